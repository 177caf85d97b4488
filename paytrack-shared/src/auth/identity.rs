/// Caller identity resolution
///
/// A request names its caller in one of three places, checked in order:
///
/// 1. a `userId` path parameter
/// 2. a `userId` query parameter
/// 3. the subject of a bearer token in the `Authorization` header
///
/// The first place that is present decides; later ones are not consulted,
/// so a bad token is ignored when the path already names the user.
///
/// # Example
///
/// ```
/// use paytrack_shared::auth::identity::{resolve_identity, IdentitySource};
///
/// let caller = resolve_identity(None, Some("3"), None, "secret", "paytrack").unwrap();
/// assert_eq!(caller.user_id, 3);
/// assert_eq!(caller.source, IdentitySource::Query);
/// ```

use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, JwtError};

/// Where the caller's identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Path,
    Query,
    Token,
}

/// The user a request acts on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: i64,
    pub source: IdentitySource,
}

/// Identity resolution failures
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No path parameter, query parameter or token
    #[error("User ID is required")]
    Missing,

    /// A userId parameter that is not a positive integer
    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    /// Authorization header present but not a bearer token
    #[error("Invalid Authorization header format")]
    InvalidFormat,

    /// Bearer token failed validation
    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[from] JwtError),
}

fn parse_user_id(raw: &str) -> Result<i64, IdentityError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(IdentityError::InvalidUserId(raw.to_string())),
    }
}

/// Extracts the token from a `Bearer <token>` header value
pub fn bearer_token(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller from the raw request parts
///
/// `secret` and `issuer` are only used when identity falls through to the
/// bearer token.
pub fn resolve_identity(
    path_user_id: Option<&str>,
    query_user_id: Option<&str>,
    authorization: Option<&str>,
    secret: &str,
    issuer: &str,
) -> Result<CallerIdentity, IdentityError> {
    if let Some(raw) = path_user_id {
        return Ok(CallerIdentity {
            user_id: parse_user_id(raw)?,
            source: IdentitySource::Path,
        });
    }

    if let Some(raw) = query_user_id {
        return Ok(CallerIdentity {
            user_id: parse_user_id(raw)?,
            source: IdentitySource::Query,
        });
    }

    let Some(header) = authorization else {
        return Err(IdentityError::Missing);
    };
    let token = bearer_token(header).ok_or(IdentityError::InvalidFormat)?;
    let claims = validate_token(token, secret, issuer)?;

    Ok(CallerIdentity {
        user_id: claims.sub,
        source: IdentitySource::Token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const ISSUER: &str = "paytrack";

    fn bearer(user_id: i64) -> String {
        let token = create_token(&Claims::new(user_id, ISSUER), SECRET).unwrap();
        format!("Bearer {}", token)
    }

    #[test]
    fn test_path_wins_over_query_and_token() {
        let header = bearer(3);
        let caller = resolve_identity(Some("1"), Some("2"), Some(&header), SECRET, ISSUER).unwrap();

        assert_eq!(caller.user_id, 1);
        assert_eq!(caller.source, IdentitySource::Path);
    }

    #[test]
    fn test_query_wins_over_token() {
        let header = bearer(3);
        let caller = resolve_identity(None, Some("2"), Some(&header), SECRET, ISSUER).unwrap();

        assert_eq!(caller.user_id, 2);
        assert_eq!(caller.source, IdentitySource::Query);
    }

    #[test]
    fn test_token_fallback() {
        let header = bearer(3);
        let caller = resolve_identity(None, None, Some(&header), SECRET, ISSUER).unwrap();

        assert_eq!(caller.user_id, 3);
        assert_eq!(caller.source, IdentitySource::Token);
    }

    #[test]
    fn test_bad_token_ignored_when_path_present() {
        let caller =
            resolve_identity(Some("5"), None, Some("Bearer garbage"), SECRET, ISSUER).unwrap();
        assert_eq!(caller.user_id, 5);
    }

    #[test]
    fn test_missing_identity() {
        let result = resolve_identity(None, None, None, SECRET, ISSUER);
        assert!(matches!(result, Err(IdentityError::Missing)));
    }

    #[test]
    fn test_invalid_user_id() {
        for raw in ["abc", "0", "-4", ""] {
            let result = resolve_identity(None, Some(raw), None, SECRET, ISSUER);
            assert!(matches!(result, Err(IdentityError::InvalidUserId(_))), "{raw}");
        }
    }

    #[test]
    fn test_invalid_header_and_token() {
        let result = resolve_identity(None, None, Some("Basic dXNlcjpwYXNz"), SECRET, ISSUER);
        assert!(matches!(result, Err(IdentityError::InvalidFormat)));

        let result = resolve_identity(None, None, Some("Bearer not.a.token"), SECRET, ISSUER);
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
