/// Authentication and caller identity
///
/// # Modules
///
/// - [`jwt`]: HS256 token validation (and creation for tests/tooling)
/// - [`identity`]: Resolving the acting user from path, query or token
///
/// # Example
///
/// ```
/// use paytrack_shared::auth::identity::{resolve_identity, IdentitySource};
/// use paytrack_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let token = create_token(&Claims::new(9, "paytrack"), secret)?;
/// let header = format!("Bearer {}", token);
///
/// let caller = resolve_identity(None, None, Some(&header), secret, "paytrack")?;
/// assert_eq!(caller.user_id, 9);
/// assert_eq!(caller.source, IdentitySource::Token);
/// # Ok(())
/// # }
/// ```

pub mod identity;
pub mod jwt;
