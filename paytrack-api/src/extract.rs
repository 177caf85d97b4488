/// Request extractors
///
/// - [`Caller`]: the user a request acts for, resolved from the `userId`
///   path parameter, the `userId` query parameter or a bearer token, in
///   that order
/// - [`JsonBody`], [`QueryParams`], [`PathParams`]: the axum extractors
///   with rejections reported as [`ApiError`] JSON bodies
///
/// # Example
///
/// ```no_run
/// use paytrack_api::extract::Caller;
///
/// async fn whoami(Caller(caller): Caller) -> String {
///     format!("user {}", caller.user_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query},
    http::{header, request::Parts},
};
use paytrack_shared::auth::identity::{resolve_identity, CallerIdentity};
use serde::Deserialize;
use std::collections::HashMap;

use crate::{app::AppState, error::ApiError};

/// Name of the identity parameter in paths and query strings
pub const USER_ID_PARAM: &str = "userId";

/// Resolved caller identity
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub CallerIdentity);

#[derive(Debug, Deserialize)]
struct IdentityQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Routes without path parameters reject; that just means "not in the path"
        let path_params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();

        let query = Query::<IdentityQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .map_err(ApiError::from)?;

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let caller = resolve_identity(
            path_params.get(USER_ID_PARAM).map(String::as_str),
            query.user_id.as_deref(),
            authorization,
            &state.config.jwt.secret,
            &state.config.jwt.issuer,
        )
        .map_err(|err| {
            tracing::debug!(error = %err, "Caller identity not resolved");
            ApiError::from(err)
        })?;

        Ok(Caller(caller))
    }
}

/// `axum::Json` with rejections reported as 400 JSON errors
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Query` with rejections reported as 400 JSON errors
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// `axum::extract::Path` with rejections reported as 400 JSON errors
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParams<T>(pub T);
