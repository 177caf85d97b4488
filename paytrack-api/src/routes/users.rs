/// User endpoints
///
/// # Endpoints
///
/// - `POST /api/users` - Create user (201 + Location)
/// - `GET /api/users` - List users
/// - `GET /api/users/:userId` - Get user
/// - `PUT /api/users/:userId` - Partial update
/// - `DELETE /api/users/:userId` - Delete user and all their payments (204)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use paytrack_shared::{
    error::{FieldError, ServiceError},
    models::user::{CreateUser, UpdateUser, User},
};
use serde::Deserialize;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{JsonBody, PathParams},
};

#[derive(Debug, Deserialize)]
pub struct UserPath {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

fn user_not_found(id: i64) -> ApiError {
    ServiceError::NotFound { entity: "User", id }.into()
}

fn reject_invalid(errors: Vec<FieldError>) -> ApiResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(ServiceError::Validation(errors).into())
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUser>,
) -> ApiResult<impl IntoResponse> {
    reject_invalid(input.field_errors())?;

    let user = state.users.create_user(input).await?;
    tracing::info!(user_id = user.id, "Created user");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/users/{}", user.id))],
        Json(user),
    ))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .find_user(path.user_id)
        .await?
        .ok_or_else(|| user_not_found(path.user_id))?;

    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
    JsonBody(changes): JsonBody<UpdateUser>,
) -> ApiResult<Json<User>> {
    reject_invalid(changes.field_errors())?;

    let user = state
        .users
        .update_user(path.user_id, changes)
        .await?
        .ok_or_else(|| user_not_found(path.user_id))?;
    tracing::info!(user_id = user.id, "Updated user");

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
) -> ApiResult<StatusCode> {
    if !state.users.delete_user(path.user_id).await? {
        return Err(user_not_found(path.user_id));
    }

    tracing::info!(user_id = path.user_id, "Deleted user and their payments");
    Ok(StatusCode::NO_CONTENT)
}
