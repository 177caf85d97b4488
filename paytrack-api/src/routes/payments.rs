/// Payment endpoints
///
/// Every handler acts for the [`Caller`]; a payment owned by anyone else
/// answers 404 exactly like a missing one.
///
/// # Endpoints
///
/// Relative to `/api/payments` or `/api/users/:userId/payments`:
///
/// - `GET /` - All payments, by due date
/// - `POST /` - Create a payment (201 + Location)
/// - `GET /upcoming?days=30` - Unpaid, due from today through today + days
/// - `GET /overdue` - Unpaid, due before today
/// - `GET /due-soon?days=7` - Unpaid, due from today through today + days
/// - `GET /reminders` - Overdue plus due within three days
/// - `GET /summary` - Counts and totals
/// - `GET /:id` - One payment
/// - `PUT /:id` - Partial update
/// - `DELETE /:id` - Delete (204)
/// - `POST /:id/mark-as-paid` - Mark paid, rolling recurring payments over

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use paytrack_shared::models::{
    payment::{CreatePayment, PaymentView, UpdatePayment},
    summary::PaymentSummary,
};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Caller, JsonBody, PathParams, QueryParams},
};

/// Path parameters of single-payment routes
///
/// The `userId` segment of the nested mount is read by [`Caller`].
#[derive(Debug, Deserialize)]
pub struct PaymentPath {
    pub id: i64,
}

/// `days` query parameter of the windowed listings
#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

/// Optional body of mark-as-paid
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    pub paid_date: Option<NaiveDate>,
}

/// Mark-as-paid response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidResponse {
    pub message: String,
    pub payment: PaymentView,
    pub next_payment: Option<PaymentView>,
}

pub async fn list_payments(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(state.payments.list(caller.user_id).await?))
}

pub async fn list_upcoming(
    State(state): State<AppState>,
    Caller(caller): Caller,
    QueryParams(query): QueryParams<DaysQuery>,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(
        state
            .payments
            .list_upcoming(caller.user_id, query.days)
            .await?,
    ))
}

pub async fn list_overdue(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(state.payments.list_overdue(caller.user_id).await?))
}

pub async fn list_due_soon(
    State(state): State<AppState>,
    Caller(caller): Caller,
    QueryParams(query): QueryParams<DaysQuery>,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(
        state
            .payments
            .list_due_soon(caller.user_id, query.days)
            .await?,
    ))
}

pub async fn list_reminders(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<PaymentView>>> {
    Ok(Json(state.payments.list_reminders(caller.user_id).await?))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<PaymentSummary>> {
    Ok(Json(state.payments.summary(caller.user_id).await?))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParams(path): PathParams<PaymentPath>,
) -> ApiResult<Json<PaymentView>> {
    Ok(Json(state.payments.get(caller.user_id, path.id).await?))
}

/// Creates a payment and points `Location` at it
pub async fn create_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    OriginalUri(uri): OriginalUri,
    JsonBody(input): JsonBody<CreatePayment>,
) -> ApiResult<impl IntoResponse> {
    let created = state.payments.create(caller.user_id, input).await?;
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), created.payment.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParams(path): PathParams<PaymentPath>,
    JsonBody(changes): JsonBody<UpdatePayment>,
) -> ApiResult<Json<PaymentView>> {
    Ok(Json(
        state
            .payments
            .update(caller.user_id, path.id, changes)
            .await?,
    ))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParams(path): PathParams<PaymentPath>,
) -> ApiResult<StatusCode> {
    state.payments.delete(caller.user_id, path.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Marks a payment as paid
///
/// The body is optional; without `paidDate` the payment is paid today.
pub async fn mark_as_paid(
    State(state): State<AppState>,
    Caller(caller): Caller,
    PathParams(path): PathParams<PaymentPath>,
    body: Bytes,
) -> ApiResult<Json<MarkPaidResponse>> {
    let request = parse_optional_body(&body)?;

    let marked = state
        .payments
        .mark_paid(caller.user_id, path.id, request.paid_date)
        .await?;

    Ok(Json(MarkPaidResponse {
        message: "Payment marked as paid successfully".to_string(),
        payment: marked.payment,
        next_payment: marked.next_payment,
    }))
}

fn parse_optional_body(body: &[u8]) -> ApiResult<MarkPaidRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(MarkPaidRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_paid_body_is_optional() {
        assert!(parse_optional_body(b"").unwrap().paid_date.is_none());
        assert!(parse_optional_body(b"  \n").unwrap().paid_date.is_none());
        assert!(parse_optional_body(b"{}").unwrap().paid_date.is_none());

        let request = parse_optional_body(br#"{"paidDate":"2026-10-01"}"#).unwrap();
        assert_eq!(request.paid_date, NaiveDate::from_ymd_opt(2026, 10, 1));

        assert!(parse_optional_body(b"{not json").is_err());
    }
}
