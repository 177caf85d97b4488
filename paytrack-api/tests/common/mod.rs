//! Common test utilities for HTTP tests
//!
//! Builds the full router over an in-memory store seeded with the sample
//! bills, with "today" pinned so derived fields are deterministic:
//!
//! | id | owner | name          | amount  | due   | paid | recurrence |
//! |----|-------|---------------|---------|-------|------|------------|
//! | 1  | 1     | Rent          | 1200.00 | +1    |      | monthly    |
//! | 2  | 1     | Electric Bill | 85.50   | +15   |      | monthly    |
//! | 3  | 1     | Netflix       | 15.99   | -2    | -5   | monthly    |
//! | 4  | 1     | Car Insurance | 450.00  | -5    |      | none       |
//! | 5  | 1     | Phone Bill    | 65.00   | +10   |      | monthly    |
//! | 6  | 2     | Gym           | 40.00   | +3    |      | none       |

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate};
use paytrack_api::app::{build_router, AppState};
use paytrack_api::config::Config;
use paytrack_shared::auth::jwt::{create_token, Claims};
use paytrack_shared::models::payment::{NewPayment, RecurrenceKind};
use paytrack_shared::models::user::{CreateUser, User};
use paytrack_shared::service::Clock;
use paytrack_shared::store::{memory::MemoryStore, PaymentStore, UserStore};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const JWT_ISSUER: &str = "paytrack";

/// Fixed reference date for every HTTP test
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn days(offset: i64) -> NaiveDate {
    today() + Duration::days(offset)
}

/// Test context containing the router and its backing store
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub user: User,
    pub other_user: User,
}

/// Response status, headers and JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

fn sample(
    user_id: i64,
    name: &str,
    amount: &str,
    due_offset: i64,
    paid_offset: Option<i64>,
    recurrence: RecurrenceKind,
    notes: Option<&str>,
) -> NewPayment {
    NewPayment {
        user_id,
        name: name.to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        due_date: days(due_offset),
        paid_date: paid_offset.map(days),
        is_recurring: recurrence != RecurrenceKind::None,
        recurrence,
        notes: notes.map(str::to_string),
    }
}

impl TestContext {
    /// Creates a router over a freshly seeded store
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        let user = store
            .create_user(CreateUser {
                name: "john_doe".to_string(),
                email: Some("john@example.com".to_string()),
            })
            .await
            .unwrap();
        let other_user = store
            .create_user(CreateUser {
                name: "jane_roe".to_string(),
                email: Some("jane@example.com".to_string()),
            })
            .await
            .unwrap();

        let monthly = RecurrenceKind::Monthly;
        let seeds = [
            sample(user.id, "Rent", "1200.00", 1, None, monthly, Some("Monthly rent payment")),
            sample(user.id, "Electric Bill", "85.50", 15, None, monthly, Some("Electricity bill")),
            sample(user.id, "Netflix", "15.99", -2, Some(-5), monthly, Some("Streaming subscription")),
            sample(user.id, "Car Insurance", "450.00", -5, None, RecurrenceKind::None, Some("Semi-annual premium")),
            sample(user.id, "Phone Bill", "65.00", 10, None, monthly, None),
            sample(other_user.id, "Gym", "40.00", 3, None, RecurrenceKind::None, None),
        ];
        for seed in seeds {
            store.insert(seed).await.unwrap();
        }

        let state = AppState::with_clock(store.clone(), test_config(), Clock::Fixed(today()));

        Self {
            app: build_router(state),
            store,
            user,
            other_user,
        }
    }

    /// `Authorization` header value for `user_id`
    pub fn auth_header(&self, user_id: i64) -> String {
        let token = create_token(&Claims::new(user_id, JWT_ISSUER), JWT_SECRET).unwrap();
        format!("Bearer {}", token)
    }

    /// Sends a request through the router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Sends a prepared request through the router
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, None, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, None, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, None).await
    }
}

/// Names of the payments in a JSON array response, in order
pub fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}
