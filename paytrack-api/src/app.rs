/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use paytrack_api::{app::{build_router, AppState}, config::Config};
/// use paytrack_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use paytrack_shared::{
    service::{Clock, PaymentService},
    store::{PaymentStore, UserStore},
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Owner-scoped payment operations
    pub payments: PaymentService,

    /// User persistence
    pub users: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state over a store that holds both users and payments
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: PaymentStore + UserStore + 'static,
    {
        Self::with_clock(store, config, Clock::System)
    }

    /// Same as [`AppState::new`] with an explicit source of "today"
    pub fn with_clock<S>(store: Arc<S>, config: Config, clock: Clock) -> Self
    where
        S: PaymentStore + UserStore + 'static,
    {
        Self {
            payments: PaymentService::with_clock(store.clone(), clock),
            users: store,
            config: Arc::new(config),
        }
    }
}

/// Payment routes, mounted under both `/api/payments` and
/// `/api/users/:userId/payments`
fn payment_routes() -> Router<AppState> {
    use routes::payments;

    Router::new()
        .route("/", get(payments::list_payments).post(payments::create_payment))
        .route("/upcoming", get(payments::list_upcoming))
        .route("/overdue", get(payments::list_overdue))
        .route("/due-soon", get(payments::list_due_soon))
        .route("/reminders", get(payments::list_reminders))
        .route("/summary", get(payments::get_summary))
        .route(
            "/:id",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route("/:id/mark-as-paid", post(payments::mark_as_paid))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── /health                                # Health check
/// └── /api/
///     ├── /me                                # Resolved caller identity
///     ├── /payments/...                      # Caller from ?userId= or bearer token
///     └── /users/
///         ├── POST   /                       # Create user
///         ├── GET    /                       # List users
///         ├── GET    /:userId                # Get user
///         ├── PUT    /:userId                # Update user
///         ├── DELETE /:userId                # Delete user and their payments
///         └── /:userId/payments/...          # Caller from the path
/// ```
///
/// Payment sub-routes: `GET|POST /`, `GET /upcoming`, `GET /overdue`,
/// `GET /due-soon`, `GET /reminders`, `GET /summary`,
/// `GET|PUT|DELETE /:id`, `POST /:id/mark-as-paid`.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/:userId",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .nest("/:userId/payments", payment_routes());

    let api_routes = Router::new()
        .route("/me", get(routes::me::whoami))
        .nest("/payments", payment_routes())
        .nest("/users", user_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
