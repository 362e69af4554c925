use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core dashboard services and components.
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod views;

// Routing split by access level (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use backend::{AdminBackend, BackendState, HttpBackend, MockBackend};
pub use config::AppConfig;
pub use pages::PageStore;

/// ApiDoc
///
/// OpenAPI document for the dashboard's own HTTP surface, served at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home, handlers::login_page, handlers::login, handlers::logout,
        handlers::list_users, handlers::update_block_status, handlers::list_withdrawals,
        handlers::approve_withdrawal, handlers::reject_withdrawal
    ),
    components(
        schemas(
            models::User, models::Withdrawal, models::WithdrawalStatus, models::LoginRequest,
            models::BlockStatusRequest, models::ApproveWithdrawalRequest,
            models::RejectWithdrawalRequest, models::UserStatusFilter, models::Toast,
            models::ToastVariant, models::UsersPage, models::WithdrawalSummary,
            models::WithdrawalsPage, models::LoginPage, models::HomePage,
        )
    ),
    tags(
        (name = "admin-dashboard", description = "Investment platform admin dashboard")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared by every request: the backend client, the per-session page store
/// and the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// Platform API access (HTTP client, or the mock in tests/local mode).
    pub backend: BackendState,
    /// Per-session page state.
    pub pages: PageStore,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state around `backend` with an empty page store.
    pub fn new(backend: BackendState, config: AppConfig) -> Self {
        Self {
            pages: PageStore::new(backend.clone()),
            backend,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for PageStore {
    fn from_ref(app_state: &AppState) -> PageStore {
        app_state.pages.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, wraps them in the route guard, and adds the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        // The guard wraps every route (matched or not), so gated prefixes
        // without a page still redirect to the login page.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying method, URI and the `x-request-id` set above, so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
