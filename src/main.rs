use admin_dashboard::{
    AppState,
    backend::{BackendState, HttpBackend, MockBackend},
    config::{AppConfig, Env},
    create_router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PAGE_SWEEP_SECS: u64 = 300;

/// main
///
/// Entry point: configuration, logging, backend client, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for the dashboard itself.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "admin_dashboard=debug,tower_http=info".into());

    // 3. Pretty logs locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Dashboard starting in {:?} mode", config.env);

    // 4. Backend Client
    let backend: BackendState = if config.use_mock_backend {
        tracing::warn!("USE_MOCK_BACKEND is set: serving seeded in-memory data");
        Arc::new(MockBackend::seeded()) as BackendState
    } else {
        let client = HttpBackend::new(&config.backend_url, config.backend_timeout_secs)
            .expect("FATAL: Failed to build the backend HTTP client.");
        tracing::info!(backend = %config.backend_url, "using platform backend");
        Arc::new(client) as BackendState
    };

    // 5. Router, Page Sweeper and Server Startup
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(backend, config);

    // Sessions that expire without a logout are swept here.
    let pages = state.pages.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(PAGE_SWEEP_SECS));
        loop {
            ticker.tick().await;
            let evicted = pages.evict_expired().await;
            if evicted > 0 {
                tracing::info!(evicted, "evicted pages of expired sessions");
            }
        }
    });

    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
