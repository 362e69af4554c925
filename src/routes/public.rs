use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. `/login` is still seen by the
/// route guard, which sends already signed-in admins home.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /login  (sign-in page, the guard's redirect target)
        // POST /login (exchanges credentials with the backend and sets the session cookie)
        .route("/login", get(handlers::login_page).post(handlers::login))
        // POST /logout
        .route("/logout", post(handlers::logout))
}
