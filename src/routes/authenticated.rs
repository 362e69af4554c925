use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// The dashboard pages. Each handler takes an `AdminSession`, which keys the
/// session's page store entry and carries the backend token.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /
        // Landing page for a signed-in admin.
        .route("/", get(handlers::home))
        // --- Users Page ---
        // GET /users?name=...&email=...&status=...&refresh=...
        // Mounts the page on first visit and applies the filter to the full collection.
        .route("/users", get(handlers::list_users))
        // POST /users/{id}/block-status
        // Blocks or unblocks; the page is patched only after the backend confirms.
        .route(
            "/users/{id}/block-status",
            post(handlers::update_block_status),
        )
        // --- Withdrawals Page ---
        // GET /withdrawals?refresh=...
        .route("/withdrawals", get(handlers::list_withdrawals))
        // POST /withdrawals/{id}/approve
        // Moves a pending withdrawal to the front of the approved tab.
        .route(
            "/withdrawals/{id}/approve",
            post(handlers::approve_withdrawal),
        )
        // POST /withdrawals/{id}/reject
        .route(
            "/withdrawals/{id}/reject",
            post(handlers::reject_withdrawal),
        )
}
