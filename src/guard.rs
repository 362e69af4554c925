//! Route guard: decides, before any handler runs, whether a request may
//! proceed or must be redirected based on its path and session presence.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth};

/// Path prefixes that require a signed-in admin.
pub const PROTECTED_PREFIXES: [&str; 8] = [
    "/(dashboard)",
    "/users",
    "/withdrawals",
    "/kyc",
    "/plans",
    "/tasks",
    "/transactions",
    "/notifications",
];

/// Path prefix of the sign-in page.
pub const AUTH_PREFIX: &str = "/login";

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// RouteClass
///
/// Access level of a path: gated, the sign-in page, or open to anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Protected,
    Auth,
    Public,
}

/// GuardDecision
///
/// Outcome of the guard for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

/// classify
///
/// Plain prefix match, so `/users/42` and `/usersettings` are both protected.
pub fn classify(path: &str) -> RouteClass {
    if PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        RouteClass::Protected
    } else if path.starts_with(AUTH_PREFIX) {
        RouteClass::Auth
    } else {
        RouteClass::Public
    }
}

/// decide
///
/// Protected without a token goes to the login page; the login page with a
/// token goes home; everything else passes.
pub fn decide(path: &str, token_present: bool) -> GuardDecision {
    match (classify(path), token_present) {
        (RouteClass::Protected, false) => GuardDecision::RedirectToLogin,
        (RouteClass::Auth, true) => GuardDecision::RedirectToHome,
        _ => GuardDecision::Allow,
    }
}

/// route_guard
///
/// Middleware applied around the whole router. The session lookup never
/// fails loudly: a missing, expired or forged session is simply "no token".
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let token_present = auth::session_from_headers(request.headers(), &state.config).is_some();

    match decide(&path, token_present) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToLogin => {
            tracing::debug!(%path, "no session, redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
        GuardDecision::RedirectToHome => {
            tracing::debug!(%path, "already signed in, redirecting home");
            Redirect::to(HOME_PATH).into_response()
        }
    }
}
