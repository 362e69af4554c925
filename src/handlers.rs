use crate::{
    AppState,
    auth::{self, AdminSession},
    backend::BackendError,
    error::{ApiError, ApiResult},
    models::{
        ApproveWithdrawalRequest, BlockStatusRequest, HomePage, LoginPage, LoginRequest,
        RejectWithdrawalRequest, User, UserFilter, UserStatusFilter, UsersPage, WithdrawalsPage,
    },
    pages::PageStore,
    views::ViewError,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;

// --- Query Structs ---

/// UsersQuery
///
/// Query parameters of the users page. The filter fields mirror the filter
/// form; `refresh=true` refetches the collection before filtering.
#[derive(Deserialize, Default, utoipa::IntoParams)]
pub struct UsersQuery {
    /// Case-insensitive substring of the user's name.
    pub name: Option<String>,
    /// Case-insensitive substring of the user's email.
    pub email: Option<String>,
    /// One of `all`, `blocked`, `active`, `verified`.
    pub status: Option<UserStatusFilter>,
    pub refresh: Option<bool>,
}

impl UsersQuery {
    fn filter(&self) -> UserFilter {
        UserFilter {
            name: self.name.clone(),
            email: self.email.clone(),
            status: self.status,
        }
    }
}

/// WithdrawalsQuery
///
/// Query parameters of the withdrawals page; `refresh=true` refetches all three buckets.
#[derive(Deserialize, Default, utoipa::IntoParams)]
pub struct WithdrawalsQuery {
    pub refresh: Option<bool>,
}

/// Maps a failed page action to the status the page is rendered with.
fn failure_status(error: &ViewError) -> StatusCode {
    match error {
        ViewError::Backend(_) => StatusCode::BAD_GATEWAY,
        ViewError::NotPending(_) => StatusCode::CONFLICT,
    }
}

// --- Handlers ---

/// home
///
/// [Authenticated Route] Landing page after sign-in.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home", body = HomePage),
        (status = 401, description = "No session")
    )
)]
pub async fn home(session: AdminSession) -> Json<HomePage> {
    Json(HomePage {
        admin_email: session.email,
        sections: ["users", "withdrawals", "kyc", "plans", "tasks", "transactions", "notifications"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })
}

/// login_page
///
/// [Public Route] The sign-in page. Signed-in admins never reach it: the
/// route guard sends them home first.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Sign-in page", body = LoginPage))
)]
pub async fn login_page() -> Json<LoginPage> {
    Json(LoginPage {
        title: "Admin sign in".to_string(),
        action: "/login".to_string(),
        fields: vec!["email".to_string(), "password".to_string()],
    })
}

/// login
///
/// [Public Route] Forwards the credentials to the backend and, on success,
/// issues the signed `admin_session` cookie wrapping the backend token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = User),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Backend unavailable")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.backend.login(&payload).await.map_err(|e| match e {
        BackendError::Status { status: 400 | 401 | 403, .. } => ApiError::InvalidCredentials,
        other => ApiError::Backend(other),
    })?;

    let (token, claims) = auth::issue_session(&state.config, &response.user, &response.token)?;
    tracing::info!(session = %claims.sid, admin = %claims.sub, "admin signed in");

    let cookie = auth::session_cookie(&token, state.config.session_ttl_secs);
    Ok(([(header::SET_COOKIE, cookie)], Json(response.user)))
}

/// logout
///
/// [Public Route] Clears the session cookie and drops the session's pages.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(claims) = auth::session_from_headers(&headers, &state.config) {
        state.pages.close(claims.sid).await;
        tracing::info!(session = %claims.sid, "admin signed out");
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, auth::clear_session_cookie())],
    )
}

/// list_users
///
/// [Authenticated Route] Renders the users page. The first request of a
/// session mounts the page (fetching all users); every request re-applies
/// the filter from the query string to the full collection.
#[utoipa::path(
    get,
    path = "/users",
    params(UsersQuery),
    responses((status = 200, description = "Users page", body = UsersPage))
)]
pub async fn list_users(
    session: AdminSession,
    State(pages): State<PageStore>,
    Query(query): Query<UsersQuery>,
) -> Json<UsersPage> {
    let view = pages.users(&session).await;
    let mut view = view.lock().await;

    if query.refresh.unwrap_or(false) {
        view.load().await;
    }
    view.filter(&query.filter());

    Json(view.render())
}

/// update_block_status
///
/// [Authenticated Route] Blocks or unblocks a user, given the block state
/// the admin currently sees. On failure nothing changes and the page comes
/// back with a destructive toast and a 502.
#[utoipa::path(
    post,
    path = "/users/{id}/block-status",
    params(("id" = i64, Path, description = "User ID")),
    request_body = BlockStatusRequest,
    responses(
        (status = 200, description = "Updated", body = UsersPage),
        (status = 502, description = "Backend refused", body = UsersPage)
    )
)]
pub async fn update_block_status(
    session: AdminSession,
    State(pages): State<PageStore>,
    Path(id): Path<i64>,
    Json(payload): Json<BlockStatusRequest>,
) -> (StatusCode, Json<UsersPage>) {
    let view = pages.users(&session).await;
    let mut view = view.lock().await;

    let status = match view.toggle_block(id, payload.is_blocked).await {
        Ok(()) => StatusCode::OK,
        Err(e) => failure_status(&e),
    };

    (status, Json(view.render()))
}

/// list_withdrawals
///
/// [Authenticated Route] Renders the withdrawals page with its summary cards.
#[utoipa::path(
    get,
    path = "/withdrawals",
    params(WithdrawalsQuery),
    responses((status = 200, description = "Withdrawals page", body = WithdrawalsPage))
)]
pub async fn list_withdrawals(
    session: AdminSession,
    State(pages): State<PageStore>,
    Query(query): Query<WithdrawalsQuery>,
) -> Json<WithdrawalsPage> {
    let view = pages.withdrawals(&session).await;
    let mut view = view.lock().await;

    if query.refresh.unwrap_or(false) {
        view.load().await;
    }

    Json(view.render())
}

/// approve_withdrawal
///
/// [Authenticated Route] Approves a pending withdrawal with an admin note.
#[utoipa::path(
    post,
    path = "/withdrawals/{id}/approve",
    params(("id" = i64, Path, description = "Withdrawal ID")),
    request_body = ApproveWithdrawalRequest,
    responses(
        (status = 200, description = "Approved", body = WithdrawalsPage),
        (status = 409, description = "Not pending", body = WithdrawalsPage),
        (status = 502, description = "Backend refused", body = WithdrawalsPage)
    )
)]
pub async fn approve_withdrawal(
    session: AdminSession,
    State(pages): State<PageStore>,
    Path(id): Path<i64>,
    Json(payload): Json<ApproveWithdrawalRequest>,
) -> (StatusCode, Json<WithdrawalsPage>) {
    let view = pages.withdrawals(&session).await;
    let mut view = view.lock().await;

    let status = match view.approve(id, &payload.admin_note).await {
        Ok(()) => StatusCode::OK,
        Err(e) => failure_status(&e),
    };

    (status, Json(view.render()))
}

/// reject_withdrawal
///
/// [Authenticated Route] Rejects a pending withdrawal; the reason is stored as its note.
#[utoipa::path(
    post,
    path = "/withdrawals/{id}/reject",
    params(("id" = i64, Path, description = "Withdrawal ID")),
    request_body = RejectWithdrawalRequest,
    responses(
        (status = 200, description = "Rejected", body = WithdrawalsPage),
        (status = 409, description = "Not pending", body = WithdrawalsPage),
        (status = 502, description = "Backend refused", body = WithdrawalsPage)
    )
)]
pub async fn reject_withdrawal(
    session: AdminSession,
    State(pages): State<PageStore>,
    Path(id): Path<i64>,
    Json(payload): Json<RejectWithdrawalRequest>,
) -> (StatusCode, Json<WithdrawalsPage>) {
    let view = pages.withdrawals(&session).await;
    let mut view = view.lock().await;

    let status = match view.reject(id, &payload.reason).await {
        Ok(()) => StatusCode::OK,
        Err(e) => failure_status(&e),
    };

    (status, Json(view.render()))
}
