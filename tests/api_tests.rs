use admin_dashboard::{
    AppState, MockBackend,
    backend::{MOCK_ADMIN_EMAIL, MOCK_ADMIN_PASSWORD, MockOp},
    config::AppConfig,
    create_router,
    models::{HomePage, LoginPage, User, UsersPage, WithdrawalStatus, WithdrawalsPage},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

// --- Helper Functions ---

fn test_state() -> (Arc<MockBackend>, AppState) {
    let backend = Arc::new(MockBackend::seeded());
    let mut config = AppConfig::default();
    config.session_secret = "api-test-session-secret".to_string();
    let state = AppState::new(backend.clone(), config);
    (backend, state)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Signs in as the seeded admin and returns the `name=value` cookie pair.
async fn sign_in(app: &Router) -> String {
    let response = send(
        app,
        post_json(
            "/login",
            None,
            json!({ "email": MOCK_ADMIN_EMAIL, "password": MOCK_ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login must set the session cookie")
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));

    set_cookie.split(';').next().unwrap().to_string()
}

// --- Tests ---

#[tokio::test]
async fn test_health_is_public() {
    let (_, state) = test_state();
    let app = create_router(state);

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guard_redirects_anonymous_requests_to_login() {
    let (backend, state) = test_state();
    let app = create_router(state);

    for path in ["/withdrawals/42", "/users", "/kyc", "/notifications/7"] {
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/login"), "{path}");

        // Following the redirect lands on the sign-in page.
        let target = location(&response).unwrap().to_string();
        let page = send(&app, get(&target, None)).await;
        assert_eq!(page.status(), StatusCode::OK, "{path}");
        let page: LoginPage = read_json(page).await;
        assert_eq!(page.action, "/login");
        assert_eq!(page.fields, vec!["email", "password"]);
    }

    // Nothing reached the backend.
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_guard_sends_signed_in_admin_home_from_login() {
    let (_, state) = test_state();
    let app = create_router(state);
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let home = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(home.status(), StatusCode::OK);
    let home: HomePage = read_json(home).await;
    assert_eq!(home.admin_email, MOCK_ADMIN_EMAIL);
}

#[tokio::test]
async fn test_forged_cookie_counts_as_no_session() {
    let (_, state) = test_state();
    let app = create_router(state);

    let response = send(&app, get("/users", Some("admin_session=forged.token.value"))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_login_returns_user_and_rejects_bad_password() {
    let (_, state) = test_state();
    let app = create_router(state);

    let ok = send(
        &app,
        post_json(
            "/login",
            None,
            json!({ "email": MOCK_ADMIN_EMAIL, "password": MOCK_ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let user: User = read_json(ok).await;
    assert_eq!(user.email, MOCK_ADMIN_EMAIL);

    let refused = send(
        &app,
        post_json(
            "/login",
            None,
            json!({ "email": MOCK_ADMIN_EMAIL, "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(refused.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = read_json(refused).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_users_page_filters_and_toggles_block() {
    let (backend, state) = test_state();
    let app = create_router(state);
    let cookie = sign_in(&app).await;

    let page: UsersPage = read_json(send(&app, get("/users", Some(&cookie))).await).await;
    assert_eq!(page.total, 3);
    assert_eq!(page.users.len(), 3);
    assert!(page.error.is_none());

    let blocked: UsersPage =
        read_json(send(&app, get("/users?status=blocked", Some(&cookie))).await).await;
    let ids: Vec<i64> = blocked.users.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(blocked.total, 3);

    let by_name: UsersPage =
        read_json(send(&app, get("/users?name=RAHIM", Some(&cookie))).await).await;
    assert_eq!(by_name.users.len(), 1);
    assert_eq!(by_name.users[0].id, 2);

    let response = send(
        &app,
        post_json(
            "/users/2/block-status",
            Some(&cookie),
            json!({ "is_blocked": false }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page: UsersPage = read_json(response).await;
    assert_eq!(page.toasts.len(), 1);
    assert_eq!(page.toasts[0].description, "User has been blocked");
    assert!(page.users.iter().any(|u| u.id == 2 && u.is_blocked));

    assert!(backend.users().iter().any(|u| u.id == 2 && u.is_blocked));
}

#[tokio::test]
async fn test_failed_block_renders_page_with_bad_gateway() {
    let (backend, state) = test_state();
    let app = create_router(state);
    let cookie = sign_in(&app).await;
    backend.fail(MockOp::Block);

    let response = send(
        &app,
        post_json(
            "/users/2/block-status",
            Some(&cookie),
            json!({ "is_blocked": false }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let page: UsersPage = read_json(response).await;
    assert_eq!(page.toasts[0].description, "Failed to block user");
    assert!(page.users.iter().any(|u| u.id == 2 && !u.is_blocked));
}

#[tokio::test]
async fn test_withdrawals_approve_then_repeat_conflicts() {
    let (backend, state) = test_state();
    let app = create_router(state);
    let cookie = sign_in(&app).await;

    let page: WithdrawalsPage =
        read_json(send(&app, get("/withdrawals", Some(&cookie))).await).await;
    assert_eq!(page.summary.pending_count, 2);
    assert_eq!(page.summary.pending_total_display, "BDT 1,750.50");

    let approve = || {
        post_json(
            "/withdrawals/10/approve",
            Some(&cookie),
            json!({ "admin_note": "ok" }),
        )
    };

    let first = send(&app, approve()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let page: WithdrawalsPage = read_json(first).await;
    assert_eq!(page.approved[0].id, 10);
    assert_eq!(page.approved[0].status, WithdrawalStatus::Approved);
    assert_eq!(page.summary.pending_count, 1);

    let second = send(&app, approve()).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let page: WithdrawalsPage = read_json(second).await;
    assert_eq!(page.approved.iter().filter(|w| w.id == 10).count(), 1);

    let reject = send(
        &app,
        post_json(
            "/withdrawals/11/reject",
            Some(&cookie),
            json!({ "reason": "kyc missing" }),
        ),
    )
    .await;
    assert_eq!(reject.status(), StatusCode::OK);
    let page: WithdrawalsPage = read_json(reject).await;
    assert!(page.pending.is_empty());
    assert_eq!(page.rejected[0].admin_note.as_deref(), Some("kyc missing"));

    let decisions = backend
        .calls()
        .into_iter()
        .filter(|op| matches!(op, MockOp::Approve | MockOp::Reject))
        .count();
    assert_eq!(decisions, 2);
}

#[tokio::test]
async fn test_logout_clears_cookie_and_pages() {
    let (_, state) = test_state();
    let pages = state.pages.clone();
    let app = create_router(state);
    let cookie = sign_in(&app).await;

    send(&app, get("/users", Some(&cookie))).await;
    assert_eq!(pages.open_sessions().await, 1);

    let response = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/logout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(pages.open_sessions().await, 0);
}

#[tokio::test]
async fn test_sessions_do_not_share_pages() {
    let (_, state) = test_state();
    let app = create_router(state);
    let first = sign_in(&app).await;
    let second = sign_in(&app).await;
    assert_ne!(first, second);

    send(
        &app,
        post_json(
            "/withdrawals/10/approve",
            Some(&first),
            json!({ "admin_note": "ok" }),
        ),
    )
    .await;

    // The second session mounts after the approval and sees it; its own
    // toasts stay empty because the action happened elsewhere.
    let page: WithdrawalsPage =
        read_json(send(&app, get("/withdrawals", Some(&second))).await).await;
    assert!(page.toasts.is_empty());
    assert_eq!(page.summary.pending_count, 1);
}
