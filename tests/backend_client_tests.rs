use admin_dashboard::{
    backend::{AdminBackend, BackendError, HttpBackend},
    models::{
        ApproveWithdrawalRequest, LoginRequest, LoginResponse, RejectWithdrawalRequest, User,
        Withdrawal, WithdrawalStatus,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

// --- Fake Platform Backend ---

const API_TOKEN: &str = "backend-api-token";

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Deserialize)]
struct StatusQuery {
    status: WithdrawalStatus,
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", API_TOKEN))
}

fn ann() -> User {
    User {
        id: 1,
        name: "Ann".to_string(),
        email: "a@x.com".to_string(),
        is_blocked: false,
        is_kyc_verified: true,
    }
}

async fn spawn_backend() -> (String, Journal) {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let router = Router::new()
        .route(
            "/auth/login",
            post(|Json(req): Json<LoginRequest>| async move {
                if req.password == "secret" {
                    Ok(Json(LoginResponse {
                        token: API_TOKEN.to_string(),
                        user: ann(),
                    }))
                } else {
                    Err(StatusCode::UNAUTHORIZED)
                }
            }),
        )
        .route(
            "/users",
            get(|headers: HeaderMap| async move {
                if bearer_ok(&headers) {
                    Ok(Json(vec![ann()]))
                } else {
                    Err(StatusCode::UNAUTHORIZED)
                }
            }),
        )
        .route(
            "/users/{id}/block",
            post(
                |State(journal): State<Journal>, Path(id): Path<i64>| async move {
                    journal.lock().unwrap().push(format!("block {}", id));
                    StatusCode::NO_CONTENT
                },
            ),
        )
        .route(
            "/users/{id}/unblock",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/withdrawals",
            get(|Query(q): Query<StatusQuery>| async move {
                Json(vec![Withdrawal {
                    id: 42,
                    amount: 99.5,
                    status: q.status,
                    admin_note: None,
                    created_at: Utc::now(),
                }])
            }),
        )
        .route(
            "/withdrawals/{id}/approve",
            post(
                |State(journal): State<Journal>,
                 Path(id): Path<i64>,
                 Json(body): Json<ApproveWithdrawalRequest>| async move {
                    journal
                        .lock()
                        .unwrap()
                        .push(format!("approve {} {}", id, body.admin_note));
                    StatusCode::OK
                },
            ),
        )
        .route(
            "/withdrawals/{id}/reject",
            post(
                |State(journal): State<Journal>,
                 Path(id): Path<i64>,
                 Json(body): Json<RejectWithdrawalRequest>| async move {
                    journal
                        .lock()
                        .unwrap()
                        .push(format!("reject {} {}", id, body.reason));
                    StatusCode::OK
                },
            ),
        )
        .with_state(journal.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://127.0.0.1:{}/", port), journal)
}

// --- Tests ---

#[tokio::test]
async fn test_login_exchanges_credentials_for_token() {
    let (url, _) = spawn_backend().await;
    let client = HttpBackend::new(&url, 5).unwrap();

    let response = client
        .login(&LoginRequest {
            email: "a@x.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.token, API_TOKEN);
    assert_eq!(response.user, ann());

    let refused = client
        .login(&LoginRequest {
            email: "a@x.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;
    assert!(matches!(
        refused,
        Err(BackendError::Status { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_list_users_sends_bearer_token() {
    let (url, _) = spawn_backend().await;
    let client = HttpBackend::new(&url, 5).unwrap();

    let users = client.list_users(API_TOKEN).await.unwrap();
    assert_eq!(users, vec![ann()]);

    let anonymous = client.list_users("").await;
    assert!(matches!(
        anonymous,
        Err(BackendError::Status { status: 401, ref path }) if path == "/users"
    ));
}

#[tokio::test]
async fn test_block_and_failed_unblock() {
    let (url, journal) = spawn_backend().await;
    let client = HttpBackend::new(&url, 5).unwrap();

    client.block_user(API_TOKEN, 7).await.unwrap();
    let failed = client.unblock_user(API_TOKEN, 7).await;

    assert_eq!(*journal.lock().unwrap(), vec!["block 7".to_string()]);
    assert!(matches!(
        failed,
        Err(BackendError::Status { status: 500, ref path }) if path == "/users/7/unblock"
    ));
}

#[tokio::test]
async fn test_list_withdrawals_filters_by_status_query() {
    let (url, _) = spawn_backend().await;
    let client = HttpBackend::new(&url, 5).unwrap();

    for status in [
        WithdrawalStatus::Pending,
        WithdrawalStatus::Approved,
        WithdrawalStatus::Rejected,
    ] {
        let items = client.list_withdrawals(API_TOKEN, status).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, status);
    }
}

#[tokio::test]
async fn test_approve_and_reject_send_their_bodies() {
    let (url, journal) = spawn_backend().await;
    let client = HttpBackend::new(&url, 5).unwrap();

    client
        .approve_withdrawal(API_TOKEN, 5, "ok")
        .await
        .unwrap();
    client
        .reject_withdrawal(API_TOKEN, 6, "kyc missing")
        .await
        .unwrap();

    assert_eq!(
        *journal.lock().unwrap(),
        vec!["approve 5 ok".to_string(), "reject 6 kyc missing".to_string()]
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = HttpBackend::new(&format!("http://127.0.0.1:{}", port), 2).unwrap();
    let result = client.list_users(API_TOKEN).await;

    assert!(matches!(result, Err(BackendError::Transport(_))));
}
