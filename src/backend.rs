use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    ApproveWithdrawalRequest, LoginRequest, LoginResponse, RejectWithdrawalRequest, User,
    Withdrawal, WithdrawalStatus,
};

/// BackendError
///
/// Every way a call to the platform API can fail. The dashboard never retries;
/// callers turn these into a page error or a destructive toast.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend answered {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Backend rejected the request: {0}")]
    Rejected(String),
}

// 1. AdminBackend Contract
/// AdminBackend
///
/// The subset of the platform REST API the dashboard consumes. The concrete
/// implementation can be swapped between the real HTTP client (`HttpBackend`)
/// and the in-memory `MockBackend` without touching the views.
///
/// `token` is the backend API token captured at login. An empty token sends
/// no `Authorization` header.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// POST /auth/login
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError>;

    /// GET /users
    async fn list_users(&self, token: &str) -> Result<Vec<User>, BackendError>;

    /// POST /users/{id}/block
    async fn block_user(&self, token: &str, id: i64) -> Result<(), BackendError>;

    /// POST /users/{id}/unblock
    async fn unblock_user(&self, token: &str, id: i64) -> Result<(), BackendError>;

    /// GET /withdrawals?status={status}
    async fn list_withdrawals(
        &self,
        token: &str,
        status: WithdrawalStatus,
    ) -> Result<Vec<Withdrawal>, BackendError>;

    /// POST /withdrawals/{id}/approve with `{ admin_note }`
    async fn approve_withdrawal(
        &self,
        token: &str,
        id: i64,
        admin_note: &str,
    ) -> Result<(), BackendError>;

    /// POST /withdrawals/{id}/reject with `{ reason }`
    async fn reject_withdrawal(&self, token: &str, id: i64, reason: &str)
    -> Result<(), BackendError>;
}

/// BackendState
///
/// The concrete type used to share backend access across sessions and views.
pub type BackendState = Arc<dyn AdminBackend>;

// 2. The Real Implementation (reqwest)
/// HttpBackend
///
/// JSON-over-HTTP client for the platform API.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// new
    ///
    /// Builds the client with a per-request timeout. `base_url` must not end with `/`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        if token.is_empty() {
            builder
        } else {
            builder.bearer_auth(token)
        }
    }

    /// Sends the request and maps any non-2xx answer to `BackendError::Status`.
    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "backend returned an error status");
            return Err(BackendError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let builder = self.authorized(self.client.get(self.url(path)).query(query), token);
        let response = self.send(builder, path).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_action<B: serde::Serialize + ?Sized>(
        &self,
        token: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), BackendError> {
        let mut builder = self.authorized(self.client.post(self.url(path)), token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder, path).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
        let path = "/auth/login";
        let builder = self.client.post(self.url(path)).json(request);
        let response = self.send(builder, path).await?;
        Ok(response.json::<LoginResponse>().await?)
    }

    async fn list_users(&self, token: &str) -> Result<Vec<User>, BackendError> {
        self.get_json(token, "/users", &[]).await
    }

    async fn block_user(&self, token: &str, id: i64) -> Result<(), BackendError> {
        let path = format!("/users/{}/block", id);
        self.post_action::<()>(token, &path, None).await
    }

    async fn unblock_user(&self, token: &str, id: i64) -> Result<(), BackendError> {
        let path = format!("/users/{}/unblock", id);
        self.post_action::<()>(token, &path, None).await
    }

    async fn list_withdrawals(
        &self,
        token: &str,
        status: WithdrawalStatus,
    ) -> Result<Vec<Withdrawal>, BackendError> {
        self.get_json(token, "/withdrawals", &[("status", status.as_str())])
            .await
    }

    async fn approve_withdrawal(
        &self,
        token: &str,
        id: i64,
        admin_note: &str,
    ) -> Result<(), BackendError> {
        let path = format!("/withdrawals/{}/approve", id);
        let body = ApproveWithdrawalRequest {
            admin_note: admin_note.to_string(),
        };
        self.post_action(token, &path, Some(&body)).await
    }

    async fn reject_withdrawal(
        &self,
        token: &str,
        id: i64,
        reason: &str,
    ) -> Result<(), BackendError> {
        let path = format!("/withdrawals/{}/reject", id);
        let body = RejectWithdrawalRequest {
            reason: reason.to_string(),
        };
        self.post_action(token, &path, Some(&body)).await
    }
}

// 3. The Mock Implementation (Tests and Local Development)

/// MockOp
///
/// Identifies a backend call, used to script failures and to record calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Login,
    ListUsers,
    Block,
    Unblock,
    ListWithdrawals(WithdrawalStatus),
    Approve,
    Reject,
}

#[derive(Default)]
struct MockData {
    users: Vec<User>,
    withdrawals: Vec<Withdrawal>,
    failing: HashSet<MockOp>,
    calls: Vec<MockOp>,
}

/// MockBackend
///
/// In-memory stand-in for the platform API. Keeps its own users and
/// withdrawals so that block/approve/reject are visible on the next fetch,
/// and can be told to fail any individual operation.
#[derive(Default)]
pub struct MockBackend {
    data: Mutex<MockData>,
}

/// Credentials accepted by `MockBackend::login`.
pub const MOCK_ADMIN_EMAIL: &str = "admin@example.com";
pub const MOCK_ADMIN_PASSWORD: &str = "admin";

impl MockBackend {
    pub fn new(users: Vec<User>, withdrawals: Vec<Withdrawal>) -> Self {
        Self {
            data: Mutex::new(MockData {
                users,
                withdrawals,
                ..MockData::default()
            }),
        }
    }

    /// A small fixture set used by the local `USE_MOCK_BACKEND` mode.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let users = vec![
            User {
                id: 1,
                name: "Admin".to_string(),
                email: MOCK_ADMIN_EMAIL.to_string(),
                is_blocked: false,
                is_kyc_verified: true,
            },
            User {
                id: 2,
                name: "Rahim Uddin".to_string(),
                email: "rahim@example.com".to_string(),
                is_blocked: false,
                is_kyc_verified: true,
            },
            User {
                id: 3,
                name: "Karim Hossain".to_string(),
                email: "karim@example.com".to_string(),
                is_blocked: true,
                is_kyc_verified: false,
            },
        ];
        let withdrawals = vec![
            Withdrawal {
                id: 10,
                amount: 1500.0,
                status: WithdrawalStatus::Pending,
                admin_note: None,
                created_at: now - ChronoDuration::hours(2),
            },
            Withdrawal {
                id: 11,
                amount: 250.5,
                status: WithdrawalStatus::Pending,
                admin_note: None,
                created_at: now - ChronoDuration::days(1),
            },
            Withdrawal {
                id: 12,
                amount: 900.0,
                status: WithdrawalStatus::Approved,
                admin_note: Some("verified account".to_string()),
                created_at: now - ChronoDuration::days(3),
            },
        ];
        Self::new(users, withdrawals)
    }

    /// Makes every subsequent `op` call fail with `BackendError::Rejected`.
    pub fn fail(&self, op: MockOp) {
        self.lock().failing.insert(op);
    }

    /// Clears a failure set with `fail`.
    pub fn recover(&self, op: MockOp) {
        self.lock().failing.remove(&op);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MockOp> {
        self.lock().calls.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn withdrawals(&self) -> Vec<Withdrawal> {
        self.lock().withdrawals.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call and returns the data guard, or the scripted failure.
    fn enter(&self, op: MockOp) -> Result<MutexGuard<'_, MockData>, BackendError> {
        let mut data = self.lock();
        data.calls.push(op);
        if data.failing.contains(&op) {
            return Err(BackendError::Rejected(format!(
                "Mock Backend Error: {:?} failure requested",
                op
            )));
        }
        Ok(data)
    }

    fn set_blocked(&self, op: MockOp, id: i64, blocked: bool) -> Result<(), BackendError> {
        let mut data = self.enter(op)?;
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found(&format!("/users/{}", id)))?;
        user.is_blocked = blocked;
        Ok(())
    }

    fn decide(
        &self,
        op: MockOp,
        id: i64,
        status: WithdrawalStatus,
        note: &str,
    ) -> Result<(), BackendError> {
        let mut data = self.enter(op)?;
        let withdrawal = data
            .withdrawals
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found(&format!("/withdrawals/{}", id)))?;

        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(BackendError::Status {
                status: 409,
                path: format!("/withdrawals/{}", id),
            });
        }
        withdrawal.status = status;
        withdrawal.admin_note = Some(note.to_string());
        Ok(())
    }
}

fn not_found(path: &str) -> BackendError {
    BackendError::Status {
        status: 404,
        path: path.to_string(),
    }
}

#[async_trait]
impl AdminBackend for MockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, BackendError> {
        let data = self.enter(MockOp::Login)?;
        let user = data
            .users
            .iter()
            .find(|u| u.email == request.email)
            .filter(|_| request.password == MOCK_ADMIN_PASSWORD)
            .cloned()
            .ok_or(BackendError::Status {
                status: 401,
                path: "/auth/login".to_string(),
            })?;

        Ok(LoginResponse {
            token: format!("mock-token-{}", user.id),
            user,
        })
    }

    async fn list_users(&self, _token: &str) -> Result<Vec<User>, BackendError> {
        Ok(self.enter(MockOp::ListUsers)?.users.clone())
    }

    async fn block_user(&self, _token: &str, id: i64) -> Result<(), BackendError> {
        self.set_blocked(MockOp::Block, id, true)
    }

    async fn unblock_user(&self, _token: &str, id: i64) -> Result<(), BackendError> {
        self.set_blocked(MockOp::Unblock, id, false)
    }

    async fn list_withdrawals(
        &self,
        _token: &str,
        status: WithdrawalStatus,
    ) -> Result<Vec<Withdrawal>, BackendError> {
        let data = self.enter(MockOp::ListWithdrawals(status))?;
        Ok(data
            .withdrawals
            .iter()
            .filter(|w| w.status == status)
            .cloned()
            .collect())
    }

    async fn approve_withdrawal(
        &self,
        _token: &str,
        id: i64,
        admin_note: &str,
    ) -> Result<(), BackendError> {
        self.decide(MockOp::Approve, id, WithdrawalStatus::Approved, admin_note)
    }

    async fn reject_withdrawal(
        &self,
        _token: &str,
        id: i64,
        reason: &str,
    ) -> Result<(), BackendError> {
        self.decide(MockOp::Reject, id, WithdrawalStatus::Rejected, reason)
    }
}
