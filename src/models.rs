use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Backend Records (Owned by the Platform API) ---

/// User
///
/// A platform user as returned by `GET /users`. The dashboard never creates or
/// deletes users; it only flips `is_blocked` after the backend confirms a
/// block/unblock call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_kyc_verified: bool,
}

/// WithdrawalStatus
///
/// The three mutually exclusive states of a withdrawal request.
/// Transitions are one-directional: `Pending -> Approved` or `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum WithdrawalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    /// The value used in the `?status=` query of `GET /withdrawals`.
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

/// Withdrawal
///
/// A withdrawal request as returned by `GET /withdrawals?status=...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Withdrawal {
    pub id: i64,
    /// Amount in BDT.
    pub amount: f64,
    pub status: WithdrawalStatus,
    /// Set by an admin on approval (the note) or rejection (the reason).
    #[serde(default)]
    pub admin_note: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads ---

/// LoginRequest
///
/// Credentials posted to `/login` and forwarded untouched to the backend's
/// `/auth/login`. The password is never logged or stored by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// The backend's answer to a successful login: its own API token plus the
/// admin's user record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// ApproveWithdrawalRequest
///
/// Body of `POST /withdrawals/{id}/approve`, both on the dashboard and on the backend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ApproveWithdrawalRequest {
    #[serde(default)]
    pub admin_note: String,
}

/// RejectWithdrawalRequest
///
/// Body of `POST /withdrawals/{id}/reject`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RejectWithdrawalRequest {
    #[serde(default)]
    pub reason: String,
}

/// BlockStatusRequest
///
/// Body of `POST /users/{id}/block-status`. Carries the block state the admin
/// currently sees; the dashboard flips it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlockStatusRequest {
    pub is_blocked: bool,
}

/// UserStatusFilter
///
/// The status dropdown of the users page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum UserStatusFilter {
    #[default]
    All,
    Blocked,
    Active,
    Verified,
}

/// UserFilter
///
/// Every field is optional; an empty string counts as "not provided".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatusFilter>,
}

// --- Notifications ---

/// ToastVariant
///
/// Visual style of a toast: neutral for success, destructive for failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// Toast
///
/// A transient notification produced by a page action. Toasts are drained
/// into the next rendered page and then forgotten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

// --- Page Models (Output) ---

/// UsersPage
///
/// Render model of the users page: the filtered table plus page-level state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UsersPage {
    pub users: Vec<User>,
    /// Size of the unfiltered collection.
    pub total: usize,
    pub error: Option<String>,
    pub toasts: Vec<Toast>,
}

/// WithdrawalSummary
///
/// The three cards at the top of the withdrawals page. Recomputed on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WithdrawalSummary {
    pub pending_count: usize,
    /// Approved withdrawals created on the current local calendar day.
    pub approved_today: usize,
    pub pending_total: f64,
    /// `pending_total` formatted as currency, e.g. `BDT 1,234.50`.
    pub pending_total_display: String,
}

/// WithdrawalsPage
///
/// Render model of the withdrawals page: one tab per bucket.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct WithdrawalsPage {
    pub summary: WithdrawalSummary,
    pub pending: Vec<Withdrawal>,
    pub approved: Vec<Withdrawal>,
    pub rejected: Vec<Withdrawal>,
    pub error: Option<String>,
    pub toasts: Vec<Toast>,
}

/// LoginPage
///
/// The sign-in page served to anonymous admins, including those redirected
/// here by the route guard. Credentials are posted as a `LoginRequest`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginPage {
    pub title: String,
    /// Where the form posts to.
    pub action: String,
    /// Names of the `LoginRequest` fields the form collects.
    pub fields: Vec<String>,
}

/// HomePage
///
/// Landing view for a signed-in admin.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HomePage {
    pub admin_email: String,
    pub sections: Vec<String>,
}
