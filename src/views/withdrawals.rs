use chrono::{Local, NaiveDate};

use crate::{
    backend::{BackendError, BackendState},
    models::{Toast, Withdrawal, WithdrawalStatus, WithdrawalSummary, WithdrawalsPage},
    views::ViewError,
};

const LOAD_ERROR: &str = "Failed to load withdrawals data";
const CURRENCY: &str = "BDT";

/// format_currency
///
/// Two decimals with thousands separators, e.g. `BDT 1,234.50`. A NaN or
/// infinite amount renders as `BDT N/A`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{} N/A", CURRENCY);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{} {}.{}", sign, CURRENCY, grouped, fraction)
}

/// WithdrawalsView
///
/// State of the withdrawals page for one session: three disjoint buckets.
/// A withdrawal only ever leaves `pending`, into exactly one of the others.
pub struct WithdrawalsView {
    backend: BackendState,
    token: String,
    pending: Vec<Withdrawal>,
    approved: Vec<Withdrawal>,
    rejected: Vec<Withdrawal>,
    error: Option<String>,
    toasts: Vec<Toast>,
}

impl WithdrawalsView {
    pub fn new(backend: BackendState, token: impl Into<String>) -> Self {
        Self {
            backend,
            token: token.into(),
            pending: Vec::new(),
            approved: Vec::new(),
            rejected: Vec::new(),
            error: None,
            toasts: Vec::new(),
        }
    }

    pub fn pending(&self) -> &[Withdrawal] {
        &self.pending
    }

    pub fn approved(&self) -> &[Withdrawal] {
        &self.approved
    }

    pub fn rejected(&self) -> &[Withdrawal] {
        &self.rejected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// load
    ///
    /// Fetches the three buckets concurrently. Each successful fetch replaces
    /// its bucket; a single failure sets the shared error flag.
    pub async fn load(&mut self) {
        let backend = &self.backend;
        let token = self.token.as_str();

        let (pending, approved, rejected) = tokio::join!(
            backend.list_withdrawals(token, WithdrawalStatus::Pending),
            backend.list_withdrawals(token, WithdrawalStatus::Approved),
            backend.list_withdrawals(token, WithdrawalStatus::Rejected),
        );

        let mut failed = false;
        for (bucket, result) in [
            (&mut self.pending, pending),
            (&mut self.approved, approved),
            (&mut self.rejected, rejected),
        ] {
            match result {
                Ok(items) => *bucket = items,
                Err(e) => {
                    tracing::error!("Error fetching withdrawals: {}", e);
                    failed = true;
                }
            }
        }

        if failed {
            self.error = Some(LOAD_ERROR.to_string());
            self.toasts.push(Toast::error(LOAD_ERROR));
        } else {
            self.error = None;
        }
    }

    /// approve
    ///
    /// Moves `id` from pending to the front of approved, carrying `admin_note`.
    pub async fn approve(&mut self, id: i64, admin_note: &str) -> Result<(), ViewError> {
        self.decide(id, WithdrawalStatus::Approved, admin_note).await
    }

    /// reject
    ///
    /// Moves `id` from pending to the front of rejected; `reason` becomes the note.
    pub async fn reject(&mut self, id: i64, reason: &str) -> Result<(), ViewError> {
        self.decide(id, WithdrawalStatus::Rejected, reason).await
    }

    async fn decide(
        &mut self,
        id: i64,
        outcome: WithdrawalStatus,
        note: &str,
    ) -> Result<(), ViewError> {
        let verb = match outcome {
            WithdrawalStatus::Approved => "approve",
            _ => "reject",
        };

        // A repeated submit for an already-decided id stops here, before the backend.
        let Some(index) = self.pending.iter().position(|w| w.id == id) else {
            tracing::warn!(id, "{} requested for a withdrawal that is not pending", verb);
            self.toasts
                .push(Toast::error(format!("Failed to {} withdrawal", verb)));
            return Err(ViewError::NotPending(id));
        };

        let result: Result<(), BackendError> = match outcome {
            WithdrawalStatus::Approved => {
                self.backend
                    .approve_withdrawal(&self.token, id, note)
                    .await
            }
            _ => self.backend.reject_withdrawal(&self.token, id, note).await,
        };

        if let Err(e) = result {
            tracing::error!(id, "Error trying to {} withdrawal: {}", verb, e);
            self.toasts
                .push(Toast::error(format!("Failed to {} withdrawal", verb)));
            return Err(e.into());
        }

        let mut withdrawal = self.pending.remove(index);
        withdrawal.status = outcome;
        withdrawal.admin_note = Some(note.to_string());

        let target = match outcome {
            WithdrawalStatus::Approved => &mut self.approved,
            _ => &mut self.rejected,
        };
        target.insert(0, withdrawal);

        tracing::info!(id, status = outcome.as_str(), "withdrawal decided");
        self.toasts
            .push(Toast::success(format!("Withdrawal has been {}d", verb)));
        Ok(())
    }

    /// approved_on
    ///
    /// Approved withdrawals whose `created_at`, in local time, falls on `date`.
    pub fn approved_on(&self, date: NaiveDate) -> usize {
        self.approved
            .iter()
            .filter(|w| w.created_at.with_timezone(&Local).date_naive() == date)
            .count()
    }

    pub fn pending_total(&self) -> f64 {
        self.pending.iter().map(|w| w.amount).sum()
    }

    /// summary
    ///
    /// The derived card values. "Today" is the local calendar date, not the last 24 hours.
    pub fn summary(&self) -> WithdrawalSummary {
        let pending_total = self.pending_total();
        WithdrawalSummary {
            pending_count: self.pending.len(),
            approved_today: self.approved_on(Local::now().date_naive()),
            pending_total,
            pending_total_display: format_currency(pending_total),
        }
    }

    /// render
    ///
    /// Snapshot for the response. Drains pending toasts.
    pub fn render(&mut self) -> WithdrawalsPage {
        WithdrawalsPage {
            summary: self.summary(),
            pending: self.pending.clone(),
            approved: self.approved.clone(),
            rejected: self.rejected.clone(),
            error: self.error.clone(),
            toasts: std::mem::take(&mut self.toasts),
        }
    }
}
