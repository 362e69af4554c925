use crate::{
    backend::BackendState,
    models::{Toast, User, UserFilter, UserStatusFilter, UsersPage},
    views::ViewError,
};

const LOAD_ERROR: &str = "Failed to load users data";

/// apply_filter
///
/// Name match, then email match (both case-insensitive substrings), then the
/// status predicate. Never touches `users`.
pub fn apply_filter(users: &[User], filter: &UserFilter) -> Vec<User> {
    let name = provided(&filter.name);
    let email = provided(&filter.email);
    let status = filter.status.unwrap_or_default();

    users
        .iter()
        .filter(|user| name.as_ref().is_none_or(|n| user.name.to_lowercase().contains(n)))
        .filter(|user| email.as_ref().is_none_or(|e| user.email.to_lowercase().contains(e)))
        .filter(|user| match status {
            UserStatusFilter::All => true,
            UserStatusFilter::Blocked => user.is_blocked,
            UserStatusFilter::Active => !user.is_blocked,
            UserStatusFilter::Verified => user.is_kyc_verified,
        })
        .cloned()
        .collect()
}

fn provided(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// UsersView
///
/// State of the users page for one session: the authoritative `all`
/// collection and the `filtered` collection currently on screen.
pub struct UsersView {
    backend: BackendState,
    token: String,
    all: Vec<User>,
    filtered: Vec<User>,
    error: Option<String>,
    toasts: Vec<Toast>,
}

impl UsersView {
    pub fn new(backend: BackendState, token: impl Into<String>) -> Self {
        Self {
            backend,
            token: token.into(),
            all: Vec::new(),
            filtered: Vec::new(),
            error: None,
            toasts: Vec::new(),
        }
    }

    pub fn all(&self) -> &[User] {
        &self.all
    }

    pub fn filtered(&self) -> &[User] {
        &self.filtered
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// load
    ///
    /// Fetches every user. On failure the previous collections stay as they are.
    pub async fn load(&mut self) {
        match self.backend.list_users(&self.token).await {
            Ok(users) => {
                self.filtered = users.clone();
                self.all = users;
                self.error = None;
            }
            Err(e) => {
                tracing::error!("Error fetching users: {}", e);
                self.error = Some(LOAD_ERROR.to_string());
                self.toasts.push(Toast::error(LOAD_ERROR));
            }
        }
    }

    /// filter
    ///
    /// Recomputes `filtered` from `all`, so filters never compound.
    pub fn filter(&mut self, filter: &UserFilter) {
        self.filtered = apply_filter(&self.all, filter);
    }

    /// toggle_block
    ///
    /// Unblocks when `currently_blocked`, blocks otherwise. The new state is
    /// written to both collections only after the backend confirms.
    pub async fn toggle_block(
        &mut self,
        user_id: i64,
        currently_blocked: bool,
    ) -> Result<(), ViewError> {
        let action = if currently_blocked { "unblock" } else { "block" };

        let result = if currently_blocked {
            self.backend.unblock_user(&self.token, user_id).await
        } else {
            self.backend.block_user(&self.token, user_id).await
        };

        if let Err(e) = result {
            tracing::error!(user_id, "Error updating user block status: {}", e);
            self.toasts
                .push(Toast::error(format!("Failed to {} user", action)));
            return Err(e.into());
        }

        let is_blocked = !currently_blocked;
        for user in self
            .all
            .iter_mut()
            .chain(self.filtered.iter_mut())
            .filter(|user| user.id == user_id)
        {
            user.is_blocked = is_blocked;
        }

        tracing::info!(user_id, is_blocked, "user block status updated");
        self.toasts
            .push(Toast::success(format!("User has been {}ed", action)));
        Ok(())
    }

    /// render
    ///
    /// Snapshot for the response. Drains pending toasts.
    pub fn render(&mut self) -> UsersPage {
        UsersPage {
            users: self.filtered.clone(),
            total: self.all.len(),
            error: self.error.clone(),
            toasts: std::mem::take(&mut self.toasts),
        }
    }
}
