use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    auth::{self, AdminSession},
    backend::BackendState,
    views::{UsersView, WithdrawalsView},
};

/// SessionPages
///
/// The pages mounted for one session. A page is mounted (and loaded) the
/// first time it is requested and lives until logout or until the session
/// expires, whichever comes first.
#[derive(Default)]
struct SessionPages {
    expires_at: usize,
    users: Option<Arc<Mutex<UsersView>>>,
    withdrawals: Option<Arc<Mutex<WithdrawalsView>>>,
}

/// PageStore
///
/// Owns the view state of every signed-in session. Views of different
/// sessions never share collections. Each view sits behind its own async
/// mutex, so actions on one page of one session run one at a time.
#[derive(Clone)]
pub struct PageStore {
    backend: BackendState,
    sessions: Arc<Mutex<HashMap<Uuid, SessionPages>>>,
}

impl PageStore {
    pub fn new(backend: BackendState) -> Self {
        Self {
            backend,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Evicts expired sessions, then returns the entry for `session`.
    fn entry<'a>(
        sessions: &'a mut HashMap<Uuid, SessionPages>,
        session: &AdminSession,
    ) -> &'a mut SessionPages {
        drop_expired(sessions);

        let pages = sessions.entry(session.id).or_default();
        pages.expires_at = session.expires_at;
        pages
    }

    /// users
    ///
    /// Returns the session's users view, mounting and loading it on first use.
    pub async fn users(&self, session: &AdminSession) -> Arc<Mutex<UsersView>> {
        let (view, mounting) = {
            let mut sessions = self.sessions.lock().await;
            let pages = Self::entry(&mut sessions, session);
            match pages.users.clone() {
                Some(view) => (view, None),
                None => {
                    let view = Arc::new(Mutex::new(UsersView::new(
                        self.backend.clone(),
                        session.backend_token.clone(),
                    )));
                    // Locked before it becomes visible, so nobody renders it unloaded.
                    let guard = view.clone().lock_owned().await;
                    pages.users = Some(view.clone());
                    (view, Some(guard))
                }
            }
        };

        if let Some(mut guard) = mounting {
            tracing::debug!(session = %session.id, "mounting users page");
            guard.load().await;
        }
        view
    }

    /// withdrawals
    ///
    /// Returns the session's withdrawals view, mounting and loading it on first use.
    pub async fn withdrawals(&self, session: &AdminSession) -> Arc<Mutex<WithdrawalsView>> {
        let (view, mounting) = {
            let mut sessions = self.sessions.lock().await;
            let pages = Self::entry(&mut sessions, session);
            match pages.withdrawals.clone() {
                Some(view) => (view, None),
                None => {
                    let view = Arc::new(Mutex::new(WithdrawalsView::new(
                        self.backend.clone(),
                        session.backend_token.clone(),
                    )));
                    // Locked before it becomes visible, so nobody renders it unloaded.
                    let guard = view.clone().lock_owned().await;
                    pages.withdrawals = Some(view.clone());
                    (view, Some(guard))
                }
            }
        };

        if let Some(mut guard) = mounting {
            tracing::debug!(session = %session.id, "mounting withdrawals page");
            guard.load().await;
        }
        view
    }

    /// Drops every page of the session.
    pub async fn close(&self, session_id: Uuid) {
        self.sessions.lock().await.remove(&session_id);
    }

    /// evict_expired
    ///
    /// Drops the pages of every session that has expired. Returns how many
    /// sessions were dropped.
    pub async fn evict_expired(&self) -> usize {
        drop_expired(&mut *self.sessions.lock().await)
    }

    /// Number of sessions with at least one mounted page.
    pub async fn open_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

fn drop_expired(sessions: &mut HashMap<Uuid, SessionPages>) -> usize {
    let now = auth::now_secs() as usize;
    let before = sessions.len();
    sessions.retain(|_, pages| pages.expires_at > now);

    let evicted = before - sessions.len();
    if evicted > 0 {
        tracing::debug!(evicted, "dropped pages of expired sessions");
    }
    evicted
}
