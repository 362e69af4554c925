//! Page state containers.
//!
//! Each view owns the collections one dashboard page renders. Loads and
//! mutations go through the backend first; local collections are patched
//! only after the backend confirms.

use thiserror::Error;

use crate::backend::BackendError;

pub mod users;
pub mod withdrawals;

pub use users::{UsersView, apply_filter};
pub use withdrawals::{WithdrawalsView, format_currency};

/// ViewError
///
/// Why a page action was refused. The page has already queued a toast.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The withdrawal is not (or no longer) in the pending bucket.
    #[error("Withdrawal {0} is not pending")]
    NotPending(i64),
}
