pub mod api;
pub mod poller;
pub mod worker;

use crate::model::AppState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use api::{ApiClient, ApiError};
pub use poller::{PollerHandle, apply_fetch_result, fetch_once, poll_resources};
pub use worker::{Command, CommandSender, submit_credentials, worker_task};

pub type SharedState = Arc<Mutex<AppState>>;

/// Locks the shared state. A panic while holding the lock leaves plain data
/// behind, so a poisoned lock is still usable.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
