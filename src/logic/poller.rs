use super::api::{ApiClient, ApiError};
use super::{SharedState, lock_state};
use crate::model::{AppState, ResourceSnapshot, Route};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Background task that fetches the resource snapshot right away, then on
/// every tick of `interval` and whenever a refresh is requested.
///
/// Fetches are not serialized: a refresh during a slow timer fetch runs
/// alongside it and whichever finishes last wins. Every fetch lives in a
/// `JoinSet` owned by this task, so aborting the task cancels them too.
pub async fn poll_resources(
    api: ApiClient,
    state: SharedState,
    mut refresh: mpsc::UnboundedReceiver<()>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("poll tick");
                in_flight.spawn(fetch_once(api.clone(), state.clone()));
            }
            request = refresh.recv() => match request {
                Some(()) => {
                    debug!("manual refresh");
                    in_flight.spawn(fetch_once(api.clone(), state.clone()));
                }
                None => break,
            },
            Some(joined) = in_flight.join_next() => {
                if let Err(err) = joined {
                    if err.is_panic() {
                        warn!(%err, "resource fetch panicked");
                    }
                }
            }
        }
    }
}

/// Runs one fetch cycle against the shared state.
pub async fn fetch_once(api: ApiClient, state: SharedState) {
    let session = {
        let mut state = lock_state(&state);
        if !state.session.is_authenticated() {
            state.dashboard.refreshing = false;
            state.navigate(Route::Login);
            return;
        }
        state.dashboard.begin_fetch();
        state.session.clone()
    };

    let result = api.fetch_resources(&session).await;

    let mut state = lock_state(&state);
    apply_fetch_result(&mut state, result);
}

/// Folds the outcome of a fetch into the view state. An unauthorized
/// answer sends the user back to the login screen.
pub fn apply_fetch_result(state: &mut AppState, result: Result<ResourceSnapshot, ApiError>) {
    match result {
        Ok(snapshot) => state.dashboard.apply_snapshot(snapshot),
        Err(err) => {
            warn!(%err, "resource fetch failed");
            state.dashboard.apply_failure(err.user_message());
            if err.is_unauthorized() {
                info!("session rejected by backend, returning to login");
                state.navigate(Route::Login);
            }
        }
    }
}

/// Running poller. Dropping the handle stops the timer and cancels any
/// fetch still in flight.
pub struct PollerHandle {
    refresh: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Starts polling on the current tokio runtime.
    pub fn spawn(api: ApiClient, state: SharedState, interval: Duration) -> Self {
        let (refresh, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(poll_resources(api, state, receiver, interval));
        info!(interval_secs = interval.as_secs_f64(), "polling started");
        Self { refresh, task }
    }

    pub fn refresh(&self) {
        if self.refresh.send(()).is_err() {
            warn!("refresh requested but the poller has stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
        info!("polling stopped");
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
