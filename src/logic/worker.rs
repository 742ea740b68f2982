use super::api::ApiClient;
use super::poller::PollerHandle;
use super::{SharedState, lock_state};
use crate::model::Route;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tr::tr;
use tracing::{debug, info, warn};

/// Requests from the UI thread to the network side.
pub enum Command {
    Login { username: String, password: String },
    /// The dashboard became visible.
    StartPolling,
    /// The dashboard is gone.
    StopPolling,
    Refresh,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .finish_non_exhaustive(),
            Command::StartPolling => f.write_str("StartPolling"),
            Command::StopPolling => f.write_str("StopPolling"),
            Command::Refresh => f.write_str("Refresh"),
        }
    }
}

pub type CommandSender = mpsc::UnboundedSender<Command>;

/// Serves UI commands until every sender is gone. Owns the poller so its
/// lifetime follows the dashboard's.
pub async fn worker_task(
    api: ApiClient,
    state: SharedState,
    mut commands: mpsc::UnboundedReceiver<Command>,
    poll_interval: Duration,
) {
    let mut poller: Option<PollerHandle> = None;

    while let Some(command) = commands.recv().await {
        debug!(?command, "worker command");
        match command {
            Command::Login { username, password } => {
                tokio::spawn(submit_credentials(
                    api.clone(),
                    state.clone(),
                    username,
                    password,
                ));
            }
            Command::StartPolling => {
                // The old poller must be gone before the new one ticks.
                drop(poller.take());
                poller = Some(PollerHandle::spawn(api.clone(), state.clone(), poll_interval));
            }
            Command::StopPolling => poller = None,
            Command::Refresh => match &poller {
                Some(p) => p.refresh(),
                None => debug!("refresh ignored, dashboard is not shown"),
            },
        }
    }
}

/// Sends one login request and stores the token on success. Any failure is
/// reported to the user with the same generic message.
pub async fn submit_credentials(
    api: ApiClient,
    state: SharedState,
    username: String,
    password: String,
) {
    let result = api.login(&username, &password).await;

    let mut state = lock_state(&state);
    state.login.pending = false;
    match result {
        Ok(token) => {
            info!(%username, "login succeeded");
            state.session.sign_in(token);
            state.login.error = None;
            state.navigate(Route::Dashboard);
        }
        Err(err) => {
            warn!(%username, %err, "login failed");
            state.login.error = Some(tr!("Invalid credentials"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{AppState, Phase, Session};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn api_for(url: &str) -> ApiClient {
        ApiClient::new(&Config {
            api_url: url.to_string(),
            login_url: url.to_string(),
            ..Config::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_success_stores_token_and_opens_dashboard() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/login")
            .match_body(Matcher::Json(json!({ "username": "admin", "password": "pw" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "token": "jwt-123", "message": "Login successful" }).to_string())
            .create_async()
            .await;

        let state: SharedState = Arc::new(Mutex::new(AppState::default()));
        {
            let mut s = lock_state(&state);
            s.navigate(Route::Login);
            s.login.pending = true;
        }

        submit_credentials(
            api_for(&server.url()),
            state.clone(),
            "admin".to_string(),
            "pw".to_string(),
        )
        .await;

        let mut s = lock_state(&state);
        assert!(!s.login.pending);
        assert!(s.login.error.is_none());
        assert_eq!(s.session.token(), Some("jwt-123"));
        assert_eq!(s.gate(), Route::Dashboard);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_failure_shows_generic_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": "The request you have made requires authentication." }).to_string())
            .expect(1)
            .create_async()
            .await;

        let state: SharedState = Arc::new(Mutex::new(AppState::default()));
        lock_state(&state).navigate(Route::Login);

        submit_credentials(
            api_for(&server.url()),
            state.clone(),
            "admin".to_string(),
            "wrong".to_string(),
        )
        .await;

        let s = lock_state(&state);
        assert_eq!(s.login.error.as_deref(), Some("Invalid credentials"));
        assert!(!s.session.is_authenticated());
        assert_eq!(s.route, Route::Login);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_worker_starts_and_stops_polling() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/resources")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "instances": [], "pricing_info": { "total_cost": 0 } }).to_string())
            .create_async()
            .await;

        let state: SharedState = Arc::new(Mutex::new(AppState::with_session(
            Session::with_token("t"),
        )));
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(worker_task(
            api_for(&server.url()),
            state.clone(),
            rx,
            Duration::from_millis(100),
        ));

        tx.send(Command::StartPolling).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(lock_state(&state).dashboard.phase(), Phase::Ready);

        tx.send(Command::StopPolling).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        lock_state(&state).dashboard = Default::default();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(lock_state(&state).dashboard.phase(), Phase::Loading);

        drop(tx);
        worker.await.unwrap();
    }

    #[test]
    fn test_command_debug_hides_password() {
        let command = Command::Login {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", command);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }
}
