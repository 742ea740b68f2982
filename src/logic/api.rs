use crate::config::Config;
use crate::model::{ResourceSnapshot, Session};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tr::tr;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no session token")]
    MissingToken,
    #[error("unauthorized")]
    Unauthorized { message: Option<String> },
    #[error("backend returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Text shown on the dashboard for a failed resource fetch: the
    /// backend's own `error` string when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message: Some(m) } | ApiError::Status { message: Some(m), .. } => {
                m.clone()
            }
            _ => tr!("Failed to fetch resources"),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the dashboard backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    login_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            login_url: config.login_url.clone(),
        })
    }

    /// Exchanges credentials for a bearer token with a single request.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/login", self.login_url);
        info!(%username, "logging in");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let body: LoginResponse = response.json().await?;
        Ok(body.token)
    }

    /// Fetches the full resource snapshot for the signed-in user.
    pub async fn fetch_resources(&self, session: &Session) -> Result<ResourceSnapshot, ApiError> {
        let token = session.token().ok_or(ApiError::MissingToken)?;
        let url = format!("{}/api/resources", self.api_url);
        debug!(%url, "fetching resources");

        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let snapshot: ResourceSnapshot = response.json().await?;
        debug!(
            instances = snapshot.instances.len(),
            networks = snapshot.networks.len(),
            volumes = snapshot.volumes.len(),
            images = snapshot.images.len(),
            keypairs = snapshot.keypairs.len(),
            "resources fetched"
        );
        Ok(snapshot)
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> ApiError {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error);

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized { message }
    } else {
        ApiError::Status { status, message }
    }
}
