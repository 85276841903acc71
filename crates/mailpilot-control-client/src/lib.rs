use std::time::Duration;

use async_trait::async_trait;
use mailpilot_client_core::api::{
    ControlApi, ControlApiError, FALLBACK_LOGIN_MESSAGE, FALLBACK_SETTINGS_MESSAGE,
    FALLBACK_TOGGLE_MESSAGE, LoginRequest, SettingsRequest, StatusSnapshot, ToggleRequest,
};
use mailpilot_client_core::session::{self, Credentials, InputError};
use serde::Deserialize;

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

pub const LOGIN_PATH: &str = "/login";
pub const STATUS_PATH: &str = "/status";
pub const TOGGLE_PATH: &str = "/toggle";
pub const SETTINGS_PATH: &str = "/settings";

#[derive(Debug, Clone)]
pub struct ControlClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ControlClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Typed request/response wrapper around the four remote operations of the
/// agent-control backend. Requests carry a per-request timeout and are never
/// retried: login and toggle are not safe to replay.
#[derive(Debug, Clone)]
pub struct AgentControlClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

impl AgentControlClient {
    pub fn new(config: ControlClientConfig) -> Result<Self, InputError> {
        let base_url = session::normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            http: reqwest::Client::new(),
        })
    }

    /// Resolves the base url from the environment, falling back to the
    /// fixed local default.
    pub fn from_env() -> Result<Self, InputError> {
        let (base_url, source) = session::resolve_control_base_url()?;
        tracing::debug!(%base_url, source, "resolved control base url");
        Self::new(ControlClientConfig::new(base_url))
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ControlApiError> {
        request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| ControlApiError::Transport {
                message: error.to_string(),
            })
    }
}

#[async_trait]
impl ControlApi for AgentControlClient {
    async fn login(&self, credentials: &Credentials) -> Result<(), ControlApiError> {
        let request = self
            .http
            .post(self.endpoint(LOGIN_PATH))
            .json(&LoginRequest::from(credentials));
        let response = self.send(request).await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(ControlApiError::AuthRejected {
            message: detail_message(response, FALLBACK_LOGIN_MESSAGE).await,
        })
    }

    async fn fetch_status(&self, email: &str) -> Result<StatusSnapshot, ControlApiError> {
        let request = self
            .http
            .post(self.endpoint(STATUS_PATH))
            .query(&[("email", email)]);
        let response = self.send(request).await?;

        if response.status().as_u16() == 404 {
            return Err(ControlApiError::SessionNotFound);
        }
        decode_snapshot(response).await
    }

    async fn toggle(&self, email: &str, active: bool) -> Result<StatusSnapshot, ControlApiError> {
        let request = self.http.post(self.endpoint(TOGGLE_PATH)).json(&ToggleRequest {
            email: email.to_string(),
            active,
        });
        let response = self.send(request).await?;

        if response.status().as_u16() == 404 {
            return Err(ControlApiError::SessionNotFound);
        }
        if !response.status().is_success() {
            return Err(ControlApiError::Toggle {
                message: detail_message(response, FALLBACK_TOGGLE_MESSAGE).await,
            });
        }
        decode_snapshot(response).await
    }

    async fn save_settings(&self, email: &str, interval: u32) -> Result<(), ControlApiError> {
        let request = self
            .http
            .post(self.endpoint(SETTINGS_PATH))
            .json(&SettingsRequest {
                email: email.to_string(),
                interval,
            });
        let response = self.send(request).await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(ControlApiError::Settings {
            message: detail_message(response, FALLBACK_SETTINGS_MESSAGE).await,
        })
    }
}

async fn decode_snapshot(response: reqwest::Response) -> Result<StatusSnapshot, ControlApiError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| ControlApiError::Transport {
            message: error.to_string(),
        })?;

    if !status.is_success() {
        return Err(ControlApiError::Transport {
            message: format!("http_{}:{}", status.as_u16(), String::from_utf8_lossy(&bytes)),
        });
    }
    snapshot_from_bytes(&bytes)
}

fn snapshot_from_bytes(bytes: &[u8]) -> Result<StatusSnapshot, ControlApiError> {
    serde_json::from_slice(bytes).map_err(|error| ControlApiError::Transport {
        message: format!("decode_failed:{error}"),
    })
}

/// Extracts the server-supplied `{detail}` message from an error body,
/// falling back to a hardcoded message when absent or unreadable.
async fn detail_message(response: reqwest::Response, fallback: &str) -> String {
    match response.bytes().await {
        Ok(bytes) => detail_from_bytes(&bytes, fallback),
        Err(_) => fallback.to_string(),
    }
}

fn detail_from_bytes(bytes: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|body| body.detail)
        .map(|detail| detail.trim().to_string())
        .filter(|detail| !detail.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
