use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::session::Credentials;

pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;

pub const FALLBACK_LOGIN_MESSAGE: &str = "Login failed. Check credentials.";
pub const FALLBACK_TOGGLE_MESSAGE: &str = "Error toggling state";
pub const FALLBACK_SETTINGS_MESSAGE: &str = "Failed to save settings.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlApiError {
    /// Credentials rejected by the backend.
    #[error("{message}")]
    AuthRejected { message: String },
    /// The server no longer recognizes the session (HTTP 404). Signaled
    /// distinctly because it forces local session teardown.
    #[error("session not recognized by server")]
    SessionNotFound,
    #[error("{message}")]
    Toggle { message: String },
    #[error("{message}")]
    Settings { message: String },
    /// Network-level failure (unreachable host, timeout, malformed
    /// response). Always recoverable, never fatal.
    #[error("control_transport_failed:{message}")]
    Transport { message: String },
}

/// Server-reported run state at a point in time. Fetched fresh on every
/// status request, never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusSnapshot {
    pub active: bool,
    #[serde(default)]
    pub last_run: Option<NaiveDateTime>,
    #[serde(default)]
    pub next_run: Option<String>,
    #[serde(default = "default_interval")]
    pub interval: u32,
}

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub app_password: String,
    pub openrouter_key: String,
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            email: credentials.email.clone(),
            app_password: credentials.app_password.clone(),
            openrouter_key: credentials.api_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleRequest {
    pub email: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsRequest {
    pub email: String,
    pub interval: u32,
}

/// The four remote operations of the agent-control backend, each a single
/// request/response exchange.
#[async_trait]
pub trait ControlApi {
    async fn login(&self, credentials: &Credentials) -> Result<(), ControlApiError>;
    async fn fetch_status(&self, email: &str) -> Result<StatusSnapshot, ControlApiError>;
    async fn toggle(&self, email: &str, active: bool) -> Result<StatusSnapshot, ControlApiError>;
    async fn save_settings(&self, email: &str, interval: u32) -> Result<(), ControlApiError>;
}
