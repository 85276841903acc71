pub const DEFAULT_CONTROL_BASE_URL: &str = "http://127.0.0.1:8000";
pub const ENV_CONTROL_BASE_URL: &str = "MAILPILOT_CONTROL_BASE_URL";

pub const INTERVAL_MIN_MINUTES: u32 = 1;
pub const INTERVAL_MAX_MINUTES: u32 = 1_440;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
    #[error("Please fill all fields.")]
    EmptyEmail,
    #[error("Please fill all fields.")]
    EmptyAppPassword,
    #[error("Please fill all fields.")]
    EmptyApiKey,
    #[error("Interval must be a whole number between {INTERVAL_MIN_MINUTES} and {INTERVAL_MAX_MINUTES} minutes.")]
    InvalidInterval,
}

/// Login-only credential bundle. Never persisted; dropped once the login
/// request completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub app_password: String,
    pub api_key: String,
}

impl Credentials {
    /// Normalizes and validates all three fields. Invalid input never
    /// reaches the network.
    pub fn parse(email: &str, app_password: &str, api_key: &str) -> Result<Self, InputError> {
        Ok(Self {
            email: normalize_email(email)?,
            app_password: normalize_app_password(app_password)?,
            api_key: normalize_api_key(api_key)?,
        })
    }
}

pub fn normalize_email(raw: &str) -> Result<String, InputError> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(InputError::EmptyEmail);
    }
    Ok(normalized)
}

/// App-specific passwords are conventionally displayed in spaced groups
/// ("abcd efgh ijkl"); the spacing must not be sent literally.
pub fn normalize_app_password(raw: &str) -> Result<String, InputError> {
    let collapsed = raw.split_whitespace().collect::<String>();
    if collapsed.is_empty() {
        return Err(InputError::EmptyAppPassword);
    }
    Ok(collapsed)
}

pub fn normalize_api_key(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyApiKey);
    }
    Ok(trimmed.to_string())
}

/// Parses a poll interval in minutes, bounds-checked so an out-of-range
/// value never reaches the backend.
pub fn parse_interval(raw: &str) -> Result<u32, InputError> {
    let minutes: u32 = raw.trim().parse().map_err(|_| InputError::InvalidInterval)?;
    if !(INTERVAL_MIN_MINUTES..=INTERVAL_MAX_MINUTES).contains(&minutes) {
        return Err(InputError::InvalidInterval);
    }
    Ok(minutes)
}

pub fn resolve_control_base_url() -> Result<(String, &'static str), InputError> {
    if let Some(base_url) = env_non_empty(ENV_CONTROL_BASE_URL) {
        return normalize_base_url(&base_url).map(|normalized| (normalized, ENV_CONTROL_BASE_URL));
    }
    normalize_base_url(DEFAULT_CONTROL_BASE_URL).map(|normalized| (normalized, "default_local"))
}

pub fn normalize_base_url(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(InputError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(InputError::InvalidBaseUrl);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(InputError::InvalidBaseUrl);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(InputError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
