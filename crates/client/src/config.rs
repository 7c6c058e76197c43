//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use staffdesk_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the employee API.
    pub api_url: String,
    /// Session storage file; `None` means the platform default.
    pub storage_path: Option<PathBuf>,
    /// Per-request timeout enforced by the HTTP backend.
    pub request_timeout: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_path: None,
            request_timeout: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Read `STAFFDESK_*` variables, falling back to defaults.
    ///
    /// Malformed values are logged and ignored rather than aborting startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("STAFFDESK_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }

        if let Some(path) = lookup("STAFFDESK_STORAGE_PATH").filter(|v| !v.trim().is_empty()) {
            config.storage_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("STAFFDESK_REQUEST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => {}
                Ok(secs) => config.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!("ignoring invalid STAFFDESK_REQUEST_TIMEOUT_SECS={raw:?}"),
            }
        }

        if let Some(raw) = lookup("STAFFDESK_LOG_FORMAT") {
            match raw.parse::<LogFormat>() {
                Ok(format) => config.log_format = format,
                Err(e) => tracing::warn!("ignoring STAFFDESK_LOG_FORMAT: {e}"),
            }
        }

        config
    }
}
