//! Client configuration

use std::time::Duration;

use peel_core::{ApiBaseUrl, Error, InvalidInputError, Result};

/// Endpoint that exchanges a refresh token for a new access token.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/token/refresh/";

/// Page users are sent to when their session cannot be recovered.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Upper bound on a single refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "PEEL_API_URL";

/// Environment variable overriding the refresh timeout, in seconds.
pub const ENV_REFRESH_TIMEOUT_SECS: &str = "PEEL_REFRESH_TIMEOUT_SECS";

/// Environment variable overriding the login page path.
pub const ENV_LOGIN_PATH: &str = "PEEL_LOGIN_PATH";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint is appended to.
    pub base_url: ApiBaseUrl,
    /// Refresh endpoint path.
    pub refresh_path: String,
    /// Login page path used for session-expiry redirects.
    pub login_path: String,
    /// How long a refresh may take before waiters are failed.
    pub refresh_timeout: Duration,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the base URL.
    pub fn new(base_url: ApiBaseUrl) -> Self {
        Self {
            base_url,
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            request_timeout: None,
            user_agent: concat!("peel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Build a configuration from `PEEL_*` environment variables.
    ///
    /// `PEEL_API_URL` is required; the others fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(ENV_API_URL).map_err(|_| InvalidInputError::Other {
            message: format!("{} is not set", ENV_API_URL),
        })?;
        let mut config = Self::new(ApiBaseUrl::new(base_url)?);

        if let Ok(secs) = std::env::var(ENV_REFRESH_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::from(InvalidInputError::Other {
                    message: format!("{} must be a whole number of seconds", ENV_REFRESH_TIMEOUT_SECS),
                })
            })?;
            config.refresh_timeout = Duration::from_secs(secs);
        }

        if let Ok(path) = std::env::var(ENV_LOGIN_PATH) {
            config.login_path = path;
        }

        Ok(config)
    }

    /// Override the refresh endpoint path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Override the login page path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Override the refresh timeout.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Override the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
