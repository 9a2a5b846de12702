//! Pinata client configuration.
//!
//! Credentials come from the environment (or a `.env` file), never from source.

use std::fmt;

use tracing::warn;
use url::Url;

use reportvault_core::constants::{DEFAULT_GATEWAY_URL, DEFAULT_PINATA_API_URL, DEFAULT_TIMEOUT_SECS};
use reportvault_core::error::{ReportError, Result};

/// How requests to the pinning API authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum PinataAuth {
    /// Scoped JWT sent as `Authorization: Bearer <token>`.
    Jwt(String),
    /// Legacy key pair sent as `pinata_api_key` / `pinata_secret_api_key` headers.
    ApiKey {
        /// Public API key.
        api_key: String,
        /// Secret API key.
        secret_api_key: String,
    },
}

impl PinataAuth {
    /// JWT authentication.
    pub fn jwt(token: impl Into<String>) -> Self {
        PinataAuth::Jwt(token.into())
    }

    /// Key/secret authentication.
    pub fn api_key(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        PinataAuth::ApiKey {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    /// Returns true for the deprecated key/secret scheme.
    pub fn is_legacy(&self) -> bool {
        matches!(self, PinataAuth::ApiKey { .. })
    }

    /// Attaches the credentials to a request.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            PinataAuth::Jwt(token) => request.bearer_auth(token),
            PinataAuth::ApiKey { api_key, secret_api_key } => request
                .header("pinata_api_key", api_key)
                .header("pinata_secret_api_key", secret_api_key),
        }
    }

    fn validate(&self) -> Result<()> {
        let blank = match self {
            PinataAuth::Jwt(token) => token.trim().is_empty(),
            PinataAuth::ApiKey { api_key, secret_api_key } => {
                api_key.trim().is_empty() || secret_api_key.trim().is_empty()
            }
        };
        if blank {
            return Err(ReportError::Config("Pinata credentials are empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for PinataAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinataAuth::Jwt(_) => f.write_str("Jwt(<redacted>)"),
            PinataAuth::ApiKey { api_key, .. } => f
                .debug_struct("ApiKey")
                .field("api_key", api_key)
                .field("secret_api_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Pinata client configuration.
#[derive(Clone, Debug)]
pub struct PinataConfig {
    /// Pinning API base URL (e.g. "https://api.pinata.cloud")
    pub api_url: String,
    /// Gateway base URL; content lives at `<gateway_url>/<cid>`
    pub gateway_url: String,
    /// Access token for dedicated gateways (?pinataGatewayToken=...)
    pub gateway_token: Option<String>,
    /// Credentials for uploads; retrieval works without them
    pub auth: Option<PinataAuth>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PINATA_API_URL.into(),
            gateway_url: DEFAULT_GATEWAY_URL.into(),
            gateway_token: None,
            auth: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PinataConfig {
    /// Creates a config for the public Pinata endpoints with the given credentials.
    pub fn new(auth: PinataAuth) -> Self {
        Self {
            auth: Some(auth),
            ..Default::default()
        }
    }

    /// Overrides the pinning API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Overrides the gateway base URL.
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Sets the dedicated gateway access token.
    pub fn with_gateway_token(mut self, token: impl Into<String>) -> Self {
        self.gateway_token = Some(token.into());
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Loads configuration from the process environment, after reading `.env` if present.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `PINATA_JWT` | Bearer token (preferred) |
    /// | `PINATA_API_KEY`, `PINATA_SECRET_API_KEY` | Legacy key pair |
    /// | `PINATA_API_URL` | Pinning API base URL |
    /// | `PINATA_GATEWAY_URL` | Gateway base URL |
    /// | `PINATA_GATEWAY_TOKEN` | Dedicated gateway token |
    /// | `PINATA_TIMEOUT_SECS` | Request timeout |
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let auth = match (get("PINATA_JWT"), get("PINATA_API_KEY"), get("PINATA_SECRET_API_KEY")) {
            (Some(jwt), key, _) => {
                if key.is_some() {
                    warn!("Both PINATA_JWT and PINATA_API_KEY are set; using the JWT");
                }
                Some(PinataAuth::Jwt(jwt))
            }
            (None, Some(key), Some(secret)) => Some(PinataAuth::api_key(key, secret)),
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(ReportError::Config(
                    "PINATA_API_KEY and PINATA_SECRET_API_KEY must be set together".into(),
                ));
            }
            (None, None, None) => None,
        };

        let timeout_seconds = match get("PINATA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ReportError::Config(format!("Invalid PINATA_TIMEOUT_SECS: {}", raw))
            })?,
            None => defaults.timeout_seconds,
        };

        let config = Self {
            api_url: get("PINATA_API_URL").unwrap_or(defaults.api_url),
            gateway_url: get("PINATA_GATEWAY_URL").unwrap_or(defaults.gateway_url),
            gateway_token: get("PINATA_GATEWAY_TOKEN"),
            auth,
            timeout_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks URLs, timeout and credentials.
    pub fn validate(&self) -> Result<()> {
        check_url("api_url", &self.api_url)?;
        check_url("gateway_url", &self.gateway_url)?;

        if self.timeout_seconds == 0 {
            return Err(ReportError::Config("timeout_seconds must be positive".into()));
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        Ok(())
    }
}

fn check_url(field: &str, raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| ReportError::Config(format!("Invalid {} '{}': {}", field, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ReportError::Config(format!(
            "Invalid {} '{}': unsupported scheme {}",
            field, raw, other
        ))),
    }
}
