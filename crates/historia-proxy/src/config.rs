use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Relay configuration, read from the environment.
#[derive(Clone)]
pub struct ProxyConfig {
    /// Provider credential. Never logged.
    pub api_key: String,
    pub upstream_url: String,
    pub model: String,
    pub upstream_timeout: Duration,
    pub bind: SocketAddr,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("model", &self.model)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("bind", &self.bind)
            .finish()
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key =
            get("HISTORIA_PROVIDER_API_KEY").ok_or(ConfigError::Missing("HISTORIA_PROVIDER_API_KEY"))?;

        let upstream_timeout = match get("HISTORIA_UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "HISTORIA_UPSTREAM_TIMEOUT_SECS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let bind_raw = get("HISTORIA_PROXY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            name: "HISTORIA_PROXY_BIND",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            api_key,
            upstream_url: get("HISTORIA_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            model: get("HISTORIA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            upstream_timeout,
            bind,
        })
    }
}
