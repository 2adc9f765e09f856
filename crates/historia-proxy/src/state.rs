use std::sync::Arc;

use crate::config::ProxyConfig;

/// Shared relay state, injected into handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    /// Pooled client for upstream calls, with the upstream timeout applied.
    pub http: reqwest::Client,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }
}
