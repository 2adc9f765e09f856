use std::env;

use tracing_subscriber::EnvFilter;

use historia_proxy::config::ProxyConfig;
use historia_proxy::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = ProxyConfig::from_env()?;
    tracing::info!(
        upstream = %config.upstream_url,
        model = %config.model,
        timeout_secs = config.upstream_timeout.as_secs(),
        "proxy configured"
    );

    let bind = config.bind;
    let app = historia_proxy::app(AppState::new(config)?);

    if env::var_os("AWS_LAMBDA_RUNTIME_API").is_some() {
        tracing::info!("running under the Lambda runtime");
        return lambda_http::run(app).await.map_err(|e| eyre::eyre!(e));
    }

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}
