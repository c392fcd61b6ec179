//! askdoc server binary.

use anyhow::Context;
use askdoc_server::{app, build_state, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("askdoc_server=info,askdoc_rag=info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let addr = config.addr.clone();
    let state = build_state(config).context("failed to build pipeline")?;

    let listener =
        tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("bind {addr}"))?;
    info!(%addr, "askdoc server listening");

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
