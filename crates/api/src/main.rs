use anyhow::Context;

use aerodesk_api::config::AppConfig;
use aerodesk_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aerodesk_observability::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(?config, "configuration loaded");
    let bind_addr = config.bind_addr;

    let state = AppState::from_config(config)
        .await
        .context("connecting to the identity provider")?;
    let app = aerodesk_api::app::build_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
