use anyhow::Context;

use stockpile_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpile_observability::init_with(ApiConfig::log_format_from_env());
    let config = ApiConfig::from_env();

    let app = stockpile_api::app::build_app(config.engine);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
