mod bootstrap;
mod health;
pub mod proposals;

use std::sync::Arc;

use anyhow::Result;
use propel_core::config::{AppConfig, LoadOptions};
use propel_insights::{AnthropicClient, LlmClient};

fn init_logging(config: &AppConfig) {
    use propel_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let llm: Option<Arc<dyn LlmClient>> = AnthropicClient::from_config(&app.config.llm)?
        .map(|client| Arc::new(client) as Arc<dyn LlmClient>);
    tracing::info!(
        event_name = "system.server.insights_mode",
        mode = if llm.is_some() { "model" } else { "heuristic" },
        "transcript analysis mode initialized"
    );

    let router = proposals::router(
        app.db_pool.clone(),
        llm,
        app.config.server.public_base_url.clone(),
    )
    .merge(health::router(app.db_pool.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "propel-server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopping", "propel-server stopping");
    app.db_pool.close().await;

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
