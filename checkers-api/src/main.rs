//! Checkers Web API server.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use checkers_api::config::Config;
use checkers_api::oracle::{AgentClient, AgentOracle};
use checkers_api::{app_state, driver, router};
use checkers_core::Coordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    info!(
        oracle = %config.oracle_url,
        ai_side = ?config.ai_side,
        strict = config.strict_oracle,
        "starting"
    );

    let oracle = AgentOracle::new(AgentClient::new(
        config.oracle_url.clone(),
        config.oracle_token.clone(),
    ));
    let state = app_state(Coordinator::new(config.coordinator()), Arc::new(oracle));

    // The oracle opens when it plays red
    driver::dispatch_pending(&state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!("Checkers API running on http://{}", config.bind);
    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
