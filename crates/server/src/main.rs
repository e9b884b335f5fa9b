use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use markdown_sidecar::{AppState, Config, check_health, logging, serve};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();

    if config.healthcheck {
        let healthy = check_health(config.listen_addr).await;
        return Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    logging::init(&config);

    let state = AppState::from_config(&config)?;
    if !state.tokens.is_precise() {
        warn!(model = %config.token_model, "Token model unavailable, counts are approximate");
    }

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    info!(
        addr = %config.listen_addr,
        origin = %state.origin.base_url(),
        timeout_secs = config.origin_timeout,
        token_model = %config.token_model,
        strip_selectors = state.converter.selectors().len(),
        "Starting markdown-sidecar"
    );

    serve(listener, Arc::new(state)).await.context("Server error")?;

    Ok(ExitCode::SUCCESS)
}
