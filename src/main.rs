// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PMC-Tracker API Server
//!
//! Serves training load tables, profile stats and GPS heatmaps computed
//! from the caller's Strava history.

use pmc_tracker::{config::Config, services::ReqwestTransport, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting PMC-Tracker API");
    tracing::info!(
        api = %config.strava_api_url,
        retry_attempts = config.retry_attempts,
        stream_concurrency = config.stream_concurrency,
        cache = config.cache_responses,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        analysis_start = %config.analysis_start,
        "Strava client configured"
    );

    let transport = Arc::new(ReqwestTransport::new(config.strava_api_url.clone()));

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), transport));

    // Build router
    let app = pmc_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pmc_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
