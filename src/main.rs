// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API Dashboard server
//!
//! Aggregates news, weather, cryptocurrency and GitHub data behind one
//! JSON API.

use api_dashboard::{
    config::Config,
    db::SqliteDb,
    services::{InMemoryNotificationStore, Providers},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting API Dashboard");

    let db = SqliteDb::open(&config.database_path)?;

    // Missing credentials are not fatal; those providers just return empty data.
    let providers = Providers::from_config(&config)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        providers,
        notifications: Arc::new(InMemoryNotificationStore::new()),
    });

    // Build router
    let app = api_dashboard::routes::create_router(state);

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
                .add_directive("api_dashboard=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .try_init()?;
    Ok(())
}
