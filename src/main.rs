// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MockMind API Server
//!
//! Serves the auth server actions and the signed-in home page.

use mockmind::{
    config::{Config, PlatformMode},
    db::FirestoreDb,
    services::{
        AuthService, DocumentStore, FirebaseAuth, IdentityPlatform, InMemoryPlatform,
        InterviewQueries,
    },
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
    tracing::info!(
        port = config.port,
        platform = ?config.platform,
        production = config.production,
        "Starting MockMind API"
    );

    let (identity, store, interviews): (
        Arc<dyn IdentityPlatform>,
        Arc<dyn DocumentStore>,
        Arc<dyn InterviewQueries>,
    ) = match config.platform {
        PlatformMode::Firebase => {
            let db = Arc::new(FirestoreDb::new(&config.project_id).await?);
            let auth: Arc<dyn IdentityPlatform> = Arc::new(FirebaseAuth::new(&config).await?);
            let store: Arc<dyn DocumentStore> = db.clone();
            let interviews: Arc<dyn InterviewQueries> = db;
            (auth, store, interviews)
        }
        PlatformMode::Memory => {
            tracing::warn!("Using in-memory platform; accounts are lost on restart");
            let platform = Arc::new(InMemoryPlatform::new(
                &config.project_id,
                &config.session_signing_key,
            ));
            let identity: Arc<dyn IdentityPlatform> = platform.clone();
            let store: Arc<dyn DocumentStore> = platform.clone();
            let interviews: Arc<dyn InterviewQueries> = platform;
            (identity, store, interviews)
        }
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        auth: AuthService::new(identity, store),
        interviews,
    });

    // Build router
    let app = mockmind::routes::create_router(state);

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
                .add_directive("mockmind=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
