mod accounts;
mod api;
mod artifacts;
mod cases;
mod config;
mod directory;
mod domain;
mod error;
mod hackathons;
mod mapper;
mod records;
mod schema;
mod session;
mod storage;
mod workflow;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::AppConfig;
use records::RestBase;
use storage::S3Store;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hackbase=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let base = RestBase::new(config.records.clone()).expect("Failed to create records client");
    let store = S3Store::new(config.storage.clone());
    tracing::info!(
        bucket = %config.storage.bucket,
        "Connected to records base {} and object store",
        config.records.base_id
    );

    let state = Arc::new(AppState::new(Arc::new(base), Arc::new(store)));

    let app = api::router()
        .with_state(state)
        // Solution archives can be large
        .layer(DefaultBodyLimit::max(512 * 1024 * 1024))
        .layer(TraceLayer::new_for_http());

    tracing::info!("hackbase starting on http://{}", config.listen_addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  POST /api/auth/register      - Register a participant");
    tracing::info!("  POST /api/auth/login         - Login");
    tracing::info!("  GET  /api/team               - Current team state");
    tracing::info!("  POST /api/team               - Create a team");
    tracing::info!("  POST /api/team/join          - Join a team by invite code");
    tracing::info!("  GET  /api/hackathons         - Hackathon catalog");
    tracing::info!("  GET  /api/cases              - Case list");

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
