//! Standalone REST API server binary.
//!
//! ## Purpose
//! Serves the analytics REST API (with OpenAPI/Swagger UI) over an existing database.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `hca-run` binary can also bootstrap
//! the database from a CSV extract before serving.

use api_rest::{router, AppState, DEFAULT_REST_ADDR};
use hca_core::config_from_lookup;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HCA REST API server
///
/// # Environment Variables
/// - `HCA_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `HCA_DATABASE_PATH`, `HCA_EXPORT_DIR`, `HCA_REFERENCE_DATE`, `HCA_ROW_LIMIT`: see `CoreConfig`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration cannot be resolved,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let today = chrono::Local::now().date_naive();
    let cfg = Arc::new(config_from_lookup(|key| std::env::var(key).ok(), today)?);

    if !cfg.database_path().exists() {
        tracing::warn!(
            "Database {} does not exist yet; queries will fail until it is imported",
            cfg.database_path().display()
        );
    }

    let addr = std::env::var("HCA_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    tracing::info!("-- Starting HCA REST API on {}", addr);

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
