use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, DEFAULT_REST_ADDR, router};
use hca_core::config_from_lookup;

/// Main entry point for the HCA application
///
/// Loads `.env`, optionally imports a CSV extract into the configured database and then serves
/// the REST API.
///
/// # Environment Variables
/// - `HCA_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `HCA_BOOTSTRAP_CSV_DIR`: directory of CSV exports to import before serving (optional)
/// - `HCA_DATABASE_PATH`: SQLite database (default: "healthcare.db")
/// - `HCA_EXPORT_DIR`, `HCA_REFERENCE_DATE`, `HCA_ROW_LIMIT`: see `CoreConfig`
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, the bootstrap import or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hca_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("hca_store=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let today = chrono::Local::now().date_naive();
    let cfg = Arc::new(config_from_lookup(|key| std::env::var(key).ok(), today)?);

    if let Some(csv_dir) = std::env::var("HCA_BOOTSTRAP_CSV_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
    {
        tracing::info!(
            "++ Importing {} into {}",
            csv_dir.display(),
            cfg.database_path().display()
        );
        let summary = hca_store::import_csv_dir(cfg.database_path(), &csv_dir)?;
        tracing::info!(
            "++ Imported {} rows across {} tables",
            summary.total_rows(),
            summary.imported.len()
        );
    }

    let rest_addr = std::env::var("HCA_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    tracing::info!("++ Starting HCA REST on {}", rest_addr);

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
