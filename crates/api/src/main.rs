use anyhow::Result;
use tracing::info;

use wardops_api::{app, bootstrap, config, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!("Starting WardOps API v{}", env!("CARGO_PKG_VERSION"));

    // Install the Prometheus recorder before any metric is recorded
    let metrics = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // Create the document store and seed registry defaults
    let store = persistence::MemoryStore::new(config.store.registry_db.clone());
    bootstrap::seed(&store, &config).await?;

    let verifier = middleware::auth::build_verifier(&config.auth)?;
    let notifier = services::notifier::build_notifier(&config.notifications);

    // Build application
    let app = app::create_app(config.clone(), store, verifier, notifier, Some(metrics));

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
