//! Property Impact Dashboard - Main Entry Point

use api::{init_logging, run_server, DashboardConfig, CONFIG_FILE};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::load(CONFIG_FILE)?;
    init_logging(&config.logging)?;

    info!("=== Property Impact Dashboard v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Fitting impact models on the synthetic corpus...");

    run_server(config).await?;

    Ok(())
}
