use anyhow::Result;
use lectura_core::{config::Config, server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let prometheus_handle = telemetry::init(&config.telemetry)?;

    info!("Starting Lectura Core Service");
    info!("HTTP server listening on {}", config.http_addr());

    server::run(config, prometheus_handle).await
}
