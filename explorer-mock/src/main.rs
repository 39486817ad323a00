/// Explorer Mock Server
///
/// Serves the explorer address endpoints from memory. Balances and
/// mempool entries are seeded through the /mock helper endpoints.

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use explorer_mock::{run_server, ExplorerState};

#[derive(Debug)]
struct Config {
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "9090".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Explorer Mock Server...");

    let config = Config::from_env().context("Failed to load configuration")?;
    log::info!("Server will listen on {}:{}", config.server_host, config.server_port);

    run_server(
        Arc::new(ExplorerState::new()),
        config.server_host,
        config.server_port,
    )
    .await
    .context("Server error")?;

    Ok(())
}
