use std::process::ExitCode;

use clap::Parser;
use minesweeper_server::{
    config::{Cli, ServerConfig},
    server::MinesweeperServer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!("💣 Starting Minesweeper server");

    let config = match ServerConfig::try_from(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let server = match MinesweeperServer::from_config(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("📡 Commands: look, dig X Y, flag X Y, deflag X Y, help, bye");

    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
