use std::process::ExitCode;

use agri_gateway::configs::GatewayConfig;
use agri_gateway::loggers::LoggerBuilder;
use agri_gateway::server::{self, AppState};
use agri_gateway::{info, GatewayError};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be populated
    let _ = dotenvy::dotenv();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("agri_gateway: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), GatewayError> {
    let config = GatewayConfig::load()?;
    let logger = LoggerBuilder::new("agri_gateway")
        .with_level(config.log_level.clone())
        .build()?;

    info!(
        logger,
        "Gateway starting",
        "addr" => config.bind_addr(),
        "timezone" => &config.timezone,
        "upstream_timeout_ms" => config.upstream_timeout_ms
    );

    let state = AppState::from_config(&config, logger)?;
    server::serve(&config, state).await
}
