//! HTTP surface: axum router over the four capabilities plus a health route.

pub mod handlers;

use axum::routing::get;
use axum::Router;
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::configs::GatewayConfig;
use crate::core::error::GatewayError;
use crate::loggers::Logger;
use crate::retrieve::upstream::{UpstreamClient, UpstreamOptions};
use crate::upstreams::forecast::local_now;
use crate::upstreams::target::TargetCatalog;
use crate::{error, info};

/// Local wall-clock source used for forecast windows.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TargetCatalog>,
    pub client: UpstreamClient,
    pub logger: Logger,
    pub clock: Clock,
}

impl AppState {
    pub fn new(catalog: TargetCatalog, client: UpstreamClient, logger: Logger, clock: Clock) -> Self {
        Self {
            catalog: Arc::new(catalog),
            client,
            logger,
            clock,
        }
    }

    /// Builds the catalog and client from `config`, using the configured
    /// timezone's wall clock.
    ///
    /// Disabled capabilities are logged once here.
    pub fn from_config(config: &GatewayConfig, logger: Logger) -> Result<Self, GatewayError> {
        let tz = config.timezone()?;
        let catalog = TargetCatalog::from_config(config)?;

        for (capability, reason) in catalog.unavailable() {
            error!(
                logger,
                "Capability disabled at startup",
                "capability" => capability.as_str(),
                "reason" => &reason
            );
        }

        let client = UpstreamClient::new_with_opts(
            logger.clone(),
            Some(UpstreamOptions {
                timeout: config.upstream_timeout(),
                ..UpstreamOptions::default()
            }),
        )?;

        Ok(Self::new(catalog, client, logger, Arc::new(move || local_now(tz))))
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/fertilizer", get(handlers::fertilizer))
        .route("/api/weather/forecast", get(handlers::weather_forecast))
        .route("/api/weather/observation", get(handlers::weather_observation))
        // legacy forecast route
        .route("/api/weather", get(handlers::weather_forecast))
        .route("/api/pest", get(handlers::pest))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Binds `config.bind_addr()` and serves until Ctrl-C.
pub async fn serve(config: &GatewayConfig, state: AppState) -> Result<(), GatewayError> {
    let addr = config.bind_addr();
    let logger = state.logger.clone();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GatewayError::ConfigError(format!("Failed to bind {}: {}", addr, e)))?;

    info!(logger, "Gateway listening", "addr" => &addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await
        .map_err(|e| GatewayError::InternalError(format!("Server error: {}", e)))
}

async fn shutdown_signal(logger: Logger) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(logger, "Shutdown signal received");
    }
}
