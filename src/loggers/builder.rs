use tokio::sync::mpsc;
use crate::loggers::worker::LogWorker;
use crate::loggers::core::{LogLevel, LogRecord};
use crate::core::error::GatewayError;
use std::sync::Arc;
use arc_swap::ArcSwap;

pub struct LoggerConfig {
    pub level: LogLevel,
    pub component: String,
}

/// Cheap, cloneable handle shared by the server, the upstream client and every handler.
#[derive(Clone)]
pub struct Logger {
    pub sender: mpsc::Sender<LogRecord>,
    pub config: Arc<ArcSwap<LoggerConfig>>,
}

impl Logger {
    /// Changes the level for every clone of this logger.
    pub fn set_level(&self, level: LogLevel) {
        let component = self.config.load().component.clone();
        self.config.store(Arc::new(LoggerConfig { level, component }));
    }

    pub fn level(&self) -> LogLevel {
        self.config.load().level.clone()
    }
}

pub struct LoggerBuilder {
    component: String,
    level: LogLevel,
    buffer_size: usize,
}

impl LoggerBuilder {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            level: LogLevel::Info,
            buffer_size: 1024,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Spawns the log worker on the current tokio runtime.
    pub fn build(self) -> Result<Logger, GatewayError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| GatewayError::InternalError(format!("Logger needs a tokio runtime: {}", e)))?;

        let (tx, rx) = mpsc::channel(self.buffer_size);
        let config = Arc::new(ArcSwap::from_pointee(LoggerConfig {
            level: self.level,
            component: self.component,
        }));

        let worker = LogWorker::new(rx);
        handle.spawn(async move {
            worker.run().await;
        });

        Ok(Logger { sender: tx, config })
    }
}
