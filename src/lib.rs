pub mod core;
pub mod configs;
pub mod loggers;
pub mod retrieve;
pub mod server;
pub mod upstreams;

pub use crate::core::error::{GatewayError, NormalizationError, NormalizationKind};
