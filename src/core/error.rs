//! # Core Error Module
//!
//! This module defines the central `GatewayError` type used throughout the gateway.
//! It leverages `thiserror` for error message formatting and `serde` for serialization.

use serde::Serialize;
use thiserror::Error;

/// Why an upstream body could not be turned into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationKind {
    /// The body could not be parsed in the target's format.
    Malformed,
    /// The body parsed, but the payload path is missing.
    PathNotFound,
    /// The body is a recognised upstream error document.
    UpstreamErrorEnvelope,
}

impl NormalizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationKind::Malformed => "malformed",
            NormalizationKind::PathNotFound => "path_not_found",
            NormalizationKind::UpstreamErrorEnvelope => "upstream_error_envelope",
        }
    }
}

/// Failure raised by the envelope normalizer.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{} upstream response: {details}", .kind.as_str())]
pub struct NormalizationError {
    pub kind: NormalizationKind,
    /// Operator-facing description (missing segment, parser message, upstream code).
    pub details: String,
}

impl NormalizationError {
    pub fn new(kind: NormalizationKind, details: impl Into<String>) -> Self {
        Self { kind, details: details.into() }
    }
}

/// Central error type for the `agri_gateway` crate.
#[derive(Debug, Error, Serialize)]
pub enum GatewayError {
    /// Error related to configuration loading or startup validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error related to internal logic or state (programming errors).
    #[error("Internal error: {0}")]
    InternalError(String),

    /// The caller omitted one or more required query parameters.
    #[error("Validation error: {message}")]
    Validation {
        /// Names of the missing parameters.
        fields: Vec<String>,
        /// Caller-facing message naming the missing fields.
        message: String,
    },

    /// Network failure, non-2xx status, or timeout talking to an upstream.
    #[error("Upstream transport error for {capability} at {url}: {details}")]
    UpstreamTransport {
        capability: String,
        /// Request URL with the auth key redacted.
        url: String,
        /// HTTP status when the upstream answered at all.
        status: Option<u16>,
        timed_out: bool,
        details: String,
    },

    /// The upstream answered but its envelope held no usable payload.
    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    /// The capability was disabled at startup (e.g. its API key is absent).
    #[error("Capability {capability} is unavailable: {reason}")]
    Unavailable { capability: String, reason: String },
}
