//! src/retrieve/upstream.rs
//!
//! UpstreamClient: single-attempt HTTP GET against an upstream target with a
//! hard latency bound. Reads the body once, never interprets it, and never
//! retries; a failure is surfaced to the handler immediately.
use crate::core::error::GatewayError;
use crate::loggers::Logger;
use crate::upstreams::envelope::{RawBody, UpstreamResponse};
use crate::upstreams::request::UpstreamRequest;
use crate::upstreams::target::ResponseFormat;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// UpstreamOptions
///
/// Public options for UpstreamClient.
#[derive(Clone, Debug)]
pub struct UpstreamOptions {
    /// Bound on one upstream call, connect through body read.
    pub timeout: Duration,

    /// User-Agent sent to every upstream.
    pub user_agent: String,

    /// Number of body characters kept in logs for non-success responses.
    pub snippet_chars: usize,
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("agri-gateway/{}", env!("CARGO_PKG_VERSION")),
            snippet_chars: 250,
        }
    }
}

/// UpstreamClient
///
/// Cloneable; clones share the connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    logger: Logger,
    opts: UpstreamOptions,
}

impl UpstreamClient {
    pub fn new(logger: Logger) -> Result<Self, GatewayError> {
        Self::new_with_opts(logger, None)
    }

    /// # Errors
    /// Returns [`GatewayError::ConfigError`] when the HTTP client cannot be
    /// built (e.g. the TLS backend fails to initialise).
    pub fn new_with_opts(logger: Logger, opts: Option<UpstreamOptions>) -> Result<Self, GatewayError> {
        let opts = opts.unwrap_or_default();
        let client = Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|e| GatewayError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, logger, opts })
    }

    fn headers_for(&self, format: ResponseFormat) -> HeaderMap {
        let mut h = HeaderMap::new();
        let accept = match format {
            ResponseFormat::Xml => "application/xml, text/xml;q=0.9, */*;q=0.8",
            ResponseFormat::Json => "application/json, */*;q=0.8",
        };
        h.insert(ACCEPT, HeaderValue::from_static(accept));
        if let Ok(ua) = HeaderValue::from_str(&self.opts.user_agent) {
            h.insert(USER_AGENT, ua);
        }
        h
    }

    /// Issues the GET for `request` and returns the raw body.
    ///
    /// The timeout is applied by the reqwest client and again around the
    /// whole exchange, body read included.
    ///
    /// # Errors
    /// Returns [`GatewayError::UpstreamTransport`] on network failure,
    /// timeout, or a non-2xx status.
    pub async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, GatewayError> {
        let display_url = request.redacted_url();
        let capability = request.capability.to_string();

        crate::info!(
            self.logger,
            "Upstream request start",
            "capability" => &capability,
            "url" => &display_url
        );

        let started = Instant::now();
        let exchange = async {
            let resp = self
                .client
                .get(request.url.clone())
                .headers(self.headers_for(request.format))
                .send()
                .await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let transport_error = |status: Option<u16>, timed_out: bool, details: String| GatewayError::UpstreamTransport {
            capability: capability.clone(),
            url: display_url.clone(),
            status,
            timed_out,
            details,
        };

        let (status, body) = match timeout(self.opts.timeout, exchange).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                // reqwest errors embed the full URL, auth key included
                let timed_out = e.is_timeout();
                let details = e.without_url().to_string();
                crate::error!(
                    self.logger,
                    "Upstream network failure",
                    "capability" => &capability,
                    "url" => &display_url,
                    "timed_out" => timed_out,
                    "error" => &details
                );
                return Err(transport_error(None, timed_out, details));
            }
            Err(_) => {
                crate::error!(
                    self.logger,
                    "Upstream call timed out",
                    "capability" => &capability,
                    "url" => &display_url,
                    "timeout_ms" => self.opts.timeout.as_millis() as u64
                );
                return Err(transport_error(
                    None,
                    true,
                    format!("no response within {} ms", self.opts.timeout.as_millis()),
                ));
            }
        };

        let status_u16 = status.as_u16();
        if !status.is_success() {
            let snippet: String = body.chars().take(self.opts.snippet_chars).collect();
            crate::warn!(
                self.logger,
                "Upstream returned non-success status",
                "capability" => &capability,
                "url" => &display_url,
                "status" => status_u16,
                "snippet" => &snippet
            );
            return Err(transport_error(Some(status_u16), false, format!("HTTP {}", status_u16)));
        }

        crate::debug!(
            self.logger,
            "Upstream request done",
            "capability" => &capability,
            "status" => status_u16,
            "bytes" => body.len(),
            "elapsed_ms" => started.elapsed().as_millis() as u64
        );

        Ok(UpstreamResponse {
            status: status_u16,
            format: request.format,
            body: RawBody::Text(body),
        })
    }
}
