use reqwest::Url;
use std::collections::HashMap;

use crate::core::error::GatewayError;
use crate::upstreams::forecast::ForecastWindow;
use crate::upstreams::target::{Capability, ParamSource, ResponseFormat, TargetDescriptor};

const REDACTED: &str = "***";

/// A fully-qualified outbound request for one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub capability: Capability,
    pub url: Url,
    pub format: ResponseFormat,
    auth_key_name: &'static str,
}

impl UpstreamRequest {
    /// The request URL with the auth key value replaced, safe for logs and errors.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let value = if k == self.auth_key_name { REDACTED.to_string() } else { v.into_owned() };
                (k.into_owned(), value)
            })
            .collect();

        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

/// Builds the outbound URL for `target` from caller parameters.
///
/// The auth key comes first, then every binding in declaration order; each
/// value is form-urlencoded. `window` must be supplied for targets with a
/// forecast-time binding.
///
/// # Errors
/// Returns [`GatewayError::InternalError`] when a required value is absent;
/// handlers validate before building, so this marks a programming error.
pub fn build_request(
    target: &TargetDescriptor,
    params: &HashMap<String, String>,
    window: Option<&ForecastWindow>,
) -> Result<UpstreamRequest, GatewayError> {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(target.params.len() + 1);
    pairs.push((target.auth_key_name, target.auth_key.clone()));

    for binding in &target.params {
        let value = match &binding.source {
            ParamSource::Caller(name) => params.get(*name).cloned().ok_or_else(|| {
                GatewayError::InternalError(format!(
                    "{}: required parameter '{}' reached the request builder unset",
                    target.capability, name
                ))
            })?,
            ParamSource::OptionalCaller(name) => params.get(*name).cloned().unwrap_or_default(),
            ParamSource::ForecastTime => window.map(ForecastWindow::reference_timestamp).ok_or_else(|| {
                GatewayError::InternalError(format!(
                    "{}: '{}' needs a resolved forecast window",
                    target.capability, binding.upstream
                ))
            })?,
            ParamSource::Fixed(value) => value.to_string(),
        };
        pairs.push((binding.upstream, value));
    }

    let mut url = target.base_url.clone();
    url.query_pairs_mut().extend_pairs(pairs);

    Ok(UpstreamRequest {
        capability: target.capability,
        url,
        format: target.response_format,
        auth_key_name: target.auth_key_name,
    })
}
