//! # Envelope Normalizer
//!
//! Unwraps the payload from an upstream envelope. Each target names a
//! `payload_path` (`response.body.items.item`, `service.list`, ...); the
//! normalizer parses the body in the target's format and descends that path,
//! returning whatever it finds unmodified.
//!
//! Upstream error documents never carry the payload path, so a missing
//! segment is how failures hidden behind HTTP 200 are detected. Two known
//! error shapes are reported with the upstream's own code and message.

use serde_json::Value;

use crate::core::error::{NormalizationError, NormalizationKind};
use crate::upstreams::target::{ResponseFormat, TargetDescriptor};
use crate::upstreams::xmltree::parse_xml;

/// Upstream body as received: raw text, or a tree parsed elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Text(String),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub format: ResponseFormat,
    pub body: RawBody,
}

/// Extracts the payload of `response` for `target`.
///
/// # Errors
/// * [`NormalizationKind::Malformed`] when the body does not parse.
/// * [`NormalizationKind::UpstreamErrorEnvelope`] when the path is missing
///   and the body is a recognised upstream error document.
/// * [`NormalizationKind::PathNotFound`] when the path is missing otherwise,
///   or the upstream answered with its `NO_DATA` result code.
pub fn normalize(response: &UpstreamResponse, target: &TargetDescriptor) -> Result<Value, NormalizationError> {
    let tree = parse_body(&response.body, target.response_format)?;

    match descend(&tree, &target.payload_path) {
        Ok(payload) => Ok(payload.clone()),
        Err(depth) => {
            if let Some(envelope) = detect_error_envelope(&tree) {
                return Err(envelope);
            }
            Err(NormalizationError::new(
                NormalizationKind::PathNotFound,
                format!(
                    "missing '{}' at {}",
                    target.payload_path[depth],
                    target.payload_path[..=depth].join(".")
                ),
            ))
        }
    }
}

/// Walks `path` through nested objects.
///
/// Returns the index of the first segment that is absent (or whose parent
/// is not an object) on failure.
pub fn descend<'a, S: AsRef<str>>(tree: &'a Value, path: &[S]) -> Result<&'a Value, usize> {
    let mut node = tree;
    for (depth, segment) in path.iter().enumerate() {
        node = node
            .as_object()
            .and_then(|map| map.get(segment.as_ref()))
            .ok_or(depth)?;
    }
    Ok(node)
}

fn parse_body(body: &RawBody, format: ResponseFormat) -> Result<Value, NormalizationError> {
    let text = match body {
        RawBody::Json(value) => return Ok(value.clone()),
        RawBody::Text(text) => text,
    };

    match format {
        ResponseFormat::Xml => parse_xml(text)
            .map_err(|e| NormalizationError::new(NormalizationKind::Malformed, format!("XML: {}", e))),
        ResponseFormat::Json => match serde_json::from_str::<Value>(text) {
            Ok(value) => Ok(value),
            Err(e) => {
                // Auth failures come back as XML even when JSON was requested
                if text.trim_start().starts_with('<') {
                    if let Some(envelope) = parse_xml(text).ok().as_ref().and_then(detect_error_envelope) {
                        return Err(envelope);
                    }
                }
                Err(NormalizationError::new(NormalizationKind::Malformed, format!("JSON: {}", e)))
            }
        },
    }
}

/// Portal result code for a well-formed answer with nothing in it.
const NO_DATA_CODE: &str = "03";

/// Recognises the portal gateway error document and non-success result headers.
///
/// A `NO_DATA` header is reported as [`NormalizationKind::PathNotFound`].
fn detect_error_envelope(tree: &Value) -> Option<NormalizationError> {
    let gateway = &tree["OpenAPI_ServiceResponse"]["cmmMsgHeader"];
    if gateway.is_object() {
        let code = scalar(&gateway["returnReasonCode"]);
        let message = Some(scalar(&gateway["returnAuthMsg"]))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| scalar(&gateway["errMsg"]));
        return Some(envelope_error(&code, &message));
    }

    let header = &tree["response"]["header"];
    let code = scalar(&header["resultCode"]);
    if code == NO_DATA_CODE {
        // e.g. a tmFc bulletin not yet published; not a rejection
        return Some(NormalizationError::new(
            NormalizationKind::PathNotFound,
            format!("upstream reported no data ({}: {})", code, scalar(&header["resultMsg"])),
        ));
    }
    if !code.is_empty() && code != "00" && code != "0" {
        return Some(envelope_error(&code, &scalar(&header["resultMsg"])));
    }

    None
}

fn envelope_error(code: &str, message: &str) -> NormalizationError {
    NormalizationError::new(
        NormalizationKind::UpstreamErrorEnvelope,
        format!("upstream error {}: {}", if code.is_empty() { "?" } else { code }, message),
    )
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
