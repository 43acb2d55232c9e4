use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace, Debug, Info, Warn, Error, Fatal,
}

impl LogLevel {
    /// Records at this level and above are written to stderr.
    pub fn is_alerting(&self) -> bool {
        *self >= LogLevel::Warn
    }
}

#[derive(Debug, Serialize)]
pub struct LogRecord {
    pub ts: DateTime<Utc>,
    pub level: LogLevel,
    pub msg: String,
    pub component: String,
    pub ctx: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sys: Option<SysInfo>,
}

impl LogRecord {
    pub fn new(level: LogLevel, msg: impl Into<String>, component: &str, ctx: HashMap<String, Value>) -> Self {
        Self {
            ts: Utc::now(),
            level,
            msg: msg.into(),
            component: component.to_string(),
            ctx,
            sys: None,
        }
    }
}

/// Converts a context value for a log record; unserializable values become null.
pub fn ctx_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[derive(Debug, Serialize)]
pub struct SysInfo {
    pub cpu_usage: f32,
    pub mem_used_kb: u64,
    pub load_avg: Vec<f64>,
    pub uptime_secs: u64,
}
