// tests/test_logger.rs
use agri_gateway::loggers::core::{LogLevel, LogRecord};
use agri_gateway::loggers::{Logger, LoggerBuilder};
use agri_gateway::loggers::builder::LoggerConfig;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::mpsc;
use serde_json::Value;
use chrono::Utc;

use agri_gateway::{trace, debug, info, warn, error, fatal};

fn channel_logger(level: LogLevel) -> (Logger, mpsc::Receiver<LogRecord>) {
    let (tx, rx) = mpsc::channel::<LogRecord>(16);
    let config = Arc::new(ArcSwap::from_pointee(LoggerConfig {
        level,
        component: "test-component".to_string(),
    }));
    (Logger { sender: tx, config }, rx)
}

async fn drain(rx: &mut mpsc::Receiver<LogRecord>, max: usize) -> Vec<LogRecord> {
    let mut recs = Vec::new();
    for _ in 0..max {
        match tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await {
            Ok(Some(r)) => recs.push(r),
            _ => break,
        }
    }
    recs
}

#[tokio::test]
async fn logger_filters_below_configured_level() {
    let (logger, mut rx) = channel_logger(LogLevel::Info);

    trace!(logger, "trace message", "k" => "v1");
    debug!(logger, "debug message", "k" => "v2");
    info!(logger, "info message", "k" => "v3");
    warn!(logger, "warn message", "k" => "v4");
    error!(logger, "error message", "error" => "boom", "status" => 503u16);
    fatal!(logger, "fatal message");

    let recs = drain(&mut rx, 6).await;
    assert_eq!(recs.len(), 4, "Expected 4 records (info,warn,error,fatal)");

    let levels: Vec<_> = recs.iter().map(|r| r.level.clone()).collect();
    assert_eq!(levels, vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error, LogLevel::Fatal]);
    assert!(recs.iter().all(|r| r.component == "test-component"));

    let info_rec = &recs[0];
    assert_eq!(info_rec.msg, "info message");
    match info_rec.ctx.get("k") {
        Some(Value::String(s)) => assert_eq!(s, "v3"),
        other => panic!("info.k missing or wrong type: {:?}", other),
    }

    let error_rec = &recs[2];
    assert_eq!(error_rec.ctx.get("status"), Some(&Value::from(503)));
    assert!(recs[3].ctx.is_empty());

    let delta = Utc::now().signed_duration_since(recs[0].ts);
    assert!(delta.num_seconds() >= 0 && delta.num_minutes() < 5, "timestamp should be recent");
}

#[tokio::test]
async fn set_level_applies_to_every_clone() {
    let (logger, mut rx) = channel_logger(LogLevel::Error);
    let clone = logger.clone();

    info!(clone, "dropped");
    logger.set_level(LogLevel::Debug);
    assert_eq!(clone.level(), LogLevel::Debug);
    debug!(clone, "kept");

    let recs = drain(&mut rx, 2).await;
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].msg, "kept");
}

#[tokio::test]
async fn record_serializes_as_json_line() {
    let (logger, mut rx) = channel_logger(LogLevel::Info);
    info!(logger, "Upstream request start", "capability" => "fertilizer", "bytes" => 42usize);

    let rec = drain(&mut rx, 1).await.pop().expect("record");
    let line = serde_json::to_string(&rec).unwrap();
    let parsed: Value = serde_json::from_str(&line).unwrap();

    assert_eq!(parsed["level"], "info");
    assert_eq!(parsed["ctx"]["capability"], "fertilizer");
    assert_eq!(parsed["ctx"]["bytes"], 42);
    assert!(parsed.get("sys").is_none());
}

#[tokio::test]
async fn builder_spawns_worker() {
    let logger = LoggerBuilder::new("builder-test").with_level(LogLevel::Warn).build().unwrap();
    assert_eq!(logger.level(), LogLevel::Warn);
    warn!(logger, "worker smoke test");
}
