use tokio::sync::mpsc;
use sysinfo::System;
use crate::loggers::core::{LogRecord, SysInfo, LogLevel};
use std::io::Write;

/// Drains the logger channel and writes one JSON line per record.
pub struct LogWorker {
    receiver: mpsc::Receiver<LogRecord>,
    sys: System,
}

impl LogWorker {
    pub fn new(receiver: mpsc::Receiver<LogRecord>) -> Self {
        // sysinfo 0.30: System::new() is empty, refreshed lazily on the first error
        Self { receiver, sys: System::new() }
    }

    pub async fn run(mut self) {
        while let Some(mut record) = self.receiver.recv().await {
            if record.level >= LogLevel::Error {
                record.sys = Some(self.snapshot());
            }

            let Ok(line) = serde_json::to_string(&record) else {
                continue;
            };

            if record.level.is_alerting() {
                let _ = writeln!(std::io::stderr().lock(), "{}", line);
            } else {
                let _ = writeln!(std::io::stdout().lock(), "{}", line);
            }
        }
    }

    fn snapshot(&mut self) -> SysInfo {
        self.sys.refresh_cpu();
        self.sys.refresh_memory();

        let load = System::load_average();
        SysInfo {
            // In 0.30, global_cpu_info() returns the aggregated CPU data
            cpu_usage: self.sys.global_cpu_info().cpu_usage(),
            mem_used_kb: self.sys.used_memory() / 1024,
            load_avg: vec![load.one, load.five, load.fifteen],
            uptime_secs: System::uptime(),
        }
    }
}
