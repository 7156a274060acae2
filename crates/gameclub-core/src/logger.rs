//! Logging collaborator injected into the pipeline layers.
//!
//! Layers only append records; they never read them back. [`TracingLogger`]
//! forwards to `tracing` and is what production code uses. [`MemoryLogger`]
//! keeps every record in memory so callers and tests can inspect them.

use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use time::OffsetDateTime;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only logging contract.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Forwards records to the `tracing` dispatcher under the `gameclub` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "gameclub", "{message}"),
            LogLevel::Info => tracing::info!(target: "gameclub", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "gameclub", "{message}"),
            LogLevel::Error => tracing::error!(target: "gameclub", "{message}"),
        }
    }
}

/// One immutable log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: OffsetDateTime,
    pub level: LogLevel,
    pub message: String,
}

/// Thread-safe in-memory logger.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .expect("memory logger lock is not poisoned")
            .clone()
    }

    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    /// `(level, message)` pairs, convenient for asserting exact sequences.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.records()
            .into_iter()
            .map(|record| (record.level, record.message))
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let record = LogRecord {
            timestamp: OffsetDateTime::now_utc(),
            level,
            message: message.to_owned(),
        };
        self.records
            .lock()
            .expect("memory logger lock is not poisoned")
            .push(record);
    }
}
