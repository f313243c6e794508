//! Real-time conversion logs via Server-Sent Events (SSE).
//!
//! The pipeline reports progress through a broadcast channel. Entries go to
//! stderr immediately (stdout stays reserved for JSON results) and fan out
//! to any connected SSE clients of the HTTP server.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for client display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Pipeline stage the entry belongs to ("mapping", "devices",
    /// "autoevents"), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), stage: None }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), stage: None }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), stage: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), stage: None }
    }

    pub fn in_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

/// Global log bus.
pub static LOG_BUS: Lazy<LogBus> = Lazy::new(LogBus::new);

/// Broadcasts log entries to all connected SSE clients.
pub struct LogBus {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Print an entry to stderr and send it to all subscribers.
    pub fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        match &entry.stage {
            Some(stage) => eprintln!("{} [{}] {}", prefix, stage, entry.message),
            None => eprintln!("{} {}", prefix, entry.message),
        }

        // no receivers is fine, the CLI path never subscribes
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOG_BUS.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BUS.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BUS.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BUS.log(LogEntry::error(msg));
}

/// Log into a named pipeline stage.
pub fn log_stage(stage: &str, level: LogLevel, msg: impl Into<String>) {
    let entry = match level {
        LogLevel::Info => LogEntry::info(msg),
        LogLevel::Success => LogEntry::success(msg),
        LogLevel::Warning => LogEntry::warning(msg),
        LogLevel::Error => LogEntry::error(msg),
    };
    LOG_BUS.log(entry.in_stage(stage));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry::success("12 devices converted").in_stage("devices");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "12 devices converted");
        assert_eq!(json["stage"], "devices");
    }

    #[test]
    fn test_stage_omitted_when_absent() {
        let json = serde_json::to_value(LogEntry::info("reading workbook")).unwrap();
        assert!(json.get("stage").is_none());
    }

    #[test]
    fn test_subscribers_receive_entries() {
        let bus = LogBus::new();
        let mut receiver = bus.subscribe();
        bus.log(LogEntry::warning("unknown device 'Ghost'").in_stage("autoevents"));
        let entry = receiver.try_recv().unwrap();
        assert_eq!(entry.message, "unknown device 'Ghost'");
        assert_eq!(entry.stage.as_deref(), Some("autoevents"));
    }
}
