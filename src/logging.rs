//! Structured logging for the wave probe
//!
//! stdout carries probe outcomes only, so every log entry goes to stderr
//! (or to an in-memory buffer in tests). Entries support:
//! - Multiple levels with a configurable floor
//! - Console and JSON line formats
//! - A session correlation ID attached to every entry of a run
//! - Structured fields for waves, outcomes and errors

use crate::error::AppError;
use crate::models::{Config, ProbeOutcome, RunSummary, WaveReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - per-probe and per-wave detail
    Debug = 1,
    /// Info level - run lifecycle
    Info = 2,
    /// Warning level - configuration warnings, failed probes in verbose runs
    Warn = 3,
    /// Error level - run-level errors
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Where formatted entries are written
#[derive(Clone)]
enum LogOutput {
    Stderr,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger with level filtering and multiple output formats
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    output: LogOutput,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger that only reports warnings and errors
    pub fn new(name: &str) -> Self {
        Self {
            min_level: LogLevel::Warn,
            use_color: false,
            format: LogFormat::Console,
            name: name.to_string(),
            output: LogOutput::Stderr,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger whose level and format follow the run configuration
    pub fn with_config(name: &str, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name: name.to_string(),
            output: LogOutput::Stderr,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger that writes into a shared buffer instead of stderr
    pub fn with_buffer(name: &str, buffer: Arc<Mutex<Vec<u8>>>) -> Self {
        Self {
            output: LogOutput::Buffer(buffer),
            ..Self::new(name)
        }
    }

    /// Derive a logger for another component sharing this session context
    pub fn child(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    /// Start a new session and return its correlation ID
    pub async fn start_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut context = self.context.write().await;
        context.session_id = Some(session_id.clone());
        session_id
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key.to_string(), json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let context = self.context.read().await;
        if entry.correlation_id.is_none() {
            entry.correlation_id = context.session_id.clone();
        }
        for (key, value) in &context.context_fields {
            entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
        drop(context);

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
        };

        match &self.output {
            LogOutput::Stderr => {
                let _ = writeln!(io::stderr(), "{}", output);
            }
            LogOutput::Buffer(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    let _ = writeln!(buffer, "{}", output);
                }
            }
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        if let Some(correlation_id) = &entry.correlation_id {
            let short = correlation_id.get(..8).unwrap_or(correlation_id);
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add the fields describing one probe outcome
    pub fn outcome(self, outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Success { .. } => self
                .field("outcome", "success")
                .field("latency_ms", outcome.latency_ms()),
            ProbeOutcome::NonSuccess { status_line, .. } => self
                .field("outcome", "non_success")
                .field("latency_ms", outcome.latency_ms())
                .field("status_line", status_line),
            ProbeOutcome::Failure { kind, detail } => self
                .field("outcome", "failure")
                .field("failure_kind", kind.as_str())
                .field("error", detail),
        }
    }

    /// Add the fields describing a completed wave
    pub fn wave(self, wave: &WaveReport) -> Self {
        self.field("wave", wave.index)
            .field("wave_size", wave.size)
            .field("wave_ms", wave.duration.as_secs_f64() * 1000.0)
            .field("success", wave.counts.success)
            .field("non_success", wave.counts.non_success)
            .field("failure", wave.counts.failure)
    }

    /// Add the fields describing a finished run
    pub fn summary(self, summary: &RunSummary) -> Self {
        self.field("issued", summary.issued)
            .field("waves", summary.waves)
            .field("success", summary.counts.success)
            .field("non_success", summary.counts.non_success)
            .field("failure", summary.counts.failure)
            .field("run_ms", summary.duration.as_secs_f64() * 1000.0)
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}
