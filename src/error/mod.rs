//! Error handling for the wave probe
//!
//! Probe failures never become errors: they are outcomes. `AppError` covers
//! what can stop a run, which is bad input before the first wave, a broken
//! stdout, or an internal fault.

use thiserror::Error;

/// Custom error types for the wave probe
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (arguments, environment, .env files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing errors (destination, numbers, enum values)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// I/O errors (stdout)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Parse(_) => "PARSE",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the usage line should accompany this error
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Parse(_))
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<clap::Error> for AppError {
    fn from(error: clap::Error) -> Self {
        let rendered = error.to_string();
        // clap appends its own usage block after a blank line; keep what precedes it
        let message = rendered
            .lines()
            .take_while(|line| !line.trim().is_empty())
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ");
        Self::config(message.trim_start_matches("error: ").to_string())
    }
}

/// Result type alias for the wave probe
pub type Result<T> = std::result::Result<T, AppError>;
