//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
};
use std::fmt;

/// Concurrency above this needs one socket per probe and may hit descriptor limits
pub const HIGH_CONCURRENCY: u64 = 1024;

/// Configuration validator with advisory checks on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_destination(config));
        warnings.extend(Self::validate_run_shape(config));
        warnings.extend(Self::validate_limits(config));

        Ok(warnings)
    }

    fn validate_destination(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let ip = config.destination.ip;

        if ip.is_unspecified() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Destination {} is the unspecified address", config.destination),
            ));
        } else if ip.is_broadcast() || ip.is_multicast() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Destination {} is not a unicast address; connects will fail", config.destination),
            ));
        } else if !ip.is_loopback() && !ip.is_private() && !ip.is_link_local() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Destination {} is a public address; make sure you are allowed to load it", config.destination),
            ));
        }

        warnings
    }

    fn validate_run_shape(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.total_requests == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "COUNT is 0; no requests will be sent",
            ));
        }

        if config.concurrency > HIGH_CONCURRENCY {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Concurrency {} opens that many sockets at once and may exceed the open file limit",
                    config.concurrency
                ),
            ));
        }

        if config.total_requests > 0 && config.concurrency > config.total_requests {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Concurrency {} exceeds COUNT {}; a single wave of {} will run",
                    config.concurrency, config.total_requests, config.total_requests
                ),
            ));
        }

        warnings
    }

    fn validate_limits(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.read_chunk_size > config.max_response_bytes {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Read chunk size {} is larger than the response limit {}",
                    config.read_chunk_size, config.max_response_bytes
                ),
            ));
        }

        if config.connect_timeout_ms < 10 || config.response_timeout_ms < 10 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Timeouts under 10ms will fail most probes",
            ));
        }

        warnings
    }
}

/// Convenience function for comprehensive validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

/// Validation warning with severity level
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new<S: Into<String>>(level: ValidationLevel, message: S) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let prefix = match self.level {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARN",
        };

        if use_color {
            use colored::Colorize;
            let prefix = match self.level {
                ValidationLevel::Info => prefix.blue().to_string(),
                ValidationLevel::Warning => prefix.yellow().to_string(),
            };
            format!("[{}] {}", prefix, self.message)
        } else {
            format!("[{}] {}", prefix, self.message)
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Validation warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}
