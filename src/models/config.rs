//! Configuration data model and validation

use crate::types::{AppError, Destination, NonSuccessPolicy, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Main run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Probe target
    pub destination: Destination,

    /// Total number of probes to issue
    pub total_requests: u64,

    /// Maximum number of probes in flight at once
    pub concurrency: u64,

    /// TCP connect bound in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Bound on writing the request and reading until close, in milliseconds
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Largest response accepted before the probe counts as failed
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// Size of each socket read
    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,

    /// Handling of responses that are not `HTTP/1.1 200 OK`
    #[serde(default)]
    pub non_success_policy: NonSuccessPolicy,

    /// Outcome line format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Print a count summary to stderr after the run
    #[serde(default)]
    pub summary: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: Destination::new(Ipv4Addr::LOCALHOST, 80),
            total_requests: 0,
            concurrency: 1,
            connect_timeout_ms: default_connect_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            read_chunk_size: default_read_chunk_size(),
            non_success_policy: NonSuccessPolicy::default(),
            output_format: OutputFormat::default(),
            summary: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a configuration for the given run shape with default tuning
    pub fn new(destination: Destination, total_requests: u64, concurrency: u64) -> Self {
        Self {
            destination,
            total_requests,
            concurrency,
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        // A zero limit with work outstanding would never make progress
        if self.concurrency == 0 && self.total_requests > 0 {
            return Err(AppError::config(
                "Concurrency must be greater than 0 when COUNT is greater than 0",
            ));
        }

        if self.connect_timeout_ms == 0 {
            return Err(AppError::config("Connect timeout must be greater than 0"));
        }

        if self.response_timeout_ms == 0 {
            return Err(AppError::config("Response timeout must be greater than 0"));
        }

        if self.max_response_bytes == 0 {
            return Err(AppError::config("Max response bytes must be greater than 0"));
        }

        if self.read_chunk_size == 0 {
            return Err(AppError::config("Read chunk size must be greater than 0"));
        }

        Ok(())
    }

    /// Merge settings from environment variables
    pub fn merge_from_env(&mut self) -> Result<()> {
        use std::env;

        if let Ok(value) = env::var("WAVE_PROBE_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = value.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid WAVE_PROBE_CONNECT_TIMEOUT_MS '{}': {}", value, e))
            })?;
        }

        if let Ok(value) = env::var("WAVE_PROBE_RESPONSE_TIMEOUT_MS") {
            self.response_timeout_ms = value.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid WAVE_PROBE_RESPONSE_TIMEOUT_MS '{}': {}", value, e))
            })?;
        }

        if let Ok(value) = env::var("WAVE_PROBE_MAX_RESPONSE_BYTES") {
            self.max_response_bytes = value.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid WAVE_PROBE_MAX_RESPONSE_BYTES '{}': {}", value, e))
            })?;
        }

        if let Ok(value) = env::var("WAVE_PROBE_NON_SUCCESS") {
            self.non_success_policy = value.parse()?;
        }

        if let Ok(value) = env::var("WAVE_PROBE_FORMAT") {
            self.output_format = value.parse()?;
        }

        if let Ok(value) = env::var("WAVE_PROBE_SUMMARY") {
            self.summary = parse_bool_env(&value).ok_or_else(|| {
                AppError::config(format!("Invalid WAVE_PROBE_SUMMARY value: {}", value))
            })?;
        }

        // https://no-color.org: presence disables color regardless of value
        if env::var_os("NO_COLOR").is_some() {
            self.enable_color = false;
        }

        Ok(())
    }
}

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// Default value functions for serde
fn default_connect_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}

fn default_response_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_RESPONSE_TIMEOUT.as_millis() as u64
}

fn default_max_response_bytes() -> usize {
    crate::defaults::DEFAULT_MAX_RESPONSE_BYTES
}

fn default_read_chunk_size() -> usize {
    crate::defaults::DEFAULT_READ_CHUNK_SIZE
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(port: u16) -> Destination {
        Destination::new(Ipv4Addr::LOCALHOST, port)
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.response_timeout(), Duration::from_secs(10));
        assert_eq!(config.read_chunk_size, 1024);
        assert_eq!(config.non_success_policy, NonSuccessPolicy::Drop);
    }

    #[test]
    fn test_zero_concurrency_with_work_is_rejected() {
        let config = Config::new(local(80), 5, 0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_zero_concurrency_without_work_is_allowed() {
        let config = Config::new(local(80), 0, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_bounds_are_rejected() {
        let mut config = Config::new(local(80), 1, 1);
        config.connect_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new(local(80), 1, 1);
        config.response_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new(local(80), 1, 1);
        config.max_response_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new(local(80), 1, 1);
        config.read_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool_env() {
        assert_eq!(parse_bool_env("TRUE"), Some(true));
        assert_eq!(parse_bool_env("off"), Some(false));
        assert_eq!(parse_bool_env("maybe"), None);
    }

    #[test]
    fn test_serde_defaults_fill_tuning_fields() {
        let json = r#"{
            "destination": {"ip": "10.0.0.2", "port": 8080},
            "total_requests": 10,
            "concurrency": 3
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.destination, Destination::new(Ipv4Addr::new(10, 0, 0, 2), 8080));
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.output_format, OutputFormat::Plain);
        assert!(!config.summary);
    }
}
