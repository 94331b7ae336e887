//! Environment variable keys and .env file loading

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variables read by the configuration layer
pub const ENV_KEYS: &[&str] = &[
    "WAVE_PROBE_CONNECT_TIMEOUT_MS",
    "WAVE_PROBE_RESPONSE_TIMEOUT_MS",
    "WAVE_PROBE_MAX_RESPONSE_BYTES",
    "WAVE_PROBE_NON_SUCCESS",
    "WAVE_PROBE_FORMAT",
    "WAVE_PROBE_SUMMARY",
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific .env file if it exists; existing variables win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }
}
