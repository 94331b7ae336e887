//! Wave Probe
//!
//! A minimal HTTP load-generation probe. It sends a fixed raw
//! `GET / HTTP/1.1` request to a single IPv4 destination a configurable
//! number of times, in waves no larger than a concurrency limit, and
//! reports the latency (or failure) of every request.

pub mod cli;
pub mod config;
pub mod client;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod models;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use client::{Prober, TcpProber};
pub use executor::{plan_waves, OutcomeSink, WavePlan, WaveScheduler};
pub use models::{Config, ProbeOutcome, RunSummary, WaveReport};
pub use output::{OutputCoordinator, OutputFormatter, OutputFormatterFactory};
pub use types::Destination;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata exported by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;
    pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
