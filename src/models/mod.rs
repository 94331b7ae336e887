//! Data models and structures for the wave probe

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{OutcomeCounts, ProbeOutcome, RunSummary, WaveReport};
