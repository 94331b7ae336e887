//! Probe outcome and run accounting data models

use crate::types::FailureKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Response started with `HTTP/1.1 200 OK`
    Success {
        latency: Duration,
    },
    /// A complete response arrived but was not a 200
    NonSuccess {
        latency: Duration,
        status_line: String,
    },
    /// The probe could not complete the exchange
    Failure {
        kind: FailureKind,
        detail: String,
    },
}

impl ProbeOutcome {
    pub fn success(latency: Duration) -> Self {
        Self::Success { latency }
    }

    pub fn non_success<S: Into<String>>(latency: Duration, status_line: S) -> Self {
        Self::NonSuccess {
            latency,
            status_line: status_line.into(),
        }
    }

    pub fn failure<S: Into<String>>(kind: FailureKind, detail: S) -> Self {
        Self::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Elapsed time from connect start to classification, when a response arrived
    pub fn latency(&self) -> Option<Duration> {
        match self {
            Self::Success { latency } | Self::NonSuccess { latency, .. } => Some(*latency),
            Self::Failure { .. } => None,
        }
    }

    /// Latency as fractional milliseconds
    pub fn latency_ms(&self) -> Option<f64> {
        self.latency().map(|d| d.as_secs_f64() * 1000.0)
    }
}

/// Per-outcome counters shared by wave and run accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub success: u64,
    pub non_success: u64,
    pub failure: u64,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Success { .. } => self.success += 1,
            ProbeOutcome::NonSuccess { .. } => self.non_success += 1,
            ProbeOutcome::Failure { .. } => self.failure += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.non_success + self.failure
    }

    fn absorb(&mut self, other: &OutcomeCounts) {
        self.success += other.success;
        self.non_success += other.non_success;
        self.failure += other.failure;
    }
}

/// Accounting for one completed wave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveReport {
    /// Zero-based wave index
    pub index: u64,
    /// Number of probes launched in this wave
    pub size: u64,
    /// Wall-clock time from launch to barrier release
    pub duration: Duration,
    pub counts: OutcomeCounts,
}

/// Accounting for a whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Probes issued across all waves
    pub issued: u64,
    pub waves: u64,
    /// Largest wave launched
    pub largest_wave: u64,
    pub counts: OutcomeCounts,
    pub duration: Duration,
}

impl RunSummary {
    /// Fold a finished wave into the run totals
    pub fn add_wave(&mut self, wave: &WaveReport) {
        self.issued += wave.size;
        self.waves += 1;
        self.largest_wave = self.largest_wave.max(wave.size);
        self.counts.absorb(&wave.counts);
    }
}
