//! Outcome line and summary formatters

use crate::{
    models::{ProbeOutcome, RunSummary},
    types::NonSuccessPolicy,
};
use colored::Colorize;
use serde_json::json;

/// Line printed for a failed probe
pub const FAILURE_SENTINEL: &str = "-1";

/// Line printed for a non-200 response when non-success reporting is on
pub const NON_SUCCESS_SENTINEL: &str = "-2";

/// Formatting options shared by all formatters
#[derive(Debug, Clone, Copy)]
pub struct FormattingOptions {
    pub non_success_policy: NonSuccessPolicy,
    pub enable_color: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            non_success_policy: NonSuccessPolicy::Drop,
            enable_color: false,
        }
    }
}

/// Turns outcomes into output lines
pub trait OutputFormatter: Send + Sync {
    /// Line for one outcome, or `None` when the outcome prints nothing
    fn format_outcome(&self, outcome: &ProbeOutcome) -> Option<String>;

    /// End-of-run summary (written to stderr by the caller)
    fn format_summary(&self, summary: &RunSummary) -> String;

    fn options(&self) -> &FormattingOptions;
}

/// Bare numbers, one per line: latency in milliseconds or a sentinel
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_outcome(&self, outcome: &ProbeOutcome) -> Option<String> {
        match outcome {
            ProbeOutcome::Success { .. } => outcome.latency_ms().map(format_ms),
            ProbeOutcome::NonSuccess { .. } => match self.options.non_success_policy {
                NonSuccessPolicy::Drop => None,
                NonSuccessPolicy::Report => Some(NON_SUCCESS_SENTINEL.to_string()),
            },
            ProbeOutcome::Failure { .. } => Some(FAILURE_SENTINEL.to_string()),
        }
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        summary_line(summary, self.options.enable_color)
    }

    fn options(&self) -> &FormattingOptions {
        &self.options
    }
}

/// One JSON object per line
pub struct JsonFormatter {
    options: FormattingOptions,
}

impl JsonFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_outcome(&self, outcome: &ProbeOutcome) -> Option<String> {
        let value = match outcome {
            ProbeOutcome::Success { .. } => json!({
                "outcome": "success",
                "latency_ms": outcome.latency_ms(),
                "status_line": null,
                "error": null,
            }),
            ProbeOutcome::NonSuccess { status_line, .. } => match self.options.non_success_policy {
                NonSuccessPolicy::Drop => return None,
                NonSuccessPolicy::Report => json!({
                    "outcome": "non_success",
                    "latency_ms": outcome.latency_ms(),
                    "status_line": status_line,
                    "error": null,
                }),
            },
            ProbeOutcome::Failure { kind, detail } => json!({
                "outcome": "failure",
                "latency_ms": null,
                "status_line": null,
                "error": { "kind": kind.as_str(), "detail": detail },
            }),
        };
        Some(value.to_string())
    }

    fn format_summary(&self, summary: &RunSummary) -> String {
        json!({
            "issued": summary.issued,
            "waves": summary.waves,
            "success": summary.counts.success,
            "non_success": summary.counts.non_success,
            "failure": summary.counts.failure,
            "duration_ms": summary.duration.as_secs_f64() * 1000.0,
        })
        .to_string()
    }

    fn options(&self) -> &FormattingOptions {
        &self.options
    }
}

/// Milliseconds with microsecond resolution
pub fn format_ms(ms: f64) -> String {
    format!("{:.3}", ms)
}

fn summary_line(summary: &RunSummary, use_color: bool) -> String {
    let duration = format!("{}ms", format_ms(summary.duration.as_secs_f64() * 1000.0));
    let success = format!("success {}", summary.counts.success);
    let non_success = format!("non-success {}", summary.counts.non_success);
    let failure = format!("failure {}", summary.counts.failure);

    let (success, non_success, failure) = if use_color {
        (
            success.green().to_string(),
            non_success.yellow().to_string(),
            failure.red().to_string(),
        )
    } else {
        (success, non_success, failure)
    };

    format!(
        "{} probes in {} waves ({}): {}, {}, {}",
        summary.issued, summary.waves, duration, success, non_success, failure
    )
}
