//! Output formatting and display system
//!
//! Probe outcomes are written to stdout one line at a time as probes
//! complete. The optional run summary goes to stderr so stdout stays
//! machine-readable.

mod formatter;

pub use formatter::{
    format_ms,
    FormattingOptions,
    JsonFormatter,
    OutputFormatter,
    PlainFormatter,
    FAILURE_SENTINEL,
    NON_SUCCESS_SENTINEL,
};

use crate::{
    error::{AppError, Result},
    executor::OutcomeSink,
    models::{Config, ProbeOutcome, RunSummary},
    types::OutputFormat,
};
use std::io::{self, Write};
use std::sync::Mutex;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the given line format
    pub fn create_formatter(format: OutputFormat, options: FormattingOptions) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Plain => Box::new(PlainFormatter::new(options)),
            OutputFormat::Json => Box::new(JsonFormatter::new(options)),
        }
    }

    /// Create the formatter selected by a run configuration
    pub fn from_config(config: &Config) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            non_success_policy: config.non_success_policy,
            enable_color: config.enable_color,
        };
        Self::create_formatter(config.output_format, options)
    }
}

/// Writes formatted outcomes to a line-oriented writer
pub struct OutputCoordinator<W: Write + Send> {
    formatter: Box<dyn OutputFormatter>,
    writer: Mutex<W>,
}

impl OutputCoordinator<io::Stdout> {
    /// Coordinator writing to the process stdout
    pub fn stdout(formatter: Box<dyn OutputFormatter>) -> Self {
        Self::new(formatter, io::stdout())
    }
}

impl<W: Write + Send> OutputCoordinator<W> {
    pub fn new(formatter: Box<dyn OutputFormatter>, writer: W) -> Self {
        Self {
            formatter,
            writer: Mutex::new(writer),
        }
    }

    /// Rendered summary for the run
    pub fn render_summary(&self, summary: &RunSummary) -> String {
        self.formatter.format_summary(summary)
    }

    /// Recover the writer, e.g. to inspect a buffer in tests
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|_| AppError::internal("output writer lock poisoned"))
    }
}

impl<W: Write + Send> OutcomeSink for OutputCoordinator<W> {
    fn emit(&self, outcome: &ProbeOutcome) -> Result<()> {
        let Some(line) = self.formatter.format_outcome(outcome) else {
            return Ok(());
        };

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AppError::internal("output writer lock poisoned"))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FailureKind, NonSuccessPolicy};
    use std::time::Duration;

    fn buffer_coordinator(format: OutputFormat, policy: NonSuccessPolicy) -> OutputCoordinator<Vec<u8>> {
        let options = FormattingOptions { non_success_policy: policy, enable_color: false };
        OutputCoordinator::new(OutputFormatterFactory::create_formatter(format, options), Vec::new())
    }

    #[test]
    fn test_coordinator_writes_one_line_per_printed_outcome() {
        let coordinator = buffer_coordinator(OutputFormat::Plain, NonSuccessPolicy::Drop);
        coordinator.emit(&ProbeOutcome::success(Duration::from_millis(4))).unwrap();
        coordinator.emit(&ProbeOutcome::non_success(Duration::from_millis(4), "HTTP/1.1 500 Internal Server Error")).unwrap();
        coordinator.emit(&ProbeOutcome::failure(FailureKind::Io, "reset")).unwrap();

        let text = String::from_utf8(coordinator.into_inner().unwrap()).unwrap();
        assert_eq!(text, "4.000\n-1\n");
    }

    #[test]
    fn test_coordinator_reports_non_success_when_asked() {
        let coordinator = buffer_coordinator(OutputFormat::Plain, NonSuccessPolicy::Report);
        coordinator.emit(&ProbeOutcome::non_success(Duration::from_millis(1), "HTTP/1.1 404 Not Found")).unwrap();

        let text = String::from_utf8(coordinator.into_inner().unwrap()).unwrap();
        assert_eq!(text, "-2\n");
    }

    #[test]
    fn test_factory_follows_config() {
        let config = Config {
            output_format: OutputFormat::Json,
            ..Default::default()
        };
        let formatter = OutputFormatterFactory::from_config(&config);
        let line = formatter.format_outcome(&ProbeOutcome::failure(FailureKind::Connect, "refused")).unwrap();
        assert!(line.starts_with('{'));
        assert_eq!(formatter.options().non_success_policy, NonSuccessPolicy::Drop);
    }
}
