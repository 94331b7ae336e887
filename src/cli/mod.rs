//! Command-line interface

use clap::Parser;

/// Usage line printed with every configuration error
pub const USAGE: &str = "Usage: wave-probe DESTINATION COUNT N_CONCURRENT";

/// Wave Probe - issue raw HTTP GETs in bounded concurrent waves and print per-request latency
#[derive(Parser, Debug, Clone)]
#[command(name = "wave-probe")]
#[command(version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Target as IP:PORT (dotted-quad IPv4, port 1-65535)
    #[arg(value_name = "DESTINATION")]
    pub destination: String,

    /// Total number of requests to issue
    #[arg(value_name = "COUNT")]
    pub count: String,

    /// Maximum number of requests in flight at once
    #[arg(value_name = "N_CONCURRENT")]
    pub concurrency: String,

    /// TCP connect timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Timeout for sending the request and reading the full response, in milliseconds
    #[arg(long, value_name = "MS")]
    pub response_timeout: Option<u64>,

    /// Largest accepted response; bigger responses count as failures
    #[arg(long, value_name = "BYTES")]
    pub max_response_bytes: Option<usize>,

    /// What to print for non-200 responses: drop (nothing) or report (-2)
    #[arg(long = "non-success", value_name = "POLICY")]
    pub non_success: Option<String>,

    /// Outcome line format: plain or json
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Print a count summary to stderr when the run finishes
    #[arg(long)]
    pub summary: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate option values that clap leaves as free text
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref policy) = self.non_success {
            if policy.parse::<crate::types::NonSuccessPolicy>().is_err() {
                return Err(format!("Invalid --non-success value '{}' (expected drop or report)", policy));
            }
        }

        if let Some(ref format) = self.format {
            if format.parse::<crate::types::OutputFormat>().is_err() {
                return Err(format!("Invalid --format value '{}' (expected plain or json)", format));
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }
}

/// Colors only make sense on an interactive stderr
pub fn supports_color() -> bool {
    use std::io::IsTerminal;
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}
