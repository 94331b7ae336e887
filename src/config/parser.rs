//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    client::ProbeTimeouts,
    config::env::EnvManager,
    error::{AppError, Result},
    models::Config,
    types::Destination,
};

/// Configuration parser that combines CLI arguments with environment variables
///
/// Precedence, lowest first: built-in defaults, `.env` file, process
/// environment, command-line options.
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_run_shape(&mut config)?;
        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Parse without consulting `.env` or the process environment
    pub fn parse_cli_only(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();
        self.apply_run_shape(&mut config)?;
        self.apply_cli_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Destination, total count and concurrency from the positional arguments
    fn apply_run_shape(&self, config: &mut Config) -> Result<()> {
        config.destination = self.cli.destination.parse::<Destination>()?;
        config.total_requests = parse_non_negative(&self.cli.count, "COUNT")?;
        config.concurrency = parse_non_negative(&self.cli.concurrency, "N_CONCURRENT")?;
        Ok(())
    }

    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(ms) = self.cli.connect_timeout {
            config.connect_timeout_ms = ms;
        }

        if let Some(ms) = self.cli.response_timeout {
            config.response_timeout_ms = ms;
        }

        if let Some(bytes) = self.cli.max_response_bytes {
            config.max_response_bytes = bytes;
        }

        if let Some(ref policy) = self.cli.non_success {
            config.non_success_policy = policy.parse()?;
        }

        if let Some(ref format) = self.cli.format {
            config.output_format = format.parse()?;
        }

        if self.cli.summary {
            config.summary = true;
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        Ok(())
    }
}

/// Parse a count argument, rejecting negatives before any probing starts
pub fn parse_non_negative(value: &str, name: &str) -> Result<u64> {
    let parsed: i128 = value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{} must be an integer, got '{}'", name, value)))?;

    if parsed < 0 {
        return Err(AppError::config(format!("{} must be non-negative, got {}", name, parsed)));
    }

    u64::try_from(parsed)
        .map_err(|_| AppError::config(format!("{} is too large: {}", name, parsed)))
}

/// Convenience function to load configuration
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("Destination: {}\n", config.destination));
    summary.push_str(&format!("Requests: {} (concurrency {})\n", config.total_requests, config.concurrency));
    summary.push_str(&format!("Connect timeout: {}ms\n", config.connect_timeout_ms));
    summary.push_str(&format!("Response timeout: {}ms\n", config.response_timeout_ms));
    summary.push_str(&format!(
        "Longest probe: {}ms\n",
        ProbeTimeouts::from_config(config).worst_case().as_millis()
    ));
    summary.push_str(&format!("Max response: {} bytes\n", config.max_response_bytes));
    summary.push_str(&format!("Non-success responses: {}\n", config.non_success_policy));
    summary.push_str(&format!("Output format: {}\n", config.output_format));
    summary.push_str(&format!("Summary: {}\n", config.summary));

    summary
}
