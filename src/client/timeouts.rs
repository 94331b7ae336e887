//! Explicit per-probe time bounds
//!
//! Every probe phase that can block on the peer has its own bound, so the
//! worst-case duration of a wave is known up front instead of depending on
//! platform socket defaults.

use crate::models::Config;
use std::time::Duration;

/// Connect and response bounds for a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// Bound on establishing the TCP connection
    pub connect: Duration,
    /// Bound on writing the request and reading until the peer closes
    pub response: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect: crate::defaults::DEFAULT_CONNECT_TIMEOUT,
            response: crate::defaults::DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

impl ProbeTimeouts {
    pub fn new(connect: Duration, response: Duration) -> Self {
        Self { connect, response }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.connect_timeout(), config.response_timeout())
    }

    /// Longest a single probe can take; also the upper bound on one wave
    pub fn worst_case(&self) -> Duration {
        self.connect + self.response
    }
}
