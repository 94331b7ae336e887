//! Type definitions and aliases

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Probe target: an IPv4 address and a TCP port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl Destination {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Socket address used for the TCP connect
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl FromStr for Destination {
    type Err = AppError;

    /// Parse `ip:port`, where ip is a dotted quad and port is in 1..=65535
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let (ip, port) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ip), Some(port), None) => (ip, port),
            _ => {
                return Err(AppError::config(format!(
                    "Destination '{}' must have the form IP:PORT", s
                )))
            }
        };

        let ip = Ipv4Addr::from_str(ip)
            .map_err(|_| AppError::config(format!("Invalid IPv4 address '{}'", ip)))?;

        // Parse wide so that negative and oversized ports get a range error
        let port: i64 = port
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("Invalid port '{}'", port)))?;
        if port <= 0 || port > u16::MAX as i64 {
            return Err(AppError::config(format!(
                "Port {} is out of range (1-65535)", port
            )));
        }

        Ok(Self::new(ip, port as u16))
    }
}

/// What to do with a response that is not `HTTP/1.1 200 OK`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonSuccessPolicy {
    /// Emit nothing for the probe
    #[default]
    Drop,
    /// Emit a distinct non-success line
    Report,
}

impl FromStr for NonSuccessPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "report" => Ok(Self::Report),
            other => Err(AppError::parse(format!(
                "Invalid non-success policy '{}' (expected drop or report)", other
            ))),
        }
    }
}

impl fmt::Display for NonSuccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Report => write!(f, "report"),
        }
    }
}

/// Line format used for probe outcomes on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One bare number per line
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(AppError::parse(format!(
                "Invalid output format '{}' (expected plain or json)", other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Why a probe failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// TCP connect was refused, reset or unreachable
    Connect,
    /// Connect or response phase exceeded its bound
    Timeout,
    /// Write or read failed after connecting
    Io,
    /// Response bytes were not valid UTF-8
    Decode,
    /// Response exceeded the configured byte limit
    TooLarge,
    /// The probe task itself did not finish (panic)
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Io => "io",
            Self::Decode => "decode",
            Self::TooLarge => "too_large",
            Self::Aborted => "aborted",
        }
    }
}
