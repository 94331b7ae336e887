//! Raw HTTP prober: one TCP round trip per probe

pub mod timeouts;


pub use timeouts::ProbeTimeouts;

use crate::{
    models::{Config, ProbeOutcome},
    types::{Destination, FailureKind},
};
use async_trait::async_trait;
use std::time::Instant;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

/// Exact bytes written on every connection: request line and an empty header block
pub const REQUEST_BYTES: &[u8] = b"GET / HTTP/1.1\r\n\r\n";

/// Prefix that marks a response as successful
pub const SUCCESS_PREFIX: &str = "HTTP/1.1 200 OK";

/// A single-shot probe against a destination
///
/// Implementations never return an error: every failure is folded into
/// [`ProbeOutcome::Failure`] so one bad probe cannot disturb its wave.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, destination: Destination) -> ProbeOutcome;
}

/// Limits applied to each probe exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub timeouts: ProbeTimeouts,
    /// Responses longer than this fail with [`FailureKind::TooLarge`]
    pub max_response_bytes: usize,
    /// Size of each socket read
    pub read_chunk_size: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeouts: ProbeTimeouts::default(),
            max_response_bytes: crate::defaults::DEFAULT_MAX_RESPONSE_BYTES,
            read_chunk_size: crate::defaults::DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl From<&Config> for ProbeSettings {
    fn from(config: &Config) -> Self {
        Self {
            timeouts: ProbeTimeouts::from_config(config),
            max_response_bytes: config.max_response_bytes,
            read_chunk_size: config.read_chunk_size,
        }
    }
}

/// Failure raised inside the exchange, before classification
#[derive(Debug)]
struct ProbeFailure {
    kind: FailureKind,
    detail: String,
}

impl ProbeFailure {
    fn new<S: Into<String>>(kind: FailureKind, detail: S) -> Self {
        Self { kind, detail: detail.into() }
    }
}

impl From<ProbeFailure> for ProbeOutcome {
    fn from(failure: ProbeFailure) -> Self {
        ProbeOutcome::failure(failure.kind, failure.detail)
    }
}

/// Prober that opens a fresh TCP connection for every probe
#[derive(Debug, Clone, Default)]
pub struct TcpProber {
    settings: ProbeSettings,
}

impl TcpProber {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ProbeSettings::from(config))
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Send the request and collect bytes until the peer closes
    async fn exchange(&self, stream: &mut TcpStream) -> Result<Vec<u8>, ProbeFailure> {
        stream
            .write_all(REQUEST_BYTES)
            .await
            .map_err(|e| ProbeFailure::new(FailureKind::Io, format!("write failed: {}", e)))?;

        let mut response = Vec::new();
        let mut chunk = vec![0u8; self.settings.read_chunk_size];

        loop {
            let read = stream
                .read(&mut chunk)
                .await
                .map_err(|e| ProbeFailure::new(FailureKind::Io, format!("read failed: {}", e)))?;

            if read == 0 {
                break;
            }

            if response.len() + read > self.settings.max_response_bytes {
                return Err(ProbeFailure::new(
                    FailureKind::TooLarge,
                    format!("response exceeded {} bytes", self.settings.max_response_bytes),
                ));
            }

            response.extend_from_slice(&chunk[..read]);
        }

        Ok(response)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, destination: Destination) -> ProbeOutcome {
        let timeouts = self.settings.timeouts;
        let start = Instant::now();

        let connect = timeout(timeouts.connect, TcpStream::connect(destination.socket_addr())).await;
        let mut stream = match connect {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return ProbeOutcome::failure(
                    FailureKind::Connect,
                    format!("connect to {} failed: {}", destination, e),
                )
            }
            Err(_) => {
                return ProbeOutcome::failure(
                    FailureKind::Timeout,
                    format!("connect to {} timed out after {}ms", destination, timeouts.connect.as_millis()),
                )
            }
        };

        // The stream is dropped (and the socket closed) on every return below
        let response = match timeout(timeouts.response, self.exchange(&mut stream)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(failure)) => return failure.into(),
            Err(_) => {
                return ProbeOutcome::failure(
                    FailureKind::Timeout,
                    format!("no complete response within {}ms", timeouts.response.as_millis()),
                )
            }
        };

        classify_response(&response, start)
    }
}

/// Decode a full response and decide its outcome
///
/// Latency is taken at classification time, measured from `start`.
pub fn classify_response(bytes: &[u8], start: Instant) -> ProbeOutcome {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            return ProbeOutcome::failure(FailureKind::Decode, format!("response is not valid UTF-8: {}", e))
        }
    };

    if text.starts_with(SUCCESS_PREFIX) {
        ProbeOutcome::success(start.elapsed())
    } else {
        let status_line = text.lines().next().unwrap_or_default();
        ProbeOutcome::non_success(start.elapsed(), status_line)
    }
}
