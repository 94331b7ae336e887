//! Destinations for probe outcomes

use crate::{error::Result, models::ProbeOutcome};

/// Receives each probe outcome as soon as its probe completes
///
/// Called from the scheduler's control flow, one outcome at a time.
pub trait OutcomeSink: Send + Sync {
    fn emit(&self, outcome: &ProbeOutcome) -> Result<()>;
}

#[cfg(test)]
pub(crate) use collecting::CollectingSink;
