//! Partitioning of a request total into waves

use crate::error::{AppError, Result};

/// Iterator over wave sizes for a run
///
/// Owns the remaining-count state: each step yields `min(concurrency,
/// remaining)` and subtracts it, so the yielded sizes always sum to the
/// original total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavePlan {
    remaining: u64,
    concurrency: u64,
}

impl WavePlan {
    /// Build a plan, rejecting a zero limit when there is work to do
    pub fn new(total: u64, concurrency: u64) -> Result<Self> {
        if concurrency == 0 && total > 0 {
            return Err(AppError::config(format!(
                "Cannot schedule {} probes with a concurrency limit of 0", total
            )));
        }

        Ok(Self { remaining: total, concurrency })
    }

    /// Probes not yet assigned to a wave
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Number of waves left in the plan
    pub fn wave_count(&self) -> u64 {
        if self.remaining == 0 {
            0
        } else {
            self.remaining.div_ceil(self.concurrency)
        }
    }
}

impl Iterator for WavePlan {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }

        let size = self.concurrency.min(self.remaining);
        self.remaining -= size;
        Some(size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let waves = usize::try_from(self.wave_count()).unwrap_or(usize::MAX);
        (waves, Some(waves))
    }
}

/// Wave sizes for `total` probes under `concurrency`, e.g. 10 / 3 gives `[3, 3, 3, 1]`
pub fn plan_waves(total: u64, concurrency: u64) -> Result<Vec<u64>> {
    Ok(WavePlan::new(total, concurrency)?.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ten_by_three() {
        assert_eq!(plan_waves(10, 3).unwrap(), vec![3, 3, 3, 1]);
        assert_eq!(WavePlan::new(10, 3).unwrap().wave_count(), 4);
    }

    #[test]
    fn test_limit_at_or_above_total_is_one_wave() {
        assert_eq!(plan_waves(5, 10).unwrap(), vec![5]);
        assert_eq!(plan_waves(5, 5).unwrap(), vec![5]);
    }

    #[test]
    fn test_zero_total() {
        assert!(plan_waves(0, 4).unwrap().is_empty());
        assert!(plan_waves(0, 0).unwrap().is_empty());
        assert_eq!(WavePlan::new(0, 0).unwrap().wave_count(), 0);
    }

    #[test]
    fn test_zero_limit_with_work_is_rejected() {
        assert!(matches!(WavePlan::new(1, 0), Err(AppError::Config(_))));
    }

    #[test]
    fn test_remaining_decreases() {
        let mut plan = WavePlan::new(7, 3).unwrap();
        assert_eq!(plan.next(), Some(3));
        assert_eq!(plan.remaining(), 4);
        assert_eq!(plan.wave_count(), 2);
    }

    proptest! {
        /// Wave sizes always add up to the requested total
        #[test]
        fn waves_sum_to_total(total in 0u64..5_000, concurrency in 1u64..300) {
            let waves = plan_waves(total, concurrency).unwrap();
            prop_assert_eq!(waves.iter().sum::<u64>(), total);
        }

        /// No wave exceeds the limit and no wave is empty
        #[test]
        fn waves_respect_limit(total in 0u64..5_000, concurrency in 1u64..300) {
            let waves = plan_waves(total, concurrency).unwrap();
            prop_assert!(waves.iter().all(|&w| w >= 1 && w <= concurrency));
        }

        /// Only the final wave may be smaller than the limit
        #[test]
        fn only_last_wave_is_partial(total in 1u64..5_000, concurrency in 1u64..300) {
            let waves = plan_waves(total, concurrency).unwrap();
            let (last, full) = waves.split_last().unwrap();
            prop_assert!(full.iter().all(|&w| w == concurrency));
            prop_assert!(*last <= concurrency);
            prop_assert_eq!(waves.len() as u64, WavePlan::new(total, concurrency).unwrap().wave_count());
        }
    }
}
