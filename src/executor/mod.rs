//! Wave scheduler: bounded-concurrency probe execution
//!
//! A run of N probes with concurrency limit C is split into waves of at most
//! C probes. Each wave is launched as a group of parallel tasks and fully
//! joined before the next one starts, so:
//! - no more than C probes are ever in flight
//! - exactly N probes are issued, whatever their outcomes
//! - a failing probe never affects its siblings or later waves

pub mod plan;
pub mod sink;

pub use plan::{plan_waves, WavePlan};
pub use sink::OutcomeSink;
#[cfg(test)]
pub(crate) use sink::CollectingSink;

use crate::{
    client::{Prober, TcpProber},
    error::Result,
    logging::Logger,
    models::{Config, OutcomeCounts, ProbeOutcome, RunSummary, WaveReport},
    types::{Destination, FailureKind},
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Runs probes against one destination in barrier-separated waves
pub struct WaveScheduler {
    prober: Arc<dyn Prober>,
    destination: Destination,
    logger: Logger,
}

impl WaveScheduler {
    /// Create a scheduler around any prober implementation
    pub fn new(prober: Arc<dyn Prober>, destination: Destination) -> Self {
        Self {
            prober,
            destination,
            logger: Logger::new("SCHED"),
        }
    }

    /// Create a scheduler with a TCP prober and logger built from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            prober: Arc::new(TcpProber::from_config(config)),
            destination: config.destination,
            logger: Logger::with_config("SCHED", config),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Issue `total` probes, at most `concurrency` at a time
    ///
    /// Every outcome is handed to `sink` as its probe completes. Returns once
    /// all probes have finished. A sink error stops further waves but the
    /// current wave is still joined before returning it.
    pub async fn run(&self, total: u64, concurrency: u64, sink: &dyn OutcomeSink) -> Result<RunSummary> {
        let plan = WavePlan::new(total, concurrency)?;
        let started = Instant::now();
        let mut summary = RunSummary::default();

        self.logger.info(&format!("Starting {} probes against {}", total, self.destination))
            .field("total", total)
            .field("concurrency", concurrency)
            .field("waves", plan.wave_count())
            .log()
            .await;

        for (index, size) in plan.enumerate() {
            let wave = self.run_wave(index as u64, size, sink).await?;
            summary.add_wave(&wave);
        }

        summary.duration = started.elapsed();

        self.logger.info("Run complete")
            .summary(&summary)
            .log()
            .await;

        Ok(summary)
    }

    /// Launch one wave and wait for every probe in it
    async fn run_wave(&self, index: u64, size: u64, sink: &dyn OutcomeSink) -> Result<WaveReport> {
        let started = Instant::now();

        self.logger.debug(&format!("Launching wave {} with {} probes", index, size))
            .field("wave", index)
            .field("wave_size", size)
            .log()
            .await;

        let mut in_flight: FuturesUnordered<_> = (0..size)
            .map(|_| {
                let prober = self.prober.clone();
                let destination = self.destination;
                tokio::spawn(async move { prober.probe(destination).await })
            })
            .collect();

        let mut counts = OutcomeCounts::default();
        let mut sink_error = None;

        // Barrier: drain every task of this wave, in completion order
        while let Some(joined) = in_flight.next().await {
            let outcome = joined.unwrap_or_else(|e| {
                ProbeOutcome::failure(FailureKind::Aborted, format!("probe task did not complete: {}", e))
            });
            counts.record(&outcome);

            self.logger.trace("Probe finished")
                .field("wave", index)
                .outcome(&outcome)
                .log()
                .await;

            if sink_error.is_none() {
                if let Err(e) = sink.emit(&outcome) {
                    sink_error = Some(e);
                }
            }
        }

        let report = WaveReport {
            index,
            size,
            duration: started.elapsed(),
            counts,
        };

        self.logger.debug(&format!("Wave {} complete", index))
            .wave(&report)
            .log()
            .await;

        match sink_error {
            Some(e) => {
                self.logger.error("Outcome sink failed; stopping run")
                    .error_info(&e)
                    .log()
                    .await;
                Err(e)
            }
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::integration_tests::{closed_destination, spawn_server, Reply};
    use crate::error::AppError;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Prober that tracks how many probes overlap and which wave each began in
    #[derive(Default)]
    struct CountingProber {
        started: AtomicU64,
        in_flight: AtomicU64,
        max_in_flight: AtomicU64,
        delay_ms: u64,
        fail_every: Option<u64>,
    }

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, _destination: Destination) -> ProbeOutcome {
            let n = self.started.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.fail_every {
                Some(k) if n % k == 0 => ProbeOutcome::failure(FailureKind::Connect, "refused"),
                _ => ProbeOutcome::success(Duration::from_millis(self.delay_ms)),
            }
        }
    }

    /// Prober that panics, to exercise task failure handling
    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, _destination: Destination) -> ProbeOutcome {
            panic!("probe exploded");
        }
    }

    /// Sink that refuses every outcome
    struct BrokenSink;

    impl OutcomeSink for BrokenSink {
        fn emit(&self, _outcome: &ProbeOutcome) -> Result<()> {
            Err(AppError::io("broken pipe"))
        }
    }

    fn any_destination() -> Destination {
        Destination::new(Ipv4Addr::LOCALHOST, 9)
    }

    fn scheduler(prober: Arc<dyn Prober>) -> WaveScheduler {
        WaveScheduler::new(prober, any_destination())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_issues_exactly_n_probes() {
        let prober = Arc::new(CountingProber { delay_ms: 5, ..Default::default() });
        let sink = CollectingSink::new();

        let summary = scheduler(prober.clone()).run(10, 3, &sink).await.unwrap();

        assert_eq!(prober.started.load(Ordering::SeqCst), 10);
        assert_eq!(sink.len(), 10);
        assert_eq!(summary.issued, 10);
        assert_eq!(summary.waves, 4);
        assert_eq!(summary.largest_wave, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_never_exceeds_limit() {
        let prober = Arc::new(CountingProber { delay_ms: 20, ..Default::default() });
        let sink = CollectingSink::new();

        scheduler(prober.clone()).run(25, 4, &sink).await.unwrap();

        let max = prober.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 4, "saw {} probes in flight", max);
        assert!(max >= 1);
        assert_eq!(prober.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_total_runs_nothing() {
        let prober = Arc::new(CountingProber::default());
        let sink = CollectingSink::new();

        let summary = scheduler(prober.clone()).run(0, 5, &sink).await.unwrap();

        assert_eq!(prober.started.load(Ordering::SeqCst), 0);
        assert!(sink.is_empty());
        assert_eq!(summary.waves, 0);
    }

    #[tokio::test]
    async fn test_zero_concurrency_with_work_is_an_error() {
        let prober = Arc::new(CountingProber::default());
        let sink = CollectingSink::new();

        let result = scheduler(prober.clone()).run(3, 0, &sink).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(prober.started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_above_total_is_single_wave() {
        let prober = Arc::new(CountingProber::default());
        let sink = CollectingSink::new();

        let summary = scheduler(prober).run(5, 10, &sink).await.unwrap();

        assert_eq!(summary.waves, 1);
        assert_eq!(summary.largest_wave, 5);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let prober = Arc::new(CountingProber { fail_every: Some(2), ..Default::default() });
        let sink = CollectingSink::new();

        let summary = scheduler(prober).run(8, 3, &sink).await.unwrap();

        assert_eq!(summary.issued, 8);
        assert_eq!(summary.counts.failure, 4);
        assert_eq!(summary.counts.success, 4);
        assert_eq!(sink.outcomes().iter().filter(|o| o.is_failure()).count(), 4);
    }

    /// Run the scheduler with a counting prober and check the run-shape invariants
    fn check_run_shape(total: u64, concurrency: u64, fail_every: Option<u64>) -> std::result::Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .map_err(|e| e.to_string())?;

        let prober = Arc::new(CountingProber { delay_ms: 1, fail_every, ..Default::default() });
        let sink = CollectingSink::new();
        let summary = runtime
            .block_on(scheduler(prober.clone()).run(total, concurrency, &sink))
            .map_err(|e| e.to_string())?;

        let started = prober.started.load(Ordering::SeqCst);
        let max_in_flight = prober.max_in_flight.load(Ordering::SeqCst);
        let limit = concurrency.min(total);

        if started != total {
            return Err(format!("{}/{}: started {} probes", total, concurrency, started));
        }
        if sink.len() as u64 != total || summary.counts.total() != total {
            return Err(format!("{}/{}: {} outcomes emitted", total, concurrency, sink.len()));
        }
        if max_in_flight > limit {
            return Err(format!("{}/{}: {} probes in flight", total, concurrency, max_in_flight));
        }
        if summary.waves != total.div_ceil(concurrency) {
            return Err(format!("{}/{}: ran {} waves", total, concurrency, summary.waves));
        }
        Ok(())
    }

    #[test]
    fn test_run_shape_over_edge_grid() {
        let grid = [(0, 1), (0, 7), (1, 1), (5, 1), (3, 3), (4, 3), (5, 10), (12, 4), (13, 4), (1, 100)];
        for (total, concurrency) in grid {
            check_run_shape(total, concurrency, None).unwrap();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_scheduler_issues_n_within_limit(
            total in 0u64..40,
            concurrency in 1u64..12,
            fail_every in proptest::option::of(1u64..5),
        ) {
            let checked = check_run_shape(total, concurrency, fail_every);
            prop_assert!(checked.is_ok(), "{:?}", checked);
        }
    }

    #[tokio::test]
    async fn test_panicking_probe_counts_as_failure() {
        let sink = CollectingSink::new();

        let summary = scheduler(Arc::new(PanickingProber)).run(3, 2, &sink).await.unwrap();

        assert_eq!(summary.issued, 3);
        assert_eq!(summary.counts.failure, 3);
        assert!(sink.outcomes().iter().all(|o| matches!(
            o,
            ProbeOutcome::Failure { kind: FailureKind::Aborted, .. }
        )));
    }

    #[tokio::test]
    async fn test_sink_error_stops_after_current_wave() {
        let prober = Arc::new(CountingProber::default());

        let result = scheduler(prober.clone()).run(9, 3, &BrokenSink).await;

        assert!(matches!(result, Err(AppError::Io(_))));
        // The first wave is fully joined, later waves never start
        assert_eq!(prober.started.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_waves_are_strictly_sequential() {
        /// Records the (start, end) window of every probe
        struct WindowProber {
            windows: Mutex<Vec<(Instant, Instant)>>,
        }

        #[async_trait]
        impl Prober for WindowProber {
            async fn probe(&self, _destination: Destination) -> ProbeOutcome {
                let start = Instant::now();
                tokio::time::sleep(Duration::from_millis(10)).await;
                self.windows.lock().unwrap().push((start, Instant::now()));
                ProbeOutcome::success(start.elapsed())
            }
        }

        let prober = Arc::new(WindowProber { windows: Mutex::new(Vec::new()) });
        let sink = CollectingSink::new();
        scheduler(prober.clone()).run(6, 2, &sink).await.unwrap();

        let mut windows = prober.windows.lock().unwrap().clone();
        windows.sort_by_key(|(start, _)| *start);
        assert_eq!(windows.len(), 6);
        for wave in 1..3 {
            let previous_end = windows[wave * 2 - 2].1.max(windows[wave * 2 - 1].1);
            let next_start = windows[wave * 2].0.min(windows[wave * 2 + 1].0);
            assert!(next_start >= previous_end, "wave {} started before wave {} finished", wave, wave - 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ten_probes_against_ok_server() {
        let (destination, requests) = spawn_server(Reply::Bytes(b"HTTP/1.1 200 OK\r\n\r\n".to_vec())).await;
        let config = Config::new(destination, 10, 3);
        let sink = CollectingSink::new();

        let summary = WaveScheduler::from_config(&config).run(10, 3, &sink).await.unwrap();

        assert_eq!(summary.waves, 4);
        assert_eq!(summary.counts.success, 10);
        assert!(sink.outcomes().iter().all(|o| o.latency_ms().unwrap() >= 0.0));
        assert_eq!(requests.lock().unwrap().len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_five_probes_against_closed_port() {
        let destination = closed_destination().await;
        let config = Config::new(destination, 5, 10);
        let sink = CollectingSink::new();

        let summary = WaveScheduler::from_config(&config).run(5, 10, &sink).await.unwrap();

        assert_eq!(summary.waves, 1);
        assert_eq!(summary.counts.failure, 5);
        assert_eq!(sink.len(), 5);
    }

    #[tokio::test]
    async fn test_not_found_server_yields_non_success() {
        let (destination, _) = spawn_server(Reply::Bytes(b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec())).await;
        let config = Config::new(destination, 2, 2);
        let sink = CollectingSink::new();

        let summary = WaveScheduler::from_config(&config).run(2, 2, &sink).await.unwrap();

        assert_eq!(summary.counts.non_success, 2);
        assert_eq!(summary.counts.success, 0);
    }
}
