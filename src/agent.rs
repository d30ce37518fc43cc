//! Per-cycle pipeline and the drift-corrected scheduling loop.
//!
//! Every I/O step inside a cycle is individually non-fatal: upstream scrape
//! failure substitutes an empty payload, sampling failure substitutes an
//! empty record set, delivery failure is logged. Nothing propagates out of
//! [`run_cycle`], so the loop can never crash or stall on a bad cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::collector::{ProcessSampler, ProcessSource};
use crate::config::AgentConfig;
use crate::exposition;
use crate::push::{Batch, Sink};
use crate::scrape::Upstream;

/// Granularity of the shutdown-aware sleep between cycles.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Process-wide agent state, constructed once at startup.
pub struct AgentState {
    pub config: AgentConfig,
}

impl AgentState {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

/// Runs one collect-render-push cycle. Never fails and never panics on I/O.
///
/// Returns `true` when the batch was delivered, for logging and tests only;
/// the scheduler ignores the outcome.
pub fn run_cycle<S, U, K>(
    state: &AgentState,
    sampler: &ProcessSampler<S>,
    upstream: &U,
    sink: &K,
) -> bool
where
    S: ProcessSource,
    U: Upstream,
    K: Sink,
{
    let upstream_text = match upstream.fetch() {
        Ok(text) => text,
        Err(e) => {
            warn!("{}, pushing local metrics only", e);
            String::new()
        }
    };

    let records = match sampler.sample() {
        Ok(records) => records,
        Err(e) => {
            warn!("{}, pushing without process metrics", e);
            Vec::new()
        }
    };

    let local_text = exposition::render(&records);
    let batch = Batch::compose(&upstream_text, &local_text, &state.config);

    match sink.deliver(&batch) {
        Ok(()) => {
            info!(
                "pushed metric batch ({} processes, {} bytes)",
                records.len(),
                batch.metrics_str.len()
            );
            true
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

/// Nominal fire time of cycle `n`: `origin + n * period`.
///
/// Deadlines are anchored to the loop origin, not to the previous cycle's
/// completion, so slow cycles do not accumulate drift. Offsets that would
/// overflow the clock saturate to one period ahead instead of panicking.
pub fn cycle_deadline(origin: Instant, n: u64, period: Duration) -> Instant {
    let offset_nanos = period.as_nanos().saturating_mul(n as u128);
    let offset = Duration::from_nanos(u64::try_from(offset_nanos).unwrap_or(u64::MAX));
    origin.checked_add(offset).unwrap_or(origin + period)
}

/// Runs the push loop until `running` is cleared.
///
/// The first cycle fires immediately; cycle `n` fires at `origin + n * period`.
/// A cycle that overruns its slot starts the next cycle without sleeping, at
/// the unchanged nominal cadence.
pub fn run<S, U, K>(
    state: &AgentState,
    sampler: &ProcessSampler<S>,
    upstream: &U,
    sink: &K,
    running: &AtomicBool,
) where
    S: ProcessSource,
    U: Upstream,
    K: Sink,
{
    let period = Duration::from_secs(state.config.period_seconds);
    let origin = Instant::now();
    let mut cycle: u64 = 0;

    while running.load(Ordering::SeqCst) {
        run_cycle(state, sampler, upstream, sink);
        cycle += 1;

        // Sleep in slices so a shutdown signal is observed promptly.
        let deadline = cycle_deadline(origin, cycle, period);
        while running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockProcessSource;
    use crate::push::DeliveryError;
    use crate::scrape::ScrapeError;
    use std::cell::RefCell;

    struct FixedUpstream(&'static str);

    impl Upstream for FixedUpstream {
        fn fetch(&self) -> Result<String, ScrapeError> {
            Ok(self.0.to_string())
        }
    }

    struct DownUpstream;

    impl Upstream for DownUpstream {
        fn fetch(&self) -> Result<String, ScrapeError> {
            Err(ScrapeError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ))
        }
    }

    /// Sink that records every delivered batch.
    #[derive(Default)]
    struct RecordingSink {
        delivered: RefCell<Vec<Batch>>,
    }

    impl Sink for RecordingSink {
        fn deliver(&self, batch: &Batch) -> Result<(), DeliveryError> {
            self.delivered.borrow_mut().push(batch.clone());
            Ok(())
        }
    }

    /// Sink that fails every delivery with a server error.
    struct FailingSink;

    impl Sink for FailingSink {
        fn deliver(&self, _batch: &Batch) -> Result<(), DeliveryError> {
            Err(DeliveryError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }

    fn state() -> AgentState {
        AgentState::new(AgentConfig {
            remote_endpoint: "http://collector:8080/push".to_string(),
            local_scrape_endpoint: "http://localhost:9100/metrics".to_string(),
            device_ip: "10.1.2.3".to_string(),
            period_seconds: 60,
            program_label: "edge-node".to_string(),
            http_timeout: Duration::from_secs(10),
        })
    }

    #[test]
    fn cycle_merges_upstream_and_local_text() {
        let sampler = ProcessSampler::new(MockProcessSource::typical_system());
        let sink = RecordingSink::default();
        let delivered = run_cycle(
            &state(),
            &sampler,
            &FixedUpstream("node_load1 0.5\n"),
            &sink,
        );
        assert!(delivered);

        let batches = sink.delivered.borrow();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].metrics_str.starts_with("node_load1 0.5\n"));
        assert!(batches[0].metrics_str.contains("# TYPE process_cpu gauge"));
        assert!(batches[0].metrics_str.contains("process_mem{user=\"root\""));
    }

    #[test]
    fn upstream_failure_still_pushes_local_metrics() {
        let sampler = ProcessSampler::new(MockProcessSource::typical_system());
        let sink = RecordingSink::default();
        assert!(run_cycle(&state(), &sampler, &DownUpstream, &sink));

        let batches = sink.delivered.borrow();
        assert!(batches[0].metrics_str.starts_with("# HELP process_cpu"));
    }

    #[test]
    fn total_failure_still_pushes_empty_families() {
        let sampler = ProcessSampler::new(MockProcessSource::failing());
        let sink = RecordingSink::default();
        assert!(run_cycle(&state(), &sampler, &DownUpstream, &sink));

        let batches = sink.delivered.borrow();
        // Best-effort always-push: headers only, no sample lines.
        assert_eq!(batches[0].metrics_str.lines().count(), 4);
    }

    #[test]
    fn delivery_failure_does_not_propagate() {
        let sampler = ProcessSampler::new(MockProcessSource::typical_system());
        assert!(!run_cycle(
            &state(),
            &sampler,
            &FixedUpstream(""),
            &FailingSink
        ));
    }

    #[test]
    fn deadlines_anchor_to_origin_not_completion() {
        let origin = Instant::now();
        let period = Duration::from_secs(60);
        assert_eq!(cycle_deadline(origin, 0, period), origin);
        assert_eq!(
            cycle_deadline(origin, 1, period) - origin,
            Duration::from_secs(60)
        );
        // A 5-second overrun of cycle 0 does not move cycle 2's deadline.
        assert_eq!(
            cycle_deadline(origin, 2, period) - origin,
            Duration::from_secs(120)
        );
    }

    #[test]
    fn absurd_cycle_counts_saturate_without_panic() {
        let origin = Instant::now();
        let period = Duration::from_secs(60);
        let deadline = cycle_deadline(origin, u64::MAX, period);
        assert!(deadline >= origin + period);
    }

    #[test]
    fn loop_stops_when_flag_cleared() {
        let sampler = ProcessSampler::new(MockProcessSource::typical_system());
        let sink = RecordingSink::default();
        let running = AtomicBool::new(false);
        run(
            &state(),
            &sampler,
            &FixedUpstream(""),
            &sink,
            &running,
        );
        assert!(sink.delivered.borrow().is_empty());
    }
}
