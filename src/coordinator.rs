//! Time-bounded read phase: races "all reader workers done" against a
//! wall-clock deadline, aggregating streamed progress increments.
//!
//! Whichever resolves first decides the outcome. On deadline expiry the
//! stop is soft: workers are told to terminate, in-flight lookups finish on
//! their own, and no progress received after the termination point counts
//! toward the total. The resulting undercount (work done between a
//! worker's last report and termination) is the accepted default;
//! `drain_after_deadline` offers the stricter variant.

use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::partition::WorkRange;
use crate::worker::{WorkerPool, WorkerReport, WorkerTask};

/// Folds concurrently-produced progress increments into one running total.
///
/// Mutated only on the orchestrator thread — delivery is serialized through
/// the pool's single inbox, so no locking is needed. Only the sum matters;
/// arrival order does not.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    total: u64,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, increment: u64) {
        self.total += increment;
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Which branch of the deadline race resolved first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadResolution {
    AllCompleted,
    TimedOut,
}

/// Result of one read phase.
#[derive(Debug, Clone)]
pub struct ReadPhaseOutcome {
    pub elapsed: Duration,
    /// Sum of all progress increments received before resolution. May
    /// undercount true completed work on timeout.
    pub processed: u64,
    pub resolution: ReadResolution,
}

impl ReadPhaseOutcome {
    pub fn timed_out(&self) -> bool {
        self.resolution == ReadResolution::TimedOut
    }
}

/// Spawn one reader worker per non-empty range and run the deadline race.
pub fn run_read_phase(
    config: &BenchConfig,
    ranges: &[WorkRange],
    db_path: &Path,
) -> Result<ReadPhaseOutcome, BenchError> {
    let mut pool = WorkerPool::new();
    for range in ranges.iter().filter(|r| !r.is_empty()) {
        pool.spawn(WorkerTask::Select {
            range: *range,
            db_path: db_path.to_path_buf(),
            progress_interval: config.progress_interval,
        })?;
    }
    run_pool(&mut pool, config.deadline, config.drain_after_deadline)
}

/// Drive an already-spawned pool of reader workers to resolution.
pub(crate) fn run_pool(
    pool: &mut WorkerPool,
    deadline: Duration,
    drain_after_deadline: bool,
) -> Result<ReadPhaseOutcome, BenchError> {
    let start = Instant::now();
    let cutoff = start + deadline;
    let mut aggregator = ProgressAggregator::new();
    let total_workers = pool.worker_count();
    let mut finished = 0usize;

    let resolution = loop {
        if finished == total_workers {
            break ReadResolution::AllCompleted;
        }
        let remaining = cutoff.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break ReadResolution::TimedOut;
        }
        match pool.recv_timeout(remaining) {
            Ok((_, WorkerReport::Progress(n))) => aggregator.add(n),
            Ok((_, WorkerReport::Done)) => finished += 1,
            Ok((id, WorkerReport::Failed(message))) => {
                // One failed reader must not sink the phase; its range is
                // simply missing from the processed count.
                log::error!("read worker {id} failed: {message}");
                finished += 1;
            }
            Ok((id, WorkerReport::Records(_))) => {
                log::warn!("unexpected record chunk from read worker {id}");
            }
            Err(RecvTimeoutError::Timeout) => break ReadResolution::TimedOut,
            Err(RecvTimeoutError::Disconnected) => return Err(BenchError::ChannelClosed),
        }
    };

    pool.terminate_all();
    match resolution {
        ReadResolution::AllCompleted => pool.join_all(),
        ReadResolution::TimedOut => {
            if drain_after_deadline {
                for increment in pool.drain_progress() {
                    aggregator.add(increment);
                }
            }
            // Workers exit at their next cancellation check; never wait on
            // one that may not get there.
            pool.detach_all();
        }
    }

    Ok(ReadPhaseOutcome {
        elapsed: start.elapsed(),
        processed: aggregator.total(),
        resolution,
    })
}

// ---------------------------------------------------------------------------
//  Unit Tests
// ---------------------------------------------------------------------------
