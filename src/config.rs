//! Benchmark configuration.
//!
//! Everything the original hardcoded as process-wide constants (record
//! count, worker count, deadline, commit granularity) is an explicit,
//! validated field here.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::BenchError;

#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Total number of records to insert and look up.
    pub total_records: u64,
    /// Number of worker threads per phase.
    pub worker_count: usize,
    /// Wall-clock bound on the select phase.
    pub deadline: Duration,
    /// Records per write transaction inside a worker's chunk.
    pub commit_granularity: usize,
    /// Create a secondary index on `email` before inserting.
    pub with_index: bool,
    /// Lookups between two progress reports from a reader worker.
    pub progress_interval: u64,
    /// Bound on the insert phase's wait for the next worker report; trips
    /// if a worker never signals completion.
    pub liveness_timeout: Duration,
    /// After deadline expiry, also collect progress increments that were
    /// already queued in the channel. Off by default: the slight undercount
    /// is the accepted tradeoff for not instrumenting in-flight lookups.
    pub drain_after_deadline: bool,
    /// Primary database file; `-wal`/`-shm` side files live next to it.
    pub db_path: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            total_records: 1_000_000,
            worker_count: num_cpus::get().max(1),
            deadline: Duration::from_secs(10),
            commit_granularity: 1_000,
            with_index: false,
            progress_interval: 1_000,
            liveness_timeout: Duration::from_secs(30),
            drain_after_deadline: false,
            db_path: PathBuf::from("benchmark.db"),
        }
    }
}

impl BenchConfig {
    /// Small configuration for tests and smoke runs.
    pub fn quick() -> Self {
        Self {
            total_records: 10_000,
            worker_count: 4,
            commit_granularity: 500,
            progress_interval: 100,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.total_records == 0 {
            return Err(BenchError::InvalidConfig(
                "total_records must be positive".into(),
            ));
        }
        if self.worker_count == 0 {
            return Err(BenchError::InvalidConfig(
                "worker_count must be positive".into(),
            ));
        }
        if self.deadline.is_zero() {
            return Err(BenchError::InvalidConfig(
                "deadline must be positive".into(),
            ));
        }
        if self.commit_granularity == 0 {
            return Err(BenchError::InvalidConfig(
                "commit_granularity must be positive".into(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(BenchError::InvalidConfig(
                "progress_interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(BenchConfig::default().validate().is_ok());
        assert!(BenchConfig::quick().validate().is_ok());
    }

    #[test]
    fn zero_fields_are_rejected() {
        for broken in [
            BenchConfig {
                total_records: 0,
                ..BenchConfig::quick()
            },
            BenchConfig {
                worker_count: 0,
                ..BenchConfig::quick()
            },
            BenchConfig {
                deadline: Duration::ZERO,
                ..BenchConfig::quick()
            },
            BenchConfig {
                commit_granularity: 0,
                ..BenchConfig::quick()
            },
            BenchConfig {
                progress_interval: 0,
                ..BenchConfig::quick()
            },
        ] {
            assert!(matches!(
                broken.validate(),
                Err(BenchError::InvalidConfig(_))
            ));
        }
    }
}
