//! Error taxonomy for the benchmark.
//!
//! Phase-level failures (spawn, transfer, transaction) abort the whole run:
//! the benchmark numbers are only meaningful if record counts are exact.
//! Deadline expiry is *not* an error — it yields a partial processed count
//! and a normal result. Cleanup failures are logged and swallowed by the
//! runner.

use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// A configuration field failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker OS thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// A worker reported a failure instead of completing its task.
    #[error("worker {id} failed: {message}")]
    WorkerFailed { id: usize, message: String },

    /// The report channel closed before every worker sent a terminal signal.
    #[error("worker channel closed before all workers reported")]
    ChannelClosed,

    /// No worker report arrived within the liveness timeout. Guards the
    /// insert phase's await-all against a worker that never signals
    /// completion.
    #[error("no worker report within {0:?}; a worker appears to be stalled")]
    WorkerStalled(Duration),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
