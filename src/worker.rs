//! Worker pool: isolated execution units that either generate record
//! chunks or perform point lookups over an assigned range.
//!
//! Workers share no memory with the orchestrator or each other. Each
//! receives exactly one [`WorkerTask`] at spawn time and reports back
//! through a shared many-to-one `mpsc` channel: zero or more
//! [`WorkerReport::Progress`] increments, followed by exactly one terminal
//! [`WorkerReport::Done`] (or [`WorkerReport::Failed`]). Arrival order
//! across different workers is unspecified.
//!
//! Cancellation is advisory: [`WorkerHandle::terminate`] raises a flag that
//! reader workers check between lookups. An already-issued lookup is not
//! interrupted mid-flight; reads have no persistent side effects, so no
//! rollback is needed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::error::BenchError;
use crate::partition::WorkRange;
use crate::record::{self, Record};

/// The single unit of work sent to a worker at spawn time.
#[derive(Debug, Clone)]
pub enum WorkerTask {
    /// Generate synthetic records for the range and send them back in one
    /// chunk.
    Generate { range: WorkRange },
    /// Open a private read-only connection and perform one point lookup per
    /// record index in the range, reporting progress every
    /// `progress_interval` lookups.
    Select {
        range: WorkRange,
        db_path: PathBuf,
        progress_interval: u64,
    },
}

/// A message from a worker to the orchestrator.
#[derive(Debug)]
pub enum WorkerReport {
    /// The full generated chunk for an insert-phase worker's range.
    Records(Vec<Record>),
    /// A count of lookups completed since the previous report.
    Progress(u64),
    /// Terminal signal: the task ran to completion (or was cancelled).
    Done,
    /// Terminal signal: the task failed.
    Failed(String),
}

/// Handle for one spawned worker.
pub struct WorkerHandle {
    id: usize,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Ask the worker to stop at its next cancellation check. Idempotent
    /// and safe to call after the worker has already finished.
    pub fn terminate(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Reap the worker thread. A worker that has sent its terminal report
    /// exits promptly, so this does not block meaningfully.
    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("worker {} panicked", self.id);
            }
        }
    }

    /// Drop the join handle without waiting. The thread exits on its own
    /// once it observes the cancellation flag.
    fn detach(&mut self) {
        self.thread.take();
    }
}

/// Spawns, receives from, and tears down a fixed set of workers for one
/// benchmark phase.
pub struct WorkerPool {
    tx: Sender<(usize, WorkerReport)>,
    rx: Receiver<(usize, WorkerReport)>,
    workers: Vec<WorkerHandle>,
}

impl WorkerPool {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            workers: Vec::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Spawn one worker for the given task.
    pub fn spawn(&mut self, task: WorkerTask) -> Result<(), BenchError> {
        self.spawn_with(move |id, tx, cancel| worker_main(id, task, tx, cancel))
    }

    /// Spawn a worker running an arbitrary body. Used by `spawn` and, in
    /// tests, to wire up misbehaving workers directly.
    pub(crate) fn spawn_with<F>(&mut self, body: F) -> Result<(), BenchError>
    where
        F: FnOnce(usize, Sender<(usize, WorkerReport)>, Arc<AtomicBool>) + Send + 'static,
    {
        let id = self.workers.len();
        let tx = self.tx.clone();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let handle = thread::Builder::new()
            .name(format!("bench-worker-{id}"))
            .spawn(move || body(id, tx, cancel_flag))
            .map_err(BenchError::Spawn)?;

        self.workers.push(WorkerHandle {
            id,
            cancel,
            thread: Some(handle),
        });
        Ok(())
    }

    /// Wait up to `timeout` for the next report from any worker.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<(usize, WorkerReport), RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Collect progress increments already queued in the channel without
    /// blocking. Terminal and record reports are discarded.
    pub fn drain_progress(&self) -> Vec<u64> {
        let mut increments = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok((_, WorkerReport::Progress(n))) => increments.push(n),
                Ok(_) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        increments
    }

    /// Raise every worker's cancellation flag. Idempotent.
    pub fn terminate_all(&self) {
        for worker in &self.workers {
            worker.terminate();
        }
    }

    /// Reap all worker threads. Call only after every worker has sent its
    /// terminal report.
    pub fn join_all(&mut self) {
        for worker in &mut self.workers {
            worker.join();
        }
    }

    /// Detach all worker threads; they exit once they observe the
    /// cancellation flag.
    pub fn detach_all(&mut self) {
        for worker in &mut self.workers {
            worker.detach();
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Never joins here: a stalled worker must not be able to hang the
        // orchestrator on teardown.
        self.terminate_all();
        self.detach_all();
    }
}

// ---------------------------------------------------------------------------
//  Worker thread body
// ---------------------------------------------------------------------------

fn worker_main(
    id: usize,
    task: WorkerTask,
    tx: Sender<(usize, WorkerReport)>,
    cancel: Arc<AtomicBool>,
) {
    let outcome = match task {
        WorkerTask::Generate { range } => run_generate(id, range, &tx),
        WorkerTask::Select {
            range,
            db_path,
            progress_interval,
        } => run_select(id, range, &db_path, progress_interval, &tx, &cancel),
    };

    let terminal = match outcome {
        Ok(()) => WorkerReport::Done,
        Err(e) => WorkerReport::Failed(e.to_string()),
    };
    // The orchestrator may already have resolved and dropped the receiver.
    let _ = tx.send((id, terminal));
}

fn run_generate(
    id: usize,
    range: WorkRange,
    tx: &Sender<(usize, WorkerReport)>,
) -> Result<(), BenchError> {
    let records = record::generate_range(range);
    tx.send((id, WorkerReport::Records(records)))
        .map_err(|_| BenchError::ChannelClosed)?;
    Ok(())
}

fn run_select(
    id: usize,
    range: WorkRange,
    db_path: &Path,
    progress_interval: u64,
    tx: &Sender<(usize, WorkerReport)>,
    cancel: &AtomicBool,
) -> Result<(), BenchError> {
    // Private read-only connection: the orchestrator's write handle is never
    // shared with workers.
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let mut stmt = conn.prepare("SELECT id FROM users WHERE email = ?1")?;

    let mut pending = 0u64;
    for index in range.indices() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let email = record::email_for(index);
        let _id: Option<i64> = stmt.query_row(params![email], |row| row.get(0)).optional()?;
        pending += 1;
        if pending == progress_interval {
            tx.send((id, WorkerReport::Progress(pending)))
                .map_err(|_| BenchError::ChannelClosed)?;
            pending = 0;
        }
    }

    if pending > 0 {
        let _ = tx.send((id, WorkerReport::Progress(pending)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
//  Unit Tests
// ---------------------------------------------------------------------------
