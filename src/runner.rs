//! Benchmark runner: sequences schema reset, optional index, insert phase,
//! row-count verification, the time-boxed select phase, and artifact
//! cleanup. Owns the single write connection for the whole run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Instant;

use rusqlite::Connection;

use crate::config::BenchConfig;
use crate::coordinator::run_read_phase;
use crate::error::BenchError;
use crate::partition::{partition, WorkRange};
use crate::report::{BenchmarkResult, ComparisonReport};
use crate::worker::{WorkerPool, WorkerReport, WorkerTask};
use crate::writer::BatchedTransactionWriter;

pub struct BenchmarkRunner {
    config: BenchConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run one full benchmark: insert phase (no deadline) followed by the
    /// time-boxed select phase. Does not clean up artifacts; call
    /// [`cleanup`](Self::cleanup) when done.
    pub fn run(&self) -> Result<BenchmarkResult, BenchError> {
        let cfg = &self.config;
        cfg.validate()?;

        log::info!(
            "benchmark: {} records, {} workers, granularity {}, index: {}",
            cfg.total_records,
            cfg.worker_count,
            cfg.commit_granularity,
            cfg.with_index
        );

        let mut conn = Connection::open(&cfg.db_path)?;
        configure_connection(&conn)?;
        reset_schema(&conn)?;
        if cfg.with_index {
            create_email_index(&conn)?;
        }

        let ranges = partition(cfg.total_records, cfg.worker_count)?;

        let insert_start = Instant::now();
        let inserted = run_insert_phase(&mut conn, &ranges, cfg)?;
        let insert_elapsed = insert_start.elapsed();
        log::info!(
            "insert phase: {} records in {:.2?}",
            inserted,
            insert_elapsed
        );

        let row_count = count_rows(&conn)?;
        if row_count != cfg.total_records {
            log::warn!(
                "row count mismatch: expected {}, found {}",
                cfg.total_records,
                row_count
            );
        }

        let read = run_read_phase(cfg, &ranges, &cfg.db_path)?;
        log::info!(
            "select phase: {} lookups in {:.2?} (timed out: {})",
            read.processed,
            read.elapsed,
            read.timed_out()
        );

        Ok(BenchmarkResult {
            total_records: cfg.total_records,
            worker_count: cfg.worker_count,
            with_index: cfg.with_index,
            insert_ms: BenchmarkResult::ms(insert_elapsed),
            row_count,
            select_ms: BenchmarkResult::ms(read.elapsed),
            processed_count: read.processed,
            select_timed_out: read.timed_out(),
        })
    }

    /// Run the benchmark twice against a fresh schema — without, then with
    /// the secondary email index — and report the relative speedup.
    pub fn run_index_comparison(&self) -> Result<ComparisonReport, BenchError> {
        let baseline = BenchmarkRunner::new(BenchConfig {
            with_index: false,
            ..self.config.clone()
        })
        .run()?;

        let indexed = BenchmarkRunner::new(BenchConfig {
            with_index: true,
            ..self.config.clone()
        })
        .run()?;

        Ok(ComparisonReport { baseline, indexed })
    }

    /// Remove the database file and its WAL side files. Failures are
    /// logged and swallowed; they do not affect the benchmark numbers.
    pub fn cleanup(&self) {
        cleanup_artifacts(&self.config.db_path);
    }
}

/// Insert phase: one generator worker per non-empty range; the
/// orchestrator commits each arriving chunk through the single write
/// connection. The await-all is bounded by the liveness timeout so a
/// silent worker cannot hang the run.
fn run_insert_phase(
    conn: &mut Connection,
    ranges: &[WorkRange],
    config: &BenchConfig,
) -> Result<u64, BenchError> {
    let mut pool = WorkerPool::new();
    for range in ranges.iter().filter(|r| !r.is_empty()) {
        pool.spawn(WorkerTask::Generate { range: *range })?;
    }

    let mut writer = BatchedTransactionWriter::new(conn, config.commit_granularity);
    let total_workers = pool.worker_count();
    let mut finished = 0usize;
    let mut inserted = 0u64;

    while finished < total_workers {
        match pool.recv_timeout(config.liveness_timeout) {
            Ok((_, WorkerReport::Records(records))) => {
                inserted += writer.write_chunk(&records)? as u64;
            }
            Ok((_, WorkerReport::Done)) => finished += 1,
            Ok((id, WorkerReport::Failed(message))) => {
                return Err(BenchError::WorkerFailed { id, message });
            }
            Ok((id, WorkerReport::Progress(_))) => {
                log::warn!("unexpected progress report from generator worker {id}");
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(BenchError::WorkerStalled(config.liveness_timeout));
            }
            Err(RecvTimeoutError::Disconnected) => return Err(BenchError::ChannelClosed),
        }
    }

    pool.join_all();
    Ok(inserted)
}

/// WAL-mode pragmas for throughput, as in the original benchmark's setup.
pub fn configure_connection(conn: &Connection) -> Result<(), BenchError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = OFF;
         PRAGMA cache_size = -65536;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}

/// Drop and recreate the benchmark table.
pub fn reset_schema(conn: &Connection) -> Result<(), BenchError> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS users;
         CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL);",
    )?;
    Ok(())
}

/// Secondary index used by the point-lookup phase; without it every email
/// lookup is a full table scan.
pub fn create_email_index(conn: &Connection) -> Result<(), BenchError> {
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_users_email ON users (email);")?;
    Ok(())
}

pub fn count_rows(conn: &Connection) -> Result<u64, BenchError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// The primary database file plus the `-wal`/`-shm` side files that
/// accompany WAL mode.
fn artifact_paths(db_path: &Path) -> [PathBuf; 3] {
    let side = |suffix: &str| {
        let mut name = db_path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    };
    [db_path.to_path_buf(), side("-wal"), side("-shm")]
}

/// Delete all persisted artifacts. Missing files are fine; other failures
/// are logged and swallowed.
pub fn cleanup_artifacts(db_path: &Path) {
    for path in artifact_paths(db_path) {
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("failed to remove {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_cover_wal_side_files() {
        let [db, wal, shm] = artifact_paths(Path::new("/tmp/bench.db"));
        assert_eq!(db, Path::new("/tmp/bench.db"));
        assert_eq!(wal, Path::new("/tmp/bench.db-wal"));
        assert_eq!(shm, Path::new("/tmp/bench.db-shm"));
    }

    #[test]
    fn cleanup_of_missing_artifacts_is_silent() {
        cleanup_artifacts(Path::new("/tmp/sqlite-pool-bench-does-not-exist.db"));
    }

    #[test]
    fn schema_reset_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        reset_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (name, email) VALUES ('User0', 'user0@example.com')",
            [],
        )
        .unwrap();
        reset_schema(&conn).unwrap();
        assert_eq!(count_rows(&conn).unwrap(), 0);
    }

    #[test]
    fn invalid_config_aborts_before_touching_the_database() {
        let runner = BenchmarkRunner::new(BenchConfig {
            worker_count: 0,
            db_path: PathBuf::from("/nonexistent-dir/never-created.db"),
            ..BenchConfig::quick()
        });
        assert!(matches!(
            runner.run(),
            Err(BenchError::InvalidConfig(_))
        ));
    }
}
