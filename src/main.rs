//! Benchmark entry point.
//!
//! No command-line flags; configuration starts from [`BenchConfig::default`]
//! (worker count = available hardware concurrency) and can be overridden
//! through environment variables:
//!
//!   BENCH_TOTAL_RECORDS       total rows to insert and look up
//!   BENCH_WORKERS             worker threads per phase
//!   BENCH_DEADLINE_MS         select-phase deadline in milliseconds
//!   BENCH_COMMIT_GRANULARITY  records per write transaction
//!   BENCH_WITH_INDEX          1/true: create the email index
//!   BENCH_COMPARE_INDEX       1/true: run twice and report the speedup
//!   BENCH_DB_PATH             database file location
//!   BENCH_JSON                1/true: also emit the result as JSON
//!
//! Usage:
//!   cargo run --release
//!   BENCH_COMPARE_INDEX=1 BENCH_TOTAL_RECORDS=100000 cargo run --release

use std::env;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlite_pool_bench::config::BenchConfig;
use sqlite_pool_bench::logging;
use sqlite_pool_bench::report::{print_comparison, print_report};
use sqlite_pool_bench::runner::BenchmarkRunner;

fn main() {
    logging::init(log::LevelFilter::Info).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {e}. Exiting.");
        process::exit(1);
    });

    let config = match config_from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("bad configuration: {e:#}");
            process::exit(1);
        }
    };

    let runner = BenchmarkRunner::new(config);
    let outcome = execute(&runner);

    // Cleanup runs even after a failed phase; its own failures are logged
    // and never change the exit status.
    runner.cleanup();

    if let Err(e) = outcome {
        log::error!("benchmark failed: {e:#}");
        process::exit(1);
    }
}

fn execute(runner: &BenchmarkRunner) -> Result<()> {
    if env_flag("BENCH_COMPARE_INDEX") {
        let report = runner.run_index_comparison()?;
        print_comparison(&report);
        if env_flag("BENCH_JSON") {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    } else {
        let result = runner.run()?;
        print_report(&result);
        if env_flag("BENCH_JSON") {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

fn config_from_env() -> Result<BenchConfig> {
    let mut config = BenchConfig::default();

    if let Some(v) = env_var("BENCH_TOTAL_RECORDS") {
        config.total_records = v.parse().context("BENCH_TOTAL_RECORDS")?;
    }
    if let Some(v) = env_var("BENCH_WORKERS") {
        config.worker_count = v.parse().context("BENCH_WORKERS")?;
    }
    if let Some(v) = env_var("BENCH_DEADLINE_MS") {
        config.deadline = Duration::from_millis(v.parse().context("BENCH_DEADLINE_MS")?);
    }
    if let Some(v) = env_var("BENCH_COMMIT_GRANULARITY") {
        config.commit_granularity = v.parse().context("BENCH_COMMIT_GRANULARITY")?;
    }
    if let Some(v) = env_var("BENCH_DB_PATH") {
        config.db_path = v.into();
    }
    config.with_index = env_flag("BENCH_WITH_INDEX");

    Ok(config)
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> bool {
    matches!(
        env_var(name).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}
