//! SQLite Worker-Pool Throughput Benchmark
//!
//! Measures sustained insert and point-lookup throughput of a file-backed
//! SQLite database (WAL mode) driven by a fixed pool of worker threads:
//!
//! - **Insert phase**: the workload is partitioned into contiguous ranges,
//!   one generator worker per range; generated record chunks are committed
//!   by the orchestrator through a single write connection in batched
//!   transactions.
//! - **Select phase**: one reader worker per range, each with its own
//!   read-only connection, performing point lookups and streaming progress
//!   increments until all workers finish or a wall-clock deadline expires —
//!   whichever comes first.
//!
//! Run the benchmark: `cargo run --release`
//! Run tests: `cargo test`

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod partition;
pub mod record;
pub mod report;
pub mod runner;
pub mod worker;
pub mod writer;
