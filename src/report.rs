//! Benchmark results and console reporting.

use std::time::Duration;

use serde::Serialize;

/// Results of one full benchmark run. Immutable after construction.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub total_records: u64,
    pub worker_count: usize,
    pub with_index: bool,
    /// Insert phase wall-clock time in milliseconds.
    pub insert_ms: f64,
    /// Actual row count after the insert phase (consistency check).
    pub row_count: u64,
    /// Select phase wall-clock time in milliseconds.
    pub select_ms: f64,
    /// Point lookups counted before the deadline race resolved.
    pub processed_count: u64,
    pub select_timed_out: bool,
}

impl BenchmarkResult {
    pub fn inserts_per_sec(&self) -> f64 {
        rate(self.total_records, self.insert_ms)
    }

    pub fn selects_per_sec(&self) -> f64 {
        rate(self.processed_count, self.select_ms)
    }

    pub fn insert_complete(&self) -> bool {
        self.row_count == self.total_records
    }

    pub(crate) fn ms(d: Duration) -> f64 {
        d.as_secs_f64() * 1_000.0
    }
}

fn rate(count: u64, ms: f64) -> f64 {
    if ms <= 0.0 {
        return 0.0;
    }
    count as f64 / (ms / 1_000.0)
}

/// Two full runs, without and with the secondary email index.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub baseline: BenchmarkResult,
    pub indexed: BenchmarkResult,
}

impl ComparisonReport {
    /// Relative point-lookup speedup of the indexed run.
    pub fn select_speedup(&self) -> f64 {
        let baseline = self.baseline.selects_per_sec();
        if baseline <= 0.0 {
            return 0.0;
        }
        self.indexed.selects_per_sec() / baseline
    }
}

/// Print a formatted human-readable report for one run.
pub fn print_report(result: &BenchmarkResult) {
    println!("\n{}", "=".repeat(72));
    println!("  SQLite Worker-Pool Throughput Report");
    println!(
        "  {} records | {} workers | index: {}",
        result.total_records,
        result.worker_count,
        if result.with_index { "email" } else { "none" }
    );
    println!("{}", "=".repeat(72));

    println!(
        "  Insert phase:     {:>12.2} ms  ({:>12.0} inserts/sec)",
        result.insert_ms,
        result.inserts_per_sec()
    );
    println!(
        "  Rows verified:    {:>12}  ({})",
        result.row_count,
        if result.insert_complete() {
            "complete"
        } else {
            "MISMATCH"
        }
    );
    println!(
        "  Select phase:     {:>12.2} ms  ({:>12.0} selects/sec)",
        result.select_ms,
        result.selects_per_sec()
    );
    println!(
        "  Lookups counted:  {:>12}  ({})",
        result.processed_count,
        if result.select_timed_out {
            "deadline expired — partial"
        } else {
            "all workers completed"
        }
    );
    println!("{}", "=".repeat(72));
}

/// Print both runs of an index comparison plus the relative speedup.
pub fn print_comparison(report: &ComparisonReport) {
    print_report(&report.baseline);
    print_report(&report.indexed);

    println!("\n  Comparison Summary:");
    println!(
        "  {:12} {:>14} {:>14} {:>10}",
        "Run", "Inserts/sec", "Selects/sec", "Timed out"
    );
    println!("  {}", "-".repeat(54));
    for (label, r) in [("no index", &report.baseline), ("email index", &report.indexed)] {
        println!(
            "  {:12} {:>14.0} {:>14.0} {:>10}",
            label,
            r.inserts_per_sec(),
            r.selects_per_sec(),
            if r.select_timed_out { "yes" } else { "no" }
        );
    }
    println!(
        "\n  Point-lookup speedup with index: {:.2}x\n",
        report.select_speedup()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(processed: u64, select_ms: f64) -> BenchmarkResult {
        BenchmarkResult {
            total_records: 1_000,
            worker_count: 4,
            with_index: false,
            insert_ms: 500.0,
            row_count: 1_000,
            select_ms,
            processed_count: processed,
            select_timed_out: false,
        }
    }

    #[test]
    fn rates_are_derived_from_counts_and_elapsed_time() {
        let result = sample(1_000, 2_000.0);
        assert_eq!(result.inserts_per_sec(), 2_000.0);
        assert_eq!(result.selects_per_sec(), 500.0);
        assert!(result.insert_complete());
    }

    #[test]
    fn zero_elapsed_reports_zero_rate() {
        let result = sample(1_000, 0.0);
        assert_eq!(result.selects_per_sec(), 0.0);
    }

    #[test]
    fn speedup_is_the_select_rate_ratio() {
        let report = ComparisonReport {
            baseline: sample(100, 1_000.0),
            indexed: sample(400, 1_000.0),
        };
        assert_eq!(report.select_speedup(), 4.0);
    }

    #[test]
    fn result_serializes_to_json() {
        let json = serde_json::to_string(&sample(42, 10.0)).unwrap();
        assert!(json.contains("\"processed_count\":42"));
    }
}
