//! Workload partitioning: divides a record count into contiguous,
//! worker-sized half-open ranges.

use crate::error::BenchError;

/// A contiguous, half-open interval `[start, end)` of record indices
/// assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRange {
    pub start: u64,
    pub end: u64,
}

impl WorkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Record indices covered by this range.
    pub fn indices(&self) -> std::ops::Range<u64> {
        self.start..self.end
    }
}

/// Split `[0, total)` into exactly `workers` ranges of `ceil(total / workers)`
/// records each. The final non-empty range is clipped to `total`; if there
/// are more workers than records, the excess ranges are empty.
///
/// The returned ranges are disjoint, ascending, and their union is
/// `[0, total)`.
pub fn partition(total: u64, workers: usize) -> Result<Vec<WorkRange>, BenchError> {
    if workers == 0 {
        return Err(BenchError::InvalidConfig(
            "worker count must be positive".into(),
        ));
    }

    let workers = workers as u64;
    let chunk = total.div_ceil(workers);
    Ok((0..workers)
        .map(|i| WorkRange {
            start: (i * chunk).min(total),
            end: ((i + 1) * chunk).min(total),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ranges must be disjoint, ascending, and cover `[0, total)` exactly.
    fn assert_covers(ranges: &[WorkRange], total: u64) {
        let mut expected_start = 0;
        for range in ranges {
            assert_eq!(range.start, expected_start);
            assert!(range.end >= range.start);
            expected_start = range.end;
        }
        assert_eq!(expected_start, total);
    }

    #[test]
    fn million_records_across_eight_workers() {
        let ranges = partition(1_000_000, 8).unwrap();
        assert_eq!(ranges.len(), 8);
        for range in &ranges {
            assert_eq!(range.len(), 125_000);
        }
        assert_eq!(ranges.last().unwrap().end, 1_000_000);
        assert_covers(&ranges, 1_000_000);
    }

    #[test]
    fn uneven_division_clips_final_range() {
        let ranges = partition(10, 3).unwrap();
        assert_eq!(
            ranges,
            vec![
                WorkRange { start: 0, end: 4 },
                WorkRange { start: 4, end: 8 },
                WorkRange { start: 8, end: 10 },
            ]
        );
    }

    #[test]
    fn more_workers_than_records_yields_empty_tail() {
        let ranges = partition(3, 8).unwrap();
        assert_eq!(ranges.len(), 8);
        assert_covers(&ranges, 3);
        assert!(ranges[3..].iter().all(|r| r.is_empty()));
        assert_eq!(ranges[0], WorkRange { start: 0, end: 1 });
    }

    #[test]
    fn zero_records_yields_all_empty_ranges() {
        let ranges = partition(0, 4).unwrap();
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(|r| r.is_empty()));
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(
            partition(100, 0),
            Err(BenchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn coverage_holds_across_a_grid_of_inputs() {
        for total in [0u64, 1, 2, 7, 100, 1_001, 65_536] {
            for workers in [1usize, 2, 3, 8, 13, 64] {
                let ranges = partition(total, workers).unwrap();
                assert_eq!(ranges.len(), workers);
                assert_covers(&ranges, total);
            }
        }
    }
}
