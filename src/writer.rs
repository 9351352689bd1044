//! Batched transactional writes.
//!
//! The writer borrows the orchestrator's write connection mutably, so the
//! single-writer invariant is enforced by ownership: workers never hold a
//! handle capable of writing, and chunk commits from different workers are
//! strictly serialized in arrival order.

use rusqlite::{params, Connection};

use crate::error::BenchError;
use crate::record::Record;

pub struct BatchedTransactionWriter<'conn> {
    conn: &'conn mut Connection,
    commit_granularity: usize,
}

impl<'conn> BatchedTransactionWriter<'conn> {
    pub fn new(conn: &'conn mut Connection, commit_granularity: usize) -> Self {
        debug_assert!(commit_granularity > 0);
        Self {
            conn,
            commit_granularity,
        }
    }

    /// Persist one worker's full chunk, committing one transaction per
    /// `commit_granularity` records. A granularity at or above the chunk
    /// size degenerates to a single transaction for the whole chunk. On a
    /// mid-batch failure the open transaction rolls back and the error
    /// aborts the run.
    ///
    /// Returns the number of records written.
    pub fn write_chunk(&mut self, records: &[Record]) -> Result<usize, BenchError> {
        for batch in records.chunks(self.commit_granularity) {
            let tx = self.conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare_cached("INSERT INTO users (name, email) VALUES (?1, ?2)")?;
                for record in batch {
                    stmt.execute(params![record.name, record.email])?;
                }
            }
            tx.commit()?;
        }
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::WorkRange;
    use crate::record::generate_range;
    use crate::runner::{count_rows, reset_schema};

    fn fresh_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        reset_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn chunk_is_fully_visible_after_write() {
        let mut conn = fresh_conn();
        let records = generate_range(WorkRange { start: 0, end: 137 });

        let mut writer = BatchedTransactionWriter::new(&mut conn, 32);
        let written = writer.write_chunk(&records).unwrap();

        assert_eq!(written, 137);
        assert_eq!(count_rows(&conn).unwrap(), 137);
    }

    #[test]
    fn granularity_larger_than_chunk_still_writes_everything() {
        let mut conn = fresh_conn();
        let records = generate_range(WorkRange { start: 0, end: 10 });

        let mut writer = BatchedTransactionWriter::new(&mut conn, 10_000);
        writer.write_chunk(&records).unwrap();

        assert_eq!(count_rows(&conn).unwrap(), 10);
    }

    #[test]
    fn granularity_of_one_commits_per_record() {
        let mut conn = fresh_conn();
        let records = generate_range(WorkRange { start: 0, end: 25 });

        let mut writer = BatchedTransactionWriter::new(&mut conn, 1);
        writer.write_chunk(&records).unwrap();

        assert_eq!(count_rows(&conn).unwrap(), 25);
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let mut conn = fresh_conn();
        let mut writer = BatchedTransactionWriter::new(&mut conn, 100);
        assert_eq!(writer.write_chunk(&[]).unwrap(), 0);
        assert_eq!(count_rows(&conn).unwrap(), 0);
    }
}
