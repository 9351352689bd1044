//! Synthetic record generation: a pure, deterministic function of the
//! record index, so every run (and every worker) produces identical data.

use crate::partition::WorkRange;

/// One synthetic row. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub email: String,
}

pub fn name_for(index: u64) -> String {
    format!("User{index}")
}

pub fn email_for(index: u64) -> String {
    format!("user{index}@example.com")
}

/// Generate the full record chunk for one worker's range.
pub fn generate_range(range: WorkRange) -> Vec<Record> {
    range
        .indices()
        .map(|i| Record {
            name: name_for(i),
            email: email_for(i),
        })
        .collect()
}
