//! Per-cycle merge of thread results into one record per ticker.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::{SecurityRecord, Snapshot};

/// What [`SnapshotAggregator::offer`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// First record seen for the ticker.
    Inserted,
    /// Replaced a weaker record for the same ticker.
    Replaced,
    /// Dropped; the existing record is at least as extreme.
    Kept,
}

/// Keeps the most extreme record per ticker, regardless of sign.
///
/// Not synchronized. One instance belongs to one crawl cycle.
#[derive(Debug, Default)]
pub struct SnapshotAggregator {
    records: Vec<SecurityRecord>,
    index: HashMap<String, usize>,
}

impl SnapshotAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one record. A later record wins only when its absolute sentiment
    /// is strictly greater; the ticker keeps its original insertion slot.
    pub fn offer(&mut self, record: SecurityRecord) -> Merge {
        if let Some(&slot) = self.index.get(&record.ticker) {
            let existing = &mut self.records[slot];
            if record.avg_comment_sentiment.abs() > existing.avg_comment_sentiment.abs() {
                *existing = record;
                Merge::Replaced
            } else {
                Merge::Kept
            }
        } else {
            self.index.insert(record.ticker.clone(), self.records.len());
            self.records.push(record);
            Merge::Inserted
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort by descending sentiment and seal the snapshot.
    ///
    /// The sort is stable, so equal sentiments keep first-insertion order.
    #[must_use]
    pub fn finish(self, captured_at: DateTime<Utc>) -> Snapshot {
        let mut records = self.records;
        records.sort_by(|a, b| b.avg_comment_sentiment.total_cmp(&a.avg_comment_sentiment));
        Snapshot {
            captured_at,
            records,
        }
    }
}
