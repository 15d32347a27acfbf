//! Deduplicated collection of observed file kinds.
//!
//! Records are keyed by the fingerprint of their canonical description and
//! nothing else. Two descriptions whose fingerprints collide count as the
//! same kind: the later one only bumps the count and the first record's
//! text stays.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use itertools::Itertools;

use filetally_core::{Fingerprint, FileTypeRecord};

/// What happened to a candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First time this fingerprint was seen.
    Inserted,
    /// Counted against an existing record; the candidate was dropped.
    Merged,
}

/// Hash-keyed set of [`FileTypeRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct TypeInventory {
    records: HashMap<Fingerprint, FileTypeRecord>,
}

impl TypeInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `candidate`, or count it against the record that already
    /// holds its fingerprint.
    pub fn insert_or_increment(&mut self, candidate: FileTypeRecord) -> Observation {
        match self.records.entry(candidate.fingerprint) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().increment();
                Observation::Merged
            }
            Entry::Vacant(slot) => {
                slot.insert(FileTypeRecord {
                    count: 1,
                    ..candidate
                });
                Observation::Inserted
            }
        }
    }

    /// Fold another inventory into this one with the same match-or-insert
    /// rule, adding counts. Records already here keep their text.
    pub fn merge(&mut self, other: TypeInventory) {
        for (fingerprint, record) in other.records {
            match self.records.entry(fingerprint) {
                Entry::Occupied(mut existing) => existing.get_mut().count += record.count,
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
    }

    /// Look up a record by fingerprint.
    pub fn get(&self, fingerprint: Fingerprint) -> Option<&FileTypeRecord> {
        self.records.get(&fingerprint)
    }

    /// Look up the record a description would land in.
    pub fn get_by_description(&self, description: &str) -> Option<&FileTypeRecord> {
        self.get(Fingerprint::of(description))
    }

    /// Number of distinct kinds.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all record counts.
    pub fn total_observations(&self) -> u64 {
        self.records.values().map(|r| r.count).sum()
    }

    /// Records in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &FileTypeRecord> {
        self.records.values()
    }

    /// Records by count descending, then description ascending.
    pub fn sorted(&self) -> Vec<&FileTypeRecord> {
        self.records
            .values()
            .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.description.cmp(&b.description)))
            .collect()
    }

    /// The `n` most common kinds.
    pub fn top(&self, n: usize) -> Vec<&FileTypeRecord> {
        let mut sorted = self.sorted();
        sorted.truncate(n);
        sorted
    }

    /// Consume into records sorted like [`TypeInventory::sorted`].
    pub fn into_sorted(self) -> Vec<FileTypeRecord> {
        self.records
            .into_values()
            .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.description.cmp(&b.description)))
            .collect()
    }
}
