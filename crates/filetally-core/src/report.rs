//! Finished run summary.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ClassifierConfig, ScanConfig};
use crate::counts::AggregateCounts;
use crate::error::ScanWarning;
use crate::record::FileTypeRecord;

/// Everything a renderer needs after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyReport {
    /// Root path that was walked.
    pub root_path: PathBuf,

    /// When the run finished.
    pub scanned_at: DateTime<Utc>,

    /// Duration of the run.
    pub scan_duration: Duration,

    /// Walk configuration used.
    pub scan_config: ScanConfig,

    /// Classifier configuration used.
    pub classifier_config: ClassifierConfig,

    /// Entry counts by kind.
    pub counts: AggregateCounts,

    /// Distinct file kinds, most common first.
    pub types: Vec<FileTypeRecord>,

    /// Warnings encountered during the run.
    pub warnings: Vec<ScanWarning>,
}

impl TallyReport {
    /// Number of distinct kinds.
    pub fn distinct_types(&self) -> usize {
        self.types.len()
    }

    /// Files that produced a record (the rest failed to sniff).
    pub fn classified_files(&self) -> u64 {
        self.types.iter().map(|t| t.count).sum()
    }

    /// The `n` most common kinds.
    pub fn top(&self, n: usize) -> &[FileTypeRecord] {
        &self.types[..n.min(self.types.len())]
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
