//! Per-run classification context.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use compact_str::CompactString;
use tracing::{debug, warn};

use filetally_core::{
    AggregateCounts, Architecture, ClassifierConfig, EntryKind, FileTypeRecord, Fingerprint,
    ScanConfig, ScanWarning, SniffError, TallyReport,
};

use crate::inventory::{Observation, TypeInventory};
use crate::normalize::Normalizer;
use crate::vocabulary::Vocabulary;

/// Side-channel notifications raised while classifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyEvent {
    /// An audited architecture marker was seen.
    ArchitectureDetected {
        path: PathBuf,
        description: String,
        architecture: Architecture,
    },
    /// The sniffer could not describe a file.
    SniffFailed { path: PathBuf, error: SniffError },
}

/// Outcome of one `classify` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// A new kind was recorded.
    Inserted(Fingerprint),
    /// An existing kind was counted again.
    Merged(Fingerprint),
    /// Nothing to classify.
    Skipped,
}

type Observer = Box<dyn FnMut(&TallyEvent) + Send>;

/// Owns the inventory and counters for one traversal.
pub struct Tally {
    config: ClassifierConfig,
    normalizer: Normalizer,
    inventory: TypeInventory,
    counts: AggregateCounts,
    warnings: Vec<ScanWarning>,
    observer: Option<Observer>,
}

impl Tally {
    /// Create a context with the default classifier config.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a context for a classifier config.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self {
            normalizer: Normalizer::new(Vocabulary::from_config(&config)),
            config,
            inventory: TypeInventory::new(),
            counts: AggregateCounts::new(),
            warnings: Vec::new(),
            observer: None,
        }
    }

    /// Route events to `observer` instead of the log.
    pub fn on_event(mut self, observer: impl FnMut(&TallyEvent) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Classify one file from its raw description.
    ///
    /// Architecture events fire whether or not the file lands in an
    /// existing record. A description with nothing left after
    /// normalization creates no record.
    pub fn classify(&mut self, path: &Path, description: &str) -> ClassifyOutcome {
        let normalized = self.normalizer.normalize(description);
        if normalized.description.is_empty() {
            debug!(path = %path.display(), "empty description, skipping");
            return ClassifyOutcome::Skipped;
        }

        for &architecture in &normalized.architectures {
            if self.config.audits(architecture) {
                self.emit(TallyEvent::ArchitectureDetected {
                    path: path.to_path_buf(),
                    description: description.to_string(),
                    architecture,
                });
            }
        }

        let fingerprint = normalized.fingerprint;
        let candidate = FileTypeRecord {
            fingerprint,
            description: CompactString::from(normalized.description),
            count: 1,
            classification: normalized.classification,
        };

        match self.inventory.insert_or_increment(candidate) {
            Observation::Inserted => {
                debug!(path = %path.display(), %fingerprint, "new file kind");
                ClassifyOutcome::Inserted(fingerprint)
            }
            Observation::Merged => ClassifyOutcome::Merged(fingerprint),
        }
    }

    /// Count a directory entry of `kind`.
    pub fn record_entry_kind(&mut self, kind: EntryKind) {
        self.counts.record(kind);
    }

    /// Count a regular file and classify it with whatever the sniffer
    /// returned. A sniff failure is reported and stored as a warning; the
    /// file still counts, but no record is touched.
    pub fn record_file(&mut self, path: &Path, sniffed: Result<String, SniffError>) -> ClassifyOutcome {
        self.counts.record(EntryKind::File);
        match sniffed {
            Ok(description) => self.classify(path, &description),
            Err(error) => {
                self.warnings.push(ScanWarning::sniff_failure(path, &error));
                self.emit(TallyEvent::SniffFailed {
                    path: path.to_path_buf(),
                    error,
                });
                ClassifyOutcome::Skipped
            }
        }
    }

    /// Keep a non-fatal warning for the report.
    pub fn record_warning(&mut self, warning: ScanWarning) {
        self.warnings.push(warning);
    }

    /// Fold another partition's results into this one. Counts add up and
    /// records match by fingerprint exactly as `classify` would.
    pub fn merge(&mut self, other: Tally) {
        self.counts.absorb(&other.counts);
        self.inventory.merge(other.inventory);
        self.warnings.extend(other.warnings);
    }

    /// Entry counts so far.
    pub fn counts(&self) -> &AggregateCounts {
        &self.counts
    }

    /// File kinds recorded so far.
    pub fn inventory(&self) -> &TypeInventory {
        &self.inventory
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Finish the run.
    pub fn into_report(self, root_path: PathBuf, scan_config: ScanConfig, scan_duration: Duration) -> TallyReport {
        TallyReport {
            root_path,
            scanned_at: Utc::now(),
            scan_duration,
            scan_config,
            classifier_config: self.config,
            counts: self.counts,
            types: self.inventory.into_sorted(),
            warnings: self.warnings,
        }
    }

    fn emit(&mut self, event: TallyEvent) {
        if let Some(observer) = &mut self.observer {
            observer(&event);
        } else {
            log_event(&event);
        }
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tally")
            .field("config", &self.config)
            .field("counts", &self.counts)
            .field("kinds", &self.inventory.len())
            .field("warnings", &self.warnings.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

fn log_event(event: &TallyEvent) {
    match event {
        TallyEvent::ArchitectureDetected {
            path,
            description,
            architecture,
        } => debug!(path = %path.display(), %architecture, "{description}"),
        TallyEvent::SniffFailed { path, error } => {
            warn!(path = %path.display(), "sniff failed: {error}")
        }
    }
}
