//! Core types for filetally.
//!
//! This crate holds the data model shared by the classification engine and
//! the tree walker: fingerprints, file type records, entry counters,
//! configuration and the finished report.

mod config;
mod counts;
mod error;
pub mod fingerprint;
mod record;
mod report;

pub use config::{ClassifierConfig, ClassifierConfigBuilder, ScanConfig, ScanConfigBuilder};
pub use counts::{AggregateCounts, EntryKind};
pub use error::{ScanError, ScanWarning, SniffError, WarningKind};
pub use fingerprint::{Fingerprint, FingerprintHasher};
pub use record::{Architecture, Classification, FileTypeRecord, Linkage, StripStatus};
pub use report::TallyReport;
