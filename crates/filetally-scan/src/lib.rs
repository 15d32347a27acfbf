//! Tree walking and file sniffing for filetally.
//!
//! This crate drives the classification engine over a real directory tree:
//!
//! - **Sequential physical traversal** via jwalk in serial mode, never
//!   following symlinks
//! - **Sniffing** through the [`Sniffer`] trait, with a `file(1)` backend
//! - **Progress updates** via broadcast channels
//! - **Configurable** depth limits, hidden-file skipping and glob ignores
//!
//! # Example
//!
//! ```rust,no_run
//! use filetally_scan::{ClassifierConfig, FileCommandSniffer, ScanConfig, TreeScanner};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let report = TreeScanner::new()
//!     .scan(&config, &ClassifierConfig::default(), &FileCommandSniffer::new())
//!     .unwrap();
//!
//! println!("{} files, {} kinds", report.counts.files, report.distinct_types());
//! for kind in report.top(10) {
//!     println!("{:5}\t{}", kind.count, kind.description);
//! }
//! ```

mod progress;
mod scanner;
mod sniff;

pub use progress::ScanProgress;
pub use scanner::TreeScanner;
pub use sniff::{FileCommandSniffer, Sniffer};

// Re-export core types for convenience
pub use filetally_classify::{Tally, TallyEvent};
pub use filetally_core::{
    AggregateCounts, ClassifierConfig, EntryKind, ScanConfig, ScanError, ScanWarning, SniffError,
    TallyReport, WarningKind,
};
