//! Classification engine for filetally.
//!
//! Turns free-form file descriptions (the kind `file(1)` prints) into a
//! deduplicated inventory of file kinds:
//!
//! 1. Split the description into comma-delimited segments
//! 2. Match each segment against a fixed vocabulary by fingerprint
//! 3. Drop volatile segments such as build identifiers, collect flags
//! 4. Fingerprint the canonical description and count it in the inventory
//!
//! ```rust
//! use std::path::Path;
//! use filetally_classify::Tally;
//!
//! let mut tally = Tally::new();
//! tally.classify(Path::new("a"), "ELF 64-bit LSB executable, x86-64, BuildID[sha1]=01, stripped");
//! tally.classify(Path::new("b"), "ELF 64-bit LSB executable, x86-64, BuildID[sha1]=02, stripped");
//!
//! assert_eq!(tally.inventory().len(), 1);
//! let record = tally.inventory().iter().next().unwrap();
//! assert_eq!(record.description, "ELF 64-bit LSB executable, x86-64, stripped");
//! assert_eq!(record.count, 2);
//! ```

mod inventory;
mod normalize;
mod segment;
mod tally;
pub mod vocabulary;

pub use inventory::{Observation, TypeInventory};
pub use normalize::{Normalized, Normalizer, Verdict};
pub use segment::{Segment, Segments, segments};
pub use tally::{ClassifyOutcome, Tally, TallyEvent};
pub use vocabulary::{MarkerClass, Policy, Vocabulary};

// Re-export core types for convenience
pub use filetally_core::{
    AggregateCounts, Architecture, Classification, ClassifierConfig, EntryKind, FileTypeRecord,
    Fingerprint, Linkage, StripStatus,
};
