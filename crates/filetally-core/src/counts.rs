//! Per-run counters for directory entry kinds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Kind of directory entry reported by the tree walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory that could be listed.
    Directory,
    /// Directory whose children could not be read.
    UnreadableDirectory,
    /// Symbolic link, or an entry whose metadata could not be read.
    Symlink,
    /// Sockets, devices, fifos and anything else.
    Unknown,
}

/// Aggregate entry counts for one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounts {
    pub files: u64,
    pub directories: u64,
    pub unreadable_directories: u64,
    pub symlinks: u64,
    pub unknown: u64,
}

impl AggregateCounts {
    /// Create zeroed counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one entry of the given kind.
    pub fn record(&mut self, kind: EntryKind) {
        *self.slot(kind) += 1;
    }

    /// All entries seen, of any kind.
    pub fn total(&self) -> u64 {
        self.files + self.directories + self.unreadable_directories + self.symlinks + self.unknown
    }

    /// Add another partition's counts into these.
    pub fn absorb(&mut self, other: &AggregateCounts) {
        self.files += other.files;
        self.directories += other.directories;
        self.unreadable_directories += other.unreadable_directories;
        self.symlinks += other.symlinks;
        self.unknown += other.unknown;
    }

    fn slot(&mut self, kind: EntryKind) -> &mut u64 {
        match kind {
            EntryKind::File => &mut self.files,
            EntryKind::Directory => &mut self.directories,
            EntryKind::UnreadableDirectory => &mut self.unreadable_directories,
            EntryKind::Symlink => &mut self.symlinks,
            EntryKind::Unknown => &mut self.unknown,
        }
    }
}
