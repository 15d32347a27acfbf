//! File type records and their classification flags.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::fingerprint::Fingerprint;

/// Instruction set architecture named by a description.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Architecture {
    /// Intel 80386.
    #[strum(to_string = "i386")]
    I386,
    /// x86-64.
    #[strum(to_string = "x86-64", serialize = "x86_64")]
    #[serde(rename = "x86-64", alias = "x86_64")]
    X86_64,
    /// 32-bit ARM.
    Arm,
    /// ARM aarch64.
    #[strum(to_string = "arm64", serialize = "aarch64")]
    Arm64,
}

/// How a binary is linked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    #[default]
    Unknown,
    Static,
    Dynamic,
}

/// Symbol table status of a binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StripStatus {
    #[default]
    Unknown,
    Stripped,
    NotStripped,
}

/// Flags set by recognized markers while a description is normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Some marker identified the file as an executable object.
    pub executable: bool,
    /// Built with debug info.
    pub has_debug_info: bool,
    /// Symbol table status.
    pub strip_status: StripStatus,
    /// Target architecture, if one was named.
    pub architecture: Option<Architecture>,
    /// Linkage, if one was named.
    pub linkage: Linkage,
}

impl Classification {
    /// Record an architecture marker.
    pub fn mark_architecture(&mut self, architecture: Architecture) {
        self.executable = true;
        self.architecture = Some(architecture);
    }

    /// Record a linkage marker.
    pub fn mark_linkage(&mut self, linkage: Linkage) {
        self.executable = true;
        self.linkage = linkage;
    }

    /// Record a debug-info marker.
    pub fn mark_debug_info(&mut self) {
        self.executable = true;
        self.has_debug_info = true;
    }

    /// Record a strip-status marker.
    pub fn mark_strip_status(&mut self, status: StripStatus) {
        self.executable = true;
        self.strip_status = status;
    }

    /// No marker touched these flags.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One distinct kind of file seen during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeRecord {
    /// Fingerprint of `description`; the inventory key.
    pub fingerprint: Fingerprint,
    /// Canonical description.
    pub description: CompactString,
    /// Number of files that mapped to this record. Never zero.
    pub count: u64,
    /// Flags from the first observation.
    #[serde(flatten)]
    pub classification: Classification,
}

impl FileTypeRecord {
    /// Build a fresh record with a count of one. The fingerprint is derived
    /// from the description.
    pub fn new(description: impl Into<CompactString>, classification: Classification) -> Self {
        let description = description.into();
        Self {
            fingerprint: Fingerprint::of(&description),
            description,
            count: 1,
            classification,
        }
    }

    /// Count one more observation.
    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Whether any marker tagged this record as an executable object.
    pub fn is_executable(&self) -> bool {
        self.classification.executable
    }
}
