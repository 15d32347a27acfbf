//! Recognized description segments.
//!
//! Segments are matched by fingerprint against a fixed table. Matching is
//! exact on the fingerprint, so a segment that merely collides with a
//! table entry is treated as that entry. The one exception is the build
//! identifier, which differs per binary and is recognized by its `BuildID`
//! prefix instead.
//!
//! The default vocabulary only acts on architectures and build
//! identifiers. The extended vocabulary also folds debug-info, strip and
//! linkage segments into flags and drops them from the description.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

use filetally_core::{
    Architecture, Classification, ClassifierConfig, Fingerprint, Linkage, StripStatus,
};

use crate::segment::Segment;

/// Prefix of build identifier segments (`BuildID[sha1]=...`).
pub const BUILD_ID_PREFIX: &str = "BuildID";

/// Linkage and executable-object markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ExecutableFlag {
    Elf32Executable,
    Elf32Relocatable,
    Elf32SharedObject,
    Elf64Executable,
    Elf64PieExecutable,
    Elf64Relocatable,
    Elf64SharedObject,
    DynamicallyLinked,
    StaticallyLinked,
    WithDebugInfo,
    NotStripped,
    Stripped,
}

/// Text format markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TextFormat {
    Ascii,
    Utf8,
    CSource,
    AssemblerSource,
    CrlfLineTerminators,
    VeryLongLines,
}

/// Image format markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ImageFormat {
    Gif,
    Jpeg,
    Png,
}

/// Script markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ScriptKind {
    PosixShell,
    Bash,
    Makefile,
    M4,
    TextExecutable,
}

/// What a segment means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerClass {
    Architecture(Architecture),
    ExecutableFlag(ExecutableFlag),
    TextFormat(TextFormat),
    ImageFormat(ImageFormat),
    ScriptKind(ScriptKind),
    BuildIdentifier,
    Unrecognized,
}

impl fmt::Display for MarkerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Architecture(arch) => write!(f, "architecture({arch})"),
            Self::ExecutableFlag(flag) => write!(f, "executable({flag})"),
            Self::TextFormat(format) => write!(f, "text({format})"),
            Self::ImageFormat(format) => write!(f, "image({format})"),
            Self::ScriptKind(kind) => write!(f, "script({kind})"),
            Self::BuildIdentifier => f.write_str("build-id"),
            Self::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

/// What the normalizer does with a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Policy {
    Keep,
    Discard,
}

/// One row of the vocabulary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub text: &'static str,
    pub fingerprint: Fingerprint,
    pub class: MarkerClass,
}

const fn entry(text: &'static str, class: MarkerClass) -> VocabularyEntry {
    VocabularyEntry {
        text,
        fingerprint: Fingerprint::of(text),
        class,
    }
}

use ExecutableFlag as X;
use MarkerClass as M;

/// Every recognized segment body.
pub static ENTRIES: &[VocabularyEntry] = &[
    entry("Intel 80386", M::Architecture(Architecture::I386)),
    entry("x86-64", M::Architecture(Architecture::X86_64)),
    entry("ARM", M::Architecture(Architecture::Arm)),
    entry("ARM aarch64", M::Architecture(Architecture::Arm64)),
    entry("ELF 32-bit LSB executable", M::ExecutableFlag(X::Elf32Executable)),
    entry("ELF 32-bit LSB relocatable", M::ExecutableFlag(X::Elf32Relocatable)),
    entry("ELF 32-bit LSB shared object", M::ExecutableFlag(X::Elf32SharedObject)),
    entry("ELF 64-bit LSB executable", M::ExecutableFlag(X::Elf64Executable)),
    entry("ELF 64-bit LSB pie executable", M::ExecutableFlag(X::Elf64PieExecutable)),
    entry("ELF 64-bit LSB relocatable", M::ExecutableFlag(X::Elf64Relocatable)),
    entry("ELF 64-bit LSB shared object", M::ExecutableFlag(X::Elf64SharedObject)),
    entry("dynamically linked", M::ExecutableFlag(X::DynamicallyLinked)),
    entry("statically linked", M::ExecutableFlag(X::StaticallyLinked)),
    entry("with debug_info", M::ExecutableFlag(X::WithDebugInfo)),
    entry("not stripped", M::ExecutableFlag(X::NotStripped)),
    entry("stripped", M::ExecutableFlag(X::Stripped)),
    entry("ASCII text", M::TextFormat(TextFormat::Ascii)),
    entry("UTF-8 Unicode text", M::TextFormat(TextFormat::Utf8)),
    entry("UTF-8 text", M::TextFormat(TextFormat::Utf8)),
    entry("C source", M::TextFormat(TextFormat::CSource)),
    entry("assembler source", M::TextFormat(TextFormat::AssemblerSource)),
    entry("with CRLF line terminators", M::TextFormat(TextFormat::CrlfLineTerminators)),
    entry("with very long lines", M::TextFormat(TextFormat::VeryLongLines)),
    entry("GIF image data", M::ImageFormat(ImageFormat::Gif)),
    entry("JPEG image data", M::ImageFormat(ImageFormat::Jpeg)),
    entry("PNG image data", M::ImageFormat(ImageFormat::Png)),
    entry("POSIX shell script", M::ScriptKind(ScriptKind::PosixShell)),
    entry("Bourne-Again shell script", M::ScriptKind(ScriptKind::Bash)),
    entry("makefile script", M::ScriptKind(ScriptKind::Makefile)),
    entry("M4 macro processor script", M::ScriptKind(ScriptKind::M4)),
    entry("ASCII text executable", M::ScriptKind(ScriptKind::TextExecutable)),
];

/// Fingerprint lookup plus the keep/discard rules in force.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    table: HashMap<Fingerprint, MarkerClass>,
    extended: bool,
}

impl Vocabulary {
    /// Default vocabulary: only architectures and build identifiers act.
    pub fn new() -> Self {
        Self::with_extended(false)
    }

    /// Vocabulary with the extended markers switched on or off.
    pub fn with_extended(extended: bool) -> Self {
        let table = ENTRIES.iter().map(|e| (e.fingerprint, e.class)).collect();
        Self { table, extended }
    }

    /// Vocabulary for a classifier config.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::with_extended(config.extended_markers)
    }

    /// Resolve a segment.
    pub fn lookup(&self, segment: &Segment<'_>) -> MarkerClass {
        self.resolve(segment.fingerprint, segment.body)
    }

    /// Resolve a bare segment body.
    pub fn lookup_text(&self, body: &str) -> MarkerClass {
        self.resolve(Fingerprint::of(body), body)
    }

    fn resolve(&self, fingerprint: Fingerprint, body: &str) -> MarkerClass {
        if let Some(class) = self.table.get(&fingerprint) {
            return *class;
        }
        if body.trim_start().starts_with(BUILD_ID_PREFIX) {
            return MarkerClass::BuildIdentifier;
        }
        MarkerClass::Unrecognized
    }

    /// Whether a class changes anything under the current rules. Inactive
    /// classes are recognized but pass through untouched.
    pub fn is_active(&self, class: MarkerClass) -> bool {
        match class {
            MarkerClass::Architecture(_) | MarkerClass::BuildIdentifier => true,
            MarkerClass::ExecutableFlag(flag) => self.extended && is_volatile_flag(flag),
            MarkerClass::TextFormat(TextFormat::VeryLongLines) => self.extended,
            _ => false,
        }
    }

    /// Keep or drop a segment of this class.
    pub fn policy(&self, class: MarkerClass) -> Policy {
        match class {
            MarkerClass::BuildIdentifier => Policy::Discard,
            MarkerClass::Architecture(_) => Policy::Keep,
            other if self.is_active(other) => Policy::Discard,
            _ => Policy::Keep,
        }
    }

    /// Set the flags an active class implies.
    pub fn apply(&self, class: MarkerClass, flags: &mut Classification) {
        if !self.is_active(class) {
            return;
        }
        match class {
            MarkerClass::Architecture(arch) => flags.mark_architecture(arch),
            MarkerClass::ExecutableFlag(X::DynamicallyLinked) => flags.mark_linkage(Linkage::Dynamic),
            MarkerClass::ExecutableFlag(X::StaticallyLinked) => flags.mark_linkage(Linkage::Static),
            MarkerClass::ExecutableFlag(X::WithDebugInfo) => flags.mark_debug_info(),
            MarkerClass::ExecutableFlag(X::NotStripped) => {
                flags.mark_strip_status(StripStatus::NotStripped)
            }
            MarkerClass::ExecutableFlag(X::Stripped) => flags.mark_strip_status(StripStatus::Stripped),
            _ => {}
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

/// Flags that vary between builds of the same program.
fn is_volatile_flag(flag: ExecutableFlag) -> bool {
    matches!(
        flag,
        X::DynamicallyLinked | X::StaticallyLinked | X::WithDebugInfo | X::NotStripped | X::Stripped
    )
}
