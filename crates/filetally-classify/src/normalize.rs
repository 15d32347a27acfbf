//! Rewriting raw descriptions into their canonical form.

use filetally_core::{Architecture, Classification, Fingerprint};

use crate::segment::{Segment, segments};
use crate::vocabulary::{MarkerClass, Policy, Vocabulary};

/// Result of normalizing one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Kept segments in order, trailing spaces and commas trimmed.
    pub description: String,
    /// Fingerprint of `description`.
    pub fingerprint: Fingerprint,
    /// Flags set by active markers.
    pub classification: Classification,
    /// Architecture markers seen, in order.
    pub architectures: Vec<Architecture>,
}

/// A segment with the verdict the normalizer reached for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict<'a> {
    pub segment: Segment<'a>,
    pub class: MarkerClass,
    pub policy: Policy,
}

/// Applies a vocabulary's keep/discard rules to descriptions.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    vocabulary: Vocabulary,
}

impl Normalizer {
    /// Create a normalizer over a vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary in use.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Classify every segment of `raw` without building anything.
    pub fn verdicts<'a>(&'a self, raw: &'a str) -> impl Iterator<Item = Verdict<'a>> + 'a {
        segments(raw).map(move |segment| {
            let class = self.vocabulary.lookup(&segment);
            let policy = self.vocabulary.policy(class);
            Verdict {
                segment,
                class,
                policy,
            }
        })
    }

    /// Normalize a raw description.
    pub fn normalize(&self, raw: &str) -> Normalized {
        let mut description = String::with_capacity(raw.len());
        let mut classification = Classification::default();
        let mut architectures = Vec::new();

        for verdict in self.verdicts(raw) {
            if let MarkerClass::Architecture(arch) = verdict.class {
                architectures.push(arch);
            }
            self.vocabulary.apply(verdict.class, &mut classification);

            if verdict.policy == Policy::Keep {
                description.push_str(verdict.segment.text);
            }
        }

        let trimmed = description.trim_end_matches([' ', ',']).len();
        description.truncate(trimmed);

        Normalized {
            fingerprint: Fingerprint::of(&description),
            description,
            classification,
            architectures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetally_core::{Linkage, StripStatus};

    fn canonical(raw: &str) -> String {
        Normalizer::default().normalize(raw).description
    }

    #[test]
    fn test_plain_description_unchanged() {
        assert_eq!(canonical("ASCII text"), "ASCII text");
        assert_eq!(
            canonical("POSIX shell script, ASCII text executable"),
            "POSIX shell script, ASCII text executable"
        );
    }

    #[test]
    fn test_trailing_delimiters_trimmed() {
        assert_eq!(canonical("data, , "), "data");
        assert_eq!(canonical("data,,,"), "data");
        assert_eq!(canonical(",  "), "");
    }

    #[test]
    fn test_build_id_removed_with_delimiter() {
        let raw = "ELF 64-bit LSB executable, x86-64, BuildID[sha1]=abcd1234, not stripped";
        assert_eq!(canonical(raw), "ELF 64-bit LSB executable, x86-64, not stripped");
    }

    #[test]
    fn test_trailing_build_id_leaves_no_comma() {
        let raw = "ELF 64-bit LSB shared object, x86-64, BuildID[sha1]=ff00";
        assert_eq!(canonical(raw), "ELF 64-bit LSB shared object, x86-64");
    }

    #[test]
    fn test_architecture_sets_flags() {
        let normalized = Normalizer::default().normalize("ELF 32-bit LSB executable, Intel 80386, version 1");
        assert!(normalized.classification.executable);
        assert_eq!(normalized.classification.architecture, Some(Architecture::I386));
        assert_eq!(normalized.architectures, [Architecture::I386]);
    }

    #[test]
    fn test_inactive_markers_leave_flags_alone() {
        let normalized = Normalizer::default().normalize("ELF 64-bit LSB executable, dynamically linked, not stripped");
        assert!(!normalized.classification.executable);
        assert_eq!(normalized.classification.linkage, Linkage::Unknown);
        assert_eq!(normalized.description, "ELF 64-bit LSB executable, dynamically linked, not stripped");
    }

    #[test]
    fn test_extended_markers() {
        let normalizer = Normalizer::new(Vocabulary::with_extended(true));
        let normalized = normalizer.normalize(
            "ELF 64-bit LSB executable, x86-64, dynamically linked, with debug_info, not stripped",
        );
        assert_eq!(normalized.description, "ELF 64-bit LSB executable, x86-64");
        let flags = normalized.classification;
        assert_eq!(flags.linkage, Linkage::Dynamic);
        assert_eq!(flags.strip_status, StripStatus::NotStripped);
        assert!(flags.has_debug_info);
        assert_eq!(flags.architecture, Some(Architecture::X86_64));
    }

    #[test]
    fn test_fingerprint_of_canonical_form() {
        let normalized = Normalizer::default().normalize("data, BuildID=1");
        assert_eq!(normalized.description, "data");
        assert_eq!(normalized.fingerprint, Fingerprint::of("data"));
    }

    #[test]
    fn test_never_grows() {
        for raw in ["", "a", "a, b, ", "BuildID=1, BuildID=2", "x86-64,x86-64"] {
            assert!(canonical(raw).len() <= raw.len());
        }
    }

    #[test]
    fn test_verdicts() {
        let normalizer = Normalizer::default();
        let verdicts: Vec<_> = normalizer.verdicts("x86-64, BuildID[sha1]=00").collect();
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[0].policy, Policy::Keep);
        assert_eq!(verdicts[1].class, MarkerClass::BuildIdentifier);
        assert_eq!(verdicts[1].policy, Policy::Discard);
    }
}
