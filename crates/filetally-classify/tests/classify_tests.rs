use std::path::Path;
use std::sync::{Arc, Mutex};

use filetally_classify::{
    Architecture, ClassifierConfig, ClassifyOutcome, Fingerprint, Linkage, MarkerClass,
    Normalizer, Policy, StripStatus, Tally, TallyEvent, Vocabulary, segments,
};
use filetally_core::SniffError;

const STRIPPED_ELF: &str = "ELF 64-bit LSB executable, x86-64, version 1 (SYSV), \
                            dynamically linked, interpreter /lib64/ld-linux-x86-64.so.2, \
                            for GNU/Linux 3.2.0, stripped";

fn with_build_id(id: &str) -> String {
    format!(
        "ELF 64-bit LSB executable, x86-64, version 1 (SYSV), \
         dynamically linked, interpreter /lib64/ld-linux-x86-64.so.2, \
         for GNU/Linux 3.2.0, BuildID[sha1]={id}, stripped"
    )
}

#[test]
fn test_normalize_is_deterministic() {
    let normalizer = Normalizer::default();
    let raw = with_build_id("abcd1234");
    assert_eq!(normalizer.normalize(&raw), normalizer.normalize(&raw));
}

#[test]
fn test_keep_only_descriptions_pass_through() {
    let normalizer = Normalizer::default();
    for raw in [
        "ASCII text",
        "PNG image data, 640 x 480, 8-bit/color RGBA, non-interlaced",
        "UTF-8 Unicode text, with very long lines",
        "gzip compressed data, from Unix  ",
        "Zip archive data, at least v2.0 to extract,",
    ] {
        let normalized = normalizer.normalize(raw);
        assert_eq!(normalized.description, raw.trim_end_matches([' ', ',']));
        assert_eq!(normalized.fingerprint, Fingerprint::of(&normalized.description));
    }
}

#[test]
fn test_build_id_segment_absent() {
    let normalizer = Normalizer::default();
    for raw in [
        with_build_id("abcd1234"),
        "ELF 32-bit LSB shared object, ARM, BuildID[md5/uuid]=0123, not stripped".to_string(),
        "data, BuildID[xxHash]=77".to_string(),
    ] {
        let canonical = normalizer.normalize(&raw).description;
        assert!(!canonical.contains("BuildID"), "{canonical}");
        assert!(!canonical.contains(",,"), "{canonical}");
        assert!(!canonical.ends_with(','), "{canonical}");
    }
}

#[test]
fn test_build_ids_collapse_into_one_record() {
    let mut tally = Tally::new();
    tally.classify(Path::new("/usr/bin/a"), &with_build_id("abcd1234"));
    tally.classify(Path::new("/usr/bin/b"), &with_build_id("ffff0000"));
    tally.classify(Path::new("/usr/bin/c"), STRIPPED_ELF);

    assert_eq!(tally.inventory().len(), 1);
    let record = tally.inventory().get_by_description(STRIPPED_ELF).unwrap();
    assert_eq!(record.count, 3);
    assert_eq!(record.classification.architecture, Some(Architecture::X86_64));
    assert!(record.is_executable());
}

#[test]
fn test_script_without_architecture() {
    let raw = "POSIX shell script, ASCII text executable";
    let normalizer = Normalizer::default();

    let verdicts: Vec<_> = normalizer.verdicts(raw).collect();
    assert_eq!(verdicts.len(), 2);
    assert!(verdicts.iter().all(|v| v.policy == Policy::Keep));

    let mut tally = Tally::new();
    assert!(matches!(
        tally.classify(Path::new("/etc/rc"), raw),
        ClassifyOutcome::Inserted(_)
    ));
    let record = tally.inventory().iter().next().unwrap();
    assert_eq!(record.description, raw);
    assert!(!record.is_executable());
}

#[test]
fn test_file_count_with_sniff_failures() {
    let mut tally = Tally::new();
    let descriptions = ["ASCII text", "data", "ASCII text", "PNG image data, 16 x 16"];
    let failures = 3;

    for (i, raw) in descriptions.iter().enumerate() {
        let path = format!("/tree/ok{i}");
        tally.record_file(Path::new(&path), Ok(raw.to_string()));
    }
    for i in 0..failures {
        let path = format!("/tree/bad{i}");
        tally.record_file(
            Path::new(&path),
            Err(SniffError::failed(&path, "Permission denied")),
        );
    }

    let n = descriptions.len() + failures;
    assert_eq!(tally.counts().files, n as u64);
    assert!(tally.inventory().len() <= n - failures);
    assert_eq!(tally.inventory().len(), 3);
    assert_eq!(tally.inventory().total_observations(), descriptions.len() as u64);
    assert_eq!(tally.warnings().len(), failures);
}

#[test]
fn test_colliding_segment_matches_vocabulary() {
    // 'B' * 43 + '\'' == 'A' * 43 + 'R', and the tail byte is shared.
    assert_eq!(Fingerprint::of("B'M"), Fingerprint::of("ARM"));

    let vocabulary = Vocabulary::new();
    assert_eq!(vocabulary.lookup_text("B'M"), MarkerClass::Architecture(Architecture::Arm));

    let normalized = Normalizer::default().normalize("ELF 32-bit LSB executable, B'M, version 1");
    assert_eq!(normalized.architectures, [Architecture::Arm]);
    assert_eq!(normalized.classification.architecture, Some(Architecture::Arm));
}

#[test]
fn test_colliding_descriptions_merge() {
    let mut tally = Tally::new();
    let first = tally.classify(Path::new("/a"), "text ab");
    let second = tally.classify(Path::new("/b"), "text b7");

    assert!(matches!(first, ClassifyOutcome::Inserted(_)));
    assert!(matches!(second, ClassifyOutcome::Merged(_)));
    assert_eq!(tally.inventory().len(), 1);

    // The first description seen names the record.
    let record = tally.inventory().iter().next().unwrap();
    assert_eq!(record.description, "text ab");
    assert_eq!(record.count, 2);
}

#[test]
fn test_extended_markers_fold_flags() {
    let config = ClassifierConfig::builder().extended_markers(true).build().unwrap();
    let mut tally = Tally::with_config(config);

    tally.classify(
        Path::new("/a"),
        "ELF 64-bit LSB executable, x86-64, dynamically linked, with debug_info, not stripped",
    );
    tally.classify(Path::new("/b"), "ELF 64-bit LSB executable, x86-64, statically linked, stripped");

    // Both fold into the same kind; the first record keeps its flags.
    assert_eq!(tally.inventory().len(), 1);
    let record = tally.inventory().iter().next().unwrap();
    assert_eq!(record.description, "ELF 64-bit LSB executable, x86-64");
    assert_eq!(record.count, 2);
    assert_eq!(record.classification.linkage, Linkage::Dynamic);
    assert_eq!(record.classification.strip_status, StripStatus::NotStripped);
    assert!(record.classification.has_debug_info);
}

#[test]
fn test_default_markers_keep_linkage_text() {
    let mut tally = Tally::new();
    tally.classify(Path::new("/a"), "ELF 64-bit LSB executable, x86-64, dynamically linked");
    tally.classify(Path::new("/b"), "ELF 64-bit LSB executable, x86-64, statically linked");

    assert_eq!(tally.inventory().len(), 2);
    for record in tally.inventory().iter() {
        assert_eq!(record.classification.linkage, Linkage::Unknown);
    }
}

#[test]
fn test_segments_cover_description() {
    let raw = "ELF 64-bit LSB executable, x86-64,  version 1 (SYSV), stripped";
    let rebuilt: String = segments(raw).map(|s| s.text).collect();
    assert_eq!(rebuilt, raw);
}

#[test]
fn test_observer_sees_audited_architectures() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let config = ClassifierConfig::builder()
        .audit_architectures(vec![Architecture::Arm64])
        .build()
        .unwrap();
    let mut tally = Tally::with_config(config).on_event(move |event| {
        sink.lock().unwrap().push(event.clone());
    });

    tally.classify(Path::new("/x86"), STRIPPED_ELF);
    tally.classify(Path::new("/arm"), "ELF 64-bit LSB executable, ARM aarch64, version 1 (SYSV)");

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        TallyEvent::ArchitectureDetected { architecture: Architecture::Arm64, path, .. }
            if path == Path::new("/arm")
    ));
}

#[test]
fn test_partitioned_tallies_merge() {
    let mut left = Tally::new();
    let mut right = Tally::new();
    left.record_file(Path::new("/l/a"), Ok("ASCII text".to_string()));
    right.record_file(Path::new("/r/a"), Ok("ASCII text".to_string()));
    right.record_file(Path::new("/r/b"), Ok("data".to_string()));

    left.merge(right);

    assert_eq!(left.counts().files, 3);
    assert_eq!(left.inventory().len(), 2);
    assert_eq!(left.inventory().get_by_description("ASCII text").unwrap().count, 2);
}

#[test]
fn test_build_id_only_description_counts_file_without_record() {
    let mut tally = Tally::new();
    let outcome = tally.record_file(Path::new("/blob"), Ok("BuildID[sha1]=0a1b2c".to_string()));

    assert_eq!(outcome, ClassifyOutcome::Skipped);
    assert_eq!(tally.counts().files, 1);
    assert!(tally.inventory().is_empty());
    assert!(tally.warnings().is_empty());
}
