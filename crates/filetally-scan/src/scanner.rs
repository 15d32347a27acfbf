//! Sequential physical tree walker.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use filetally_classify::Tally;
use filetally_core::{
    ClassifierConfig, EntryKind, ScanConfig, ScanError, ScanWarning, TallyReport, WarningKind,
};

use crate::progress::ScanProgress;
use crate::sniff::Sniffer;

/// Files between progress broadcasts.
const PROGRESS_INTERVAL: u64 = 256;

/// Walks a tree one entry at a time and feeds a [`Tally`].
///
/// Symlinks are never followed. Every entry is counted by kind and every
/// regular file is handed to the sniffer, then classified.
pub struct TreeScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk `config.root` with a fresh [`Tally`] and return the report.
    pub fn scan<S>(
        &self,
        config: &ScanConfig,
        classifier: &ClassifierConfig,
        sniffer: &S,
    ) -> Result<TallyReport, ScanError>
    where
        S: Sniffer + ?Sized,
    {
        self.scan_with(config, sniffer, Tally::with_config(classifier.clone()))
    }

    /// Walk `config.root` into a caller-built [`Tally`] (for example one
    /// with an event observer) and return the report.
    pub fn scan_with<S>(&self, config: &ScanConfig, sniffer: &S, mut tally: Tally) -> Result<TallyReport, ScanError>
    where
        S: Sniffer + ?Sized,
    {
        let start = Instant::now();
        let root_path = self.scan_into(config, sniffer, &mut tally)?;
        Ok(tally.into_report(root_path, config.clone(), start.elapsed()))
    }

    /// Walk `config.root` into `tally`. Returns the canonical root path.
    pub fn scan_into<S>(
        &self,
        config: &ScanConfig,
        sniffer: &S,
        tally: &mut Tally,
    ) -> Result<std::path::PathBuf, ScanError>
    where
        S: Sniffer + ?Sized,
    {
        let start = Instant::now();
        let root_path = config.root.canonicalize().map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let ignore = Arc::new(config.ignore_set()?);
        info!(root = %root_path.display(), "scan started");

        let walker = WalkDir::new(&root_path)
            .parallelism(Parallelism::Serial)
            .skip_hidden(!config.include_hidden)
            .follow_links(false)
            .sort(true)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                if ignore.is_empty() {
                    return;
                }
                children.retain(|child| match child {
                    Ok(entry) => !ignore.is_match(Path::new(&entry.file_name)),
                    Err(_) => true,
                });
            });

        let mut files_seen: u64 = 0;

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), "walk error: {err}");
                    tally.record_warning(ScanWarning::read_error(path, &err));
                    continue;
                }
            };

            let path = entry.path();

            // Mirrors stat(2) failing during the walk: such entries are
            // counted with the symlinks.
            if let Err(err) = entry.metadata() {
                debug!(path = %path.display(), "metadata error: {err}");
                tally.record_warning(ScanWarning::new(&path, err.to_string(), WarningKind::MetadataError));
                tally.record_entry_kind(EntryKind::Symlink);
                continue;
            }

            let file_type = entry.file_type();

            if file_type.is_dir() {
                // jwalk only lists directories it descends into; the ones
                // cut off by max_depth are checked by hand.
                let unreadable = entry.read_children_error.is_some()
                    || (entry.read_children_path.is_none() && std::fs::read_dir(&path).is_err());
                if unreadable {
                    debug!(path = %path.display(), "directory not readable");
                    tally.record_entry_kind(EntryKind::UnreadableDirectory);
                } else {
                    tally.record_entry_kind(EntryKind::Directory);
                }
            } else if file_type.is_symlink() {
                tally.record_entry_kind(EntryKind::Symlink);
            } else if file_type.is_file() {
                let sniffed = sniffer.describe(&path);
                tally.record_file(&path, sniffed);

                files_seen += 1;
                if files_seen % PROGRESS_INTERVAL == 0 {
                    let counts = tally.counts();
                    let _ = self.progress_tx.send(ScanProgress {
                        files_scanned: counts.files,
                        dirs_scanned: counts.directories + counts.unreadable_directories,
                        kinds_found: tally.inventory().len(),
                        current_path: path.clone(),
                        errors_count: tally.warnings().len() as u64,
                        elapsed: start.elapsed(),
                    });
                }
            } else {
                tally.record_entry_kind(EntryKind::Unknown);
            }
        }

        info!(
            files = tally.counts().files,
            kinds = tally.inventory().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan finished"
        );

        Ok(root_path)
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use filetally_core::SniffError;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.bin"), [0u8, 1, 2, 3]).unwrap();

        temp
    }

    fn by_extension(path: &Path) -> Result<String, SniffError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("txt") => Ok("ASCII text".to_string()),
            Some("bin") => Ok("data".to_string()),
            _ => Err(SniffError::failed(path, "cannot open")),
        }
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let config = ScanConfig::new(temp.path());

        let report = TreeScanner::new()
            .scan(&config, &ClassifierConfig::default(), &by_extension)
            .unwrap();

        assert_eq!(report.counts.files, 4);
        // root, dir1, dir2, subdir
        assert_eq!(report.counts.directories, 4);
        assert_eq!(report.distinct_types(), 2);
        assert_eq!(report.types[0].description, "ASCII text");
        assert_eq!(report.types[0].count, 3);
    }

    #[test]
    fn test_sniff_failures_still_count_files() {
        let temp = create_test_tree();
        fs::write(temp.path().join("mystery"), "??").unwrap();
        let config = ScanConfig::new(temp.path());

        let report = TreeScanner::new()
            .scan(&config, &ClassifierConfig::default(), &by_extension)
            .unwrap();

        assert_eq!(report.counts.files, 5);
        assert_eq!(report.classified_files(), 4);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::SniffFailure);
    }

    #[test]
    fn test_ignore_patterns_prune_subtrees() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .ignore_patterns(vec!["dir1".to_string()])
            .build()
            .unwrap();

        let report = TreeScanner::new()
            .scan(&config, &ClassifierConfig::default(), &by_extension)
            .unwrap();

        assert_eq!(report.counts.files, 2);
        assert_eq!(report.counts.directories, 2);
    }

    #[test]
    fn test_max_depth() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .max_depth(Some(1u32))
            .build()
            .unwrap();

        let report = TreeScanner::new()
            .scan(&config, &ClassifierConfig::default(), &by_extension)
            .unwrap();

        assert_eq!(report.counts.files, 1);
        assert_eq!(report.counts.directories, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("dir1"), temp.path().join("link")).unwrap();
        let config = ScanConfig::new(temp.path());

        let report = TreeScanner::new()
            .scan(&config, &ClassifierConfig::default(), &by_extension)
            .unwrap();

        assert_eq!(report.counts.symlinks, 1);
        assert_eq!(report.counts.files, 4);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = create_test_tree();
        let config = ScanConfig::new(temp.path().join("file1.txt"));

        let result = TreeScanner::new().scan(&config, &ClassifierConfig::default(), &by_extension);
        assert!(matches!(result, Err(ScanError::NotADirectory { .. })));
    }
}
