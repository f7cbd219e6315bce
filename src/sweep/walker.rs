use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::filters::SweepFilter;
use crate::common::errors::{FsError, Result};

/// A regular file discovered during the walk.
/// Snapshot taken at discovery time; the file may change afterwards.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
}

impl FileEntry {
    fn from_dir_entry(entry: &DirEntry) -> std::io::Result<Self> {
        let metadata = entry.metadata()?;
        Ok(Self {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().to_string(),
            modified: metadata.modified()?,
        })
    }
}

/// Report from a sweep
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    pub root: PathBuf,
    pub files_scanned: usize,
    /// Every eligible file, whether deleted here or handed to the callback
    pub matched: Vec<PathBuf>,
    /// Files this sweep removed itself
    pub deleted: Vec<PathBuf>,
    /// Per-entry failures that were skipped
    pub errors: Vec<String>,
    pub duration_secs: f64,
}

/// Delete every regular file under `root` that `filter` marks eligible.
///
/// Symlinks are not followed. Failures on individual entries are recorded in
/// the report and the walk continues; only an unreadable root is an error.
/// Nothing is rolled back.
pub fn delete_files_older_than(root: impl AsRef<Path>, filter: &SweepFilter) -> Result<SweepReport> {
    let root = root.as_ref();
    let start = Instant::now();
    let sweep_time = SystemTime::now();

    let metadata = std::fs::metadata(root).map_err(|source| FsError::Walk {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(FsError::Walk {
            path: root.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }

    let mut report = SweepReport {
        root: root.to_path_buf(),
        ..Default::default()
    };

    debug!(root = %root.display(), filter = ?filter, "starting sweep");

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => {
                return Err(FsError::Walk {
                    path: root.to_path_buf(),
                    source: err.into(),
                });
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                report.errors.push(err.to_string());
                continue;
            }
        };

        // Directories and symlinks are never candidates
        if !entry.file_type().is_file() {
            continue;
        }
        report.files_scanned += 1;

        let file = match FileEntry::from_dir_entry(&entry) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "cannot stat file");
                report
                    .errors
                    .push(format!("Failed to stat '{}': {}", entry.path().display(), e));
                continue;
            }
        };

        if !filter.is_eligible(&file.name, file.modified, sweep_time) {
            continue;
        }
        report.matched.push(file.path.clone());

        match filter.callback() {
            Some(callback) => {
                if let Err(e) = callback(&file.path) {
                    warn!(path = %file.path.display(), error = %e, "sweep callback failed");
                    report
                        .errors
                        .push(format!("Callback failed for '{}': {}", file.path.display(), e));
                }
            }
            None => match std::fs::remove_file(&file.path) {
                Ok(()) => {
                    debug!(path = %file.path.display(), "deleted");
                    report.deleted.push(file.path);
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "delete failed");
                    report
                        .errors
                        .push(format!("Failed to delete '{}': {}", file.path.display(), e));
                }
            },
        }
    }

    report.duration_secs = start.elapsed().as_secs_f64();
    debug!(
        root = %root.display(),
        scanned = report.files_scanned,
        matched = report.matched.len(),
        errors = report.errors.len(),
        "sweep finished"
    );
    Ok(report)
}
