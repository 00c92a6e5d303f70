use std::path::PathBuf;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::BatchConfig;
use crate::job::{Job, TEMP_PREFIX};
use crate::ledger::CompletionLedger;

/// Video container extensions eligible for transcoding. Matched
/// case-sensitively against the path suffix.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "m4v", "m2ts"];

/// Result of scanning one discovered media file
#[derive(Debug, Clone)]
pub enum ScanResult {
    /// File is eligible work
    Candidate(Job),
    /// File is eligible by extension but already in the ledger
    SkippedDone(PathBuf),
}

/// Recursively walk the media root for candidate jobs.
///
/// A file is a candidate iff it is a regular file, its extension is in the
/// allow-list, its path is not in the completion ledger, and its filename
/// does not carry the in-flight `temp-` prefix. A walk error on one entry
/// is logged and skipped; it never aborts the rest of the walk. The caller
/// has already validated that the media root exists.
pub fn find_jobs(cfg: &BatchConfig, ledger: &CompletionLedger) -> Vec<ScanResult> {
    let mut results = Vec::new();

    debug!("Starting directory walk through {}", cfg.media_root.display());
    let walker = WalkDir::new(&cfg.media_root).follow_links(false);
    for entry in walker.into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error reading directory entry - skipping: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        match ext {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => {}
            _ => continue,
        }

        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with(TEMP_PREFIX) {
            debug!("Skipping in-flight temp file: {}", path.display());
            continue;
        }

        if ledger.contains(path) {
            debug!("Already transcoded, skipping: {}", path.display());
            results.push(ScanResult::SkippedDone(path.to_path_buf()));
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                warn!("Failed to stat {} - skipping: {e}", path.display());
                continue;
            }
        };

        match Job::new(path.to_path_buf(), size, &cfg.staging_dir) {
            Some(job) => {
                debug!("Adding job to candidate list: {}", path.display());
                results.push(ScanResult::Candidate(job));
            }
            None => warn!("Cannot derive job paths for {} - skipping", path.display()),
        }
    }

    results
}
