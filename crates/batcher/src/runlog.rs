use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use humansize::{format_size, DECIMAL};
use log::warn;

use crate::config::BatchConfig;
use crate::job::Job;
use crate::runner::RunSummary;

const BANNER: &str =
    "********************************************************************************";

/// Human-readable append log for one run, written next to the diagnostic
/// logging rather than through it. Write failures are downgraded to
/// warnings: the run log is a trace, never a reason to abort a batch.
pub struct RunLog {
    file: Option<File>,
    path: PathBuf,
}

impl RunLog {
    /// Open a timestamped log file under `dir`, creating the directory if
    /// needed. An unwritable log directory degrades to a no-op log.
    pub fn create(dir: &Path) -> Self {
        let path = dir.join(format!("run-{}.log", Utc::now().timestamp()));
        let file = fs::create_dir_all(dir)
            .and_then(|_| OpenOptions::new().append(true).create(true).open(&path));
        let file = match file {
            Ok(f) => Some(f),
            Err(e) => {
                warn!("Could not open run log {}: {e}", path.display());
                None
            }
        };
        Self { file, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &str) {
        if let Some(file) = &mut self.file {
            if let Err(e) = writeln!(file, "{line}") {
                warn!("Run log write failed: {e}");
            }
        }
    }

    pub fn header(&mut self, cfg: &BatchConfig, eligible: usize, already_done: usize) {
        self.write_line(BANNER);
        self.write_line(&format!("Processing run started: {}", Utc::now().to_rfc3339()));
        self.write_line(&format!("media_root = {}", cfg.media_root.display()));
        self.write_line(&format!("dry_run = {}", cfg.dry_run));
        self.write_line(&format!("batch_limit = {}", cfg.batch_limit));
        self.write_line(&format!("found {eligible} eligible video files in media root"));
        self.write_line(&format!(
            "found {already_done} paths in completion ledger - these won't be processed"
        ));
        self.write_line(BANNER);
    }

    pub fn job_start(&mut self, index: usize, total: usize, job: &Job) {
        self.write_line("");
        self.write_line(&format!("Starting job {index}/{total}"));
        self.write_line(&format!("source: {}", job.source_path.display()));
        self.write_line(&format!(
            "size: {}",
            format_size(job.original_size_bytes, DECIMAL)
        ));
    }

    pub fn job_outcome(&mut self, outcome: &str) {
        self.write_line(&format!("outcome: {outcome}"));
    }

    pub fn summary(&mut self, summary: &RunSummary) {
        self.write_line("");
        self.write_line(&format!(
            "Run summary: discovered={} already-done={} attempted={} succeeded={} failed={}",
            summary.discovered,
            summary.skipped_done,
            summary.attempted,
            summary.succeeded,
            summary.failed
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn writes_header_jobs_and_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = BatchConfig::default_config();
        cfg.media_root = PathBuf::from("/srv/movies");
        cfg.batch_limit = 2;

        let mut log = RunLog::create(tmp.path());
        log.header(&cfg, 5, 3);
        let job = Job::new(PathBuf::from("/srv/movies/a.mkv"), 500, Path::new("/scratch")).unwrap();
        log.job_start(1, 2, &job);
        log.job_outcome("committed");
        log.summary(&RunSummary {
            discovered: 5,
            skipped_done: 3,
            attempted: 2,
            succeeded: 1,
            failed: 1,
        });

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("media_root = /srv/movies"));
        assert!(content.contains("Starting job 1/2"));
        assert!(content.contains("source: /srv/movies/a.mkv"));
        assert!(content.contains("outcome: committed"));
        assert!(content.contains("attempted=2 succeeded=1 failed=1"));
    }

    #[test]
    fn unwritable_directory_degrades_to_no_op() {
        let mut log = RunLog::create(Path::new("/proc/no-such-place"));
        log.write_line("dropped");
        log.job_outcome("also dropped");
    }
}
