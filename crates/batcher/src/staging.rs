use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::JobError;
use crate::job::Job;

/// Owns the scratch directory that isolates in-flight processing from the
/// original media tree. The directory persists across runs so a crashed
/// run's artifacts remain available for forensics.
///
/// Invariant: no method here ever deletes `source_path` itself. The only
/// operation that touches the original is [`StagingArea::promote`], which
/// replaces it in a single atomic rename once a verified non-empty
/// replacement exists.
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    /// Copy the source into the scratch directory. A copy, never a move:
    /// the original must remain intact whatever happens downstream.
    pub fn stage_in(&self, job: &Job) -> Result<(), JobError> {
        // Created lazily so an uncreatable scratch dir fails the job,
        // not the whole run.
        fs::create_dir_all(&self.dir).map_err(|source| JobError::StagingFailed {
            path: job.source_path.clone(),
            step: "create scratch dir",
            source,
        })?;

        fs::copy(&job.source_path, &job.staging_input_path).map_err(|source| {
            JobError::StagingFailed {
                path: job.source_path.clone(),
                step: "copy into scratch",
                source,
            }
        })?;

        debug!(
            "Staged {} -> {}",
            job.source_path.display(),
            job.staging_input_path.display()
        );
        Ok(())
    }

    /// Relocate the transcoder output next to the original as the `temp-`
    /// sibling, then drop the scratch copies. The scratch input copy is
    /// disposable and is removed even when relocation fails.
    pub fn stage_out(&self, job: &Job) -> Result<(), JobError> {
        let relocated = fs::copy(&job.staging_output_path, &job.relocation_path);

        if let Err(e) = fs::remove_file(&job.staging_input_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(
                    "Could not remove scratch copy {}: {e}",
                    job.staging_input_path.display()
                );
            }
        }

        match relocated {
            Ok(_) => {
                if let Err(e) = fs::remove_file(&job.staging_output_path) {
                    warn!(
                        "Could not remove staged output {}: {e}",
                        job.staging_output_path.display()
                    );
                }
                debug!(
                    "Relocated {} -> {}",
                    job.staging_output_path.display(),
                    job.relocation_path.display()
                );
                Ok(())
            }
            Err(source) => Err(JobError::StagingFailed {
                path: job.source_path.clone(),
                step: "relocate output",
                source,
            }),
        }
    }

    /// Final, explicit promotion: replace the original with the relocated
    /// artifact. Gated on the artifact existing with non-zero size; the
    /// replacement is one same-directory `rename`, so the original is never
    /// unlinked separately.
    pub fn promote(&self, job: &Job) -> Result<(), JobError> {
        let meta = fs::metadata(&job.relocation_path).map_err(|source| JobError::StagingFailed {
            path: job.source_path.clone(),
            step: "verify relocated artifact",
            source,
        })?;
        if meta.len() == 0 {
            return Err(JobError::StagingFailed {
                path: job.source_path.clone(),
                step: "verify relocated artifact",
                source: io::Error::new(io::ErrorKind::InvalidData, "relocated artifact is empty"),
            });
        }

        fs::rename(&job.relocation_path, &job.source_path).map_err(|source| {
            JobError::StagingFailed {
                path: job.source_path.clone(),
                step: "promote relocated artifact",
                source,
            }
        })?;

        debug!(
            "Promoted {} over {}",
            job.relocation_path.display(),
            job.source_path.display()
        );
        Ok(())
    }

    /// Best-effort removal of a failed job's scratch copies. The original
    /// and any relocated artifact are left alone.
    pub fn discard(&self, job: &Job) {
        for path in [&job.staging_input_path, &job.staging_output_path] {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove scratch file {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(dir: &Path) -> Job {
        let root = dir.join("media");
        fs::create_dir_all(&root).unwrap();
        let source = root.join("movie.mkv");
        fs::write(&source, b"original content").unwrap();
        Job::new(source, 16, &dir.join("scratch")).unwrap()
    }

    #[test]
    fn stage_in_copies_and_leaves_original_intact() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));

        staging.stage_in(&job).unwrap();

        assert_eq!(fs::read(&job.source_path).unwrap(), b"original content");
        assert_eq!(
            fs::read(&job.staging_input_path).unwrap(),
            b"original content"
        );
    }

    #[test]
    fn stage_in_fails_when_source_vanished() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        fs::remove_file(&job.source_path).unwrap();
        let staging = StagingArea::new(&tmp.path().join("scratch"));

        match staging.stage_in(&job) {
            Err(JobError::StagingFailed { step, .. }) => assert_eq!(step, "copy into scratch"),
            other => panic!("expected StagingFailed, got {other:?}"),
        }
    }

    #[test]
    fn stage_out_relocates_and_cleans_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));
        staging.stage_in(&job).unwrap();
        fs::write(&job.staging_output_path, b"transcoded content").unwrap();

        staging.stage_out(&job).unwrap();

        assert_eq!(
            fs::read(&job.relocation_path).unwrap(),
            b"transcoded content"
        );
        assert!(!job.staging_input_path.exists());
        assert!(!job.staging_output_path.exists());
        // original untouched until promotion
        assert_eq!(fs::read(&job.source_path).unwrap(), b"original content");
    }

    #[test]
    fn stage_out_failure_still_removes_scratch_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));
        staging.stage_in(&job).unwrap();
        // no staging output -> relocation copy fails

        assert!(staging.stage_out(&job).is_err());
        assert!(!job.staging_input_path.exists());
        assert!(job.source_path.exists());
    }

    #[test]
    fn promote_replaces_original_atomically() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));
        fs::write(&job.relocation_path, b"transcoded content").unwrap();

        staging.promote(&job).unwrap();

        assert_eq!(fs::read(&job.source_path).unwrap(), b"transcoded content");
        assert!(!job.relocation_path.exists());
    }

    #[test]
    fn promote_refuses_empty_replacement() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));
        fs::write(&job.relocation_path, b"").unwrap();

        assert!(staging.promote(&job).is_err());
        assert_eq!(fs::read(&job.source_path).unwrap(), b"original content");
    }

    #[test]
    fn promote_refuses_missing_replacement() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));

        assert!(staging.promote(&job).is_err());
        assert_eq!(fs::read(&job.source_path).unwrap(), b"original content");
    }

    #[test]
    fn discard_is_quiet_when_nothing_staged() {
        let tmp = tempfile::tempdir().unwrap();
        let job = make_job(tmp.path());
        let staging = StagingArea::new(&tmp.path().join("scratch"));
        staging.discard(&job);
        assert!(job.source_path.exists());
    }
}
