use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort the run before any job is processed.
///
/// These are the only errors that propagate out of [`crate::BatchRunner::run`];
/// everything else is absorbed at the job boundary.
#[derive(Debug, Error)]
pub enum FatalError {
    /// The completion ledger could neither be read nor created.
    #[error("completion ledger unavailable at {}: {source}", .path.display())]
    LedgerUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured media root does not exist. Checked once at startup.
    #[error("media root does not exist: {}", .0.display())]
    MediaRootDoesNotExist(PathBuf),
}

/// Per-job failures. A job hitting one of these is marked failed and the
/// batch moves on to the next candidate.
#[derive(Debug, Error)]
pub enum JobError {
    /// A staging, relocation or promotion step failed. The original file is
    /// untouched unless promotion itself failed after the rename.
    #[error("staging failed for {} ({step}): {source}", .path.display())]
    StagingFailed {
        path: PathBuf,
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The external transcoder exited non-zero, produced no usable output,
    /// could not be spawned, or timed out.
    #[error("transcoding failed (exit code {exit_code:?}): {stderr}")]
    FailedTranscoding {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The durable ledger append failed after a successful promotion. The
    /// file is already transcoded; the next run will redo it (at-least-once).
    #[error("ledger commit failed for {}: {reason}", .path.display())]
    CommitFailed { path: PathBuf, reason: String },
}
