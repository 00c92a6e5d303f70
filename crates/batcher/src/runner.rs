use humansize::{format_size, DECIMAL};
use log::{error, info};

use crate::config::BatchConfig;
use crate::error::{FatalError, JobError};
use crate::job::{Job, JobState};
use crate::ledger::CompletionLedger;
use crate::runlog::RunLog;
use crate::scan::{self, ScanResult};
use crate::staging::StagingArea;
use crate::transcoder;

/// Run-level counters, emitted at the end of every non-fatal run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Eligible video files seen by discovery, including already-done ones
    pub discovered: usize,
    /// Eligible files excluded because they are already in the ledger
    pub skipped_done: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Sort candidates largest-first and keep at most `limit`.
///
/// The batch is bounded by count, not time, so scheduling large files first
/// maximizes bytes transcoded per run and surfaces slow problematic files
/// early.
pub fn select_batch(mut jobs: Vec<Job>, limit: usize) -> Vec<Job> {
    jobs.sort_by(|a, b| b.original_size_bytes.cmp(&a.original_size_bytes));
    jobs.truncate(limit);
    jobs
}

/// Drives a bounded batch of jobs through staging, transcoding, relocation
/// and ledger commit, strictly one job at a time.
pub struct BatchRunner {
    cfg: BatchConfig,
}

impl BatchRunner {
    pub fn new(cfg: BatchConfig) -> Self {
        Self { cfg }
    }

    /// Execute one batch run. Only the two fatal preconditions propagate;
    /// every per-job failure is logged and absorbed, so a completed run
    /// always yields a summary even when every job failed.
    pub async fn run(&self) -> Result<RunSummary, FatalError> {
        if !self.cfg.media_root.exists() {
            return Err(FatalError::MediaRootDoesNotExist(
                self.cfg.media_root.clone(),
            ));
        }

        let mut ledger = CompletionLedger::load(&self.cfg.ledger_path)?;
        let staging = StagingArea::new(&self.cfg.staging_dir);
        let mut run_log = RunLog::create(&self.cfg.run_log_dir);

        info!("Scanning {} for candidates...", self.cfg.media_root.display());
        let mut candidates = Vec::new();
        let mut skipped_done = 0;
        for result in scan::find_jobs(&self.cfg, &ledger) {
            match result {
                ScanResult::Candidate(job) => candidates.push(job),
                ScanResult::SkippedDone(_) => skipped_done += 1,
            }
        }

        let mut summary = RunSummary {
            discovered: candidates.len() + skipped_done,
            skipped_done,
            ..RunSummary::default()
        };
        info!(
            "Scan complete: {} discovered, {} already done, {} candidates",
            summary.discovered,
            summary.skipped_done,
            candidates.len()
        );

        run_log.header(&self.cfg, summary.discovered, ledger.len());

        let batch = select_batch(candidates, self.cfg.batch_limit);
        let total = batch.len();

        if self.cfg.dry_run {
            for (idx, job) in batch.iter().enumerate() {
                info!(
                    "Dry run - would process {} ({})",
                    job.source_path.display(),
                    format_size(job.original_size_bytes, DECIMAL)
                );
                run_log.job_start(idx + 1, total, job);
                run_log.job_outcome("planned (dry run)");
            }
            summary.attempted = total;
            run_log.summary(&summary);
            return Ok(summary);
        }

        for (idx, mut job) in batch.into_iter().enumerate() {
            summary.attempted += 1;
            info!(
                "Starting job {}/{}: {} ({})",
                idx + 1,
                total,
                job.source_path.display(),
                format_size(job.original_size_bytes, DECIMAL)
            );
            run_log.job_start(idx + 1, total, &job);

            match self.drive_job(&staging, &mut ledger, &mut job).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    info!("Job committed: {}", job.source_path.display());
                    run_log.job_outcome("committed");
                }
                Err(err) => {
                    // One job's failure never aborts the batch.
                    summary.failed += 1;
                    error!("Job failed for {}: {err}", job.source_path.display());
                    staging.discard(&job);
                    job.state = JobState::Failed(err.to_string());
                    run_log.job_outcome(&format!("failed: {err}"));
                }
            }
        }

        run_log.summary(&summary);
        info!(
            "Run complete: {} attempted, {} succeeded, {} failed (run log: {})",
            summary.attempted,
            summary.succeeded,
            summary.failed,
            run_log.path().display()
        );
        Ok(summary)
    }

    /// One job's path through the state machine. Any error here leaves the
    /// original file intact; the caller cleans up scratch copies.
    async fn drive_job(
        &self,
        staging: &StagingArea,
        ledger: &mut CompletionLedger,
        job: &mut Job,
    ) -> Result<(), JobError> {
        staging.stage_in(job)?;
        job.state = JobState::Staged;

        transcoder::transcode(&self.cfg, &job.staging_input_path, &job.staging_output_path)
            .await?;
        job.state = JobState::Transcoded;

        staging.stage_out(job)?;
        job.state = JobState::Relocated;

        staging.promote(job)?;

        ledger
            .commit(&job.source_path)
            .map_err(|e| JobError::CommitFailed {
                path: job.source_path.clone(),
                reason: e.to_string(),
            })?;
        job.state = JobState::Committed;
        Ok(())
    }
}
