use std::path::Path;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::Command;

use crate::config::BatchConfig;
use crate::error::JobError;

/// Invoke the external transcoder synchronously for one staged file.
///
/// The transcoder is an opaque collaborator called as
/// `transcoder_bin <profile> <input> <output>`. Success requires both an
/// exit code of zero and a non-empty output file; anything else is a
/// `FailedTranscoding` carrying the exit code and captured stderr. With a
/// configured timeout the child is killed on expiry and the job fails;
/// without one a hung transcoder blocks the batch indefinitely.
pub async fn transcode(cfg: &BatchConfig, input: &Path, output: &Path) -> Result<(), JobError> {
    let mut cmd = Command::new(&cfg.transcoder_bin);
    cmd.arg(&cfg.transcode_profile).arg(input).arg(output);
    cmd.kill_on_drop(true);

    debug!(
        "Transcoder command: {} {:?} {} {}",
        cfg.transcoder_bin.display(),
        cfg.transcode_profile,
        input.display(),
        output.display()
    );

    let result = match cfg.transcode_timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Transcoder timed out after {secs}s for {}",
                    input.display()
                );
                return Err(JobError::FailedTranscoding {
                    exit_code: None,
                    stderr: format!("transcoder timed out after {secs}s"),
                });
            }
        },
        None => cmd.output().await,
    };

    let out = result.map_err(|e| JobError::FailedTranscoding {
        exit_code: None,
        stderr: format!("failed to execute transcoder: {e}"),
    })?;

    let exit_code = out.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    debug!(
        "Transcoder exit code: {exit_code}, stderr length: {}",
        stderr.len()
    );

    if exit_code != 0 {
        return Err(JobError::FailedTranscoding {
            exit_code: Some(exit_code),
            stderr,
        });
    }

    // Exit code zero alone is not success - the output must exist and
    // contain something.
    let produced = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    if produced == 0 {
        return Err(JobError::FailedTranscoding {
            exit_code: Some(exit_code),
            stderr: if stderr.is_empty() {
                "transcoder produced missing or empty output".to_string()
            } else {
                stderr
            },
        });
    }

    Ok(())
}
