use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::error::FatalError;

/// Durable record of source paths already transcoded.
///
/// The store is deliberately a flat append-only text file, one path per
/// line: partial-write recovery is trivial (truncate trailing garbage) and
/// the record stays human-auditable and hand-editable between runs. It is
/// loaded once at startup, grows by one entry per committed job, and never
/// shrinks at runtime.
#[derive(Debug)]
pub struct CompletionLedger {
    path: PathBuf,
    completed: HashSet<String>,
}

impl CompletionLedger {
    /// Read the durable store into memory, creating it empty if missing.
    /// A store that can neither be read nor created is fatal to the run.
    pub fn load(path: &Path) -> Result<Self, FatalError> {
        let mut completed = HashSet::new();

        match fs::read_to_string(path) {
            Ok(content) => {
                for line in content.lines() {
                    let line = line.trim_end();
                    if !line.is_empty() {
                        completed.insert(line.to_string());
                    }
                }
                info!(
                    "Loaded completion ledger {} ({} entries)",
                    path.display(),
                    completed.len()
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Completion ledger {} doesn't exist - will try to create...",
                    path.display()
                );
                File::create(path).map_err(|source| FatalError::LedgerUnavailable {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!("Completion ledger {} created successfully", path.display());
            }
            Err(source) => {
                return Err(FatalError::LedgerUnavailable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            completed,
        })
    }

    /// O(1) membership test.
    pub fn contains(&self, path: &Path) -> bool {
        self.completed.contains(path.to_string_lossy().as_ref())
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Record a completed source path. The durable append is flushed before
    /// the in-memory set is touched, so a crash between the two can only
    /// leave disk ahead of memory, never behind. Duplicate commits are
    /// idempotent no-ops.
    pub fn commit(&mut self, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().into_owned();
        if self.completed.contains(&key) {
            debug!("Ledger already contains {key}");
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger for append: {}", self.path.display()))?;
        writeln!(file, "{key}")
            .with_context(|| format!("Failed to append to ledger: {}", self.path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush ledger: {}", self.path.display()))?;

        info!("Adding {key} to completion ledger");
        self.completed.insert(key);
        Ok(())
    }
}
