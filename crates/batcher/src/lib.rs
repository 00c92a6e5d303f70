pub mod config;
pub mod error;
pub mod job;
pub mod ledger;
pub mod runlog;
pub mod runner;
pub mod scan;
pub mod staging;
pub mod transcoder;

pub use config::BatchConfig;
pub use error::{FatalError, JobError};
pub use job::{Job, JobState};
pub use ledger::CompletionLedger;
pub use runner::{BatchRunner, RunSummary};
