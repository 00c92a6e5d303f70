use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Filename prefix for a relocated artifact sitting next to its original.
/// Discovery skips files carrying it so a crashed run's in-flight result is
/// never picked up as a fresh job.
pub const TEMP_PREFIX: &str = "temp-";

/// Filename prefix for the transcoder output inside the scratch directory.
pub const PROCESSED_PREFIX: &str = "processed-";

/// Lifecycle of a single job. `Failed` is absorbing and reachable from any
/// step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Discovered,
    Staged,
    Transcoded,
    Relocated,
    Committed,
    Failed(String),
}

/// One unit of work: a source file and its derived in-flight locations.
///
/// `source_path` is the job's identity key. The staging paths exist only
/// while the job is in flight; `relocation_path` is a `temp-` sibling of the
/// original that holds the verified result until promotion.
#[derive(Debug, Clone)]
pub struct Job {
    pub source_path: PathBuf,
    pub staging_input_path: PathBuf,
    pub staging_output_path: PathBuf,
    pub relocation_path: PathBuf,
    /// Used only to prioritize: larger files are scheduled first.
    pub original_size_bytes: u64,
    pub state: JobState,
}

impl Job {
    /// Derive a job from a discovered source file. Returns None when the
    /// path has no filename or no parent directory.
    pub fn new(source_path: PathBuf, original_size_bytes: u64, staging_dir: &Path) -> Option<Self> {
        let file_name = source_path.file_name()?;
        let parent = source_path.parent()?;

        let staging_input_path = staging_dir.join(file_name);

        let mut processed_name = OsString::from(PROCESSED_PREFIX);
        processed_name.push(file_name);
        let staging_output_path = staging_dir.join(&processed_name);

        let mut temp_name = OsString::from(TEMP_PREFIX);
        temp_name.push(file_name);
        let relocation_path = parent.join(&temp_name);

        Some(Self {
            source_path,
            staging_input_path,
            staging_output_path,
            relocation_path,
            original_size_bytes,
            state: JobState::Discovered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_staging_and_relocation_paths() {
        let job = Job::new(
            PathBuf::from("/media/movies/beck.mkv"),
            1024,
            Path::new("/scratch"),
        )
        .unwrap();

        assert_eq!(job.staging_input_path, PathBuf::from("/scratch/beck.mkv"));
        assert_eq!(
            job.staging_output_path,
            PathBuf::from("/scratch/processed-beck.mkv")
        );
        assert_eq!(
            job.relocation_path,
            PathBuf::from("/media/movies/temp-beck.mkv")
        );
        assert_eq!(job.original_size_bytes, 1024);
        assert_eq!(job.state, JobState::Discovered);
    }

    #[test]
    fn relocation_is_a_sibling_of_the_source() {
        let job = Job::new(
            PathBuf::from("/media/a/b/clip.mp4"),
            1,
            Path::new("/scratch"),
        )
        .unwrap();
        assert_eq!(job.relocation_path.parent(), job.source_path.parent());
    }
}
