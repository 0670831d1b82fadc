use thiserror::Error;

use crate::JobStatus;

/// Everything that can end a search or export interaction early.
///
/// Carried inside messages, so it only holds rendered detail strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("could not start the search job: {0}")]
    Submission(String),
    #[error("search job finished with status {status}")]
    JobFailed { status: JobStatus },
    #[error("gave up waiting for the search job after {attempts} status checks ({elapsed_ms} ms)")]
    PollTimeout { attempts: u32, elapsed_ms: u64 },
    #[error("could not check the search job status: {0}")]
    Poll(String),
    #[error("could not fetch search results: {0}")]
    Fetch(String),
    #[error("export failed: {0}")]
    Export(String),
    #[error("search cancelled")]
    Cancelled,
}
