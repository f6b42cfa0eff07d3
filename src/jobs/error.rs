use betagen_common::JobId;

/// Errors returned synchronously by [`JobManager`](super::JobManager).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The request was rejected before a job was created.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Job not found: {0}")]
    NotFound(JobId),
}
