//! Job records and lifecycle events.

mod types;

pub use types::*;

use betagen_common::JobId;
use serde::{Deserialize, Serialize};

/// Lifecycle notification broadcast by the job manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A job was accepted and is waiting for a worker slot.
    Submitted { job: JobRecord },
    Started { job_id: JobId },
    Completed { job: JobRecord },
    Failed { job_id: JobId, error: String },
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Submitted { job } | JobEvent::Completed { job } => job.job_id,
            JobEvent::Started { job_id } | JobEvent::Failed { job_id, .. } => *job_id,
        }
    }

    /// Whether this is the last event a job will emit.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Completed { .. } | JobEvent::Failed { .. })
    }
}
