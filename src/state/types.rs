use std::collections::BTreeMap;
use std::path::PathBuf;

use betagen_common::{ArtifactKind, JobId, VideoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one pose-estimation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub video_id: VideoId,
    pub model: String,
    pub status: JobStatus,
    /// Failure reason; set only once the job has failed.
    pub error: Option<String>,
    /// Artifact paths; filled only once the job has completed.
    pub outputs: BTreeMap<ArtifactKind, PathBuf>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Lifecycle: `pending -> running -> {completed, failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    ///
    /// A pending job may only start. Completion and failure both happen
    /// from `running`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JobRecord {
    pub fn new(video_id: VideoId, model: impl Into<String>) -> Self {
        Self {
            job_id: JobId::new(),
            video_id,
            model: model.into(),
            status: JobStatus::Pending,
            error: None,
            outputs: BTreeMap::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Move to `running`. Returns `false` and leaves the record untouched when
    /// the job is not pending.
    pub fn start(&mut self) -> bool {
        if !self.status.can_transition_to(JobStatus::Running) {
            return false;
        }
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
        true
    }

    pub fn complete(&mut self, outputs: BTreeMap<ArtifactKind, PathBuf>) -> bool {
        if !self.status.can_transition_to(JobStatus::Completed) {
            return false;
        }
        self.status = JobStatus::Completed;
        self.outputs = outputs;
        self.error = None;
        self.completed_at = Some(Utc::now());
        true
    }

    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if !self.status.can_transition_to(JobStatus::Failed) {
            return false;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.outputs.clear();
        self.completed_at = Some(Utc::now());
        true
    }
}
