//! Job orchestration.
//!
//! [`JobManager`] owns the table of jobs, runs each job's pipeline on its own
//! task and records the outcome. Status changes are serialized through a
//! single lock and every transition is announced on a broadcast channel.

mod error;

pub use error::JobError;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use betagen_av::MediaBackend;
use betagen_common::{JobId, VideoId};
use parking_lot::Mutex;
use tokio::sync::{broadcast, Semaphore};

use crate::config::{Config, PoseConfig};
use crate::models::ModelRegistry;
use crate::pipeline::{Artifacts, ProcessingConfig, VideoProcessor};
use crate::state::{JobEvent, JobRecord, JobStatus};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Per-request settings; `None` falls back to the `[pose]` defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOverrides {
    pub every_n_frames: Option<u32>,
    pub output_resolution: Option<String>,
    pub save_intermediate_frames: Option<bool>,
}

/// Accepts pose-estimation jobs and tracks them to completion.
///
/// At most `max_concurrent_jobs` pipelines run at once; further jobs stay
/// `pending` until a slot frees up. Records are kept for the lifetime of the
/// manager.
pub struct JobManager {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
    defaults: PoseConfig,
    outputs_root: PathBuf,
    registry: Arc<ModelRegistry>,
    processor: VideoProcessor,
    permits: Arc<Semaphore>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobManager {
    pub fn new(
        config: &Config,
        registry: Arc<ModelRegistry>,
        backend: Arc<dyn MediaBackend>,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let processor =
            VideoProcessor::new(registry.clone(), backend, config.pose.max_video_seconds);

        Arc::new(Self {
            jobs: Mutex::new(HashMap::new()),
            defaults: config.pose.clone(),
            outputs_root: config.storage.outputs_dir(),
            registry,
            processor,
            permits: Arc::new(Semaphore::new(config.pose.max_concurrent_jobs.max(1))),
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: JobEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("No subscribers for job event");
        }
    }

    /// Accept a job for `video_id` and start working on it in the background.
    ///
    /// Unsupported models and a zero sampling interval are rejected here and
    /// create no job. Other configuration problems (a malformed resolution, an
    /// overlong video) surface later as a `failed` job.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(
        self: &Arc<Self>,
        video_id: VideoId,
        input_path: PathBuf,
        model: &str,
        overrides: JobOverrides,
    ) -> Result<JobRecord, JobError> {
        if !self.registry.supports(model) {
            return Err(JobError::InvalidArgument(format!(
                "Unsupported model '{}'. Supported: {}",
                model,
                self.registry.supported_models().join(", ")
            )));
        }

        let config = self.resolve_config(model, overrides)?;
        let record = JobRecord::new(video_id.clone(), model);
        let job_id = record.job_id;

        self.jobs.lock().insert(job_id, record.clone());
        tracing::info!(
            "Job {} submitted: video {} with {} (every {} frame(s), {})",
            job_id,
            video_id,
            model,
            config.every_n_frames,
            config.output_resolution
        );
        self.broadcast(JobEvent::Submitted {
            job: record.clone(),
        });

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.run_job(job_id, video_id, input_path, config).await;
        });

        Ok(record)
    }

    fn resolve_config(&self, model: &str, overrides: JobOverrides) -> Result<ProcessingConfig, JobError> {
        let every_n_frames = overrides
            .every_n_frames
            .unwrap_or(self.defaults.every_n_frames);
        if every_n_frames == 0 {
            return Err(JobError::InvalidArgument(
                "every_n_frames must be at least 1".to_string(),
            ));
        }

        Ok(ProcessingConfig {
            model: model.to_string(),
            every_n_frames,
            output_resolution: overrides
                .output_resolution
                .unwrap_or_else(|| self.defaults.output_resolution.clone()),
            save_intermediate_frames: overrides
                .save_intermediate_frames
                .unwrap_or(self.defaults.save_intermediate_frames),
        })
    }

    /// Current snapshot of a job.
    pub fn get(&self, job_id: &JobId) -> Result<JobRecord, JobError> {
        self.jobs
            .lock()
            .get(job_id)
            .cloned()
            .ok_or(JobError::NotFound(*job_id))
    }

    /// Snapshots of every job, oldest first.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self.jobs.lock().values().cloned().collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    /// Wait until the job reaches `completed` or `failed` and return it.
    pub async fn wait(&self, job_id: &JobId) -> Result<JobRecord, JobError> {
        // Subscribe before the first look so a transition in between is not missed.
        let mut events = self.subscribe();

        loop {
            let job = self.get(job_id)?;
            if job.status.is_terminal() {
                return Ok(job);
            }

            loop {
                match events.recv().await {
                    Ok(event) if event.job_id() == *job_id && event.is_terminal() => break,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Job event receiver lagged by {} events", skipped);
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => return self.get(job_id),
                }
            }
        }
    }

    async fn run_job(
        self: Arc<Self>,
        job_id: JobId,
        video_id: VideoId,
        input_path: PathBuf,
        config: ProcessingConfig,
    ) {
        let _permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                if self.transition(job_id, |job| job.start()) {
                    self.broadcast(JobEvent::Started { job_id });
                }
                self.finish(job_id, Err(format!("Worker pool unavailable: {}", e)));
                return;
            }
        };

        if !self.transition(job_id, |job| job.start()) {
            tracing::warn!("Job {} could not be started", job_id);
            return;
        }
        tracing::info!("Job {} running", job_id);
        self.broadcast(JobEvent::Started { job_id });

        let processor = self.processor.clone();
        let output_dir = self.outputs_root.join(video_id.as_str());
        let result = tokio::task::spawn_blocking(move || {
            processor.run(&video_id, &input_path, &output_dir, &config)
        })
        .await;

        let outcome = match result {
            Ok(Ok(artifacts)) => Ok(artifacts),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("Pipeline worker aborted: {}", e)),
        };
        self.finish(job_id, outcome);
    }

    fn finish(&self, job_id: JobId, outcome: Result<Artifacts, String>) {
        match outcome {
            Ok(artifacts) => {
                let mut completed = None;
                self.transition(job_id, |job| {
                    let applied = job.complete(artifacts);
                    if applied {
                        completed = Some(job.clone());
                    }
                    applied
                });
                if let Some(job) = completed {
                    tracing::info!("Job {} completed", job_id);
                    self.broadcast(JobEvent::Completed { job });
                }
            }
            Err(error) => {
                if self.transition(job_id, |job| job.fail(error.clone())) {
                    tracing::error!("Job {} failed: {}", job_id, error);
                    self.broadcast(JobEvent::Failed { job_id, error });
                }
            }
        }
    }

    /// Apply `f` to the job under the lock. Returns whether it changed state.
    fn transition<F>(&self, job_id: JobId, f: F) -> bool
    where
        F: FnOnce(&mut JobRecord) -> bool,
    {
        let mut jobs = self.jobs.lock();
        match jobs.get_mut(&job_id) {
            Some(job) => f(job),
            None => false,
        }
    }

    /// Number of jobs not yet in a terminal state.
    pub fn active_count(&self) -> usize {
        self.jobs
            .lock()
            .values()
            .filter(|job| matches!(job.status, JobStatus::Pending | JobStatus::Running))
            .count()
    }
}
