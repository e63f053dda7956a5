//! Job manager for launching and tracking story jobs.
//!
//! The JobManager is the central registry of all jobs of this process. Every
//! job gets its own lock-guarded record, cancellation token and tokio task, so
//! any number of jobs may run at once without sharing mutable state.

use crate::engine::PipelineEngine;
use crate::state::job::create_job;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tp_protocol::ipc::Event;
use tp_protocol::job_models::{Job, JobStatus, StatusRecord};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A job record shared between its task and the pollers.
pub type SharedJob = Arc<RwLock<Job>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Job {id} has already finished ({status:?})")]
    AlreadyFinished { id: Uuid, status: JobStatus },
}

struct JobEntry {
    job: SharedJob,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// Manages all jobs of this process.
///
/// At most `storage.max_jobs` records are kept. Past that, the oldest finished
/// jobs are forgotten; running jobs and the latest job never are. Nothing is
/// persisted.
pub struct JobManager {
    /// Registry of all jobs, indexed by their UUID.
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,

    /// Most recently launched job; its status is what `/status` reports.
    latest: Arc<RwLock<Option<Uuid>>>,

    engine: Arc<PipelineEngine>,

    max_jobs: usize,

    /// Channel for publishing job events.
    events_tx: mpsc::Sender<Event>,
}

impl JobManager {
    /// Create a new JobManager.
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine every job runs on
    /// * `events_tx` - Channel for publishing job events
    pub fn new(engine: PipelineEngine, events_tx: mpsc::Sender<Event>) -> Self {
        let max_jobs = engine.config().storage.max_jobs.max(1);
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            latest: Arc::new(RwLock::new(None)),
            engine: Arc::new(engine),
            max_jobs,
            events_tx,
        }
    }

    pub fn engine(&self) -> &Arc<PipelineEngine> {
        &self.engine
    }

    /// Launch a new job in the background and return its id immediately.
    ///
    /// The job is registered (as `Pending`) and becomes the latest job before
    /// its task is spawned, so a status poll right after this call already
    /// sees it. Launching while another job runs starts an independent job.
    pub async fn start_job(&self) -> Uuid {
        let job = create_job();
        let job_id = job.id;
        let shared: SharedJob = Arc::new(RwLock::new(job));
        let cancel = CancellationToken::new();

        self.jobs.write().await.insert(
            job_id,
            JobEntry {
                job: Arc::clone(&shared),
                cancel: cancel.clone(),
                handle: None,
            },
        );
        *self.latest.write().await = Some(job_id);
        self.evict_finished(job_id).await;

        let engine = Arc::clone(&self.engine);
        let events_tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = engine.run(shared, cancel, events_tx).await {
                debug!(%job_id, error = %e, "Job task ended without completing");
            }
        });

        if let Some(entry) = self.jobs.write().await.get_mut(&job_id) {
            entry.handle = Some(handle);
        }

        info!(%job_id, "Job launched");
        job_id
    }

    /// Status of the most recently launched job, or `Idle` if there is none.
    pub async fn latest_status(&self) -> StatusRecord {
        let latest = *self.latest.read().await;
        match latest {
            Some(job_id) => self
                .job_status(job_id)
                .await
                .unwrap_or_else(StatusRecord::idle),
            None => StatusRecord::idle(),
        }
    }

    /// Status record of one job.
    pub async fn job_status(&self, job_id: Uuid) -> Option<StatusRecord> {
        self.get_job(job_id).await.map(|job| job.status_record())
    }

    /// Get a snapshot of a job.
    pub async fn get_job(&self, job_id: Uuid) -> Option<Job> {
        let shared = self.shared_job(job_id).await?;
        let job = shared.read().await;
        Some(job.clone())
    }

    /// Snapshots of all jobs, newest first.
    pub async fn list_jobs(&self) -> Vec<Job> {
        let shared: Vec<SharedJob> = {
            let jobs = self.jobs.read().await;
            jobs.values().map(|entry| Arc::clone(&entry.job)).collect()
        };

        let mut result = Vec::with_capacity(shared.len());
        for job in shared {
            result.push(job.read().await.clone());
        }
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Number of jobs launched by this manager.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Request cancellation of a job.
    ///
    /// The running stage is abandoned and the job becomes `Cancelled` once its
    /// task observes the token.
    ///
    /// # Errors
    ///
    /// - `JobError::NotFound` if no job has this id
    /// - `JobError::AlreadyFinished` if the job is already terminal
    pub async fn cancel_job(&self, job_id: Uuid) -> Result<(), JobError> {
        let (shared, cancel) = {
            let jobs = self.jobs.read().await;
            let entry = jobs.get(&job_id).ok_or(JobError::NotFound(job_id))?;
            (Arc::clone(&entry.job), entry.cancel.clone())
        };

        let status = shared.read().await.status;
        if status.is_terminal() {
            return Err(JobError::AlreadyFinished { id: job_id, status });
        }

        cancel.cancel();
        info!(%job_id, "Cancellation requested");
        Ok(())
    }

    /// Wait for a job's task to finish and return its final record.
    pub async fn wait_for(&self, job_id: Uuid) -> Option<Job> {
        let handle = {
            let mut jobs = self.jobs.write().await;
            jobs.get_mut(&job_id)?.handle.take()
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(%job_id, error = %e, "Job task panicked");
            }
        }
        self.get_job(job_id).await
    }

    /// Cancel every unfinished job and wait for all job tasks to end.
    pub async fn shutdown(&self) -> Result<()> {
        let handles: Vec<(Uuid, JoinHandle<()>)> = {
            let mut jobs = self.jobs.write().await;
            jobs.iter_mut()
                .filter_map(|(id, entry)| {
                    entry.cancel.cancel();
                    entry.handle.take().map(|handle| (*id, handle))
                })
                .collect()
        };

        info!(jobs = handles.len(), "Shutting down job manager");
        for (job_id, handle) in handles {
            handle
                .await
                .with_context(|| format!("Job {job_id} task panicked during shutdown"))?;
        }
        Ok(())
    }

    /// Drop the oldest finished jobs until at most `max_jobs` remain.
    async fn evict_finished(&self, keep: Uuid) {
        let candidates: Vec<(Uuid, SharedJob)> = {
            let jobs = self.jobs.read().await;
            if jobs.len() <= self.max_jobs {
                return;
            }
            jobs.iter()
                .filter(|(id, _)| **id != keep)
                .map(|(id, entry)| (*id, Arc::clone(&entry.job)))
                .collect()
        };

        let mut finished = Vec::new();
        for (id, job) in candidates {
            let job = job.read().await;
            if job.status.is_terminal() {
                finished.push((job.created_at, id));
            }
        }
        finished.sort();

        let mut jobs = self.jobs.write().await;
        let excess = jobs.len().saturating_sub(self.max_jobs);
        for (_, id) in finished.into_iter().take(excess) {
            jobs.remove(&id);
            debug!(job_id = %id, "Finished job evicted from registry");
        }
    }

    async fn shared_job(&self, job_id: Uuid) -> Option<SharedJob> {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id).map(|entry| Arc::clone(&entry.job))
    }
}
