//! Runtime job state models.
//!
//! This module defines the structures for tracking the state of running
//! story jobs and the compact status view served to pollers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::pipeline_models::Stage;

/// Step label reported before any job has been launched.
pub const STEP_IDLE: &str = "Idle";
/// Step label reported once the upload has succeeded.
pub const STEP_COMPLETE: &str = "Complete";
/// Step label reported after a stage failed or timed out.
pub const STEP_FAILED: &str = "Failed";
/// Step label reported after the job was cancelled.
pub const STEP_CANCELLED: &str = "Cancelled";

/// Base of the canonical watch URL built from an upload id.
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Represents the current lifecycle status of a story job.
///
/// The status progresses through these states during normal execution:
/// Pending -> Running -> Completed
///
/// Terminal states:
/// - Completed: the video was uploaded
/// - Failed: a stage returned an error or hit its deadline
/// - Cancelled: the job was cancelled on request
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum JobStatus {
    /// Job has been registered but its task has not started yet.
    Pending,

    /// Job is executing one of its stages.
    Running,

    /// Job has uploaded its video.
    Completed,

    /// Job stopped because of an error.
    Failed,

    /// Job stopped because it was cancelled.
    Cancelled,
}

impl JobStatus {
    /// Whether the job can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

/// Represents the runtime state of a single story job.
///
/// Each launch creates a new Job with a unique ID. The job record is owned by
/// the job manager and only mutated by the task running that job.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
#[ts(export)]
pub struct Job {
    /// Unique identifier for this job.
    #[ts(type = "string")]
    pub id: Uuid,

    /// Current lifecycle status.
    pub status: JobStatus,

    /// Stage currently running, or the last stage announced before the job
    /// stopped. `None` until the first stage starts.
    pub stage: Option<Stage>,

    /// Watch URL of the uploaded video; empty until the upload succeeds.
    pub youtube_link: String,

    /// Cause of the failure when `status` is `Failed` or `Cancelled`.
    pub error: Option<String>,

    /// Accumulated log messages from this job.
    pub logs: Vec<String>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,

    #[ts(type = "string | null")]
    pub started_at: Option<DateTime<Utc>>,

    #[ts(type = "string | null")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// The step label a poller sees for this job.
    pub fn step_label(&self) -> &'static str {
        match self.status {
            JobStatus::Completed => STEP_COMPLETE,
            JobStatus::Failed => STEP_FAILED,
            JobStatus::Cancelled => STEP_CANCELLED,
            JobStatus::Pending | JobStatus::Running => {
                self.stage.map(Stage::label).unwrap_or(STEP_IDLE)
            }
        }
    }

    /// Compact status view of this job.
    pub fn status_record(&self) -> StatusRecord {
        StatusRecord {
            step: self.step_label().to_string(),
            youtube_link: self.youtube_link.clone(),
            error: self.error.clone(),
        }
    }
}

/// Snapshot of pipeline progress served by the status endpoint.
///
/// Serializes as `{"step": ..., "youtube_link": ...}`; `error` is only present
/// for failed or cancelled jobs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[ts(export)]
pub struct StatusRecord {
    /// Label of the running stage, or one of `Idle`, `Complete`, `Failed`, `Cancelled`.
    pub step: String,

    /// Watch URL of the uploaded video; empty until the upload succeeds.
    pub youtube_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl StatusRecord {
    /// Status reported before any job has been launched.
    pub fn idle() -> Self {
        Self {
            step: STEP_IDLE.to_string(),
            youtube_link: String::new(),
            error: None,
        }
    }
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self::idle()
    }
}

/// Reply to a job launch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[ts(export)]
pub struct StartResponse {
    pub status: String,

    #[ts(type = "string")]
    pub job_id: Uuid,
}

impl StartResponse {
    pub fn started(job_id: Uuid) -> Self {
        Self {
            status: "Pipeline started".to_string(),
            job_id,
        }
    }
}

/// Builds the canonical watch URL for an uploaded video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}
