//! Job progress events.
//!
//! The pipeline engine emits an [`Event`] for every state change of a job.
//! Events travel over a channel from the core to whoever observes jobs (the
//! HTTP server logs them, the `run` command prints them).
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "stageStarted",
//!   "payload": {
//!     "job_id": "uuid-here",
//!     "stage": "Generating Voiceover"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::job_models::JobStatus;
use crate::pipeline_models::Stage;

/// Events sent from the core to job observers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A job task has started running.
    JobStarted {
        #[ts(type = "string")]
        job_id: Uuid,
    },

    /// A job's lifecycle status has changed.
    JobStatusUpdate {
        #[ts(type = "string")]
        job_id: Uuid,
        status: JobStatus,
    },

    /// A job is about to perform the work of a stage.
    StageStarted {
        #[ts(type = "string")]
        job_id: Uuid,
        stage: Stage,
    },

    /// A job has produced a log line.
    JobLogChunk {
        #[ts(type = "string")]
        job_id: Uuid,
        content: String,
    },

    /// A job has uploaded its video.
    JobCompleted {
        #[ts(type = "string")]
        job_id: Uuid,
        youtube_link: String,
    },

    /// A job stopped because of an error.
    JobFailed {
        #[ts(type = "string")]
        job_id: Uuid,
        stage: Option<Stage>,
        error: String,
    },

    /// A job stopped because it was cancelled.
    JobCancelled {
        #[ts(type = "string")]
        job_id: Uuid,
        stage: Option<Stage>,
    },
}

impl Event {
    /// Id of the job this event belongs to.
    pub fn job_id(&self) -> Uuid {
        match self {
            Event::JobStarted { job_id }
            | Event::JobStatusUpdate { job_id, .. }
            | Event::StageStarted { job_id, .. }
            | Event::JobLogChunk { job_id, .. }
            | Event::JobCompleted { job_id, .. }
            | Event::JobFailed { job_id, .. }
            | Event::JobCancelled { job_id, .. } => *job_id,
        }
    }

    /// Whether this event ends a job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::JobCompleted { .. } | Event::JobFailed { .. } | Event::JobCancelled { .. }
        )
    }
}
