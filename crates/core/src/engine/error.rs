use crate::generators::GeneratorError;
use crate::media::MediaError;
use crate::storage::StorageError;
use std::time::Duration;
use thiserror::Error;
use tp_protocol::pipeline_models::Stage;

/// Why a job did not complete.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: GeneratorError,
    },

    #[error("{stage} failed: {source}")]
    Media {
        stage: Stage,
        #[source]
        source: MediaError,
    },

    #[error("{stage} failed: {source}")]
    Storage {
        stage: Stage,
        #[source]
        source: StorageError,
    },

    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout { stage: Stage, after: Duration },

    #[error("Cancelled during {stage}")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    /// Stage the job was in when it stopped.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Upstream { stage, .. }
            | PipelineError::Media { stage, .. }
            | PipelineError::Storage { stage, .. }
            | PipelineError::Timeout { stage, .. }
            | PipelineError::Cancelled { stage } => *stage,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}
