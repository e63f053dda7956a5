use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or encoding media.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to probe duration of {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("Image processing failed: {0}")]
    Image(String),

    #[error("Input file missing: {0}")]
    MissingInput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for MediaError {
    fn from(e: image::ImageError) -> Self {
        MediaError::Image(e.to_string())
    }
}
