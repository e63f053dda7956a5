//! Test doubles for the media side of the pipeline.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tp_core::media::{CompositionOutput, CompositionRequest, Compositor, MediaError};

/// Compositor that writes a placeholder file instead of invoking ffmpeg.
///
/// Reports a 2 second video at 25 fps and records every request it receives.
#[derive(Debug, Clone, Default)]
pub struct StubCompositor {
    delay: Option<Duration>,
    fail_with: Option<String>,
    requests: Arc<Mutex<Vec<CompositionRequest>>>,
}

#[allow(dead_code)]
impl StubCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            fail_with: Some(stderr.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompositionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Compositor for StubCompositor {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn compose(&self, request: &CompositionRequest) -> Result<CompositionOutput, MediaError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(stderr) = &self.fail_with {
            return Err(MediaError::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: 1,
                stderr: stderr.clone(),
            });
        }

        if !request.image.exists() {
            return Err(MediaError::MissingInput(request.image.clone()));
        }
        if !request.audio.exists() {
            return Err(MediaError::MissingInput(request.audio.clone()));
        }

        tokio::fs::write(&request.output, b"stub mp4").await?;
        Ok(CompositionOutput {
            path: request.output.clone(),
            duration: Duration::from_secs(2),
            frame_count: 50,
        })
    }
}
