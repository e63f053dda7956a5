//! Generator traits and supporting types.
//!
//! Each external service the pipeline talks to is hidden behind one trait:
//! story text, illustration, narration and video upload. The pipeline engine
//! only sees these traits, so vendors can be swapped (or mocked) freely.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tp_protocol::pipeline_models::UploadMetadata;

/// Request for a story text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    /// Model identifier, e.g. "gpt-4-turbo".
    pub model: String,

    /// Fixed instruction constraining language and theme.
    pub system_prompt: String,
}

/// Request for an illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,

    /// Requested size, e.g. "1024x1024".
    pub size: String,
}

/// Where a generated image can be obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A URL the image must be fetched from (`http(s)://` or `file://`).
    Url(String),
    /// Encoded image bytes returned inline.
    Bytes(Vec<u8>),
}

/// Request for narration audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    /// The full text to narrate.
    pub text: String,

    /// Voice name or id.
    pub voice: String,
    pub model: String,
}

/// Encoded narration audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,

    /// File extension matching the encoding, e.g. "mp3".
    pub extension: String,
}

/// Request to publish a finished video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub video_path: PathBuf,
    pub metadata: UploadMetadata,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Identifier assigned by the hosting platform.
    pub video_id: String,
}

impl UploadReceipt {
    /// Canonical watch URL of the uploaded video.
    pub fn watch_url(&self) -> String {
        tp_protocol::job_models::watch_url(&self.video_id)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Generator not available: {0}")]
    NotAvailable(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API call failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for GeneratorError {
    fn from(e: reqwest::Error) -> Self {
        GeneratorError::Http(e.to_string())
    }
}

impl From<std::io::Error> for GeneratorError {
    fn from(e: std::io::Error) -> Self {
        GeneratorError::Io(e.to_string())
    }
}

#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Short provider name used in logs and availability reports.
    fn provider(&self) -> &'static str;

    async fn check_availability(&self) -> bool {
        true
    }

    async fn generate_story(&self, request: &StoryRequest) -> Result<String, GeneratorError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn check_availability(&self) -> bool {
        true
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageSource, GeneratorError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn check_availability(&self) -> bool {
        true
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, GeneratorError>;
}

#[async_trait]
pub trait VideoUploader: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn check_availability(&self) -> bool {
        true
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, GeneratorError>;
}
