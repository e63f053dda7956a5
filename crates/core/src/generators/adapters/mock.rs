//! In-process generators for dry runs and tests.
//!
//! Every mock can succeed, fail with a given message or report itself
//! unavailable, can be slowed down with a delay, and records the requests it
//! receives so callers can assert on what the pipeline sent.

use crate::generators::base::{
    GeneratorError, ImageGenerator, ImageRequest, ImageSource, SpeechRequest, SpeechSynthesizer,
    StoryGenerator, StoryRequest, SynthesizedAudio, UploadReceipt, UploadRequest, VideoUploader,
};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MOCK_STORY: &str = "A fox learns honesty.";
pub const MOCK_VIDEO_ID: &str = "abc123";

const WAV_SAMPLE_RATE: u32 = 8_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Behavior {
    Succeed,
    Fail(String),
    Unavailable,
}

impl Behavior {
    fn is_available(&self) -> bool {
        !matches!(self, Behavior::Unavailable)
    }

    fn check(&self, provider: &str) -> Result<(), GeneratorError> {
        match self {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(GeneratorError::Api {
                status: 500,
                message: message.clone(),
            }),
            Behavior::Unavailable => Err(GeneratorError::NotAvailable(format!(
                "{provider} is not available"
            ))),
        }
    }
}

/// Shared request log; clones of a mock append to the same log.
#[derive(Debug)]
struct Recorder<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T: Clone> Recorder<T> {
    fn record(&self, request: &T) {
        if let Ok(mut log) = self.0.lock() {
            log.push(request.clone());
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.0.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone)]
pub struct MockStoryGenerator {
    behavior: Behavior,
    story: String,
    delay: Option<Duration>,
    requests: Recorder<StoryRequest>,
}

impl MockStoryGenerator {
    pub fn success(story: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Succeed,
            story: story.into(),
            delay: None,
            requests: Recorder::default(),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            ..Self::success("")
        }
    }

    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior::Unavailable,
            ..Self::success("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<StoryRequest> {
        self.requests.snapshot()
    }
}

impl Default for MockStoryGenerator {
    fn default() -> Self {
        Self::success(MOCK_STORY)
    }
}

#[async_trait]
impl StoryGenerator for MockStoryGenerator {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn check_availability(&self) -> bool {
        self.behavior.is_available()
    }

    async fn generate_story(&self, request: &StoryRequest) -> Result<String, GeneratorError> {
        self.requests.record(request);
        pause(self.delay).await;
        self.behavior.check("mock story generator")?;
        Ok(self.story.clone())
    }
}

/// Encode a solid-colour PNG.
pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Result<Vec<u8>, GeneratorError> {
    let image = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| GeneratorError::InvalidResponse(format!("Failed to encode PNG: {e}")))?;
    Ok(bytes)
}

#[derive(Debug, Clone)]
pub struct MockImageGenerator {
    behavior: Behavior,
    source: Option<ImageSource>,
    width: u32,
    height: u32,
    delay: Option<Duration>,
    requests: Recorder<ImageRequest>,
}

impl MockImageGenerator {
    /// Produces a solid PNG of the given size.
    pub fn success(width: u32, height: u32) -> Self {
        Self {
            behavior: Behavior::Succeed,
            source: None,
            width,
            height,
            delay: None,
            requests: Recorder::default(),
        }
    }

    /// Answers every request with the given source (e.g. a `file://` URL).
    pub fn with_source(source: ImageSource) -> Self {
        Self {
            source: Some(source),
            ..Self::success(1, 1)
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            ..Self::success(1, 1)
        }
    }

    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior::Unavailable,
            ..Self::success(1, 1)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.snapshot()
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::success(10, 10)
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn check_availability(&self) -> bool {
        self.behavior.is_available()
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageSource, GeneratorError> {
        self.requests.record(request);
        pause(self.delay).await;
        self.behavior.check("mock image generator")?;

        match &self.source {
            Some(source) => Ok(source.clone()),
            None => Ok(ImageSource::Bytes(solid_png(
                self.width,
                self.height,
                [240, 160, 60],
            )?)),
        }
    }
}

/// Encode `seconds` of 16-bit mono silence as a WAV file.
pub fn silent_wav(seconds: f64) -> Vec<u8> {
    let samples = (seconds.max(0.0) * f64::from(WAV_SAMPLE_RATE)).round() as u32;
    let data_len = samples * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&WAV_SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&(WAV_SAMPLE_RATE * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

#[derive(Debug, Clone)]
pub struct MockSpeechSynthesizer {
    behavior: Behavior,
    seconds: f64,
    delay: Option<Duration>,
    requests: Recorder<SpeechRequest>,
}

impl MockSpeechSynthesizer {
    /// Produces `seconds` of silent WAV audio.
    pub fn success(seconds: f64) -> Self {
        Self {
            behavior: Behavior::Succeed,
            seconds,
            delay: None,
            requests: Recorder::default(),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            ..Self::success(0.0)
        }
    }

    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior::Unavailable,
            ..Self::success(0.0)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.snapshot()
    }
}

impl Default for MockSpeechSynthesizer {
    fn default() -> Self {
        Self::success(2.0)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn check_availability(&self) -> bool {
        self.behavior.is_available()
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, GeneratorError> {
        self.requests.record(request);
        pause(self.delay).await;
        self.behavior.check("mock speech synthesizer")?;

        Ok(SynthesizedAudio {
            bytes: silent_wav(self.seconds),
            extension: "wav".to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockVideoUploader {
    behavior: Behavior,
    video_id: String,
    delay: Option<Duration>,
    requests: Recorder<UploadRequest>,
}

impl MockVideoUploader {
    pub fn success(video_id: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Succeed,
            video_id: video_id.into(),
            delay: None,
            requests: Recorder::default(),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            ..Self::success("")
        }
    }

    pub fn unavailable() -> Self {
        Self {
            behavior: Behavior::Unavailable,
            ..Self::success("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.snapshot()
    }
}

impl Default for MockVideoUploader {
    fn default() -> Self {
        Self::success(MOCK_VIDEO_ID)
    }
}

#[async_trait]
impl VideoUploader for MockVideoUploader {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn check_availability(&self) -> bool {
        self.behavior.is_available()
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, GeneratorError> {
        self.requests.record(request);
        pause(self.delay).await;
        self.behavior.check("mock video uploader")?;

        if !request.video_path.exists() {
            return Err(GeneratorError::Io(format!(
                "Video not found: {}",
                request.video_path.display()
            )));
        }

        Ok(UploadReceipt {
            video_id: self.video_id.clone(),
        })
    }
}
