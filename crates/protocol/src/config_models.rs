//! Configuration models for `talepipe.toml`.
//!
//! Every section and field has a default, so an empty file (or no file at all)
//! reproduces the stock pipeline: a Hindi moral story from OpenAI, a DALL-E
//! illustration, ElevenLabs narration and a public YouTube upload.
//!
//! Credentials are never read from this file; they come from the environment.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::pipeline_models::{CompositionStrategy, Stage, UploadMetadata};

/// Represents the complete settings from `talepipe.toml`.
///
/// # Example
///
/// ```toml
/// [server]
/// bind = "127.0.0.1:8080"
///
/// [video]
/// strategy = "frame-sequence"
/// fps = 25
///
/// [timeouts]
/// upload_secs = 1200
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
#[serde(default)]
pub struct PipelineConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub story: StorySettings,
    pub image: ImageSettings,
    pub voice: VoiceSettings,
    pub video: VideoSettings,
    pub upload: UploadSettings,
    pub timeouts: TimeoutSettings,
}

/// HTTP front end settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the server listens on.
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Where job artifacts are written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct StorageSettings {
    /// Base directory; each job writes into `<work_dir>/<job_id>/`.
    pub work_dir: String,

    /// Keep a job's directory after a successful upload.
    pub keep_artifacts: bool,

    /// Job records kept in memory. Older finished jobs are forgotten first.
    pub max_jobs: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            work_dir: "output".to_string(),
            keep_artifacts: true,
            max_jobs: 100,
        }
    }
}

/// Story text generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct StorySettings {
    /// Provider name, e.g. "openai" or "mock".
    pub provider: String,
    pub model: String,

    /// Fixed instruction constraining language and theme.
    pub system_prompt: String,
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4-turbo".to_string(),
            system_prompt: "Generate a short moral children's story in Hindi.".to_string(),
        }
    }
}

/// Illustration generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ImageSettings {
    pub provider: String,
    pub model: String,

    /// Size requested from the image model, e.g. "1024x1024".
    pub size: String,

    /// Stylistic wrapper; `{story}` is replaced by the story prefix.
    pub prompt_template: String,

    /// Number of story characters inserted into the prompt.
    pub prompt_chars: usize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            prompt_template: "Pixar-style image of {story}...".to_string(),
            prompt_chars: 50,
        }
    }
}

/// Narration synthesis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct VoiceSettings {
    pub provider: String,

    /// Voice name or voice id.
    pub voice: String,
    pub model: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            provider: "elevenlabs".to_string(),
            voice: "Arvind".to_string(),
            model: "eleven_multilingual_v2".to_string(),
        }
    }
}

/// Video composition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub strategy: CompositionStrategy,
    pub fps: u32,

    /// Reported video length when neither the narration nor the finished
    /// video can be measured.
    pub fallback_duration_secs: u64,

    /// Path or name of the ffmpeg executable.
    pub ffmpeg: String,

    /// Path or name of the ffprobe executable.
    pub ffprobe: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            strategy: CompositionStrategy::LoopStill,
            fps: 25,
            fallback_duration_secs: 10,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Video publishing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct UploadSettings {
    pub provider: String,
    pub metadata: UploadMetadata,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            provider: "youtube".to_string(),
            metadata: UploadMetadata::default(),
        }
    }
}

/// Per-stage deadlines in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct TimeoutSettings {
    pub story_secs: u64,
    pub image_secs: u64,
    pub voice_secs: u64,
    pub video_secs: u64,
    pub upload_secs: u64,
}

impl TimeoutSettings {
    /// Deadline for the given stage, in seconds.
    pub fn secs_for(&self, stage: Stage) -> u64 {
        match stage {
            Stage::GeneratingStory => self.story_secs,
            Stage::GeneratingStoryImage => self.image_secs,
            Stage::GeneratingVoiceover => self.voice_secs,
            Stage::CreatingVideo => self.video_secs,
            Stage::UploadingToYoutube => self.upload_secs,
        }
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            story_secs: 120,
            image_secs: 180,
            voice_secs: 180,
            video_secs: 600,
            upload_secs: 900,
        }
    }
}
