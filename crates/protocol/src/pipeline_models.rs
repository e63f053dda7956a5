//! Pipeline stage and publishing models.
//!
//! This module defines the fixed sequence of stages a story job walks through,
//! the video composition strategies and the metadata attached to an upload.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// One step of the story pipeline.
///
/// Stages always run in the order of [`Stage::ALL`]. The serialized form is the
/// human-readable label shown to pollers (e.g. `"Generating Story"`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[ts(export)]
pub enum Stage {
    /// Ask the language model for the story text.
    #[serde(rename = "Generating Story")]
    GeneratingStory,

    /// Render an illustration from a prefix of the story.
    #[serde(rename = "Generating Story Image")]
    GeneratingStoryImage,

    /// Synthesize the narration audio from the full story.
    #[serde(rename = "Generating Voiceover")]
    GeneratingVoiceover,

    /// Resize the illustration and mux it with the narration.
    #[serde(rename = "Creating Video")]
    CreatingVideo,

    /// Publish the finished video.
    #[serde(rename = "Uploading to YouTube")]
    UploadingToYoutube,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::GeneratingStory,
        Stage::GeneratingStoryImage,
        Stage::GeneratingVoiceover,
        Stage::CreatingVideo,
        Stage::UploadingToYoutube,
    ];

    /// Label reported through the status endpoint.
    pub fn label(self) -> &'static str {
        match self {
            Stage::GeneratingStory => "Generating Story",
            Stage::GeneratingStoryImage => "Generating Story Image",
            Stage::GeneratingVoiceover => "Generating Voiceover",
            Stage::CreatingVideo => "Creating Video",
            Stage::UploadingToYoutube => "Uploading to YouTube",
        }
    }

    /// Zero-based position of this stage in [`Stage::ALL`].
    pub fn index(self) -> usize {
        match self {
            Stage::GeneratingStory => 0,
            Stage::GeneratingStoryImage => 1,
            Stage::GeneratingVoiceover => 2,
            Stage::CreatingVideo => 3,
            Stage::UploadingToYoutube => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the compositor turns a still image into a video track.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionStrategy {
    /// Loop the single image as an input stream for the computed duration.
    #[default]
    LoopStill,

    /// Build a numbered sequence of identical frames and encode it.
    FrameSequence,
}

/// Visibility of an uploaded video.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Private => "private",
        }
    }
}

/// Title, description and classification attached to every upload.
///
/// # Example
///
/// ```toml
/// [upload.metadata]
/// title = "Hindi Story Short"
/// description = "A fun and engaging Hindi story for kids!"
/// tags = ["children", "Hindi", "story", "shorts"]
/// category_id = "24"
/// privacy = "public"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct UploadMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,

    /// Platform category; "24" is Entertainment on YouTube.
    pub category_id: String,

    pub privacy: PrivacyStatus,
}

impl Default for UploadMetadata {
    fn default() -> Self {
        Self {
            title: "Hindi Story Short".to_string(),
            description: "A fun and engaging Hindi story for kids!".to_string(),
            tags: ["children", "Hindi", "story", "shorts"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            category_id: "24".to_string(),
            privacy: PrivacyStatus::Public,
        }
    }
}
