//! The four generators one pipeline run needs, bundled together.

use crate::generators::adapters::{
    MockImageGenerator, MockSpeechSynthesizer, MockStoryGenerator, MockVideoUploader,
};
use crate::generators::base::{ImageGenerator, SpeechSynthesizer, StoryGenerator, VideoUploader};
use crate::generators::provider_kind::GeneratorRole;
use std::sync::Arc;

#[derive(Clone)]
pub struct GeneratorSet {
    pub story: Arc<dyn StoryGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub uploader: Arc<dyn VideoUploader>,
}

/// Availability of one generator, as reported by `talepipe check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub role: GeneratorRole,
    pub provider: &'static str,
    pub available: bool,
}

impl GeneratorSet {
    /// A set of default mocks: the fox story, a 10x10 image, 2 s of silence
    /// and an uploader answering with "abc123".
    pub fn mock() -> Self {
        Self {
            story: Arc::new(MockStoryGenerator::default()),
            image: Arc::new(MockImageGenerator::default()),
            speech: Arc::new(MockSpeechSynthesizer::default()),
            uploader: Arc::new(MockVideoUploader::default()),
        }
    }

    /// Ask every generator whether it can serve requests.
    pub async fn check_availability(&self) -> Vec<Availability> {
        vec![
            Availability {
                role: GeneratorRole::Story,
                provider: self.story.provider(),
                available: self.story.check_availability().await,
            },
            Availability {
                role: GeneratorRole::Image,
                provider: self.image.provider(),
                available: self.image.check_availability().await,
            },
            Availability {
                role: GeneratorRole::Speech,
                provider: self.speech.provider(),
                available: self.speech.check_availability().await,
            },
            Availability {
                role: GeneratorRole::Upload,
                provider: self.uploader.provider(),
                available: self.uploader.check_availability().await,
            },
        ]
    }
}
