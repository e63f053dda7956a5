//! Generator factory for building adapters from configuration.

use crate::config::models::{
    Credentials, ELEVENLABS_API_KEY_VAR, OPENAI_API_KEY_VAR, YOUTUBE_ACCESS_TOKEN_VAR,
};
use crate::generators::adapters::{
    ElevenLabsAdapter, MockImageGenerator, MockSpeechSynthesizer, MockStoryGenerator,
    MockVideoUploader, OpenAiAdapter, YouTubeAdapter,
};
use crate::generators::base::{
    GeneratorError, ImageGenerator, SpeechSynthesizer, StoryGenerator, VideoUploader,
};
use crate::generators::provider_kind::{GeneratorRole, ProviderKind};
use crate::generators::set::GeneratorSet;
use std::sync::Arc;
use tp_protocol::config_models::PipelineConfig;
use tracing::warn;

/// Factory for creating generator instances based on configuration.
///
/// Each role names its provider in `talepipe.toml` (`story.provider`,
/// `image.provider`, `voice.provider`, `upload.provider`). A provider that has
/// no adapter for the role, or an unknown name, is a `NotAvailable` error.
/// A missing credential is not: the adapter is built with an empty key, logs a
/// warning and reports itself unavailable to `talepipe check`.
pub struct GeneratorFactory;

impl GeneratorFactory {
    /// Build the full generator set.
    ///
    /// # Examples
    ///
    /// ```
    /// use tp_core::config::Credentials;
    /// use tp_core::generators::GeneratorFactory;
    /// use tp_protocol::config_models::PipelineConfig;
    ///
    /// let mut config = PipelineConfig::default();
    /// config.story.provider = "mock".to_string();
    /// config.image.provider = "mock".to_string();
    /// config.voice.provider = "mock".to_string();
    /// config.upload.provider = "mock".to_string();
    ///
    /// let set = GeneratorFactory::create(&config, &Credentials::default()).unwrap();
    /// assert_eq!(set.story.provider(), "mock");
    /// ```
    pub fn create(
        config: &PipelineConfig,
        credentials: &Credentials,
    ) -> Result<GeneratorSet, GeneratorError> {
        Ok(GeneratorSet {
            story: Self::story(&config.story.provider, credentials)?,
            image: Self::image(&config.image.provider, credentials, config)?,
            speech: Self::speech(&config.voice.provider, credentials)?,
            uploader: Self::uploader(&config.upload.provider, credentials)?,
        })
    }

    fn story(
        provider: &str,
        credentials: &Credentials,
    ) -> Result<Arc<dyn StoryGenerator>, GeneratorError> {
        match Self::resolve(provider, GeneratorRole::Story)? {
            ProviderKind::OpenAi => Ok(Arc::new(OpenAiAdapter::new(Self::secret(
                &credentials.openai_api_key,
                OPENAI_API_KEY_VAR,
            )))),
            _ => Ok(Arc::new(MockStoryGenerator::default())),
        }
    }

    fn image(
        provider: &str,
        credentials: &Credentials,
        config: &PipelineConfig,
    ) -> Result<Arc<dyn ImageGenerator>, GeneratorError> {
        match Self::resolve(provider, GeneratorRole::Image)? {
            ProviderKind::OpenAi => Ok(Arc::new(OpenAiAdapter::new(Self::secret(
                &credentials.openai_api_key,
                OPENAI_API_KEY_VAR,
            )))),
            _ => {
                let (width, height) = parse_size(&config.image.size).unwrap_or((10, 10));
                Ok(Arc::new(MockImageGenerator::success(width, height)))
            }
        }
    }

    fn speech(
        provider: &str,
        credentials: &Credentials,
    ) -> Result<Arc<dyn SpeechSynthesizer>, GeneratorError> {
        match Self::resolve(provider, GeneratorRole::Speech)? {
            ProviderKind::ElevenLabs => Ok(Arc::new(ElevenLabsAdapter::new(Self::secret(
                &credentials.elevenlabs_api_key,
                ELEVENLABS_API_KEY_VAR,
            )))),
            _ => Ok(Arc::new(MockSpeechSynthesizer::default())),
        }
    }

    fn uploader(
        provider: &str,
        credentials: &Credentials,
    ) -> Result<Arc<dyn VideoUploader>, GeneratorError> {
        match Self::resolve(provider, GeneratorRole::Upload)? {
            ProviderKind::YouTube => Ok(Arc::new(YouTubeAdapter::new(Self::secret(
                &credentials.youtube_access_token,
                YOUTUBE_ACCESS_TOKEN_VAR,
            )))),
            _ => Ok(Arc::new(MockVideoUploader::default())),
        }
    }

    fn resolve(provider: &str, role: GeneratorRole) -> Result<ProviderKind, GeneratorError> {
        let kind = ProviderKind::from_name(provider).ok_or_else(|| {
            GeneratorError::NotAvailable(format!("Unknown {role} provider '{provider}'"))
        })?;

        if !kind.supports(role) {
            return Err(GeneratorError::NotAvailable(format!(
                "{} cannot be used as the {role} provider",
                kind.name()
            )));
        }
        Ok(kind)
    }

    fn secret(value: &Option<String>, var: &str) -> String {
        match value {
            Some(secret) => secret.clone(),
            None => {
                warn!(var, "Credential not set; the adapter will report itself unavailable");
                String::new()
            }
        }
    }
}

/// Parse "WIDTHxHEIGHT".
fn parse_size(size: &str) -> Option<(u32, u32)> {
    let (width, height) = size.split_once(['x', 'X'])?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}
