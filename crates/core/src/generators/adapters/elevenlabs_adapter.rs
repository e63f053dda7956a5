//! ElevenLabs text-to-speech adapter.
//!
//! The configured voice may be a display name ("Arvind") or a voice id. Names
//! are resolved through the voices listing; anything that does not match a
//! listed name is sent as an id unchanged.

use crate::generators::base::{
    GeneratorError, SpeechRequest, SpeechSynthesizer, SynthesizedAudio,
};
use crate::generators::http::{ensure_success, HttpExecutor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io/v1";

pub struct ElevenLabsAdapter {
    http: HttpExecutor,
    api_key: String,
    base_url: String,
}

impl ElevenLabsAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            http: HttpExecutor::new(),
            api_key,
            base_url: ELEVENLABS_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn resolve_voice_id(&self, voice: &str) -> Result<String, GeneratorError> {
        let response = self
            .http
            .client()
            .get(format!("{}/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        let listing: VoicesResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        match find_voice_id(&listing, voice) {
            Some(id) => Ok(id),
            None => {
                warn!(voice, "Voice name not found in listing, using it as a voice id");
                Ok(voice.to_string())
            }
        }
    }
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceEntry>,
}

#[derive(Deserialize)]
struct VoiceEntry {
    voice_id: String,
    name: String,
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

fn find_voice_id(listing: &VoicesResponse, voice: &str) -> Option<String> {
    listing
        .voices
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(voice) || entry.voice_id == voice)
        .map(|entry| entry.voice_id.clone())
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsAdapter {
    fn provider(&self) -> &'static str {
        "elevenlabs"
    }

    async fn check_availability(&self) -> bool {
        !self.api_key.is_empty()
    }

    #[instrument(skip(self, request), fields(voice = %request.voice, chars = request.text.chars().count()))]
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, GeneratorError> {
        let voice_id = self.resolve_voice_id(&request.voice).await?;
        debug!(%voice_id, "Requesting narration");

        let body = SpeechBody {
            text: &request.text,
            model_id: &request.model,
        };

        let response = self
            .http
            .client()
            .post(format!("{}/text-to-speech/{}", self.base_url, voice_id))
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(GeneratorError::InvalidResponse(
                "Speech response was empty".to_string(),
            ));
        }

        Ok(SynthesizedAudio {
            bytes: bytes.to_vec(),
            extension: "mp3".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> VoicesResponse {
        serde_json::from_str(
            r#"{"voices":[
                {"voice_id":"v-001","name":"Rachel","category":"premade"},
                {"voice_id":"v-002","name":"Arvind","category":"cloned"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_voice_by_name() {
        assert_eq!(find_voice_id(&listing(), "Arvind"), Some("v-002".to_string()));
        assert_eq!(find_voice_id(&listing(), "arvind"), Some("v-002".to_string()));
    }

    #[test]
    fn test_find_voice_by_id() {
        assert_eq!(find_voice_id(&listing(), "v-001"), Some("v-001".to_string()));
    }

    #[test]
    fn test_unknown_voice() {
        assert_eq!(find_voice_id(&listing(), "Nobody"), None);
    }

    #[test]
    fn test_speech_body_shape() {
        let body = SpeechBody {
            text: "नमस्ते",
            model_id: "eleven_multilingual_v2",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "नमस्ते");
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
    }

    #[tokio::test]
    async fn test_availability_requires_key() {
        assert!(ElevenLabsAdapter::new("xi".to_string()).check_availability().await);
        assert!(!ElevenLabsAdapter::new(String::new()).check_availability().await);
    }
}
