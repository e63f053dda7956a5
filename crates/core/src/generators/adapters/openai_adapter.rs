//! OpenAI adapter for story text and illustrations.
//!
//! Story text comes from the chat completions endpoint, illustrations from the
//! images endpoint. The images endpoint answers with a URL which the engine
//! downloads afterwards.

use crate::generators::base::{
    GeneratorError, ImageGenerator, ImageRequest, ImageSource, StoryGenerator, StoryRequest,
};
use crate::generators::http::{ensure_success, HttpExecutor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI adapter implementing both `StoryGenerator` and `ImageGenerator`.
pub struct OpenAiAdapter {
    http: HttpExecutor,
    api_key: String,
    base_url: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Value of `OPENAI_API_KEY`
    pub fn new(api_key: String) -> Self {
        Self {
            http: HttpExecutor::new(),
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
        }
    }

    /// Point the adapter at a different API root (OpenAI-compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

fn story_from_response(response: ChatResponse) -> Result<String, GeneratorError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| GeneratorError::InvalidResponse("Chat response has no content".to_string()))
}

fn image_from_response(response: ImagesResponse) -> Result<ImageSource, GeneratorError> {
    response
        .data
        .into_iter()
        .next()
        .and_then(|data| data.url)
        .map(ImageSource::Url)
        .ok_or_else(|| GeneratorError::InvalidResponse("Image response has no URL".to_string()))
}

#[async_trait]
impl StoryGenerator for OpenAiAdapter {
    fn provider(&self) -> &'static str {
        "openai"
    }

    async fn check_availability(&self) -> bool {
        !self.api_key.is_empty()
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_story(&self, request: &StoryRequest) -> Result<String, GeneratorError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "system",
                content: &request.system_prompt,
            }],
        };

        debug!("Sending chat completion request");
        let response = self
            .http
            .client()
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        story_from_response(parsed)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiAdapter {
    fn provider(&self) -> &'static str {
        "openai"
    }

    async fn check_availability(&self) -> bool {
        !self.api_key.is_empty()
    }

    #[instrument(skip(self, request), fields(model = %request.model, size = %request.size))]
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageSource, GeneratorError> {
        let body = ImagesRequest {
            model: &request.model,
            prompt: &request.prompt,
            size: &request.size,
            n: 1,
        };

        debug!("Sending image generation request");
        let response = self
            .http
            .client()
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ImagesResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        image_from_response(parsed)
    }
}
