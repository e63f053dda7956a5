//! YouTube Data API v3 uploader.
//!
//! Uses the resumable upload protocol: one request creates the upload session
//! with the video metadata, a second request sends the file to the session URL.
//! Uploading requires an OAuth 2.0 access token with the `youtube.upload` scope.

use crate::generators::base::{GeneratorError, UploadReceipt, UploadRequest, VideoUploader};
use crate::generators::http::{ensure_success, HttpExecutor};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tp_protocol::pipeline_models::UploadMetadata;
use tracing::{debug, info, instrument};

const YOUTUBE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";
const VIDEO_MIME: &str = "video/mp4";

pub struct YouTubeAdapter {
    http: HttpExecutor,
    access_token: String,
    upload_url: String,
}

impl YouTubeAdapter {
    /// # Arguments
    ///
    /// * `access_token` - Value of `YOUTUBE_ACCESS_TOKEN`
    pub fn new(access_token: String) -> Self {
        Self {
            http: HttpExecutor::new(),
            access_token,
            upload_url: YOUTUBE_UPLOAD_URL.to_string(),
        }
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    async fn open_session(
        &self,
        metadata: &UploadMetadata,
        content_length: usize,
    ) -> Result<String, GeneratorError> {
        let response = self
            .http
            .client()
            .post(&self.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Type", VIDEO_MIME)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(&VideoResource::from(metadata))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                GeneratorError::InvalidResponse("Upload session has no Location header".to_string())
            })
    }
}

#[derive(Serialize)]
struct VideoResource<'a> {
    snippet: Snippet<'a>,
    status: VideoStatus<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    category_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus<'a> {
    privacy_status: &'a str,
}

impl<'a> From<&'a UploadMetadata> for VideoResource<'a> {
    fn from(metadata: &'a UploadMetadata) -> Self {
        Self {
            snippet: Snippet {
                title: &metadata.title,
                description: &metadata.description,
                tags: &metadata.tags,
                category_id: &metadata.category_id,
            },
            status: VideoStatus {
                privacy_status: metadata.privacy.as_str(),
            },
        }
    }
}

#[derive(Deserialize)]
struct UploadedVideo {
    id: Option<String>,
}

fn receipt_from_response(video: UploadedVideo) -> Result<UploadReceipt, GeneratorError> {
    video
        .id
        .filter(|id| !id.is_empty())
        .map(|video_id| UploadReceipt { video_id })
        .ok_or_else(|| GeneratorError::InvalidResponse("Upload response has no video id".to_string()))
}

#[async_trait]
impl VideoUploader for YouTubeAdapter {
    fn provider(&self) -> &'static str {
        "youtube"
    }

    async fn check_availability(&self) -> bool {
        !self.access_token.is_empty()
    }

    #[instrument(skip(self, request), fields(video = %request.video_path.display()))]
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, GeneratorError> {
        let bytes = tokio::fs::read(&request.video_path).await?;

        let session_url = self.open_session(&request.metadata, bytes.len()).await?;
        debug!(bytes = bytes.len(), "Upload session opened");

        let response = self
            .http
            .client()
            .put(&session_url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, VIDEO_MIME)
            .body(bytes)
            .send()
            .await?;

        let video: UploadedVideo = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        let receipt = receipt_from_response(video)?;
        info!(video_id = %receipt.video_id, "Video uploaded");
        Ok(receipt)
    }
}
