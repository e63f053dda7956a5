//! Pipeline execution engine.
//!
//! The PipelineEngine runs one job through the five stages in strict order:
//! story, illustration, narration, video, upload. Each stage writes its label
//! into the job record before doing any work, runs under its own deadline and
//! is abandoned as soon as the job's cancellation token fires.

mod error;

pub use error::PipelineError;

use crate::config::models::AppConfig;
use crate::generators::{
    GeneratorError, GeneratorFactory, GeneratorSet, HttpExecutor, ImageRequest, ImageSource,
    SpeechRequest, StoryRequest, UploadRequest,
};
use crate::media::image::resize_exact;
use crate::media::{CompositionRequest, Compositor, FfmpegCompositor, MediaError};
use crate::state::job::{
    cancel_job, complete_job, emit, enter_stage, fail_job, log_to_job, start_job,
};
use crate::state::SharedJob;
use crate::storage::{JobWorkspace, Workspace};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tp_protocol::config_models::PipelineConfig;
use tp_protocol::ipc::Event;
use tp_protocol::job_models::Job;
use tp_protocol::pipeline_models::Stage;
use tracing::{error, info, instrument, warn};

/// Placeholder in the image prompt template replaced by the story prefix.
pub const STORY_PLACEHOLDER: &str = "{story}";

/// Build the illustration prompt from the first `chars` characters of `story`.
///
/// The cut is made on character boundaries, so multibyte text (Devanagari,
/// emoji) is never split. A story shorter than `chars` is used whole.
///
/// # Examples
///
/// ```
/// use tp_core::engine::image_prompt;
///
/// let prompt = image_prompt("Pixar-style image of {story}...", "A fox learns honesty.", 5);
/// assert_eq!(prompt, "Pixar-style image of A fox...");
/// ```
pub fn image_prompt(template: &str, story: &str, chars: usize) -> String {
    let prefix: String = story.chars().take(chars).collect();
    template.replace(STORY_PLACEHOLDER, &prefix)
}

pub struct PipelineEngine {
    generators: GeneratorSet,
    compositor: Arc<dyn Compositor>,
    http: HttpExecutor,
    config: PipelineConfig,
    workspace: Workspace,
}

impl PipelineEngine {
    /// Create an engine; artifacts go under `config.storage.work_dir`.
    pub fn new(
        generators: GeneratorSet,
        compositor: Arc<dyn Compositor>,
        config: PipelineConfig,
    ) -> Self {
        let workspace = Workspace::new(&config.storage.work_dir);
        Self {
            generators,
            compositor,
            http: HttpExecutor::new(),
            config,
            workspace,
        }
    }

    /// Build the vendor adapters and the ffmpeg compositor from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, GeneratorError> {
        let generators = GeneratorFactory::create(&config.pipeline, &config.credentials)?;
        let compositor = Arc::new(FfmpegCompositor::new(&config.pipeline.video));
        Ok(Self::new(generators, compositor, config.pipeline.clone()))
    }

    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn generators(&self) -> &GeneratorSet {
        &self.generators
    }

    pub fn compositor(&self) -> &Arc<dyn Compositor> {
        &self.compositor
    }

    /// Run one job to a terminal state and return its final record.
    ///
    /// # Errors
    ///
    /// The job is marked `Failed` (or `Cancelled`) and the cause is returned if:
    /// - A generator call fails
    /// - A stage exceeds its deadline
    /// - Resizing or composition fails
    /// - An artifact cannot be written
    /// - The cancellation token fires
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        job: SharedJob,
        cancel: CancellationToken,
        events_tx: Sender<Event>,
    ) -> Result<Job, PipelineError> {
        let job_id = job.read().await.id;
        let workspace = self.workspace.job(job_id);

        let events = start_job(&mut *job.write().await);
        emit(&events_tx, events).await;
        info!(%job_id, dir = %workspace.dir().display(), "Job started");

        match self.run_stages(&job, &workspace, &cancel, &events_tx).await {
            Ok(youtube_link) => {
                let events = complete_job(&mut *job.write().await, youtube_link.clone());
                emit(&events_tx, events).await;
                info!(%job_id, %youtube_link, "Job complete");

                if !self.config.storage.keep_artifacts {
                    if let Err(e) = workspace.cleanup().await {
                        warn!(%job_id, error = %e, "Failed to remove job directory");
                    }
                }
                Ok(job.read().await.clone())
            }
            Err(e) if e.is_cancelled() => {
                let events = cancel_job(&mut *job.write().await, e.to_string());
                emit(&events_tx, events).await;
                warn!(%job_id, stage = %e.stage(), "Job cancelled");
                Err(e)
            }
            Err(e) => {
                let events = fail_job(&mut *job.write().await, e.to_string());
                emit(&events_tx, events).await;
                error!(%job_id, error = %e, "Job failed");
                Err(e)
            }
        }
    }

    /// The five stages in order; returns the watch URL of the uploaded video.
    async fn run_stages(
        &self,
        job: &SharedJob,
        workspace: &JobWorkspace,
        cancel: &CancellationToken,
        events_tx: &Sender<Event>,
    ) -> Result<String, PipelineError> {
        // Stage 1: story text
        let story_request = StoryRequest {
            model: self.config.story.model.clone(),
            system_prompt: self.config.story.system_prompt.clone(),
        };
        let story = self
            .stage(job, Stage::GeneratingStory, cancel, events_tx, async {
                let stage = Stage::GeneratingStory;
                workspace
                    .prepare()
                    .await
                    .map_err(|source| PipelineError::Storage { stage, source })?;
                self.generators
                    .story
                    .generate_story(&story_request)
                    .await
                    .map_err(|source| PipelineError::Upstream { stage, source })
            })
            .await?;
        self.log(
            job,
            events_tx,
            format!("Story generated ({} characters)", story.chars().count()),
        )
        .await;

        // Stage 2: illustration
        let image_request = ImageRequest {
            model: self.config.image.model.clone(),
            prompt: image_prompt(
                &self.config.image.prompt_template,
                &story,
                self.config.image.prompt_chars,
            ),
            size: self.config.image.size.clone(),
        };
        let image_path = workspace.story_image();
        self.stage(job, Stage::GeneratingStoryImage, cancel, events_tx, async {
            let stage = Stage::GeneratingStoryImage;
            let upstream = |source: GeneratorError| PipelineError::Upstream { stage, source };

            let bytes = match self
                .generators
                .image
                .generate_image(&image_request)
                .await
                .map_err(upstream)?
            {
                ImageSource::Bytes(bytes) => bytes,
                ImageSource::Url(url) => self.http.fetch_bytes(&url).await.map_err(upstream)?,
            };
            workspace
                .write(&image_path, &bytes)
                .await
                .map_err(|source| PipelineError::Storage { stage, source })
        })
        .await?;
        self.log(job, events_tx, format!("Image saved to {}", image_path.display()))
            .await;

        // Stage 3: narration
        let speech_request = SpeechRequest {
            text: story.clone(),
            voice: self.config.voice.voice.clone(),
            model: self.config.voice.model.clone(),
        };
        let audio_path = self
            .stage(job, Stage::GeneratingVoiceover, cancel, events_tx, async {
                let stage = Stage::GeneratingVoiceover;
                let audio = self
                    .generators
                    .speech
                    .synthesize(&speech_request)
                    .await
                    .map_err(|source| PipelineError::Upstream { stage, source })?;

                let path = workspace.narration_audio(&audio.extension);
                workspace
                    .write(&path, &audio.bytes)
                    .await
                    .map_err(|source| PipelineError::Storage { stage, source })?;
                Ok::<_, PipelineError>(path)
            })
            .await?;
        self.log(job, events_tx, format!("Voiceover saved to {}", audio_path.display()))
            .await;

        // Stage 4: video
        let resized_path = workspace.resized_image();
        let composition = CompositionRequest {
            image: resized_path.clone(),
            audio: audio_path,
            output: workspace.video(),
        };
        let video = self
            .stage(job, Stage::CreatingVideo, cancel, events_tx, async {
                let stage = Stage::CreatingVideo;
                let media = |source: MediaError| PipelineError::Media { stage, source };

                resize_exact(
                    &image_path,
                    &resized_path,
                    self.config.video.width,
                    self.config.video.height,
                )
                .await
                .map_err(media)?;
                self.compositor.compose(&composition).await.map_err(media)
            })
            .await?;
        self.log(
            job,
            events_tx,
            format!(
                "Video created: {} frames, {:.2}s",
                video.frame_count,
                video.duration.as_secs_f64()
            ),
        )
        .await;

        // Stage 5: upload
        let upload_request = UploadRequest {
            video_path: video.path,
            metadata: self.config.upload.metadata.clone(),
        };
        let receipt = self
            .stage(job, Stage::UploadingToYoutube, cancel, events_tx, async {
                self.generators
                    .uploader
                    .upload(&upload_request)
                    .await
                    .map_err(|source| PipelineError::Upstream {
                        stage: Stage::UploadingToYoutube,
                        source,
                    })
            })
            .await?;
        self.log(job, events_tx, format!("Uploaded video {}", receipt.video_id))
            .await;

        Ok(receipt.watch_url())
    }

    /// Announce `stage`, then drive `work` under the stage deadline and the
    /// job's cancellation token.
    async fn stage<T, F>(
        &self,
        job: &SharedJob,
        stage: Stage,
        cancel: &CancellationToken,
        events_tx: &Sender<Event>,
        work: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled { stage });
        }

        let events = enter_stage(&mut *job.write().await, stage);
        emit(events_tx, events).await;
        info!(stage = %stage, "Stage started");

        let limit = Duration::from_secs(self.config.timeouts.secs_for(stage));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled { stage }),
            result = tokio::time::timeout(limit, work) => match result {
                Ok(outcome) => outcome,
                Err(_) => Err(PipelineError::Timeout { stage, after: limit }),
            },
        }
    }

    async fn log(&self, job: &SharedJob, events_tx: &Sender<Event>, message: String) {
        let events = log_to_job(&mut *job.write().await, message);
        emit(events_tx, events).await;
    }
}
