//! Video composition from a still image and a narration track.
//!
//! `FfmpegCompositor` measures the narration with ffprobe and sizes the video
//! track so it never ends before the audio. Two strategies produce the same
//! result: looping the still as an input stream, or encoding a numbered
//! sequence of identical frames.
//!
//! When the narration cannot be measured, loop-still lets the still loop
//! until the audio input ends (`-shortest`) and frame-sequence fails with
//! `MediaError::Probe`.

use crate::media::command::MediaTool;
use crate::media::error::MediaError;
use crate::media::probe::probe_duration;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tp_protocol::config_models::VideoSettings;
use tp_protocol::pipeline_models::CompositionStrategy;
use tracing::{debug, info, instrument, warn};

const FRAME_PATTERN: &str = "frame_%05d.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionRequest {
    pub image: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionOutput {
    pub path: PathBuf,

    /// Length of the video track.
    pub duration: Duration,
    pub frame_count: u64,
}

#[async_trait]
pub trait Compositor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check_availability(&self) -> bool {
        true
    }

    async fn compose(&self, request: &CompositionRequest) -> Result<CompositionOutput, MediaError>;
}

/// Frame count and video length for a narration of `audio_secs` at `fps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub frame_count: u64,
    pub video_secs: f64,
}

impl FramePlan {
    /// `frame_count = ceil(audio_secs * fps)`, at least one frame.
    pub fn for_audio(audio_secs: f64, fps: u32) -> Self {
        let fps = fps.max(1);
        let frame_count = ((audio_secs.max(0.0) * f64::from(fps)).ceil() as u64).max(1);
        Self {
            frame_count,
            video_secs: frame_count as f64 / f64::from(fps),
        }
    }
}

pub struct FfmpegCompositor {
    ffmpeg: MediaTool,
    ffprobe: MediaTool,
    strategy: CompositionStrategy,
    fps: u32,
    fallback_secs: f64,
}

impl FfmpegCompositor {
    pub fn new(settings: &VideoSettings) -> Self {
        Self {
            ffmpeg: MediaTool::new(&settings.ffmpeg),
            ffprobe: MediaTool::new(&settings.ffprobe),
            strategy: settings.strategy,
            fps: settings.fps.max(1),
            fallback_secs: settings.fallback_duration_secs as f64,
        }
    }

    pub fn ffmpeg(&self) -> &MediaTool {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &MediaTool {
        &self.ffprobe
    }

    /// Narration length in seconds.
    async fn narration_secs(&self, audio: &Path) -> Result<f64, MediaError> {
        probe_duration(&self.ffprobe, audio)
            .await
            .map_err(|e| match e {
                e @ MediaError::Probe { .. } => e,
                e => MediaError::Probe {
                    path: audio.to_path_buf(),
                    reason: e.to_string(),
                },
            })
    }

    /// Length of a finished video, falling back to the configured estimate.
    async fn composed_secs(&self, output: &Path) -> f64 {
        match probe_duration(&self.ffprobe, output).await {
            Ok(secs) => secs,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback_secs = self.fallback_secs,
                    "Could not measure video, reporting fallback duration"
                );
                self.fallback_secs
            }
        }
    }

    async fn frame_sequence(
        &self,
        request: &CompositionRequest,
        plan: FramePlan,
    ) -> Result<(), MediaError> {
        let frames_dir = frames_dir_for(&request.output);
        write_frames(&request.image, &frames_dir, plan.frame_count).await?;

        let fps = self.fps.to_string();
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-framerate".into(),
            fps.clone().into(),
            "-i".into(),
            frames_dir.join(FRAME_PATTERN).into(),
            "-i".into(),
            request.audio.clone().into(),
        ];
        args.extend(encoder_args(&fps));
        args.push(request.output.clone().into());

        let result = self.ffmpeg.run(args).await.map(|_| ());

        if let Err(e) = tokio::fs::remove_dir_all(&frames_dir).await {
            warn!(error = %e, dir = %frames_dir.display(), "Failed to remove frame directory");
        }
        result
    }
}

/// Arguments for looping the still. With a plan the still input is cut at
/// `plan.video_secs`; without one it loops until the audio ends.
fn loop_still_args(
    request: &CompositionRequest,
    fps: u32,
    plan: Option<FramePlan>,
) -> Vec<OsString> {
    let fps = fps.to_string();
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-loop".into(),
        "1".into(),
        "-framerate".into(),
        fps.clone().into(),
    ];
    if let Some(plan) = plan {
        args.push("-t".into());
        args.push(format!("{:.3}", plan.video_secs).into());
    }
    args.extend([
        "-i".into(),
        request.image.clone().into(),
        "-i".into(),
        request.audio.clone().into(),
        "-tune".into(),
        "stillimage".into(),
    ]);
    if plan.is_none() {
        args.push("-shortest".into());
    }
    args.extend(encoder_args(&fps));
    args.push(request.output.clone().into());
    args
}

/// Codec settings shared by both strategies.
fn encoder_args(fps: &str) -> Vec<OsString> {
    [
        "-vf",
        "pad=ceil(iw/2)*2:ceil(ih/2)*2",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-r",
        fps,
        "-c:a",
        "aac",
        "-b:a",
        "192k",
        "-movflags",
        "+faststart",
    ]
    .into_iter()
    .map(OsString::from)
    .collect()
}

fn frames_dir_for(output: &Path) -> PathBuf {
    output
        .parent()
        .map(|dir| dir.join("frames"))
        .unwrap_or_else(|| PathBuf::from("frames"))
}

fn frame_name(index: u64) -> String {
    format!("frame_{index:05}.png")
}

/// Fill `dir` with `count` numbered copies of `image`, hard-linked when possible.
async fn write_frames(image: &Path, dir: &Path, count: u64) -> Result<(), MediaError> {
    tokio::fs::create_dir_all(dir).await?;
    for index in 1..=count {
        let frame = dir.join(frame_name(index));
        if tokio::fs::hard_link(image, &frame).await.is_err() {
            tokio::fs::copy(image, &frame).await?;
        }
    }
    debug!(count, dir = %dir.display(), "Frame sequence written");
    Ok(())
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    fn name(&self) -> &'static str {
        match self.strategy {
            CompositionStrategy::LoopStill => "ffmpeg-loop-still",
            CompositionStrategy::FrameSequence => "ffmpeg-frame-sequence",
        }
    }

    async fn check_availability(&self) -> bool {
        self.ffmpeg.is_available()
    }

    #[instrument(skip(self, request), fields(strategy = self.name(), output = %request.output.display()))]
    async fn compose(&self, request: &CompositionRequest) -> Result<CompositionOutput, MediaError> {
        for input in [&request.image, &request.audio] {
            if !input.exists() {
                return Err(MediaError::MissingInput(input.clone()));
            }
        }

        let narration = self.narration_secs(&request.audio).await;

        let plan = match self.strategy {
            CompositionStrategy::FrameSequence => {
                let plan = FramePlan::for_audio(narration?, self.fps);
                debug!(frames = plan.frame_count, "Frame plan computed");
                self.frame_sequence(request, plan).await?;
                plan
            }
            CompositionStrategy::LoopStill => {
                let plan = match narration {
                    Ok(audio_secs) => Some(FramePlan::for_audio(audio_secs, self.fps)),
                    Err(e) => {
                        warn!(
                            error = %e,
                            "Could not measure narration, audio will bound the video"
                        );
                        None
                    }
                };
                self.ffmpeg
                    .run(loop_still_args(request, self.fps, plan))
                    .await?;
                match plan {
                    Some(plan) => plan,
                    None => {
                        let video_secs = self.composed_secs(&request.output).await;
                        FramePlan::for_audio(video_secs, self.fps)
                    }
                }
            }
        };

        info!(
            frames = plan.frame_count,
            video_secs = plan.video_secs,
            "Video composed"
        );

        Ok(CompositionOutput {
            path: request.output.clone(),
            duration: Duration::from_secs_f64(plan.video_secs),
            frame_count: plan.frame_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_frame_plan_rounds_up() {
        let plan = FramePlan::for_audio(2.0, 25);
        assert_eq!(plan.frame_count, 50);
        assert_eq!(plan.video_secs, 2.0);

        let plan = FramePlan::for_audio(2.01, 25);
        assert_eq!(plan.frame_count, 51);
        assert!(plan.video_secs >= 2.01);
    }

    #[test]
    fn test_frame_plan_fallback_matches_legacy_constants() {
        // 10 s at 10 fps is the historical 100-frame video
        let plan = FramePlan::for_audio(10.0, 10);
        assert_eq!(plan.frame_count, 100);
    }

    #[test]
    fn test_frame_plan_never_empty() {
        assert_eq!(FramePlan::for_audio(0.0, 25).frame_count, 1);
        assert_eq!(FramePlan::for_audio(1.0, 0).frame_count, 1);
    }

    #[test]
    fn test_frame_plan_covers_audio() {
        for audio in [0.3, 1.0, 7.77, 59.99, 123.456] {
            for fps in [1, 24, 25, 30, 60] {
                let plan = FramePlan::for_audio(audio, fps);
                assert!(plan.video_secs >= audio, "{audio}s at {fps}fps");
                assert!(plan.video_secs - audio < 1.0 / f64::from(fps) + 1e-9);
            }
        }
    }

    #[test]
    fn test_frames_dir_next_to_output() {
        assert_eq!(
            frames_dir_for(Path::new("/work/job/story_video.mp4")),
            PathBuf::from("/work/job/frames")
        );
        assert_eq!(frame_name(7), "frame_00007.png");
    }

    #[tokio::test]
    async fn test_write_frames() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("resized_story_image.png");
        std::fs::write(&image, b"png").unwrap();

        let frames = dir.path().join("frames");
        write_frames(&image, &frames, 3).await.unwrap();

        for index in 1..=3 {
            let frame = frames.join(frame_name(index));
            assert_eq!(std::fs::read(frame).unwrap(), b"png");
        }
        assert!(!frames.join(frame_name(4)).exists());
    }

    #[tokio::test]
    async fn test_compose_missing_input() {
        let dir = tempdir().unwrap();
        let compositor = FfmpegCompositor::new(&VideoSettings::default());
        let request = CompositionRequest {
            image: dir.path().join("missing.png"),
            audio: dir.path().join("story_voice.mp3"),
            output: dir.path().join("story_video.mp4"),
        };

        let err = compositor.compose(&request).await.unwrap_err();
        assert!(matches!(err, MediaError::MissingInput(p) if p.ends_with("missing.png")));
    }

    #[tokio::test]
    async fn test_compose_missing_ffmpeg() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("image.png");
        let audio = dir.path().join("voice.wav");
        std::fs::write(&image, b"png").unwrap();
        std::fs::write(&audio, b"wav").unwrap();

        let settings = VideoSettings {
            ffmpeg: "nonexistent-ffmpeg-xyz".to_string(),
            ffprobe: "nonexistent-ffprobe-xyz".to_string(),
            ..VideoSettings::default()
        };
        let request = CompositionRequest {
            image,
            audio,
            output: dir.path().join("story_video.mp4"),
        };

        let err = FfmpegCompositor::new(&settings)
            .compose(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::ToolNotFound(ref t) if t == "nonexistent-ffmpeg-xyz"));
    }

    fn request_in(dir: &Path) -> CompositionRequest {
        CompositionRequest {
            image: dir.join("resized_story_image.png"),
            audio: dir.join("story_voice.mp3"),
            output: dir.join("story_video.mp4"),
        }
    }

    #[test]
    fn test_loop_still_args_with_plan() {
        let request = request_in(Path::new("/work/job"));
        let plan = FramePlan::for_audio(15.0, 25);
        let args = loop_still_args(&request, 25, Some(plan));

        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "15.000");
        assert!(t < args.iter().position(|a| a == "-i").unwrap());
        assert!(!args.iter().any(|a| a == "-shortest"));
        assert_eq!(args.last().unwrap(), "/work/job/story_video.mp4");
    }

    #[test]
    fn test_loop_still_args_without_plan() {
        let request = request_in(Path::new("/work/job"));
        let args = loop_still_args(&request, 25, None);

        assert!(!args.iter().any(|a| a == "-t"));
        assert!(args.iter().any(|a| a == "-shortest"));
        assert!(args.iter().any(|a| a == "-loop"));
    }

    /// Stand-in ffmpeg/ffprobe scripts. The fake ffmpeg writes its arguments,
    /// one per line, to `args.txt`.
    #[cfg(unix)]
    mod fake_tools {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        pub fn script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.display().to_string()
        }

        pub fn settings(
            dir: &Path,
            ffprobe_body: &str,
            strategy: CompositionStrategy,
        ) -> VideoSettings {
            let args_file = dir.join("args.txt");
            VideoSettings {
                ffmpeg: script(
                    dir,
                    "ffmpeg",
                    &format!("printf '%s\\n' \"$@\" > '{}'", args_file.display()),
                ),
                ffprobe: script(dir, "ffprobe", ffprobe_body),
                strategy,
                fps: 25,
                fallback_duration_secs: 10,
                ..VideoSettings::default()
            }
        }

        pub fn recorded_args(dir: &Path) -> Vec<String> {
            std::fs::read_to_string(dir.join("args.txt"))
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        pub fn inputs(dir: &Path) -> CompositionRequest {
            let request = request_in(dir);
            std::fs::write(&request.image, b"png").unwrap();
            std::fs::write(&request.audio, b"mp3").unwrap();
            request
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unmeasured_narration_lets_audio_bound_video() {
        let dir = tempdir().unwrap();
        let settings = fake_tools::settings(dir.path(), "exit 1", CompositionStrategy::LoopStill);
        let request = fake_tools::inputs(dir.path());

        let output = FfmpegCompositor::new(&settings)
            .compose(&request)
            .await
            .unwrap();

        let args = fake_tools::recorded_args(dir.path());
        assert!(args.iter().any(|a| a == "-shortest"), "{args:?}");
        assert!(!args.iter().any(|a| a == "-t"), "{args:?}");
        // Neither file could be measured, so the estimate is reported
        assert_eq!(output.duration, Duration::from_secs(10));
        assert_eq!(output.frame_count, 250);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_measured_narration_sizes_video() {
        let dir = tempdir().unwrap();
        let settings =
            fake_tools::settings(dir.path(), "echo 15.0", CompositionStrategy::LoopStill);
        let request = fake_tools::inputs(dir.path());

        let output = FfmpegCompositor::new(&settings)
            .compose(&request)
            .await
            .unwrap();

        let args = fake_tools::recorded_args(dir.path());
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "15.000");
        assert!(!args.iter().any(|a| a == "-shortest"));
        assert_eq!(output.frame_count, 375);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_frame_sequence_requires_measured_narration() {
        let dir = tempdir().unwrap();
        let settings =
            fake_tools::settings(dir.path(), "exit 1", CompositionStrategy::FrameSequence);
        let request = fake_tools::inputs(dir.path());

        let err = FfmpegCompositor::new(&settings)
            .compose(&request)
            .await
            .unwrap_err();

        assert!(
            matches!(err, MediaError::Probe { ref path, .. } if path == &request.audio),
            "{err:?}"
        );
        assert!(!dir.path().join("args.txt").exists());
        assert!(!dir.path().join("frames").exists());
    }

    #[test]
    fn test_compositor_name() {
        let settings = VideoSettings {
            strategy: CompositionStrategy::FrameSequence,
            ..VideoSettings::default()
        };
        assert_eq!(FfmpegCompositor::new(&settings).name(), "ffmpeg-frame-sequence");
    }
}
