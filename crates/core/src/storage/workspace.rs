//! Per-job artifact directories.
//!
//! Every job writes into `<work_dir>/<job_id>/`, so concurrent jobs never
//! overwrite each other's files.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const STORY_IMAGE_FILE: &str = "story_image.png";
pub const RESIZED_IMAGE_FILE: &str = "resized_story_image.png";
pub const NARRATION_STEM: &str = "story_voice";
pub const VIDEO_FILE: &str = "story_video.mp4";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Base directory under which job directories are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths for one job. Nothing is created on disk until [`JobWorkspace::prepare`].
    pub fn job(&self, job_id: Uuid) -> JobWorkspace {
        JobWorkspace {
            dir: self.root.join(job_id.to_string()),
        }
    }
}

/// Artifact paths of a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobWorkspace {
    dir: PathBuf,
}

impl JobWorkspace {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn story_image(&self) -> PathBuf {
        self.dir.join(STORY_IMAGE_FILE)
    }

    pub fn resized_image(&self) -> PathBuf {
        self.dir.join(RESIZED_IMAGE_FILE)
    }

    /// Narration path for the encoding reported by the synthesizer, e.g. "mp3".
    pub fn narration_audio(&self, extension: &str) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        self.dir.join(format!("{NARRATION_STEM}.{extension}"))
    }

    pub fn video(&self) -> PathBuf {
        self.dir.join(VIDEO_FILE)
    }

    /// Create the job directory.
    pub async fn prepare(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
        debug!(dir = %self.dir.display(), "Job directory ready");
        Ok(())
    }

    /// Write an artifact, replacing any previous file at `path`.
    pub async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Remove the job directory and everything in it.
    pub async fn cleanup(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove {
                path: self.dir.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_job_paths() {
        let workspace = Workspace::new("/srv/talepipe");
        let id = Uuid::new_v4();
        let job = workspace.job(id);

        assert_eq!(job.dir(), Path::new("/srv/talepipe").join(id.to_string()));
        assert!(job.story_image().ends_with("story_image.png"));
        assert!(job.resized_image().ends_with("resized_story_image.png"));
        assert!(job.narration_audio("mp3").ends_with("story_voice.mp3"));
        assert!(job.narration_audio(".wav").ends_with("story_voice.wav"));
        assert!(job.video().ends_with("story_video.mp4"));
    }

    #[test]
    fn test_jobs_do_not_share_directories() {
        let workspace = Workspace::new("out");
        let a = workspace.job(Uuid::new_v4());
        let b = workspace.job(Uuid::new_v4());
        assert_ne!(a.video(), b.video());
    }

    #[tokio::test]
    async fn test_prepare_write_cleanup() {
        let dir = tempdir().unwrap();
        let job = Workspace::new(dir.path()).job(Uuid::new_v4());

        job.prepare().await.unwrap();
        job.write(&job.story_image(), b"png").await.unwrap();
        assert_eq!(std::fs::read(job.story_image()).unwrap(), b"png");

        // Overwrite keeps the last write
        job.write(&job.story_image(), b"png2").await.unwrap();
        assert_eq!(std::fs::read(job.story_image()).unwrap(), b"png2");

        job.cleanup().await.unwrap();
        assert!(!job.dir().exists());

        // Cleaning up twice is harmless
        job.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_without_prepare_fails() {
        let dir = tempdir().unwrap();
        let job = Workspace::new(dir.path()).job(Uuid::new_v4());

        let err = job.write(&job.video(), b"mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }
}
