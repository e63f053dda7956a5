//! Still image preparation.

use crate::media::error::MediaError;
use image::imageops::FilterType;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stretch `src` to exactly `width` x `height` and write it to `dst` as PNG.
///
/// Aspect ratio is not preserved. Decoding and resampling run on a blocking thread.
pub async fn resize_exact(src: &Path, dst: &Path, width: u32, height: u32) -> Result<(), MediaError> {
    if !src.exists() {
        return Err(MediaError::MissingInput(src.to_path_buf()));
    }

    let src: PathBuf = src.to_path_buf();
    let dst: PathBuf = dst.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<(), MediaError> {
        let image = image::open(&src)?;
        debug!(
            source_width = image.width(),
            source_height = image.height(),
            width,
            height,
            "Resizing image"
        );
        image
            .resize_exact(width, height, FilterType::Lanczos3)
            .save_with_format(&dst, ImageFormat::Png)?;
        Ok(())
    })
    .await
    .map_err(|e| MediaError::Image(format!("Resize task failed: {e}")))?
}
