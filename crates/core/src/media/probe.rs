//! Audio duration probing with `ffprobe`.

use crate::media::command::MediaTool;
use crate::media::error::MediaError;
use std::ffi::OsStr;
use std::path::Path;

/// Duration of a media file in seconds, from its container header.
pub async fn probe_duration(ffprobe: &MediaTool, path: &Path) -> Result<f64, MediaError> {
    if !path.exists() {
        return Err(MediaError::MissingInput(path.to_path_buf()));
    }

    let args = [
        OsStr::new("-v"),
        OsStr::new("error"),
        OsStr::new("-show_entries"),
        OsStr::new("format=duration"),
        OsStr::new("-of"),
        OsStr::new("default=noprint_wrappers=1:nokey=1"),
        path.as_os_str(),
    ];
    let stdout = ffprobe.run(args).await?;

    parse_duration(&stdout).map_err(|reason| MediaError::Probe {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_duration(stdout: &str) -> Result<f64, String> {
    let value = stdout.trim();
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("unexpected ffprobe output '{value}'"))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("non-positive duration {value}"));
    }
    Ok(secs)
}
