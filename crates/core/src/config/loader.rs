//! Configuration file loader for `talepipe.toml`.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AppConfig, Credentials};
use std::path::Path;
use tp_protocol::config_models::PipelineConfig;
use tracing::debug;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "talepipe.toml";

/// Loads the application configuration.
///
/// # Arguments
///
/// * `path` - Path to `talepipe.toml`
///
/// # Returns
///
/// An `AppConfig` with settings from the file (defaults when the file does not
/// exist) and credentials from the environment.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has wrongly typed fields
/// - A value cannot drive a pipeline (see [`validate`])
pub async fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    let pipeline = load_pipeline_config(path)?;
    Ok(AppConfig {
        pipeline,
        credentials: Credentials::from_env(),
    })
}

/// Loads and validates only the file-backed settings.
pub fn load_pipeline_config(path: &Path) -> ConfigResult<PipelineConfig> {
    // A missing file is not an error; every setting has a default
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(PipelineConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let config: PipelineConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&config).map_err(|reason| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(config)
}

/// Reject settings that parse but cannot drive a pipeline.
pub fn validate(config: &PipelineConfig) -> Result<(), String> {
    let video = &config.video;
    if video.width == 0 || video.height == 0 {
        return Err(format!(
            "video resolution must be non-zero, got {}x{}",
            video.width, video.height
        ));
    }
    if video.fps == 0 {
        return Err("video.fps must be greater than zero".to_string());
    }
    if video.fallback_duration_secs == 0 {
        return Err("video.fallback_duration_secs must be greater than zero".to_string());
    }
    if config.storage.max_jobs == 0 {
        return Err("storage.max_jobs must be greater than zero".to_string());
    }
    if !config.image.prompt_template.contains("{story}") {
        return Err("image.prompt_template must contain the {story} placeholder".to_string());
    }

    let timeouts = &config.timeouts;
    for (name, secs) in [
        ("story_secs", timeouts.story_secs),
        ("image_secs", timeouts.image_secs),
        ("voice_secs", timeouts.voice_secs),
        ("video_secs", timeouts.video_secs),
        ("upload_secs", timeouts.upload_secs),
    ] {
        if secs == 0 {
            return Err(format!("timeouts.{name} must be greater than zero"));
        }
    }

    Ok(())
}
