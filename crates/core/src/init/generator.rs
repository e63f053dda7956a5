//! File generation for `talepipe init`.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates, CONFIG_TEMPLATE, ENV_TEMPLATE};
use crate::config::loader::CONFIG_FILE_NAME;
use std::fs;
use std::path::{Path, PathBuf};

/// Name the credentials template is written under.
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

/// Options for `talepipe init`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory that receives `talepipe.toml` and `.env.example`.
    pub target_dir: PathBuf,

    /// Overwrite an existing `talepipe.toml`.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
        }
    }
}

/// Write every embedded template into `target_dir`.
///
/// ```text
/// <target_dir>/
/// ├── talepipe.toml
/// └── .env.example
/// ```
///
/// # Returns
/// The written paths, or an `InitError` if:
/// - `talepipe.toml` already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
///
/// # Example
/// ```no_run
/// use tp_core::init::{generate_config, InitOptions};
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = InitOptions {
///     target_dir: PathBuf::from("."),
///     force: false,
/// };
///
/// generate_config(options).await?;
/// # Ok(())
/// # }
/// ```
pub async fn generate_config(options: InitOptions) -> InitResult<Vec<PathBuf>> {
    let config_path = options.target_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !options.force {
        return Err(InitError::FileExists(config_path));
    }

    let templates = list_templates();
    for required in [CONFIG_TEMPLATE, ENV_TEMPLATE] {
        if !templates.iter().any(|name| name == required) {
            return Err(InitError::TemplateNotFound(required.to_string()));
        }
    }

    fs::create_dir_all(&options.target_dir).map_err(|source| InitError::DirectoryCreate {
        path: options.target_dir.clone(),
        source,
    })?;

    templates
        .iter()
        .map(|template| write_template_file(&options.target_dir, template, target_name(template)))
        .collect()
}

/// File name a template is written under.
fn target_name(template: &str) -> &str {
    match template {
        CONFIG_TEMPLATE => CONFIG_FILE_NAME,
        ENV_TEMPLATE => ENV_EXAMPLE_FILE,
        other => other,
    }
}

fn write_template_file(dir: &Path, template: &str, file_name: &str) -> InitResult<PathBuf> {
    let content =
        get_template(template).ok_or_else(|| InitError::TemplateNotFound(template.to_string()))?;

    let target_path = dir.join(file_name);
    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path.clone(),
        source,
    })?;

    Ok(target_path)
}
