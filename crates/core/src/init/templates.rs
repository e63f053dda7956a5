//! Embedded template files for `talepipe init`.
//!
//! This module uses `rust-embed` to embed the workspace root `templates/`
//! directory into the binary at compile time.

use rust_embed::RustEmbed;

/// Template of the configuration file.
pub const CONFIG_TEMPLATE: &str = "talepipe.toml";

/// Template of the credentials file, written as `.env.example`.
pub const ENV_TEMPLATE: &str = "env.example";

/// Embedded template files from the `templates/` directory.
///
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = workspace root `templates/`
///
/// With the `debug-embed` feature, debug builds also embed the files instead of
/// reading them from disk at runtime.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path.
///
/// # Example
/// ```
/// use tp_core::init::templates::get_template;
///
/// let config = get_template("talepipe.toml").expect("talepipe.toml should exist");
/// assert!(config.contains("[video]"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all embedded template paths.
pub fn list_templates() -> Vec<String> {
    TemplateAssets::iter().map(|path| path.to_string()).collect()
}
