//! Configuration loading and management.
//!
//! Settings come from `talepipe.toml`; credentials from the environment.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, CONFIG_FILE_NAME};
pub use models::{AppConfig, Credentials};
