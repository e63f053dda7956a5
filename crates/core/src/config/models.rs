//! Configuration models that aggregate all settings.
//!
//! `AppConfig` joins the pipeline settings parsed from `talepipe.toml` with the
//! credentials taken from the environment.

use std::fmt;
use tp_protocol::config_models::PipelineConfig;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ELEVENLABS_API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
pub const YOUTUBE_ACCESS_TOKEN_VAR: &str = "YOUTUBE_ACCESS_TOKEN";

/// Unified application configuration.
///
/// # Example
///
/// ```rust,no_run
/// use tp_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("talepipe.toml")).await?;
/// println!("Serving on {}", config.pipeline.server.bind);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Settings from `talepipe.toml`.
    pub pipeline: PipelineConfig,

    /// Vendor credentials from the environment.
    pub credentials: Credentials,
}

/// Vendor credentials. Empty variables count as missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub youtube_access_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            openai_api_key: read(OPENAI_API_KEY_VAR),
            elevenlabs_api_key: read(ELEVENLABS_API_KEY_VAR),
            youtube_access_token: read(YOUTUBE_ACCESS_TOKEN_VAR),
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |value: &Option<String>| if value.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("elevenlabs_api_key", &mask(&self.elevenlabs_api_key))
            .field("youtube_access_token", &mask(&self.youtube_access_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_credentials_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (OPENAI_API_KEY_VAR, "sk-test"),
            (ELEVENLABS_API_KEY_VAR, "  "),
        ]
        .into_iter()
        .collect();

        let credentials = Credentials::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(credentials.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(credentials.elevenlabs_api_key, None);
        assert_eq!(credentials.youtube_access_token, None);
    }

    #[test]
    fn test_credentials_debug_is_masked() {
        let credentials = Credentials {
            openai_api_key: Some("sk-secret".to_string()),
            ..Credentials::default()
        };
        let debug = format!("{credentials:?}");

        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<set>"));
        assert!(debug.contains("<unset>"));
    }
}
