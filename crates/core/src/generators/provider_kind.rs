//! Provider enumeration for determining which adapter to use.

use std::fmt;

/// The pipeline role a generator fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorRole {
    Story,
    Image,
    Speech,
    Upload,
}

impl GeneratorRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Image => "image",
            Self::Speech => "voice",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for GeneratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    ElevenLabs,
    YouTube,
    Mock,
}

impl ProviderKind {
    /// Parse the provider name used in `talepipe.toml`.
    ///
    /// # Returns
    ///
    /// `None` if the name matches no known provider.
    ///
    /// # Examples
    ///
    /// ```
    /// use tp_core::generators::ProviderKind;
    ///
    /// assert_eq!(ProviderKind::from_name("openai"), Some(ProviderKind::OpenAi));
    /// assert_eq!(ProviderKind::from_name("ElevenLabs"), Some(ProviderKind::ElevenLabs));
    /// assert_eq!(ProviderKind::from_name("dropbox"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "elevenlabs" | "eleven-labs" => Some(Self::ElevenLabs),
            "youtube" => Some(Self::YouTube),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::ElevenLabs => "ElevenLabs",
            Self::YouTube => "YouTube",
            Self::Mock => "Mock",
        }
    }

    /// Whether this provider has an adapter for `role`.
    pub fn supports(&self, role: GeneratorRole) -> bool {
        match self {
            Self::OpenAi => matches!(role, GeneratorRole::Story | GeneratorRole::Image),
            Self::ElevenLabs => role == GeneratorRole::Speech,
            Self::YouTube => role == GeneratorRole::Upload,
            Self::Mock => true,
        }
    }
}
