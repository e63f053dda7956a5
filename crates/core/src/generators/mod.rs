//! Generator abstraction and vendor adapters.
//!
//! This module provides one trait per external service (Adapter Pattern), the
//! vendor implementations, and the factory that wires them from configuration.

pub mod adapters;
pub mod base;
pub mod factory;
pub mod http;
pub mod provider_kind;
pub mod set;

pub use base::{
    GeneratorError, ImageGenerator, ImageRequest, ImageSource, SpeechRequest, SpeechSynthesizer,
    StoryGenerator, StoryRequest, SynthesizedAudio, UploadReceipt, UploadRequest, VideoUploader,
};
pub use factory::GeneratorFactory;
pub use http::HttpExecutor;
pub use provider_kind::{GeneratorRole, ProviderKind};
pub use set::{Availability, GeneratorSet};
