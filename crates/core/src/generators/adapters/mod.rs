//! Generator adapter implementations.

mod elevenlabs_adapter;
pub mod mock;
mod openai_adapter;
mod youtube_adapter;

pub use elevenlabs_adapter::ElevenLabsAdapter;
pub use mock::{MockImageGenerator, MockSpeechSynthesizer, MockStoryGenerator, MockVideoUploader};
pub use openai_adapter::OpenAiAdapter;
pub use youtube_adapter::YouTubeAdapter;
