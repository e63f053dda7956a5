//! Local media processing: image resizing and video composition.

pub mod command;
pub mod compositor;
pub mod error;
pub mod image;
pub mod probe;

pub use command::MediaTool;
pub use compositor::{
    CompositionOutput, CompositionRequest, Compositor, FfmpegCompositor, FramePlan,
};
pub use error::MediaError;
