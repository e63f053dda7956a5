//! Artifact storage.

pub mod workspace;

pub use workspace::{JobWorkspace, StorageError, Workspace};
