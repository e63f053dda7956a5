//! Common test utilities and helpers for E2E tests.
//!
//! This module provides shared functionality across all E2E tests including:
//! - Test fixtures (configs, engines, managers, event channels)
//! - Custom assertions over event streams
//! - A stub compositor that does not need ffmpeg

pub mod assertions;
pub mod fixtures;
pub mod mock_generators;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_generators::*;
