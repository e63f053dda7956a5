//! State management for story jobs.
//!
//! This module provides:
//! - Job state machine logic
//! - JobManager for launching, tracking and cancelling jobs

pub mod job;
pub mod manager;

pub use manager::{JobError, JobManager, SharedJob};
