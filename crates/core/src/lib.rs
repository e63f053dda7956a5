//! # tp-core
//!
//! Core pipeline engine and job management for talepipe.
//!
//! This crate provides:
//! - Configuration loading from `talepipe.toml` and the environment
//! - Generator traits and vendor adapters (OpenAI, ElevenLabs, YouTube)
//! - Image resizing and ffmpeg-based video composition
//! - The pipeline engine and the per-job state machine
//! - The job manager that launches, tracks and cancels jobs
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and credentials
//! - [`generators`]: Generator traits and adapter implementations
//! - [`media`]: Image and video processing
//! - [`storage`]: Per-job artifact directories
//! - [`engine`]: Pipeline execution engine
//! - [`state`]: Job state machine and job manager
//! - [`init`]: `talepipe init` templates

pub mod config;
pub mod engine;
pub mod generators;
pub mod init;
pub mod media;
pub mod state;
pub mod storage;
