//! # tp-protocol
//!
//! Core protocol definitions and data models for talepipe.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (`talepipe.toml`)
//! - Runtime job state and the status view served to pollers
//! - Progress events emitted by the pipeline engine
//!
//! ## Modules
//!
//! - [`config_models`]: Settings from `talepipe.toml`
//! - [`pipeline_models`]: Pipeline stages, composition strategies, upload metadata
//! - [`job_models`]: Runtime job state and `StatusRecord`
//! - [`ipc`]: Events sent from the core to job observers
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, chrono and uuid
//! - TypeScript generation: All types derive `TS`. The types the browser
//!   status page consumes (`StatusRecord`, `StartResponse`, `Job`, `JobStatus`,
//!   `Stage`) are marked `#[ts(export)]`; `cargo test -p tp-protocol` writes
//!   their declarations to `crates/protocol/bindings/`
//! - Independent compilation: No dependencies on other talepipe crates

pub mod config_models;
pub mod ipc;
pub mod job_models;
pub mod pipeline_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use job_models::*;
pub use pipeline_models::*;
