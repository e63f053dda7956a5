//! Initialization module for `talepipe init`.
//!
//! Writes a commented `talepipe.toml` showing every default and a
//! `.env.example` listing the credentials the vendor adapters read.
//!
//! # Example
//!
//! ```no_run
//! use tp_core::init::{generate_config, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//! };
//!
//! generate_config(options).await?;
//! println!("talepipe initialized successfully!");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_config, InitOptions};
pub use templates::{get_template, list_templates};
