//! Forge CLI Library
//!
//! This library provides the core functionality for the forge command-line
//! client. It can be used as a standalone library to build tools on top of
//! a code-hosting forge's API, including its lazy completion engine.
//!
//! # Modules
//!
//! - `api`: Remote API transport (GraphQL and REST)
//! - `cli`: Command-line interface and argument parsing
//! - `commands`: Command implementations
//! - `complete`: Lazy completion-action engine
//! - `config`: Configuration management
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use forge::api::ForgeClient;
//! use forge::complete::CompletionEngine;
//! use forge::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_from_file(None)?;
//!     let client = ForgeClient::from_config(&config)?;
//!
//!     let engine = CompletionEngine::new(Arc::new(client), config);
//!     let words = ["repo".to_string(), "view".to_string(), String::new()];
//!     for candidate in engine.complete(&words) {
//!         println!("{}", candidate.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod complete;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use api::{ForgeClient, QueryExecutor};
pub use complete::{Action, Candidate, CompletionEngine, InvocationContext, QueryResolver};
pub use config::Config;
pub use error::{ForgeError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
