//! Error handling module for forge operations.
//!
//! This module provides comprehensive error handling for remote API and
//! local operations with:
//! - Structured error information extraction from GraphQL/REST responses
//! - Consistent JSON error formatting for diagnostics and logging
//! - Application-specific error types
//!
//! Note the deliberate asymmetry with the completion engine: errors raised
//! while *executing* a command are reported with diagnostics, while the
//! completion path swallows the equivalent failures and degrades to an
//! empty candidate set (see `crate::complete`).

pub mod api;
pub mod kinds;

// Re-export commonly used types
pub use api::{ErrorInfo, extract_error_info, is_scope_error, parse_graphql_errors};
pub use kinds::{
    ApiError, AuthError, CompletionError, ConfigError, ForgeError, GraphQlErrorEntry, Result,
};
