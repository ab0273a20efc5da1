use std::{fmt, io};

use crate::error::api::format_api_error;

/// Crate-wide `Result` type using [`ForgeError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Top-level error type for forge operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ForgeError {
    /// Remote API errors (transport, GraphQL, REST).
    Api(ApiError),

    /// Configuration errors.
    Config(ConfigError),

    /// Completion-engine errors.
    ///
    /// These never surface to the user during completion; they exist so the
    /// engine can log what it swallowed.
    Completion(CompletionError),

    /// Authentication errors.
    Auth(AuthError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),

    /// Feature not yet implemented.
    NotImplemented(String),
}

/// Remote-API-specific errors.
#[derive(Debug)]
pub enum ApiError {
    /// Failed to reach the remote host.
    ConnectionFailed(String),

    /// The request exceeded the configured timeout.
    Timeout,

    /// The remote host rejected the request with an HTTP status.
    HttpStatus { status: u16, message: String },

    /// The GraphQL response carried one or more errors.
    GraphQl(Vec<GraphQlErrorEntry>),

    /// The response body could not be decoded.
    MalformedResponse(String),

    /// No API host is configured.
    NoHost,
}

/// A single entry from a GraphQL `errors` array.
#[derive(Debug, Clone)]
pub struct GraphQlErrorEntry {
    /// Error message from the server.
    pub message: String,

    /// Server-side error classification, if present.
    pub kind: Option<String>,
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// The key is not a known configuration key.
    UnknownKey(String),

    /// Invalid field value, with the list of accepted values.
    InvalidValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },

    /// Config file could not be written.
    WriteFailed(String),
}

/// Completion-engine errors.
///
/// All of these degrade to an empty candidate set inside the completion
/// path; they are never shown to the user while completing.
#[derive(Debug)]
pub enum CompletionError {
    /// A resolver could not determine its query variables.
    MissingContext(String),

    /// A query result did not have the expected shape.
    UnexpectedShape(String),

    /// A cache key was re-entered while its resolution was in flight.
    ReentrantResolution(String),

    /// The underlying query failed.
    QueryFailed(String),
}

/// Authentication-specific errors.
#[derive(Debug)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed(String),

    /// The token lacks a required OAuth scope.
    InsufficientScopes(String),

    /// No token is configured for the host.
    MissingToken(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForgeError::Api(e) => format_api_error(f, e),
            ForgeError::Config(e) => write!(f, "Configuration error: {e}"),
            ForgeError::Completion(e) => write!(f, "Completion error: {e}"),
            ForgeError::Auth(e) => write!(f, "Authentication error: {e}"),
            ForgeError::Io(e) => write!(f, "I/O error: {e}"),
            ForgeError::Generic(msg) => write!(f, "{msg}"),
            ForgeError::NotImplemented(msg) => write!(f, "Not implemented: {msg}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ApiError::Timeout => write!(f, "Request timeout"),
            ApiError::HttpStatus { status, message } => {
                write!(f, "HTTP {status}: {message}")
            }
            ApiError::GraphQl(entries) => {
                let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
                write!(f, "GraphQL: {}", messages.join("; "))
            }
            ApiError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            ApiError::NoHost => write!(f, "No API host configured"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::UnknownKey(key) => {
                write!(f, "'{key}' is not a known configuration key")
            }
            ConfigError::InvalidValue {
                field,
                value,
                valid_values,
            } => {
                let quoted: Vec<String> = valid_values.iter().map(|v| format!("'{v}'")).collect();
                write!(
                    f,
                    "failed to set '{field}' to '{value}': valid values are {}",
                    quoted.join(", ")
                )
            }
            ConfigError::WriteFailed(msg) => {
                write!(f, "failed to write config to disk: {msg}")
            }
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::MissingContext(msg) => write!(f, "Missing context: {msg}"),
            CompletionError::UnexpectedShape(msg) => {
                write!(f, "Unexpected result shape: {msg}")
            }
            CompletionError::ReentrantResolution(key) => {
                write!(f, "Re-entrant resolution of key '{key}'")
            }
            CompletionError::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AuthenticationFailed(msg) => {
                write!(f, "Authentication failed: {msg}")
            }
            AuthError::InsufficientScopes(scope) => {
                write!(f, "insufficient OAuth scopes, missing: {scope}")
            }
            AuthError::MissingToken(host) => write!(f, "no token configured for {host}"),
        }
    }
}

impl std::error::Error for ForgeError {}
impl std::error::Error for ApiError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CompletionError {}
impl std::error::Error for AuthError {}

/* ========================= Conversions to ForgeError ========================= */

impl From<io::Error> for ForgeError {
    fn from(err: io::Error) -> Self {
        ForgeError::Io(err)
    }
}

impl From<ApiError> for ForgeError {
    fn from(err: ApiError) -> Self {
        ForgeError::Api(err)
    }
}

impl From<ConfigError> for ForgeError {
    fn from(err: ConfigError) -> Self {
        ForgeError::Config(err)
    }
}

impl From<CompletionError> for ForgeError {
    fn from(err: CompletionError) -> Self {
        ForgeError::Completion(err)
    }
}

impl From<AuthError> for ForgeError {
    fn from(err: AuthError) -> Self {
        ForgeError::Auth(err)
    }
}

impl From<String> for ForgeError {
    fn from(msg: String) -> Self {
        ForgeError::Generic(msg)
    }
}

impl From<&str> for ForgeError {
    fn from(msg: &str) -> Self {
        ForgeError::Generic(msg.to_owned())
    }
}
