//! Remote API transport for forge
//!
//! This module provides the HTTP transport to the code-hosting API:
//! - GraphQL execution with envelope handling and error extraction
//! - REST calls for the endpoints that have no GraphQL equivalent
//! - Host-aware endpoint selection (public host vs. self-hosted)
//!
//! The [`QueryExecutor`] trait is the seam between the transport and the
//! rest of the crate. Command execution and completion both talk to it,
//! which keeps the transport swappable for an in-memory double in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, parse_graphql_errors};

/// Executes GraphQL queries against a remote host.
///
/// Implementations must be usable from concurrent contexts; the completion
/// engine shares one executor across all resolvers of a request.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a GraphQL query and return the unwrapped `data` object.
    ///
    /// # Arguments
    /// * `query` - GraphQL document
    /// * `variables` - JSON object bound to the document's variables
    ///
    /// # Returns
    /// * `Result<Value, ApiError>` - The `data` field of the response, or
    ///   a transport/protocol error
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, ApiError>;
}

/// HTTP client for a single configured host.
pub struct ForgeClient {
    /// Underlying HTTP client, carries the request timeout
    http: reqwest::Client,

    /// Hostname requests are routed to
    host: String,

    /// OAuth token, attached as a bearer header when present
    token: Option<String>,
}

impl ForgeClient {
    /// Create a client for a host.
    ///
    /// # Arguments
    /// * `host` - Hostname, e.g. `github.com`
    /// * `token` - OAuth token, or `None` for unauthenticated requests
    /// * `timeout` - Per-request timeout
    pub fn new(
        host: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("forge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            http,
            host: host.into(),
            token,
        })
    }

    /// Create a client from the loaded configuration.
    ///
    /// Uses the configured default host, its stored token, and the
    /// configured request timeout.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let host = config.api.host.clone();
        if host.is_empty() {
            return Err(ApiError::NoHost);
        }
        let token = config.token_for(&host).map(str::to_string);
        Self::new(host, token, config.request_timeout())
    }

    /// Host this client talks to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// GraphQL endpoint for the host.
    ///
    /// The public host serves GraphQL from its `api.` subdomain while
    /// self-hosted installations serve it under `/api/graphql`.
    fn graphql_endpoint(&self) -> String {
        if self.host == "github.com" {
            "https://api.github.com/graphql".to_string()
        } else {
            format!("https://{}/api/graphql", self.host)
        }
    }

    /// REST endpoint for a path like `user/keys`.
    fn rest_endpoint(&self, path: &str) -> String {
        if self.host == "github.com" {
            format!("https://api.github.com/{path}")
        } else {
            format!("https://{}/api/v3/{path}", self.host)
        }
    }

    /// POST a JSON body to a REST path.
    ///
    /// # Arguments
    /// * `path` - REST path relative to the API root, e.g. `user/keys`
    /// * `body` - Request body
    ///
    /// # Returns
    /// * `Result<Value, ApiError>` - Parsed response body, `Value::Null`
    ///   for empty 204 responses
    pub async fn rest_post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.rest_endpoint(path);
        debug!(%url, "rest post");

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if status.as_u16() == 204 {
            return Ok(Value::Null);
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message: rest_error_message(&parsed),
            });
        }

        Ok(parsed)
    }
}

#[async_trait]
impl QueryExecutor for ForgeClient {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, ApiError> {
        let url = self.graphql_endpoint();
        debug!(%url, "graphql query");

        let payload = json!({ "query": query, "variables": variables });
        let mut request = self.http.post(&url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message: rest_error_message(&body),
            });
        }

        // A 200 response can still carry errors in the GraphQL envelope.
        if let Some(errors) = parse_graphql_errors(&body) {
            return Err(ApiError::GraphQl(errors));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| ApiError::MalformedResponse("response has no data field".to_string()))
    }
}

/// Map a transport failure onto [`ApiError`].
fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::ConnectionFailed(err.to_string())
    }
}

/// Pull the human-readable message out of a REST error body.
fn rest_error_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string()
}
