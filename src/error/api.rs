use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::kinds::{ApiError, GraphQlErrorEntry};

/// Structured error information extracted from remote API failures.
///
/// This is intended to be serialized to JSON and consumed by other
/// components (e.g. logging, diagnostics output).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub(crate) errors: Vec<GraphQlErrorDetail>,
}

/// One entry of a GraphQL `errors` array, as sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlErrorDetail {
    pub(crate) message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub(crate) kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub(crate) path: Option<Vec<String>>,
}

impl ErrorInfo {
    /// Convert error info to pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert error info to compact JSON string (single line).
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Format remote API error messages for the parent module's `Display`
/// implementation of `ForgeError::Api`.
pub fn format_api_error(f: &mut fmt::Formatter<'_>, error: &ApiError) -> fmt::Result {
    match error {
        ApiError::GraphQl(_) | ApiError::HttpStatus { .. } => {
            let info = extract_error_info(error);
            let wrapper = serde_json::json!({ "error": info });
            let json_output = serde_json::to_string_pretty(&wrapper).map_err(|_| fmt::Error)?;
            write!(f, "API error:\n{json_output}")
        }
        other => write!(f, "API error: {other}"),
    }
}

/// Extract structured information from an [`ApiError`].
pub fn extract_error_info(error: &ApiError) -> ErrorInfo {
    let mut info = ErrorInfo::default();

    match error {
        ApiError::ConnectionFailed(msg) => {
            info.error_type = Some("api.connection_failed".to_string());
            info.message = Some(msg.clone());
        }
        ApiError::Timeout => {
            info.error_type = Some("api.timeout".to_string());
            info.message = Some("request timed out".to_string());
        }
        ApiError::HttpStatus { status, message } => {
            info.error_type = Some("api.http_status".to_string());
            info.status = Some(*status);
            info.message = Some(message.clone());
        }
        ApiError::GraphQl(entries) => {
            info.error_type = Some("api.graphql".to_string());
            info.errors = entries
                .iter()
                .map(|e| GraphQlErrorDetail {
                    message: e.message.clone(),
                    kind: e.kind.clone(),
                    path: None,
                })
                .collect();
        }
        ApiError::MalformedResponse(msg) => {
            info.error_type = Some("api.malformed_response".to_string());
            info.message = Some(msg.clone());
        }
        ApiError::NoHost => {
            info.error_type = Some("api.no_host".to_string());
            info.message = Some("no API host configured".to_string());
        }
    }

    info
}

/// Parse the `errors` array of a GraphQL response body.
///
/// Returns `None` when the body carries no errors, so callers can treat a
/// `Some` as a failed request regardless of HTTP status.
pub fn parse_graphql_errors(body: &serde_json::Value) -> Option<Vec<GraphQlErrorEntry>> {
    let entries = body.get("errors")?.as_array()?;
    if entries.is_empty() {
        return None;
    }

    let parsed = entries
        .iter()
        .map(|entry| GraphQlErrorEntry {
            message: entry
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
            kind: entry
                .get("type")
                .and_then(|t| t.as_str())
                .map(str::to_string),
        })
        .collect();

    Some(parsed)
}

/// Whether a GraphQL error set indicates missing OAuth scopes.
pub fn is_scope_error(entries: &[GraphQlErrorEntry]) -> bool {
    entries.iter().any(|e| {
        e.kind.as_deref() == Some("INSUFFICIENT_SCOPES")
            || e.message.contains("OAuth scopes")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_graphql_errors_present() {
        let body = json!({
            "data": null,
            "errors": [
                { "message": "Could not resolve to a Repository", "type": "NOT_FOUND" }
            ]
        });

        let errors = parse_graphql_errors(&body).expect("errors should parse");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Could not resolve to a Repository");
        assert_eq!(errors[0].kind.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_parse_graphql_errors_absent() {
        let body = json!({ "data": { "repository": null } });
        assert!(parse_graphql_errors(&body).is_none());
    }

    #[test]
    fn test_parse_graphql_errors_empty_array() {
        let body = json!({ "data": {}, "errors": [] });
        assert!(parse_graphql_errors(&body).is_none());
    }

    #[test]
    fn test_scope_error_detection() {
        let entries = vec![GraphQlErrorEntry {
            message: "Your token has not been granted the required OAuth scopes".to_string(),
            kind: Some("INSUFFICIENT_SCOPES".to_string()),
        }];
        assert!(is_scope_error(&entries));

        let entries = vec![GraphQlErrorEntry {
            message: "not found".to_string(),
            kind: Some("NOT_FOUND".to_string()),
        }];
        assert!(!is_scope_error(&entries));
    }

    #[test]
    fn test_extract_http_status_info() {
        let err = ApiError::HttpStatus {
            status: 401,
            message: "Bad credentials".to_string(),
        };

        let info = extract_error_info(&err);
        assert_eq!(info.error_type.as_deref(), Some("api.http_status"));
        assert_eq!(info.status, Some(401));
        assert!(info.to_json().unwrap().contains("Bad credentials"));
    }
}
