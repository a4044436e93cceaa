//! Error types for the HubSpot MCP Server.
//!
//! This module defines custom error types using `thiserror` for precise error handling.
//! Tool-facing failures are collected in [`ToolError`], whose `Display` output is the
//! exact `"Error: ..."` string handed back to the MCP caller.

use crate::domain::ValidationError;
use thiserror::Error;

/// Errors that can occur when interacting with the HubSpot API.
#[derive(Error, Debug)]
pub enum HubSpotApiError {
    /// No access token was configured
    #[error("HUBSPOT_ACCESS_TOKEN not set")]
    MissingToken,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,
}

impl HubSpotApiError {
    /// HTTP status code of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HubSpotApiError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Errors raised by the Microsoft Graph transcript pipeline.
#[derive(Error, Debug)]
pub enum GraphError {
    /// OAuth sign-in or token redemption failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Graph request failed at the transport level
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Graph returned a non-success status
    #[error("Graph API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse a Graph or token response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Reading or writing the credential store or output file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the `.msg` parser.
#[derive(Error, Debug)]
pub enum EmailParseError {
    /// Only Outlook `.msg` files are understood
    #[error("Only .msg email files are supported currently")]
    UnsupportedFormat,
}

/// Caller-facing failure of a tool invocation.
///
/// Every variant renders as the string returned to the MCP client, so
/// handlers never need to build error text themselves.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The HubSpot token is absent; checked before any other work
    #[error("Error: HUBSPOT_ACCESS_TOKEN not set")]
    MissingToken,

    /// The Microsoft client ID is absent
    #[error("Error: MS_CLIENT_ID not set")]
    MissingClientId,

    /// A user-supplied value failed validation
    #[error("Error: {0}")]
    Validation(#[from] ValidationError),

    /// An update was requested with nothing to change
    #[error("Error: No properties to update")]
    NoProperties,

    /// A targeted read or update hit a 404
    #[error("Error: {0} not found")]
    NotFound(&'static str),

    /// Contact creation hit a 409
    #[error("Error: Contact already exists")]
    AlreadyExists,

    /// Any other non-2xx status
    #[error("Error: {0}")]
    Status(u16),

    /// A secondary fetch failed with a status code
    #[error("Error fetching {what}: {status}")]
    FetchFailed { what: &'static str, status: u16 },

    /// Transport or decoding failure with no status code
    #[error("Error: {0}")]
    Request(String),

    /// Transcript pipeline failure, already phrased for the caller
    #[error("{0}")]
    Transcript(String),
}

impl From<HubSpotApiError> for ToolError {
    fn from(err: HubSpotApiError) -> Self {
        match err {
            HubSpotApiError::MissingToken => ToolError::MissingToken,
            HubSpotApiError::ApiError { status, .. } => ToolError::Status(status),
            other => ToolError::Request(other.to_string()),
        }
    }
}

impl ToolError {
    /// Map an API error for an operation that targets one object by ID,
    /// turning a 404 into the entity-specific not-found message.
    pub fn for_entity(entity: &'static str, err: HubSpotApiError) -> Self {
        match err.status() {
            Some(404) => ToolError::NotFound(entity),
            _ => ToolError::from(err),
        }
    }
}

/// Convenience type alias for Results with HubSpotApiError
pub type HubSpotApiResult<T> = Result<T, HubSpotApiError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with GraphError
pub type GraphResult<T> = Result<T, GraphError>;

/// Convenience type alias for tool results
pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingVar("HUBSPOT_ACCESS_TOKEN".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: HUBSPOT_ACCESS_TOKEN"
        );

        assert_eq!(
            ToolError::MissingToken.to_string(),
            "Error: HUBSPOT_ACCESS_TOKEN not set"
        );
        assert_eq!(
            ToolError::NotFound("Company").to_string(),
            "Error: Company not found"
        );
        assert_eq!(ToolError::Status(500).to_string(), "Error: 500");
        assert_eq!(
            ToolError::FetchFailed {
                what: "project details",
                status: 502
            }
            .to_string(),
            "Error fetching project details: 502"
        );
    }

    #[test]
    fn test_api_error_variants() {
        let err = HubSpotApiError::ApiError {
            status: 404,
            message: "Not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert_eq!(err.status(), Some(404));
        assert_eq!(HubSpotApiError::Timeout.status(), None);
    }

    #[test]
    fn test_for_entity_only_rewrites_404() {
        let not_found = HubSpotApiError::ApiError {
            status: 404,
            message: String::new(),
        };
        assert_eq!(
            ToolError::for_entity("Project", not_found).to_string(),
            "Error: Project not found"
        );

        let server_error = HubSpotApiError::ApiError {
            status: 503,
            message: String::new(),
        };
        assert_eq!(
            ToolError::for_entity("Project", server_error).to_string(),
            "Error: 503"
        );
    }
}
