//! Structured Error Handling for the offer ontology query layer
//!
//! Provides a single error type with:
//! - Granular error codes for programmatic handling
//! - A coarse [`ErrorKind`] that callers branch on
//! - Structured error responses (JSON-friendly)
//! - HTTP status code mapping
//!
//! # Error Kinds
//!
//! - `InvalidParameter` - Rejected before any query text is built
//! - `StoreUnavailable` - The SPARQL endpoint could not be reached
//! - `StoreQueryError` - The endpoint was reached but rejected or failed the query
//! - `Config` - Configuration issues
//! - `Internal` - Bugs and unexpected state
//!
//! An empty result set is not an error: operations return `Ok(vec![])`.
//!
//! # Example
//!
//! ```rust,ignore
//! use oferta_ontology::error::{OntologyError, ErrorCode};
//!
//! fn check(term: &str) -> Result<(), OntologyError> {
//!     if term.is_empty() {
//!         return Err(OntologyError::empty_parameter("q")
//!             .with_hint("Pass a non-empty search term"));
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Error Kinds
// ============================================================================

/// Coarse classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Caller supplied a parameter that cannot be turned into a query
    InvalidParameter,
    /// Transport-level failure reaching the store
    StoreUnavailable,
    /// The store rejected or failed to evaluate the query
    StoreQueryError,
    /// Configuration problem
    Config,
    /// Internal error
    Internal,
}

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Invalid parameters (1xxx)
    /// Generic invalid parameter
    InvalidParameter = 1000,
    /// Required parameter missing or blank
    EmptyParameter = 1001,
    /// Category name contains characters that cannot name a class
    InvalidCategory = 1002,
    /// Search term rejected
    InvalidSearchTerm = 1003,
    /// Limit or offset out of range
    InvalidPagination = 1004,
    /// Rating threshold is not a finite number
    InvalidThreshold = 1005,

    // Store unavailable (2xxx)
    /// Generic transport failure
    StoreUnavailable = 2000,
    /// Connection refused or reset
    ConnectionFailed = 2001,
    /// Request timed out
    StoreTimeout = 2002,
    /// Endpoint answered with a gateway or not-found status
    EndpointUnavailable = 2003,

    // Store query errors (3xxx)
    /// Generic query failure
    StoreQueryError = 3000,
    /// The store rejected the query text
    QueryRejected = 3001,
    /// The response body did not match the SPARQL JSON results format
    MalformedResults = 3002,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Invalid config syntax
    InvalidConfigSyntax = 7001,
    /// Invalid config value
    InvalidConfigValue = 7002,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get the coarse kind for this code
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::InvalidParameter
            | ErrorCode::EmptyParameter
            | ErrorCode::InvalidCategory
            | ErrorCode::InvalidSearchTerm
            | ErrorCode::InvalidPagination
            | ErrorCode::InvalidThreshold => ErrorKind::InvalidParameter,

            ErrorCode::StoreUnavailable
            | ErrorCode::ConnectionFailed
            | ErrorCode::StoreTimeout
            | ErrorCode::EndpointUnavailable => ErrorKind::StoreUnavailable,

            ErrorCode::StoreQueryError
            | ErrorCode::QueryRejected
            | ErrorCode::MalformedResults => ErrorKind::StoreQueryError,

            ErrorCode::ConfigError
            | ErrorCode::InvalidConfigSyntax
            | ErrorCode::InvalidConfigValue => ErrorKind::Config,

            ErrorCode::InternalError => ErrorKind::Internal,
        }
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidParameter => "Invalid parameter",
            ErrorCode::EmptyParameter => "Missing required parameter",
            ErrorCode::InvalidCategory => "Invalid category name",
            ErrorCode::InvalidSearchTerm => "Invalid search term",
            ErrorCode::InvalidPagination => "Invalid pagination",
            ErrorCode::InvalidThreshold => "Invalid rating threshold",

            ErrorCode::StoreUnavailable => "Store unavailable",
            ErrorCode::ConnectionFailed => "Connection to store failed",
            ErrorCode::StoreTimeout => "Store request timed out",
            ErrorCode::EndpointUnavailable => "Store endpoint unavailable",

            ErrorCode::StoreQueryError => "Store query error",
            ErrorCode::QueryRejected => "Query rejected by store",
            ErrorCode::MalformedResults => "Malformed query results",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",

            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::StoreTimeout => 504,
            _ => match self.kind() {
                ErrorKind::InvalidParameter => 400,
                ErrorKind::StoreUnavailable => 503,
                ErrorKind::StoreQueryError => 502,
                ErrorKind::Config | ErrorKind::Internal => 500,
            },
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The error type returned by every query operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Diagnostic body returned by the store, when there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl OntologyError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
            payload: None,
        }
    }

    // ========================================================================
    // Factory methods
    // ========================================================================

    /// Create a generic invalid parameter error
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message)
    }

    /// Create an error for a missing or blank parameter
    pub fn empty_parameter(name: &str) -> Self {
        Self::new(ErrorCode::EmptyParameter, format!("{} cannot be empty", name))
            .with_context("parameter", name)
    }

    /// Create an invalid category error
    pub fn invalid_category(category: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCategory, reason).with_context("category", category)
    }

    /// Create an invalid search term error
    pub fn invalid_search_term(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSearchTerm, reason)
    }

    /// Create an invalid pagination error
    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPagination, message)
    }

    /// Create an invalid threshold error
    pub fn invalid_threshold(value: f64) -> Self {
        Self::new(
            ErrorCode::InvalidThreshold,
            format!("rating threshold must be a finite number, got {}", value),
        )
    }

    /// Create a store unavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// Create a store timeout error
    pub fn store_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreTimeout, message)
    }

    /// Create a store query error
    pub fn store_query(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreQueryError, message)
    }

    /// Create a malformed results error
    pub fn malformed_results(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedResults, message)
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach the store's diagnostic body; blank bodies are dropped
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        if !payload.trim().is_empty() {
            self.payload = Some(payload);
        }
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.http_status())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }
}

impl fmt::Display for OntologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref payload) = self.payload {
            write!(f, "\nStore response: {}", payload)?;
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for OntologyError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for OntologyError {
    fn from(err: serde_json::Error) -> Self {
        OntologyError::malformed_results(err.to_string()).with_context("format", "JSON")
    }
}

impl From<crate::config::ConfigError> for OntologyError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        let code = match err {
            ConfigError::Parse(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::InvalidValue { .. } => ErrorCode::InvalidConfigValue,
            _ => ErrorCode::ConfigError,
        };
        OntologyError::new(code, err.to_string())
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using OntologyError
pub type OntologyResult<T> = Result<T, OntologyError>;

// ============================================================================
// Error response for HTTP APIs
// ============================================================================

/// Structured error response for HTTP APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message, under the key the original API used
    pub error: String,
    /// Error code (string form)
    pub code: String,
    /// Numeric error code
    pub code_num: u32,
    /// Coarse kind
    pub kind: ErrorKind,
    /// HTTP status code
    pub status: u16,
    /// Additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    /// Hint for resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&OntologyError> for ErrorResponse {
    fn from(err: &OntologyError) -> Self {
        Self {
            error: err.message.clone(),
            code: format!("{:?}", err.code),
            code_num: err.code.code(),
            kind: err.kind(),
            status: err.http_status(),
            details: err.context.as_ref().map(|c| c.fields.clone()),
            hint: err.hint.clone(),
        }
    }
}

impl From<OntologyError> for ErrorResponse {
    fn from(err: OntologyError) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = OntologyError::invalid_parameter("bad offset");
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(err.message, "bad offset");
    }

    #[test]
    fn test_codes_map_to_kinds() {
        assert_eq!(ErrorCode::InvalidPagination.kind(), ErrorKind::InvalidParameter);
        assert_eq!(ErrorCode::StoreTimeout.kind(), ErrorKind::StoreUnavailable);
        assert_eq!(ErrorCode::ConnectionFailed.kind(), ErrorKind::StoreUnavailable);
        assert_eq!(ErrorCode::QueryRejected.kind(), ErrorKind::StoreQueryError);
        assert_eq!(ErrorCode::MalformedResults.kind(), ErrorKind::StoreQueryError);
    }

    #[test]
    fn test_error_http_status() {
        assert_eq!(OntologyError::empty_parameter("q").http_status(), 400);
        assert_eq!(OntologyError::store_unavailable("down").http_status(), 503);
        assert_eq!(OntologyError::store_timeout("slow").http_status(), 504);
        assert_eq!(OntologyError::store_query("bad").http_status(), 502);
        assert_eq!(OntologyError::internal("oops").http_status(), 500);
    }

    #[test]
    fn test_client_and_server_errors() {
        assert!(OntologyError::invalid_pagination("x").is_client_error());
        assert!(!OntologyError::invalid_pagination("x").is_server_error());
        assert!(OntologyError::store_unavailable("x").is_server_error());
    }

    #[test]
    fn test_blank_payload_is_dropped() {
        let err = OntologyError::store_query("rejected").with_payload("   ");
        assert!(err.payload.is_none());

        let err = OntologyError::store_query("rejected").with_payload("Parse error: line 3");
        assert_eq!(err.payload.as_deref(), Some("Parse error: line 3"));
    }

    #[test]
    fn test_error_display() {
        let err = OntologyError::store_query("query failed")
            .with_cause("HTTP 400")
            .with_payload("Encountered \" \"}\" \"}\"\" at line 9")
            .with_hint("Check the ontology namespace");

        let display = err.to_string();
        assert!(display.contains("[3000]"));
        assert!(display.contains("query failed"));
        assert!(display.contains("HTTP 400"));
        assert!(display.contains("Store response:"));
        assert!(display.contains("Check the ontology namespace"));
    }

    #[test]
    fn test_error_to_json() {
        let err = OntologyError::empty_parameter("q");
        let json = err.to_json();
        assert!(json.contains("EMPTY_PARAMETER"));
        assert!(json.contains("q cannot be empty"));
    }

    #[test]
    fn test_error_response_from_error() {
        let err = OntologyError::invalid_category("Hotel<>", "illegal character '<'");
        let resp = ErrorResponse::from(&err);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.kind, ErrorKind::InvalidParameter);
        assert_eq!(resp.error, "illegal character '<'");
        assert_eq!(
            resp.details.as_ref().and_then(|d| d.get("category")).map(String::as_str),
            Some("Hotel<>")
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: OntologyError = crate::config::ConfigError::InvalidValue {
            key: "store.timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
