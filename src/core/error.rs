//! Typed error handling for the storefront
//!
//! Every fallible operation in the crate returns a [`StorefrontError`], so
//! HTTP handlers can turn failures into consistent JSON responses and callers
//! can match on the specific category instead of a generic `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: Errors related to configuration loading and validation
//! - [`ValidationError`]: Errors related to request input (forms, query strings)
//! - [`UpstreamError`]: Errors returned by the commerce platform APIs
//! - [`RequestError`]: Errors related to the HTTP request itself
//! - [`SessionError`]: Errors raised by the page session store
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! match service.subscribe(form).await {
//!     Ok(customer) => println!("Subscribed: {:?}", customer.email),
//!     Err(StorefrontError::Upstream(UpstreamError::UserErrors { message, .. })) => {
//!         println!("Rejected by the shop: {}", message);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the storefront
#[derive(Debug)]
pub enum StorefrontError {
    /// Configuration errors
    Config(ConfigError),

    /// Input validation errors
    Validation(ValidationError),

    /// Commerce platform (Admin/Storefront API) errors
    Upstream(UpstreamError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Session store errors
    Session(SessionError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for StorefrontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorefrontError::Config(e) => write!(f, "{}", e),
            StorefrontError::Validation(e) => write!(f, "{}", e),
            StorefrontError::Upstream(e) => write!(f, "{}", e),
            StorefrontError::Request(e) => write!(f, "{}", e),
            StorefrontError::Session(e) => write!(f, "{}", e),
            StorefrontError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for StorefrontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorefrontError::Config(e) => Some(e),
            StorefrontError::Validation(e) => Some(e),
            StorefrontError::Upstream(e) => Some(e),
            StorefrontError::Request(e) => Some(e),
            StorefrontError::Session(e) => Some(e),
            StorefrontError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error shape used by the storefront's forms: `{ field, message }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl StorefrontError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorefrontError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StorefrontError::Validation(_) => StatusCode::BAD_REQUEST,
            StorefrontError::Upstream(e) => e.status_code(),
            StorefrontError::Request(e) => e.status_code(),
            StorefrontError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StorefrontError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StorefrontError::Config(_) => "CONFIG_ERROR",
            StorefrontError::Validation(_) => "VALIDATION_ERROR",
            StorefrontError::Upstream(e) => e.error_code(),
            StorefrontError::Request(e) => e.error_code(),
            StorefrontError::Session(_) => "SESSION_ERROR",
            StorefrontError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// The single message a form shows next to the offending field
    pub fn to_form_error(&self) -> FormError {
        match self {
            StorefrontError::Validation(ValidationError::FieldError { field, message }) => {
                FormError {
                    field: Some(vec![field.clone()]),
                    message: message.clone(),
                }
            }
            StorefrontError::Validation(ValidationError::FieldErrors(errors))
                if !errors.is_empty() =>
            {
                FormError {
                    field: Some(vec![errors[0].field.clone()]),
                    message: errors[0].message.clone(),
                }
            }
            StorefrontError::Upstream(UpstreamError::UserErrors { field, message }) => FormError {
                field: field.clone(),
                message: message.clone(),
            },
            other => FormError {
                field: None,
                message: other.to_string(),
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StorefrontError::Validation(ValidationError::FieldError { field, .. }) => {
                Some(serde_json::json!({ "field": [field] }))
            }
            StorefrontError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            StorefrontError::Upstream(UpstreamError::UserErrors { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file not found
    FileNotFound { path: String },

    /// Failed to parse configuration
    ParseError { message: String },

    /// A configuration value is out of range or inconsistent
    InvalidValue { field: String, message: String },

    /// A required value is missing
    MissingValue { field: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::ParseError { message } => {
                write!(f, "Failed to parse configuration: {}", message)
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid configuration value for '{}': {}", field, message)
            }
            ConfigError::MissingValue { field } => {
                write!(f, "Missing configuration value: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for StorefrontError {
    fn from(err: ConfigError) -> Self {
        StorefrontError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to request input
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Shorthand for a single-field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for StorefrontError {
    fn from(err: ValidationError) -> Self {
        StorefrontError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<FieldValidationError> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        StorefrontError::Validation(ValidationError::FieldErrors(errors))
    }
}

// =============================================================================
// Upstream Errors
// =============================================================================

/// Errors returned by the commerce platform
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The API answered without data; `errors` carries the raw GraphQL errors
    #[error("GraphQL request '{operation}' failed: {errors}")]
    GraphQL { operation: String, errors: String },

    /// The mutation ran but the platform rejected the input
    #[error("{message}")]
    UserErrors {
        field: Option<Vec<String>>,
        message: String,
    },

    /// The HTTP exchange itself failed
    #[error("Request to commerce API failed: {message}")]
    Transport { message: String },

    /// Non-success HTTP status from the commerce API
    #[error("Commerce API returned HTTP {status}")]
    Status { status: u16 },
}

impl UpstreamError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::GraphQL { .. } => StatusCode::BAD_GATEWAY,
            UpstreamError::UserErrors { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            UpstreamError::Transport { .. } => StatusCode::BAD_GATEWAY,
            UpstreamError::Status { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            UpstreamError::GraphQL { .. } => "UPSTREAM_GRAPHQL_ERROR",
            UpstreamError::UserErrors { .. } => "UPSTREAM_USER_ERROR",
            UpstreamError::Transport { .. } => "UPSTREAM_TRANSPORT_ERROR",
            UpstreamError::Status { .. } => "UPSTREAM_STATUS_ERROR",
        }
    }
}

impl From<UpstreamError> for StorefrontError {
    fn from(err: UpstreamError) -> Self {
        StorefrontError::Upstream(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Unknown path parameter value
    InvalidPath { path: String, message: String },

    /// Malformed request body
    BadRequest { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidPath { path, message } => {
                write!(f, "Invalid path '{}': {}", path, message)
            }
            RequestError::BadRequest { message } => write!(f, "Bad request: {}", message),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidPath { .. } => StatusCode::NOT_FOUND,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidPath { .. } => "INVALID_PATH",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

impl From<RequestError> for StorefrontError {
    fn from(err: RequestError) -> Self {
        StorefrontError::Request(err)
    }
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors raised by a [`SessionStore`](crate::session::SessionStore)
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Session backend failure: {0}")]
    Backend(String),
}

impl From<SessionError> for StorefrontError {
    fn from(err: SessionError) -> Self {
        StorefrontError::Session(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        StorefrontError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for StorefrontError {
    fn from(err: std::io::Error) -> Self {
        StorefrontError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_yaml::Error> for StorefrontError {
    fn from(err: serde_yaml::Error) -> Self {
        StorefrontError::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for StorefrontError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StorefrontError::Upstream(UpstreamError::Status {
                status: status.as_u16(),
            }),
            None => StorefrontError::Upstream(UpstreamError::Transport {
                message: err.to_string(),
            }),
        }
    }
}

impl From<anyhow::Error> for StorefrontError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StorefrontError>() {
            Ok(e) => e,
            Err(err) => StorefrontError::Internal(err.to_string()),
        }
    }
}

/// Result alias used throughout the crate
pub type StorefrontResult<T> = Result<T, StorefrontError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = StorefrontError::Validation(ValidationError::field("email", "Email is required"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("Email is required"));
    }

    #[test]
    fn test_user_errors_carry_field_details() {
        let err = StorefrontError::Upstream(UpstreamError::UserErrors {
            field: Some(vec!["email".to_string()]),
            message: "Email has already been taken".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = err.to_response();
        assert_eq!(response.code, "UPSTREAM_USER_ERROR");
        assert_eq!(response.message, "Email has already been taken");
        assert_eq!(
            response.details,
            Some(serde_json::json!({ "field": ["email"] }))
        );
    }

    #[test]
    fn test_form_error_shapes() {
        let missing = StorefrontError::from(ValidationError::field("email", "Email is required"));
        assert_eq!(
            serde_json::to_value(missing.to_form_error()).unwrap(),
            serde_json::json!({ "field": ["email"], "message": "Email is required" })
        );

        let rejected = StorefrontError::Upstream(UpstreamError::UserErrors {
            field: None,
            message: "Customer is blocked".to_string(),
        });
        assert_eq!(
            serde_json::to_value(rejected.to_form_error()).unwrap(),
            serde_json::json!({ "message": "Customer is blocked" })
        );

        let down = StorefrontError::Upstream(UpstreamError::Status { status: 503 });
        assert_eq!(down.to_form_error().message, "Commerce API returned HTTP 503");
        assert!(down.to_form_error().field.is_none());
    }

    #[test]
    fn test_graphql_error_is_bad_gateway() {
        let err = UpstreamError::GraphQL {
            operation: "CustomerByEmail".to_string(),
            errors: "[]".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("CustomerByEmail"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::FileNotFound {
            path: "/etc/storefront.yaml".to_string(),
        };
        assert!(err.to_string().contains("/etc/storefront.yaml"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: StorefrontError = json_err.into();
        assert!(matches!(
            err,
            StorefrontError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_category() {
        let original = StorefrontError::Request(RequestError::BadRequest {
            message: "nope".to_string(),
        });
        let wrapped = anyhow::Error::new(original);
        let err: StorefrontError = wrapped.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
