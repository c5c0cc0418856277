//! Core types shared by every storefront module

pub mod error;
pub mod query;

pub use error::{
    ConfigError, ErrorResponse, FieldValidationError, FormError, RequestError, SessionError,
    StorefrontError, StorefrontResult, UpstreamError, ValidationError,
};
pub use query::{PageDirection, PaginationVariables, QueryParams};
