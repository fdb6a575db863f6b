//! # Folio Shared
//!
//! Request/response types of the public API, the uniform response envelope,
//! and the field-level validation helpers used on incoming payloads.

pub mod dto;
pub mod response;
pub mod validation;

pub use response::{ApiResponse, ErrorResponse, FieldError, Pagination};
pub use validation::{Validate, Violations};
