//! Domain-level error taxonomy.
//!
//! These errors are transport agnostic. The API layer maps them to HTTP
//! status codes; the client surfaces them through its mutation reports.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// One or more field-level validation failures; the handler never ran.
    Validation,
    /// A referenced incident, comment, or user does not exist.
    NotFound,
    /// The actor lacks the capability for the requested mutation.
    NotAuthorized,
    /// The persistence commit failed for a reason not attributable to the
    /// caller's input. Retry-eligible.
    Conflict,
    /// Wiring or invariant failure inside the pipeline itself.
    Internal,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Request field the failure refers to.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    /// Construct a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain error payload carried through the dispatch pipeline.
///
/// # Examples
/// ```
/// use backend::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::not_found("incident 42 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    field_errors: Vec<FieldError>,
}

impl DomainError {
    /// Validation failure enumerating every violated field.
    #[must_use]
    pub fn validation(field_errors: Vec<FieldError>) -> Self {
        Self {
            code: ErrorCode::Validation,
            message: "validation failed".to_owned(),
            field_errors,
        }
    }

    /// The referenced entity does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::plain(ErrorCode::NotFound, message)
    }

    /// The actor may not perform this mutation.
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::plain(ErrorCode::NotAuthorized, message)
    }

    /// Persistence failed transiently; the caller may retry.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::plain(ErrorCode::Conflict, message)
    }

    /// Pipeline wiring failure. Indicates a bug, not caller input.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::plain(ErrorCode::Internal, message)
    }

    fn plain(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Field-level failures; empty unless `code` is [`ErrorCode::Validation`].
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field_errors.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: ", self.message)?;
            let mut first = true;
            for err in &self.field_errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", err.field, err.message)?;
                first = false;
            }
            Ok(())
        }
    }
}

impl std::error::Error for DomainError {}
