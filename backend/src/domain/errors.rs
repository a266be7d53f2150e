//! Error taxonomy shared by the domain services.
//!
//! Services return `anyhow::Result`; failures that callers need to tell apart
//! are raised as a [`DomainError`] so the REST layer can downcast and pick a
//! status code. Anything else (I/O, serialization) is an internal error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),
    /// Bad credentials
    #[error("{0}")]
    Unauthorized(String),
    /// Caller lacks the role required for the operation
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Record is in a state that forbids the operation, or a unique key is taken
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> anyhow::Error {
        DomainError::Validation(message.into()).into()
    }

    pub fn unauthorized(message: impl Into<String>) -> anyhow::Error {
        DomainError::Unauthorized(message.into()).into()
    }

    pub fn forbidden(message: impl Into<String>) -> anyhow::Error {
        DomainError::Forbidden(message.into()).into()
    }

    pub fn not_found(message: impl Into<String>) -> anyhow::Error {
        DomainError::NotFound(message.into()).into()
    }

    pub fn conflict(message: impl Into<String>) -> anyhow::Error {
        DomainError::Conflict(message.into()).into()
    }

    /// Finds a domain error anywhere in an `anyhow` chain.
    pub fn find(error: &anyhow::Error) -> Option<&DomainError> {
        error.chain().find_map(|cause| cause.downcast_ref::<DomainError>())
    }
}
