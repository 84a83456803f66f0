use thiserror::Error;

/// Errors raised by pure domain code (parsing, validation, permission checks).
/// The HTTP layer maps them onto status codes through `ApiError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Forbidden(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
