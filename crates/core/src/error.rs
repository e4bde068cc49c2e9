//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic, recoverable business failure. The caller layer maps
/// each kind to an external response; none of them is fatal. Infrastructure concerns
/// belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A process, unit or user id did not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation is not allowed from the current status.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// The caller supplied a value outside the accepted set.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An externally supplied identifier already exists.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Data required by the operation has not been recorded yet.
    #[error("missing precondition: {0}")]
    MissingPrecondition(String),
}

/// Discriminant of [`DomainError`], for matching without the message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    StateConflict,
    InvalidArgument,
    DuplicateId,
    MissingPrecondition,
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn state_conflict(msg: impl Into<String>) -> Self {
        Self::StateConflict(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn duplicate_id(msg: impl Into<String>) -> Self {
        Self::DuplicateId(msg.into())
    }

    pub fn missing_precondition(msg: impl Into<String>) -> Self {
        Self::MissingPrecondition(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::StateConflict(_) => ErrorKind::StateConflict,
            DomainError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DomainError::DuplicateId(_) => ErrorKind::DuplicateId,
            DomainError::MissingPrecondition(_) => ErrorKind::MissingPrecondition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(DomainError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::state_conflict("x").kind(), ErrorKind::StateConflict);
        assert_eq!(DomainError::invalid_argument("x").kind(), ErrorKind::InvalidArgument);
        assert_eq!(DomainError::duplicate_id("x").kind(), ErrorKind::DuplicateId);
        assert_eq!(
            DomainError::missing_precondition("x").kind(),
            ErrorKind::MissingPrecondition
        );
    }

    #[test]
    fn display_includes_message() {
        let err = DomainError::duplicate_id("blood unit U1 already exists");
        assert_eq!(err.to_string(), "duplicate id: blood unit U1 already exists");
    }
}
