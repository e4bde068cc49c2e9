use thiserror::Error;

use hemaflow_core::{DomainError, ErrorKind};

use crate::store::StoreError;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Error returned by every service operation.
///
/// The first five variants mirror [`DomainError`]; storage failures are folded
/// into them where they have a business meaning (a lost optimistic race is a state
/// conflict, a unique-key violation is a duplicate id). `Store` is what remains.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("missing precondition: {0}")]
    MissingPrecondition(String),

    /// Backend failure unrelated to the request (poisoned lock, lost connection).
    #[error("storage failure: {0}")]
    Store(String),
}

impl WorkflowError {
    /// Domain classification, `None` for infrastructure failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            WorkflowError::NotFound(_) => Some(ErrorKind::NotFound),
            WorkflowError::StateConflict(_) => Some(ErrorKind::StateConflict),
            WorkflowError::InvalidArgument(_) => Some(ErrorKind::InvalidArgument),
            WorkflowError::DuplicateId(_) => Some(ErrorKind::DuplicateId),
            WorkflowError::MissingPrecondition(_) => Some(ErrorKind::MissingPrecondition),
            WorkflowError::Store(_) => None,
        }
    }
}

impl From<DomainError> for WorkflowError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(msg) => WorkflowError::NotFound(msg),
            DomainError::StateConflict(msg) => WorkflowError::StateConflict(msg),
            DomainError::InvalidArgument(msg) => WorkflowError::InvalidArgument(msg),
            DomainError::DuplicateId(msg) => WorkflowError::DuplicateId(msg),
            DomainError::MissingPrecondition(msg) => WorkflowError::MissingPrecondition(msg),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => WorkflowError::StateConflict(msg),
            StoreError::DuplicateKey(msg) => WorkflowError::DuplicateId(msg),
            StoreError::Unavailable(msg) => WorkflowError::Store(msg),
        }
    }
}
