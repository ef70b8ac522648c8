use thiserror::Error;

use super::kinds::WorkloadKind;

/// Failures a readiness pass can observe. Cloneable so the same error can be
/// rendered into the Ready condition and still be handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("failed to list {kind} resources in namespace {namespace}: {message}")]
    List {
        kind: WorkloadKind,
        namespace: String,
        message: String,
    },

    #[error("malformed {kind} list result: {message}")]
    Extraction { kind: WorkloadKind, message: String },

    #[error("cannot access metadata of {kind} resource: {message}")]
    Accessor { kind: WorkloadKind, message: String },

    #[error("failed to persist status: {0}")]
    Persist(String),

    #[error("readiness pass cancelled")]
    Cancelled,
}

impl ReadinessError {
    pub fn list<E: std::fmt::Display>(
        kind: WorkloadKind,
        namespace: &str,
        e: E,
    ) -> Self {
        ReadinessError::List {
            kind,
            namespace: namespace.to_string(),
            message: e.to_string(),
        }
    }

    pub fn persist<E: std::fmt::Display>(e: E) -> Self {
        ReadinessError::Persist(e.to_string())
    }
}

pub type ReadinessResult<T> = Result<T, ReadinessError>;
