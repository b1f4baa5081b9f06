// src/error.rs
use std::fmt;

use thiserror::Error;

/// Failure reported by the browser-control boundary.
///
/// `Transient` covers the "not rendered yet" family (element missing, stale
/// handle, readiness timeout) and is retried locally. `Fatal` is anything the
/// collaborator cannot recover from (session gone, navigation rejected).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("transient source error: {0}")]
    Transient(String),
    #[error("source error: {0}")]
    Fatal(String),
}

impl SourceError {
    pub fn transient(msg: impl fmt::Display) -> Self {
        SourceError::Transient(msg.to_string())
    }

    pub fn fatal(msg: impl fmt::Display) -> Self {
        SourceError::Fatal(msg.to_string())
    }
}

/// Terminal reasons a collection run ends in `Failed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("source unreachable: {0}")]
    Unreachable(String),
    #[error("records view unreachable")]
    RecordsViewUnreachable,
    #[error("no records loaded")]
    NoRecords,
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors from writing the run artifacts.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Path exists but is not a directory: {0}")]
    NotADirectory(String),
}

/// Marks errors the retry combinator may try again.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl Retryable for SourceError {
    fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

impl Retryable for CollectError {
    fn is_transient(&self) -> bool {
        matches!(self, CollectError::Source(SourceError::Transient(_)))
    }
}

pub type Result<T, E = CollectError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_source_errors_retry() {
        assert!(SourceError::transient("stale").is_transient());
        assert!(!SourceError::fatal("gone").is_transient());
        assert!(CollectError::from(SourceError::transient("late")).is_transient());
        assert!(!CollectError::RecordsViewUnreachable.is_transient());
        assert!(!CollectError::Unreachable("no match".into()).is_transient());
    }
}
