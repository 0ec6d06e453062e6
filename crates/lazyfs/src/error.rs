//! lazyfs error types.

use std::io;
use thiserror::Error;

/// Boxed error returned by fulfillers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// lazyfs error type.
#[derive(Debug, Error)]
pub enum LazyFsError {
    /// No live entry and no fulfiller produced content.
    #[error("not found: {0}")]
    NotFound(String),

    /// A fulfiller returned an explicit error. The chain was aborted.
    #[error("fulfiller failed for {path}: {source}")]
    GeneratorFailure {
        path: String,
        #[source]
        source: BoxError,
    },

    /// Configuration change rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Operation on a closed file.
    #[error("file already closed")]
    Closed,

    /// Path escapes the root of a source.
    #[error("path escapes root: {0}")]
    PathEscapesRoot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl LazyFsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a GeneratorFailure error.
    pub fn generator_failure(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::GeneratorFailure {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a PathEscapesRoot error.
    pub fn path_escapes_root(path: impl Into<String>) -> Self {
        Self::PathEscapesRoot(path.into())
    }

    /// Returns true for NotFound, including an `io::ErrorKind::NotFound` wrapped in Io.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Convert LazyFsError to std::io::Error so `File` can report it through the io traits.
impl From<LazyFsError> for io::Error {
    fn from(e: LazyFsError) -> Self {
        match e {
            LazyFsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            LazyFsError::PathEscapesRoot(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            LazyFsError::InvalidConfiguration(msg) | LazyFsError::Config(msg) => {
                io::Error::new(io::ErrorKind::InvalidInput, msg)
            }
            LazyFsError::Closed => io::Error::other("file already closed"),
            LazyFsError::Io(e) => e,
            e @ LazyFsError::GeneratorFailure { .. } => io::Error::other(e),
        }
    }
}

/// lazyfs result type.
pub type LazyFsResult<T> = Result<T, LazyFsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_conversion() {
        let e: io::Error = LazyFsError::not_found("a/b").into();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);

        let e: io::Error = LazyFsError::Closed.into();
        assert_eq!(e.kind(), io::ErrorKind::Other);
        assert_eq!(e.to_string(), "file already closed");

        let e: io::Error = LazyFsError::path_escapes_root("../etc").into();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_generator_failure_keeps_source() {
        let e = LazyFsError::generator_failure("x.txt", "backend down");
        assert_eq!(e.to_string(), "fulfiller failed for x.txt: backend down");
        assert_eq!(e.source().map(|s| s.to_string()).as_deref(), Some("backend down"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(LazyFsError::not_found("x").is_not_found());
        assert!(LazyFsError::Io(io::Error::from(io::ErrorKind::NotFound)).is_not_found());
        assert!(!LazyFsError::Closed.is_not_found());
    }
}
