use std::path::PathBuf;

use reqcap_header::HeaderError;

/// Errors that can occur while deriving a manifest header.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    /// The analyzer failed (bad classpath entry, malformed class file, ...).
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// A header produced or found during processing is malformed.
    #[error("malformed header: {0}")]
    Header(#[from] HeaderError),

    /// A file could not be read.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeriveError {
    /// Create an analysis error from any message.
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for derive results.
pub type DeriveResult<T> = Result<T, DeriveError>;
