//! Error types for manifest synchronization.

use std::path::PathBuf;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while loading, synchronizing or saving a manifest
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The manifest tree does not have the shape group/file resolution relies on
    #[error("Malformed manifest: {message}")]
    Structure {
        /// What is wrong and where
        message: String,
    },

    /// The manifest is not well-formed XML
    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        /// Manifest being read
        path: PathBuf,
        /// Reader error
        #[source]
        source: quick_xml::Error,
    },

    /// Filesystem error while reading, walking or writing
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Filename pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        /// Glob as given
        pattern: String,
        /// Compiler error
        #[source]
        source: glob::PatternError,
    },

    /// A candidate path has no file name
    #[error("Invalid candidate path '{path}'")]
    InvalidCandidate {
        /// Path as produced by the scanner
        path: String,
    },

    /// Configuration values are out of range or contradictory
    #[error("Invalid configuration: {message}")]
    Config {
        /// Which value is invalid
        message: String,
    },
}

impl SyncError {
    /// Shorthand for a structural failure
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    /// Shorthand for an I/O failure on `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort with the structural exit code
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structure { .. })
    }
}
