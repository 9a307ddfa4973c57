//! Error types for annotation, traversal, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the codemap library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported file type: {path}")]
    UnsupportedType { path: PathBuf },

    #[error("failed to read file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot use '{root}' as root directory: {reason}")]
    InvalidRoot { root: PathBuf, reason: String },

    #[error("error walking directory '{root}': {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },

    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to process file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn unsupported_type(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedType { path: path.into() }
    }

    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_root(root: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            root: root.into(),
            reason: reason.into(),
        }
    }

    /// Attach the file a failure happened on.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error, looking through `File` wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::File { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True if the file has no registered language.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.root_cause(), Self::UnsupportedType { .. })
    }

    /// True for read/write failures on a target file.
    pub fn is_io(&self) -> bool {
        matches!(self.root_cause(), Self::Read { .. } | Self::Write { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
