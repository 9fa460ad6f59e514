use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting a run or rendering its report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Template could not be read
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A substitution marker is absent from the template
    #[error("Template {path} is missing the marker line `{marker}`")]
    MissingMarker { path: PathBuf, marker: &'static str },

    /// A substitution marker appears on more than one line
    #[error("Template {path} contains the marker `{marker}` on more than one line")]
    DuplicateMarker { path: PathBuf, marker: &'static str },

    /// Report artifact could not be written
    #[error("Failed to write report {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Known-exceptions file could not be loaded
    #[error("Failed to load known exceptions from {path}: {message}")]
    KnownExceptions { path: PathBuf, message: String },

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ReportError {
    /// Create a new template read error
    pub fn template_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TemplateRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new output write error
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a new known-exceptions loading error
    pub fn known_exceptions(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::KnownExceptions {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;
