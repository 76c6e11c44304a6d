//! Error types shared by every pipeline stage

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main error type for all pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// Failed to decode a sprite sheet from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to write an extracted frame or review rendering
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image encoding error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A stage document could not be read or written as JSON
    Artifact {
        /// Path of the document
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying serialization error
        source: serde_json::Error,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Input data doesn't meet pipeline requirements
    InvalidSourceData {
        /// Description of what's wrong with the input
        reason: String,
    },

    /// The scoring model could not be loaded or has stopped
    ScoringUnavailable {
        /// Description of why scoring is unavailable
        reason: String,
    },

    /// A sheet's scoring did not finish before its deadline
    ScoringTimeout {
        /// Time budget that was exceeded
        budget: Duration,
    },

    /// The scoring model answered with an unusable response
    Scoring {
        /// Description of the failure
        reason: String,
    },
}

impl PipelineError {
    /// Whether the error means the semantic check could not be carried out
    ///
    /// Scoring failures of any kind route a sheet to review as unavailable,
    /// never as a genuine low score.
    pub const fn is_scoring_failure(&self) -> bool {
        matches!(
            self,
            Self::ScoringUnavailable { .. } | Self::ScoringTimeout { .. } | Self::Scoring { .. }
        )
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Artifact {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "Artifact error during {operation} of '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::ScoringUnavailable { reason } => {
                write!(f, "Scoring unavailable: {reason}")
            }
            Self::ScoringTimeout { budget } => {
                write!(f, "Scoring timed out after {}ms", budget.as_millis())
            }
            Self::Scoring { reason } => {
                write!(f, "Scoring error: {reason}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Artifact { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PipelineError {
    PipelineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Attach a path and operation to an I/O error
pub fn file_system_error(
    path: &Path,
    operation: &'static str,
    source: std::io::Error,
) -> PipelineError {
    PipelineError::FileSystem {
        path: path.to_path_buf(),
        operation,
        source,
    }
}

/// Attach a path and operation to a JSON error
pub fn artifact_error(
    path: &Path,
    operation: &'static str,
    source: serde_json::Error,
) -> PipelineError {
    PipelineError::Artifact {
        path: path.to_path_buf(),
        operation,
        source,
    }
}
