//! Error types for project steps
//!
//! Every step surfaces one of a handful of conditions to the operator: a file
//! that is missing, an anchor that can't be found, an external tool that
//! failed, or something unexpected.

use crate::patch::{PatchError, TextIoError};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for step operations
pub type StepResult<T> = Result<T, StepError>;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{}: {source}", .path.display())]
    Patch {
        path: PathBuf,
        #[source]
        source: PatchError,
    },

    #[error(transparent)]
    Text(TextIoError),

    #[error("{tool} is not available ({hint})")]
    ToolMissing { tool: String, hint: String },

    #[error("{tool} failed with exit code {}", .code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    ToolFailed { tool: String, code: Option<i32> },

    #[error("{tool} did not finish within {} seconds", .timeout.as_secs())]
    ToolTimeout { tool: String, timeout: Duration },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<TextIoError> for StepError {
    fn from(err: TextIoError) -> Self {
        match err {
            TextIoError::NotFound(path) => StepError::FileNotFound(path),
            other => StepError::Text(other),
        }
    }
}

impl StepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            StepError::FileNotFound(path)
        } else {
            StepError::Io { path, source }
        }
    }

    pub(crate) fn patch(path: impl Into<PathBuf>, source: PatchError) -> Self {
        StepError::Patch {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err: StepError = TextIoError::NotFound(PathBuf::from("android/app/build.gradle")).into();
        assert_eq!(err.to_string(), "file not found: android/app/build.gradle");
    }

    #[test]
    fn test_patch_error_display() {
        let err = StepError::patch(
            "AndroidManifest.xml",
            PatchError::AnchorNotFound("</application>".into()),
        );
        assert_eq!(
            err.to_string(),
            "AndroidManifest.xml: anchor not found: </application>"
        );
    }

    #[test]
    fn test_tool_failed_display() {
        let err = StepError::ToolFailed {
            tool: "npm install".into(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "npm install failed with exit code 1");

        let err = StepError::ToolFailed {
            tool: "keytool".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "keytool failed with exit code unknown");
    }
}
