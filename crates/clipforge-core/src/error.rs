//! Error types module
//!
//! All failures in the media core are unified under the [`AppError`] enum:
//! missing records or files, probe output that yields no metadata, external
//! tool failures, filesystem errors and malformed edit parameters.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Metadata extraction failed: {0}")]
    Extraction(String),

    #[error("Tool invocation failed: {0}")]
    ToolInvocation(String),

    #[error("Storage I/O error: {0}")]
    StorageIo(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type used throughout the workspace
pub type AppResult<T> = Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::StorageIo(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID parsing error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation error: {}", err))
    }
}

impl AppError {
    /// Get the error type name for logging and error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::Extraction(_) => "Extraction",
            AppError::ToolInvocation(_) => "ToolInvocation",
            AppError::StorageIo(_) => "StorageIo",
            AppError::Validation(_) => "Validation",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Whether retrying the operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::StorageIo(_) | AppError::Internal(_) | AppError::InternalWithSource { .. }
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}
