// Error types for the emotion recognition pipeline
//
// This module defines the error taxonomy for audio feature extraction,
// classification, and model artifact loading. Every error carries a stable
// numeric code so the HTTP and CLI layers can report failures consistently.

mod artifacts;
mod classification;
mod extraction;

pub use artifacts::{log_artifact_error, ArtifactError, ArtifactErrorCodes};
pub use classification::{log_classification_error, ClassificationError, ClassificationErrorCodes};
pub use extraction::{log_extraction_error, ExtractionError, ExtractionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the HTTP and CLI boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Failure of the end-to-end recognition call chain
///
/// Wraps whichever stage failed so the result assembler can pick the
/// user-facing message without losing the diagnostic detail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

impl ErrorCode for RecognitionError {
    fn code(&self) -> i32 {
        match self {
            RecognitionError::Extraction(err) => err.code(),
            RecognitionError::Classification(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
