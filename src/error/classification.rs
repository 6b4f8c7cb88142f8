// Classification error types and constants

use crate::error::ErrorCode;
use log::error;

/// Classification error code constants
///
/// Error code range: 2001-2004
pub struct ClassificationErrorCodes {}

impl ClassificationErrorCodes {
    /// Feature vector width differs from what the artifacts were fit on
    pub const DIMENSION_MISMATCH: i32 = 2001;

    /// A batch operation was called with no rows
    pub const EMPTY_BATCH: i32 = 2002;

    /// The model produced an unusable output
    pub const PREDICTION_FAILED: i32 = 2003;

    /// The predicted class has no entry in the label decoder
    pub const UNKNOWN_CLASS: i32 = 2004;
}

/// Log a classification error with structured context
pub fn log_classification_error(err: &ClassificationError, context: &str) {
    error!(
        "Classification error in {}: code={}, component=EmotionClassifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Scaling and prediction errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassificationError {
    /// Input width disagrees with the fitted scaler/classifier
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Batch had no rows
    #[error("Cannot classify an empty batch")]
    EmptyBatch,

    /// Model evaluation produced no usable distribution
    #[error("Prediction failed: {reason}")]
    Prediction { reason: String },

    /// Class index outside the label decoder's range
    #[error("Class index {index} has no label (decoder knows {known} classes)")]
    UnknownClass { index: i64, known: usize },
}

impl ErrorCode for ClassificationError {
    fn code(&self) -> i32 {
        match self {
            ClassificationError::DimensionMismatch { .. } => {
                ClassificationErrorCodes::DIMENSION_MISMATCH
            }
            ClassificationError::EmptyBatch => ClassificationErrorCodes::EMPTY_BATCH,
            ClassificationError::Prediction { .. } => ClassificationErrorCodes::PREDICTION_FAILED,
            ClassificationError::UnknownClass { .. } => ClassificationErrorCodes::UNKNOWN_CLASS,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
