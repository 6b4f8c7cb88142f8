use serde::{Deserialize, Serialize};

use crate::analysis::ClassificationResult;
use crate::error::RecognitionError;
use crate::transcription::TranscriptionPayload;

/// Message returned when the audio could not be turned into features
pub const EXTRACTION_FAILED: &str = "Failed to extract audio features";

/// Message returned when the features could not be classified
pub const CLASSIFICATION_FAILED: &str = "Failed to classify audio features";

/// Result of emotion recognition for one recording
///
/// Serializes either as the four success keys
/// (`emotion`, `emotion_name`, `confidence`, `probabilities`) or as a single
/// `error` key, never a mix of both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmotionPayload {
    Success(ClassificationResult),
    Error { error: String },
}

impl EmotionPayload {
    pub fn error<S: Into<String>>(message: S) -> Self {
        EmotionPayload::Error {
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EmotionPayload::Success(_))
    }

    pub fn result(&self) -> Option<&ClassificationResult> {
        match self {
            EmotionPayload::Success(result) => Some(result),
            EmotionPayload::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            EmotionPayload::Success(_) => None,
            EmotionPayload::Error { error } => Some(error),
        }
    }
}

impl From<ClassificationResult> for EmotionPayload {
    fn from(result: ClassificationResult) -> Self {
        EmotionPayload::Success(result)
    }
}

impl From<&RecognitionError> for EmotionPayload {
    fn from(err: &RecognitionError) -> Self {
        match err {
            RecognitionError::Extraction(_) => EmotionPayload::error(EXTRACTION_FAILED),
            RecognitionError::Classification(_) => EmotionPayload::error(CLASSIFICATION_FAILED),
        }
    }
}

/// Response body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Sanitised name the upload was stored under
    pub filename: String,
    pub emotion: EmotionPayload,
    pub transcription: TranscriptionPayload,
}
