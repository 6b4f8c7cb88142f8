// Feature extraction error types and constants

use crate::error::ErrorCode;
use log::error;

/// Extraction error code constants
///
/// Error code range: 1001-1005
pub struct ExtractionErrorCodes {}

impl ExtractionErrorCodes {
    /// Decoding produced zero samples
    pub const NO_AUDIO_DATA: i32 = 1001;

    /// The container or codec could not be decoded
    pub const DECODE_FAILED: i32 = 1002;

    /// The file format is not supported by any decoder
    pub const UNSUPPORTED_FORMAT: i32 = 1003;

    /// The audio file could not be read
    pub const IO_FAILED: i32 = 1004;

    /// A feature computation produced a non-finite value
    pub const NUMERIC_FAILURE: i32 = 1005;
}

/// Log an extraction error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_extraction_error(err: &ExtractionError, context: &str) {
    error!(
        "Extraction error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Feature extraction errors
///
/// These errors cover audio decoding and DSP feature computation. None of
/// them are allowed to escape the recognition boundary as a panic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    /// Decoding yielded an empty waveform
    #[error("Audio decoded to zero samples")]
    NoAudioData,

    /// Decoder rejected the stream
    #[error("Failed to decode audio: {details}")]
    Decode { details: String },

    /// No decoder exists for the file
    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    /// The file could not be opened or read
    #[error("Failed to read audio file: {details}")]
    Io { details: String },

    /// A feature value came out NaN or infinite
    #[error("Numeric failure while computing {feature}")]
    NumericFailure { feature: String },
}

impl ErrorCode for ExtractionError {
    fn code(&self) -> i32 {
        match self {
            ExtractionError::NoAudioData => ExtractionErrorCodes::NO_AUDIO_DATA,
            ExtractionError::Decode { .. } => ExtractionErrorCodes::DECODE_FAILED,
            ExtractionError::UnsupportedFormat { .. } => ExtractionErrorCodes::UNSUPPORTED_FORMAT,
            ExtractionError::Io { .. } => ExtractionErrorCodes::IO_FAILED,
            ExtractionError::NumericFailure { .. } => ExtractionErrorCodes::NUMERIC_FAILURE,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::Io {
            details: err.to_string(),
        }
    }
}

impl From<hound::Error> for ExtractionError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => io.into(),
            other => ExtractionError::Decode {
                details: other.to_string(),
            },
        }
    }
}

impl From<symphonia::core::errors::Error> for ExtractionError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        match err {
            symphonia::core::errors::Error::Unsupported(what) => ExtractionError::UnsupportedFormat {
                format: what.to_string(),
            },
            other => ExtractionError::Decode {
                details: other.to_string(),
            },
        }
    }
}
