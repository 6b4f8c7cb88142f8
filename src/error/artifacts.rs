// Model artifact loading errors

use std::path::Path;

use crate::error::ErrorCode;
use log::error;

/// Artifact error code constants
///
/// Error code range: 3001-3005
pub struct ArtifactErrorCodes {}

impl ArtifactErrorCodes {
    pub const IO_FAILED: i32 = 3001;
    pub const PARSE_FAILED: i32 = 3002;
    pub const INCONSISTENT: i32 = 3003;
    pub const INVALID: i32 = 3004;
    pub const FEATURE_CONFIG: i32 = 3005;
}

/// Log an artifact error with structured context
pub fn log_artifact_error(err: &ArtifactError, context: &str) {
    error!(
        "Artifact error in {}: code={}, component=ModelArtifacts, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while loading the pretrained artifacts
///
/// All of these are fatal at start-up: the service must not accept
/// requests without a complete, consistent artifact set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArtifactError {
    /// Artifact file missing or unreadable
    #[error("Failed to read artifact {path}: {details}")]
    Io { path: String, details: String },

    /// Artifact file is not valid JSON for its schema
    #[error("Failed to parse artifact {path}: {details}")]
    Parse { path: String, details: String },

    /// Artifacts disagree with each other or with the feature layout
    #[error("Artifacts are inconsistent: {reason}")]
    Inconsistent { reason: String },

    /// A single artifact is malformed
    #[error("Invalid artifact: {reason}")]
    Invalid { reason: String },

    /// Feature parameters the DSP pipeline cannot run with
    #[error("Invalid feature configuration: {reason}")]
    FeatureConfig { reason: String },
}

impl ArtifactError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        ArtifactError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        }
    }

    pub(crate) fn parse(path: &Path, err: serde_json::Error) -> Self {
        ArtifactError::Parse {
            path: path.display().to_string(),
            details: err.to_string(),
        }
    }
}

impl ErrorCode for ArtifactError {
    fn code(&self) -> i32 {
        match self {
            ArtifactError::Io { .. } => ArtifactErrorCodes::IO_FAILED,
            ArtifactError::Parse { .. } => ArtifactErrorCodes::PARSE_FAILED,
            ArtifactError::Inconsistent { .. } => ArtifactErrorCodes::INCONSISTENT,
            ArtifactError::Invalid { .. } => ArtifactErrorCodes::INVALID,
            ArtifactError::FeatureConfig { .. } => ArtifactErrorCodes::FEATURE_CONFIG,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
