// Transcription - speech-to-text collaborator
//
// Transcription is consumed purely through its I/O contract: an audio file
// goes in, a `{text, error?}` payload comes out. Failures never propagate as
// errors; they are folded into the payload so the analysis response is
// always complete.

mod http;

pub use http::HttpTranscriber;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TranscriptionConfig;

/// Message reported when no transcription endpoint is configured
pub const NOT_CONFIGURED: &str = "Transcription service not configured";

/// Text reported when the service heard audio but recognised no words
pub const SPEECH_UNCLEAR: &str = "Speech unclear";

/// Transcription outcome as returned to API callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptionPayload {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    pub fn failed<T: Into<String>, E: Into<String>>(text: T, error: E) -> Self {
        Self {
            text: text.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Transcription failure classes, each with its own payload shape
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranscriptionError {
    /// The service answered but recognised no speech
    #[error("Could not understand audio")]
    Unclear,

    /// The service was unreachable or rejected the request
    #[error("Speech service error: {0}")]
    Service(String),

    /// Anything else, e.g. the upload could not be read
    #[error("Error transcribing audio: {0}")]
    Other(String),
}

impl From<TranscriptionError> for TranscriptionPayload {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::Unclear => {
                TranscriptionPayload::failed(SPEECH_UNCLEAR, err.to_string())
            }
            other => TranscriptionPayload::failed("", other.to_string()),
        }
    }
}

/// Speech-to-text backend
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `path`
    async fn transcribe(&self, path: &Path) -> TranscriptionPayload;

    /// Short backend name for logs and health reports
    fn name(&self) -> &'static str;
}

/// Transcriber used when no endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranscriber;

#[async_trait]
impl Transcriber for DisabledTranscriber {
    async fn transcribe(&self, _path: &Path) -> TranscriptionPayload {
        TranscriptionPayload::failed("", NOT_CONFIGURED)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Pick a backend from configuration
///
/// An invalid endpoint is logged and falls back to the disabled backend, so
/// emotion analysis keeps working without transcription.
pub fn from_config(config: &TranscriptionConfig) -> Arc<dyn Transcriber> {
    match config.endpoint.as_deref() {
        None => Arc::new(DisabledTranscriber),
        Some(endpoint) => match HttpTranscriber::new(endpoint, config) {
            Ok(transcriber) => Arc::new(transcriber),
            Err(err) => {
                log::warn!("[Transcription] {}; transcription disabled", err);
                Arc::new(DisabledTranscriber)
            }
        },
    }
}
