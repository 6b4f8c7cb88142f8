// HTTP transcription client for OpenAI-compatible speech-to-text servers

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Transcriber, TranscriptionError, TranscriptionPayload};
use crate::config::TranscriptionConfig;

const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Posts audio files to `{endpoint}/v1/audio/transcriptions`
#[derive(Debug, Clone)]
pub struct HttpTranscriber {
    client: reqwest::Client,
    url: String,
    model: String,
    language: Option<String>,
}

impl HttpTranscriber {
    /// Create a client for `endpoint`, validating the URL
    pub fn new(endpoint: &str, config: &TranscriptionConfig) -> Result<Self, TranscriptionError> {
        let cleaned = endpoint.trim().trim_end_matches('/');

        let parsed = reqwest::Url::parse(cleaned).map_err(|e| {
            TranscriptionError::Other(format!("invalid endpoint '{}': {}", cleaned, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TranscriptionError::Other(format!(
                "endpoint must use http or https, got {}",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranscriptionError::Other(format!("failed to build client: {}", e)))?;

        log::info!(
            "[Transcription] Using {} with model {}",
            cleaned,
            config.model
        );

        Ok(Self {
            client,
            url: format!("{}{}", cleaned, TRANSCRIPTIONS_PATH),
            model: config.model.clone(),
            language: config.language.clone().filter(|l| !l.is_empty()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, path: &Path) -> Result<String, TranscriptionError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TranscriptionError::Other(e.to_string()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let file_part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "json");
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Service(format!("{} - {}", status, body)));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Service(format!("invalid response: {}", e)))?;

        let text = parsed.text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::Unclear);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, path: &Path) -> TranscriptionPayload {
        match self.request(path).await {
            Ok(text) => {
                log::debug!("[Transcription] {} chars from {}", text.len(), path.display());
                TranscriptionPayload::text(text)
            }
            Err(err) => {
                log::warn!("[Transcription] {}: {}", path.display(), err);
                err.into()
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
