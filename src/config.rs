//! Configuration management for the emotion recognition service
//!
//! This module provides runtime configuration loading from JSON files,
//! with environment overrides for the values that usually differ between
//! deployments (bind address, artifact and upload directories, transcription
//! endpoint). Missing or malformed files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::audio::SUPPORTED_EXTENSIONS;

/// Default config file location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/emotion.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub features: FeatureConfig,
    pub transcription: TranscriptionConfig,
}

/// HTTP listener and upload handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub addr: SocketAddr,
    /// Directory uploaded files are written to before analysis
    pub upload_dir: PathBuf,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
    /// Lower-case file extensions accepted by `/analyze`
    pub allowed_extensions: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Locations of the pretrained model artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub model_file: String,
    pub scaler_file: String,
    pub label_encoder_file: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            model_file: "mlp_emotion_model.json".into(),
            scaler_file: "scaler.json".into(),
            label_encoder_file: "label_encoder.json".into(),
        }
    }
}

impl ArtifactsConfig {
    /// Use the default file names inside `dir`
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    pub fn label_encoder_path(&self) -> PathBuf {
        self.dir.join(&self.label_encoder_file)
    }
}

/// Frame-wise analysis parameters
///
/// These must match the parameters the artifacts were fit with. The
/// defaults reproduce the layout `[zcr(1) | chroma(12) | mfcc(40) | mel(128)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// FFT window size in samples (also the ZCR frame length)
    pub n_fft: usize,
    /// Hop size between frames
    pub hop_length: usize,
    /// Number of chroma bins
    pub n_chroma: usize,
    /// Number of cepstral coefficients kept
    pub n_mfcc: usize,
    /// Number of Mel bands
    pub n_mels: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_chroma: 12,
            n_mfcc: 40,
            n_mels: 128,
        }
    }
}

impl FeatureConfig {
    /// Total feature vector length for this configuration
    pub fn feature_len(&self) -> usize {
        1 + self.n_chroma + self.n_mfcc + self.n_mels
    }

    /// Reject parameters the frame-wise DSP cannot run with
    ///
    /// The centered STFT needs an even window of at least 4 samples, frames
    /// must advance, and every feature block must be non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_fft < 4 || self.n_fft % 2 != 0 {
            return Err(format!(
                "n_fft must be an even number >= 4, got {}",
                self.n_fft
            ));
        }
        if self.hop_length == 0 {
            return Err("hop_length must be at least 1".to_string());
        }
        for (name, value) in [
            ("n_chroma", self.n_chroma),
            ("n_mfcc", self.n_mfcc),
            ("n_mels", self.n_mels),
        ] {
            if value == 0 {
                return Err(format!("{} must be at least 1", name));
            }
        }
        Ok(())
    }
}

/// Speech-to-text collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Base URL of an OpenAI-compatible transcription server; `None` disables transcription
    pub endpoint: Option<String>,
    pub model: String,
    pub language: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "whisper-1".into(),
            language: Some("en".into()),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file doesn't exist
    /// or its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from the default path and apply environment overrides
    pub fn load() -> Self {
        let path = std::env::var("EMOTION_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::load_from_file(path);
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `EMOTION_*` overrides using the supplied lookup
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("EMOTION_HTTP_ADDR") {
            match raw.parse() {
                Ok(addr) => self.server.addr = addr,
                Err(err) => log::warn!("[Config] Ignoring EMOTION_HTTP_ADDR={}: {}", raw, err),
            }
        }
        if let Some(dir) = lookup("EMOTION_ARTIFACTS_DIR") {
            self.artifacts.dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("EMOTION_UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("EMOTION_TRANSCRIBE_URL") {
            self.transcription.endpoint = (!url.trim().is_empty()).then_some(url);
        }
    }
}
