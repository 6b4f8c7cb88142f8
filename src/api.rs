// Public API - the audio-to-emotion recognition call chain
//
// `recognize_emotion` is the single entry point the web layer and the CLI
// use: decode, extract features, classify, and fold any failure into the
// structured error payload. It never panics on bad input and never returns
// a partial result.

pub mod types;

use std::path::Path;
use std::sync::Arc;

use crate::analysis::{ClassificationResult, EmotionClassifier, FeatureExtractor};
use crate::audio::Waveform;
use crate::config::{AppConfig, FeatureConfig};
use crate::error::{
    log_artifact_error, log_classification_error, log_extraction_error, ArtifactError,
    RecognitionError,
};
use crate::model::ModelArtifacts;

pub use types::{AnalysisResponse, EmotionPayload, CLASSIFICATION_FAILED, EXTRACTION_FAILED};

/// Feature extractor paired with the classifier it feeds
///
/// Holds no per-request state; share one instance behind an `Arc`.
pub struct EmotionRecognizer {
    extractor: FeatureExtractor,
    classifier: EmotionClassifier,
}

impl EmotionRecognizer {
    pub fn new(artifacts: Arc<ModelArtifacts>, features: FeatureConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(features),
            classifier: EmotionClassifier::new(artifacts),
        }
    }

    /// Load the artifacts named in `config` and check them against the
    /// configured feature layout
    ///
    /// Fails with `FeatureConfig` before touching the artifacts when the
    /// feature parameters are unusable.
    pub fn load(config: &AppConfig) -> Result<Self, ArtifactError> {
        config
            .features
            .validate()
            .map_err(|reason| ArtifactError::FeatureConfig { reason })
            .inspect_err(|err| log_artifact_error(err, "EmotionRecognizer::load"))?;
        let artifacts = ModelArtifacts::load(&config.artifacts, config.features.feature_len())
            .inspect_err(|err| log_artifact_error(err, "EmotionRecognizer::load"))?;
        Ok(Self::new(Arc::new(artifacts), config.features.clone()))
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &EmotionClassifier {
        &self.classifier
    }

    pub fn artifacts(&self) -> &Arc<ModelArtifacts> {
        self.classifier.artifacts()
    }

    /// Run the full pipeline on an audio file, keeping the failure detail
    pub fn try_recognize(&self, path: &Path) -> Result<ClassificationResult, RecognitionError> {
        let features = self.extractor.extract_file(path)?;
        Ok(self.classifier.classify(&features)?)
    }

    /// Run the full pipeline on an already decoded waveform
    pub fn try_recognize_waveform(
        &self,
        waveform: &Waveform,
    ) -> Result<ClassificationResult, RecognitionError> {
        let features = self.extractor.extract(waveform)?;
        Ok(self.classifier.classify(&features)?)
    }

    /// Run the full pipeline on an audio file and build the response payload
    pub fn recognize(&self, path: &Path) -> EmotionPayload {
        match self.try_recognize(path) {
            Ok(result) => {
                log::info!(
                    "[EmotionRecognizer] {} -> {} ({:.3})",
                    path.display(),
                    result.emotion,
                    result.confidence
                );
                result.into()
            }
            Err(err) => {
                log_recognition_error(&err, &path.display().to_string());
                EmotionPayload::from(&err)
            }
        }
    }
}

fn log_recognition_error(err: &RecognitionError, context: &str) {
    match err {
        RecognitionError::Extraction(e) => log_extraction_error(e, context),
        RecognitionError::Classification(e) => log_classification_error(e, context),
    }
}

/// Recognize the emotion in the audio file at `path`
///
/// Uses the default feature layout. On failure the payload carries only an
/// `error` message; the diagnostic detail goes to the log.
pub fn recognize_emotion(path: &Path, artifacts: Arc<ModelArtifacts>) -> EmotionPayload {
    EmotionRecognizer::new(artifacts, FeatureConfig::default()).recognize(path)
}
