// Model artifacts - pretrained scaler, classifier and label decoder
//
// The three artifacts are exported once from the training pipeline and loaded
// once at start-up. After loading they are immutable and shared behind an
// `Arc` by every request.

mod labels;
mod mlp;
mod scaler;

#[cfg(test)]
pub(crate) mod fixtures;

pub use labels::LabelEncoder;
pub use mlp::{
    argmax, Activation, MlpClassifier, MlpModelFile, OutputActivation, ProbabilisticClassifier,
};
pub use scaler::{FeatureScaler, StandardScaler};

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::ArtifactsConfig;
use crate::error::ArtifactError;

/// The complete set of pretrained artifacts used for inference
pub struct ModelArtifacts {
    scaler: Box<dyn FeatureScaler>,
    classifier: Box<dyn ProbabilisticClassifier>,
    labels: LabelEncoder,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("n_features", &self.n_features())
            .field("classes", &self.labels.classes())
            .finish()
    }
}

impl ModelArtifacts {
    /// Assemble artifacts, checking that they agree with each other
    ///
    /// # Errors
    /// - `Inconsistent` if the scaler and classifier widths differ, the
    ///   classifier and label decoder disagree on the class count, or a
    ///   classifier class has no label
    pub fn new(
        scaler: Box<dyn FeatureScaler>,
        classifier: Box<dyn ProbabilisticClassifier>,
        labels: LabelEncoder,
    ) -> Result<Self, ArtifactError> {
        if scaler.n_features() != classifier.n_features() {
            return Err(ArtifactError::Inconsistent {
                reason: format!(
                    "scaler expects {} features but classifier expects {}",
                    scaler.n_features(),
                    classifier.n_features()
                ),
            });
        }

        if classifier.n_classes() != labels.len() {
            return Err(ArtifactError::Inconsistent {
                reason: format!(
                    "classifier has {} classes but label encoder has {}",
                    classifier.n_classes(),
                    labels.len()
                ),
            });
        }

        if let Some(code) = classifier
            .classes()
            .into_iter()
            .find(|&code| labels.decode(code).is_err())
        {
            return Err(ArtifactError::Inconsistent {
                reason: format!("classifier class {} has no label", code),
            });
        }

        Ok(Self {
            scaler,
            classifier,
            labels,
        })
    }

    /// Load the scaler, MLP classifier and label encoder from disk
    ///
    /// `feature_len` is the width of the vectors the feature extractor
    /// produces; artifacts fit on any other width are rejected.
    pub fn load(config: &ArtifactsConfig, feature_len: usize) -> Result<Self, ArtifactError> {
        let scaler_path = config.scaler_path();
        let model_path = config.model_path();
        let labels_path = config.label_encoder_path();

        let scaler: StandardScaler = read_json(&scaler_path)?;
        scaler.validate()?;

        let classifier = MlpClassifier::from_file(read_json(&model_path)?)?;

        let labels: LabelEncoder = read_json(&labels_path)?;
        labels.validate()?;

        let artifacts = Self::new(Box::new(scaler), Box::new(classifier), labels)?;
        artifacts.check_feature_len(feature_len)?;

        log::info!(
            "[ModelArtifacts] Loaded from {} ({} features, classes: {})",
            config.dir.display(),
            artifacts.n_features(),
            artifacts.labels.classes().join(", ")
        );

        Ok(artifacts)
    }

    /// Reject artifacts fit on a different feature vector width
    pub fn check_feature_len(&self, feature_len: usize) -> Result<(), ArtifactError> {
        if self.n_features() != feature_len {
            return Err(ArtifactError::Inconsistent {
                reason: format!(
                    "artifacts expect {} features but the extractor produces {}",
                    self.n_features(),
                    feature_len
                ),
            });
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    pub fn classifier(&self) -> &dyn ProbabilisticClassifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| ArtifactError::parse(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArtifactErrorCodes, ErrorCode};

    fn write_bundle(dir: &Path) {
        let (scaler, model, labels) = fixtures::synthetic_artifact_json();
        fs::write(dir.join("scaler.json"), scaler.to_string()).unwrap();
        fs::write(dir.join("mlp_emotion_model.json"), model.to_string()).unwrap();
        fs::write(dir.join("label_encoder.json"), labels.to_string()).unwrap();
    }

    #[test]
    fn test_load_synthetic_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());

        let artifacts = ModelArtifacts::load(&ArtifactsConfig::in_dir(dir.path()), 181).unwrap();
        assert_eq!(artifacts.n_features(), 181);
        assert_eq!(artifacts.labels().len(), 6);
        assert_eq!(artifacts.classifier().n_classes(), 6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifacts::load(&ArtifactsConfig::in_dir(dir.path()), 181).unwrap_err();
        assert_eq!(err.code(), ArtifactErrorCodes::IO_FAILED);
        assert!(err.message().contains("scaler.json"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());
        fs::write(dir.path().join("mlp_emotion_model.json"), "{\"coefs\": 3}").unwrap();

        let err = ModelArtifacts::load(&ArtifactsConfig::in_dir(dir.path()), 181).unwrap_err();
        assert_eq!(err.code(), ArtifactErrorCodes::PARSE_FAILED);
    }

    #[test]
    fn test_feature_len_must_match_extractor() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());

        let err = ModelArtifacts::load(&ArtifactsConfig::in_dir(dir.path()), 193).unwrap_err();
        assert_eq!(err.code(), ArtifactErrorCodes::INCONSISTENT);
    }

    #[test]
    fn test_label_count_must_match_classifier() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path());
        fs::write(
            dir.path().join("label_encoder.json"),
            r#"{"classes": ["ANG", "HAP", "SAD"]}"#,
        )
        .unwrap();

        let err = ModelArtifacts::load(&ArtifactsConfig::in_dir(dir.path()), 181).unwrap_err();
        assert!(matches!(err, ArtifactError::Inconsistent { .. }));
    }

    #[test]
    fn test_scaler_width_must_match_classifier() {
        let scaler = StandardScaler::new(None, None, 3).unwrap();
        let err = ModelArtifacts::new(
            Box::new(scaler),
            Box::new(fixtures::synthetic_classifier()),
            fixtures::synthetic_labels(),
        )
        .unwrap_err();
        assert!(err.message().contains("scaler expects 3"));
    }

    #[test]
    fn test_classifier_classes_must_decode() {
        let mut file = fixtures::synthetic_model_file();
        file.classes = Some(vec![0, 1, 2, 3, 4, 9]);
        let err = ModelArtifacts::new(
            Box::new(fixtures::synthetic_scaler()),
            Box::new(MlpClassifier::from_file(file).unwrap()),
            fixtures::synthetic_labels(),
        )
        .unwrap_err();
        assert!(err.message().contains("class 9"));
    }
}
