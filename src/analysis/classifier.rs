// Classifier - pretrained-model emotion classification
//
// This module turns a feature vector into a human-readable emotion result:
// 1. Scale the vector as a batch of one
// 2. Ask the classifier for a class probability distribution
// 3. Pick the most probable class (first maximum on ties)
// 4. Decode it to its canonical label and map that to a display name
//
// The artifacts are shared read-only, so one EmotionClassifier can serve
// concurrent requests without locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::features::FeatureVector;
use crate::error::ClassificationError;
use crate::model::{argmax, ModelArtifacts};

/// Canonical label to display name
pub const DISPLAY_NAMES: [(&str, &str); 6] = [
    ("ANG", "Angry"),
    ("DIS", "Disgusted"),
    ("FEA", "Fearful"),
    ("HAP", "Happy"),
    ("NEU", "Neutral"),
    ("SAD", "Sad"),
];

/// Display name for a canonical label
///
/// Labels outside the table are returned unchanged.
pub fn display_name(label: &str) -> &str {
    DISPLAY_NAMES
        .iter()
        .find(|(code, _)| *code == label)
        .map(|(_, name)| *name)
        .unwrap_or(label)
}

/// Outcome of classifying one recording
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassificationResult {
    /// Canonical label, e.g. "ANG"
    pub emotion: String,
    /// Display name, e.g. "Angry"
    pub emotion_name: String,
    /// Probability of the chosen class
    pub confidence: f64,
    /// Probability of every class, keyed by canonical label
    pub probabilities: BTreeMap<String, f64>,
}

/// EmotionClassifier maps feature vectors to emotion results
pub struct EmotionClassifier {
    artifacts: Arc<ModelArtifacts>,
}

impl EmotionClassifier {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Arc<ModelArtifacts> {
        &self.artifacts
    }

    /// Classify an extracted feature vector
    pub fn classify(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassificationResult, ClassificationError> {
        self.classify_values(features.as_slice())
    }

    /// Classify a raw feature slice
    ///
    /// # Errors
    /// - `DimensionMismatch` if the slice width differs from the artifacts'
    /// - `Prediction` if the classifier returns no usable distribution
    /// - `UnknownClass` if the chosen class has no label
    pub fn classify_values(
        &self,
        values: &[f64],
    ) -> Result<ClassificationResult, ClassificationError> {
        let scaled = self.artifacts.scaler().transform(&[values.to_vec()])?;

        let classifier = self.artifacts.classifier();
        let probs = classifier
            .predict_proba(&scaled)?
            .into_iter()
            .next()
            .ok_or_else(|| ClassificationError::Prediction {
                reason: "classifier returned no rows".to_string(),
            })?;

        let classes = classifier.classes();
        if probs.is_empty() || probs.len() != classes.len() {
            return Err(ClassificationError::Prediction {
                reason: format!(
                    "classifier returned {} probabilities for {} classes",
                    probs.len(),
                    classes.len()
                ),
            });
        }

        let labels = self.artifacts.labels();
        let mut probabilities = BTreeMap::new();
        for (&code, &p) in classes.iter().zip(&probs) {
            probabilities.insert(labels.decode(code)?.to_string(), p);
        }

        let best = argmax(&probs);
        let emotion = labels.decode(classes[best])?.to_string();
        let emotion_name = display_name(&emotion).to_string();

        log::debug!(
            "[EmotionClassifier] {} ({}) confidence={:.3}",
            emotion,
            emotion_name,
            probs[best]
        );

        Ok(ClassificationResult {
            emotion,
            emotion_name,
            confidence: probs[best],
            probabilities,
        })
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
