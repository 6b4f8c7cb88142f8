// Synthetic artifact bundle for unit tests
//
// The network keys off the zero-crossing rate alone: one hidden unit fires
// above a ZCR of 0.25 and votes ANG, the other fires below it and votes NEU.
// Noise-like audio therefore decodes to ANG and tonal or silent audio to NEU.

use serde_json::{json, Value};

use super::{
    Activation, LabelEncoder, MlpClassifier, MlpModelFile, ModelArtifacts, OutputActivation,
    StandardScaler,
};

pub const N_FEATURES: usize = 181;
pub const LABELS: [&str; 6] = ["ANG", "DIS", "FEA", "HAP", "NEU", "SAD"];

/// ZCR at which the two hidden units are both silent
pub const ZCR_PIVOT: f64 = 0.25;

pub fn synthetic_scaler() -> StandardScaler {
    let mut mean = vec![0.0; N_FEATURES];
    let mut scale = vec![1.0; N_FEATURES];
    mean[0] = ZCR_PIVOT;
    scale[0] = 0.1;
    StandardScaler::new(Some(mean), Some(scale), N_FEATURES).unwrap()
}

pub fn synthetic_model_file() -> MlpModelFile {
    let mut hidden = vec![vec![0.0, 0.0]; N_FEATURES];
    hidden[0] = vec![1.0, -1.0];

    let mut angry = vec![0.0; LABELS.len()];
    angry[0] = 3.0;
    let mut neutral = vec![0.0; LABELS.len()];
    neutral[4] = 3.0;

    MlpModelFile {
        activation: Activation::Relu,
        out_activation: OutputActivation::Softmax,
        coefs: vec![hidden, vec![angry, neutral]],
        intercepts: vec![vec![0.0, 0.0], vec![0.0; LABELS.len()]],
        classes: None,
    }
}

pub fn synthetic_classifier() -> MlpClassifier {
    MlpClassifier::from_file(synthetic_model_file()).unwrap()
}

pub fn synthetic_labels() -> LabelEncoder {
    LabelEncoder::new(LABELS.iter().map(|s| s.to_string()).collect()).unwrap()
}

pub fn synthetic_artifacts() -> ModelArtifacts {
    ModelArtifacts::new(
        Box::new(synthetic_scaler()),
        Box::new(synthetic_classifier()),
        synthetic_labels(),
    )
    .unwrap()
}

/// The same bundle as the three on-disk JSON documents
pub fn synthetic_artifact_json() -> (Value, Value, Value) {
    let mut mean = vec![0.0; N_FEATURES];
    let mut scale = vec![1.0; N_FEATURES];
    mean[0] = ZCR_PIVOT;
    scale[0] = 0.1;

    let model = synthetic_model_file();
    (
        json!({ "mean": mean, "scale": scale, "n_features_in": N_FEATURES }),
        json!({
            "activation": "relu",
            "out_activation": "softmax",
            "coefs": model.coefs,
            "intercepts": model.intercepts,
        }),
        json!({ "classes": LABELS }),
    )
}
