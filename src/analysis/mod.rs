// Analysis module - feature extraction and emotion classification

pub mod classifier;
pub mod features;

pub use classifier::{display_name, ClassificationResult, EmotionClassifier, DISPLAY_NAMES};
pub use features::{FeatureBlock, FeatureExtractor, FeatureLayout, FeatureVector};
