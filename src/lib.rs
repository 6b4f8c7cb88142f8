// Voice Emotion - speech emotion recognition service
// Audio decoding, DSP feature extraction and pretrained-model classification,
// served over HTTP alongside an optional speech-to-text collaborator

pub mod analysis;
pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod transcription;

pub use api::{recognize_emotion, AnalysisResponse, EmotionPayload, EmotionRecognizer};
