mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use voice_emotion::config::ArtifactsConfig;
use voice_emotion::model::ModelArtifacts;
use voice_emotion::{recognize_emotion, EmotionPayload};

fn load_artifacts(dir: &std::path::Path) -> Arc<ModelArtifacts> {
    common::write_synthetic_artifacts(dir);
    Arc::new(ModelArtifacts::load(&ArtifactsConfig::in_dir(dir), common::N_FEATURES).unwrap())
}

#[test]
fn harsh_recording_is_classified_angry() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = load_artifacts(&dir.path().join("artifacts"));
    let wav = dir.path().join("angry.wav");
    common::write_wav(&wav, &common::harsh_signal(32_000), 16_000, 1);

    match recognize_emotion(&wav, artifacts) {
        EmotionPayload::Success(result) => {
            assert_eq!(result.emotion, "ANG");
            assert_eq!(result.emotion_name, "Angry");
            assert!(result.confidence > 0.9);
            assert_relative_eq!(
                result.probabilities.values().sum::<f64>(),
                1.0,
                epsilon = 1e-6
            );
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn stereo_is_downmixed_before_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = load_artifacts(&dir.path().join("artifacts"));

    let mono = common::sine(200.0, 16_000, 16_000);
    let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
    let mono_path = dir.path().join("mono.wav");
    let stereo_path = dir.path().join("stereo.wav");
    common::write_wav(&mono_path, &mono, 16_000, 1);
    common::write_wav(&stereo_path, &stereo, 16_000, 2);

    let from_mono = recognize_emotion(&mono_path, Arc::clone(&artifacts));
    let from_stereo = recognize_emotion(&stereo_path, artifacts);
    assert_eq!(from_mono, from_stereo);
    assert_eq!(from_mono.result().map(|r| r.emotion.as_str()), Some("NEU"));
}

#[test]
fn float_wav_is_supported() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = load_artifacts(&dir.path().join("artifacts"));
    let wav = dir.path().join("float.wav");
    common::write_float_wav(&wav, &common::harsh_signal(8_000), 8_000);

    let payload = recognize_emotion(&wav, artifacts);
    assert_eq!(payload.result().map(|r| r.emotion.as_str()), Some("ANG"));
}

#[test]
fn unsupported_extension_is_extraction_error() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = load_artifacts(&dir.path().join("artifacts"));
    let path = dir.path().join("clip.flac");
    std::fs::write(&path, b"fLaC").unwrap();

    let payload = recognize_emotion(&path, artifacts);
    assert_eq!(
        payload.error_message(),
        Some("Failed to extract audio features")
    );
}

#[test]
fn repeated_calls_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = load_artifacts(&dir.path().join("artifacts"));
    let wav = dir.path().join("tone.wav");
    common::write_wav(&wav, &common::sine(330.0, 16_000, 12_000), 16_000, 1);

    let first = serde_json::to_string(&recognize_emotion(&wav, Arc::clone(&artifacts))).unwrap();
    let second = serde_json::to_string(&recognize_emotion(&wav, artifacts)).unwrap();
    assert_eq!(first, second);
}
