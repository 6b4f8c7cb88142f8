//! Shared helpers for integration tests: synthetic artifacts and WAV files.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::json;

pub const N_FEATURES: usize = 181;
pub const LABELS: [&str; 6] = ["ANG", "DIS", "FEA", "HAP", "NEU", "SAD"];

/// Write a scaler/MLP/label-encoder bundle whose network keys off the
/// zero-crossing rate: above 0.25 it votes ANG, below it votes NEU.
pub fn write_synthetic_artifacts(dir: &Path) {
    let mut mean = vec![0.0; N_FEATURES];
    let mut scale = vec![1.0; N_FEATURES];
    mean[0] = 0.25;
    scale[0] = 0.1;

    let mut hidden = vec![vec![0.0, 0.0]; N_FEATURES];
    hidden[0] = vec![1.0, -1.0];
    let mut angry = vec![0.0; LABELS.len()];
    angry[0] = 3.0;
    let mut neutral = vec![0.0; LABELS.len()];
    neutral[4] = 3.0;
    let output_bias = vec![0.0; LABELS.len()];

    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("scaler.json"),
        json!({ "mean": mean, "scale": scale, "n_features_in": N_FEATURES }).to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("mlp_emotion_model.json"),
        json!({
            "activation": "relu",
            "out_activation": "softmax",
            "coefs": [hidden, [angry, neutral]],
            "intercepts": [[0.0, 0.0], output_bias],
            "classes": [0, 1, 2, 3, 4, 5],
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("label_encoder.json"),
        json!({ "classes": LABELS }).to_string(),
    )
    .unwrap();
}

/// Write interleaved samples as 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample((s * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Write mono samples as 32-bit float
pub fn write_float_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Sign flips every sample: the highest possible zero-crossing rate
pub fn harsh_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
        .collect()
}

pub fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}
