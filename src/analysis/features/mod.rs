// FeatureExtractor - DSP feature extraction for speech emotion classification
//
// This module turns a decoded waveform into the fixed-length feature vector
// the pretrained scaler and classifier expect. Every block is computed
// frame-wise and then averaged over time.
//
// Module organization:
// - types: Data structures (FeatureVector, FeatureLayout)
// - stft: Centered Hann-windowed power spectrogram
// - temporal: Time-domain features (ZCR)
// - chroma: Pitch-class profile with tuning estimation
// - mel: Slaney Mel filter bank, dB conversion
// - cepstral: MFCC via orthonormal DCT-II
// - mod.rs: Coordinator (FeatureExtractor)
//
// Feature layout (concatenation order is load-bearing):
// 1. Zero-crossing rate (1)
// 2. Chroma (n_chroma, 12)
// 3. MFCC (n_mfcc, 40)
// 4. Mel spectrogram (n_mels, 128)
//
// No resampling is performed: features are computed at the file's native
// sample rate, matching how the artifacts were produced.

mod cepstral;
mod chroma;
mod mel;
mod stft;
mod temporal;
mod types;

pub use types::{FeatureBlock, FeatureLayout, FeatureVector};

use std::path::Path;

use crate::audio::{decode_file, Waveform};
use crate::config::FeatureConfig;
use crate::error::ExtractionError;

use mel::MelFilterBank;
use stft::StftProcessor;
use temporal::TemporalFeatures;

/// FeatureExtractor coordinates the DSP feature extraction pipeline
///
/// The extractor holds no per-request state, so one instance can serve
/// concurrent requests.
pub struct FeatureExtractor {
    config: FeatureConfig,
    stft: StftProcessor,
    temporal: TemporalFeatures,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            stft: StftProcessor::new(config.n_fft, config.hop_length),
            temporal: TemporalFeatures::new(config.n_fft, config.hop_length),
            config,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Layout of the vectors this extractor produces
    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout::from_config(&self.config)
    }

    /// Decode `path` and extract its feature vector
    pub fn extract_file(&self, path: &Path) -> Result<FeatureVector, ExtractionError> {
        let waveform = decode_file(path)?;
        self.extract(&waveform)
    }

    /// Extract all features from a decoded waveform
    ///
    /// This method coordinates the entire feature extraction pipeline:
    /// 1. Compute the frame-wise zero-crossing rate from the raw samples
    /// 2. Compute the centered power spectrogram once
    /// 3. Derive chroma, Mel and MFCC summaries from it
    /// 4. Concatenate in layout order
    ///
    /// # Errors
    /// - `NoAudioData` if the waveform is empty
    /// - `NumericFailure` if any value comes out non-finite
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector, ExtractionError> {
        if waveform.is_empty() {
            return Err(ExtractionError::NoAudioData);
        }
        if waveform.sample_rate == 0 {
            return Err(ExtractionError::Decode {
                details: "sample rate is zero".into(),
            });
        }

        let samples = &waveform.samples;
        let sample_rate = waveform.sample_rate;

        let zcr = self.temporal.mean_zcr(samples);

        let spectrogram = self.stft.power_spectrogram(samples);

        let chroma = chroma::mean_chroma(&spectrogram, sample_rate, self.config.n_chroma);

        let mel_bank = MelFilterBank::new(self.config.n_mels, self.config.n_fft, sample_rate);
        let mel_frames = mel_bank.mel_spectrogram(&spectrogram);
        let mfcc = cepstral::mean_mfcc(&mel_frames, self.config.n_mfcc);
        let mel = mel::mean_mel_energy(&mel_bank, &spectrogram);

        check_finite("zero-crossing rate", &[zcr])?;
        check_finite("chroma", &chroma)?;
        check_finite("mfcc", &mfcc)?;
        check_finite("mel spectrogram", &mel)?;

        log::debug!(
            "[FeatureExtractor] {} samples @ {} Hz, {} frames",
            samples.len(),
            sample_rate,
            spectrogram.n_frames()
        );

        Ok(FeatureVector::from_blocks(zcr, chroma, mfcc, mel))
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

fn check_finite(feature: &str, values: &[f64]) -> Result<(), ExtractionError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ExtractionError::NumericFailure {
            feature: feature.to_string(),
        })
    }
}
