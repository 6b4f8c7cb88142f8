//! Mel filter bank and Mel spectrogram summaries.
//!
//! Uses the Slaney mel scale (linear below 1 kHz, logarithmic above) with
//! Slaney area normalisation, spanning 0 Hz to Nyquist.
//!
//! - For freq < 1000 Hz: `mel = 3 × freq / 200`
//! - For freq >= 1000 Hz: `mel = 15 + 27 × ln(freq / 1000) / ln(6.4)`

use super::stft::{fft_frequencies, PowerSpectrogram};

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = 15.0;
const LOGSTEP: f64 = 0.06875177742094912; // ln(6.4) / 27

/// Convert frequency in Hz to mel scale using the Slaney formula.
pub fn hz_to_mel(freq: f64) -> f64 {
    if freq < MIN_LOG_HZ {
        freq / F_SP
    } else {
        MIN_LOG_MEL + (freq / MIN_LOG_HZ).ln() / LOGSTEP
    }
}

/// Convert mel scale to frequency in Hz using the Slaney formula.
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel < MIN_LOG_MEL {
        mel * F_SP
    } else {
        MIN_LOG_HZ * ((mel - MIN_LOG_MEL) * LOGSTEP).exp()
    }
}

/// Triangular Mel filters over the bins of an `n_fft`-point FFT
#[derive(Debug, Clone)]
pub struct MelFilterBank {
    /// `weights[m][k]`: contribution of FFT bin `k` to Mel band `m`
    weights: Vec<Vec<f64>>,
}

impl MelFilterBank {
    /// Build a Slaney-normalised filter bank from 0 Hz to `sample_rate / 2`
    pub fn new(n_mels: usize, n_fft: usize, sample_rate: u32) -> Self {
        let fft_freqs = fft_frequencies(sample_rate, n_fft);

        let mel_max = hz_to_mel(sample_rate as f64 / 2.0);
        let n_points = n_mels + 2;
        let mel_f: Vec<f64> = (0..n_points)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_points - 1) as f64))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let lower_width = mel_f[m + 1] - mel_f[m];
                let upper_width = mel_f[m + 2] - mel_f[m + 1];
                // Slaney normalization: each filter has unit area
                let enorm = 2.0 / (mel_f[m + 2] - mel_f[m]);

                fft_freqs
                    .iter()
                    .map(|&freq| {
                        let rising = (freq - mel_f[m]) / lower_width;
                        let falling = (mel_f[m + 2] - freq) / upper_width;
                        rising.min(falling).max(0.0) * enorm
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    /// Project one power spectrum onto the Mel bands
    pub fn apply(&self, spectrum: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|filter| filter.iter().zip(spectrum).map(|(w, p)| w * p).sum())
            .collect()
    }

    /// Mel spectrogram, frame-major
    pub fn mel_spectrogram(&self, spec: &PowerSpectrogram) -> Vec<Vec<f64>> {
        spec.frames.iter().map(|frame| self.apply(frame)).collect()
    }
}

/// Time-axis mean of the Mel spectrogram
///
/// The projection is linear, so this equals the mean of the per-frame Mel
/// energies.
pub fn mean_mel_energy(bank: &MelFilterBank, spec: &PowerSpectrogram) -> Vec<f64> {
    bank.apply(&spec.mean_spectrum())
}

/// Floor applied before taking logarithms
pub const AMIN: f64 = 1e-10;

/// Dynamic range kept below the loudest cell
pub const TOP_DB: f64 = 80.0;

/// Convert a power spectrogram to decibels (reference power 1.0)
///
/// Values are floored at `AMIN`, then clipped to `TOP_DB` below the global
/// maximum across all frames and bands.
pub fn power_to_db(frames: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut db: Vec<Vec<f64>> = frames
        .iter()
        .map(|frame| frame.iter().map(|&p| 10.0 * p.max(AMIN).log10()).collect())
        .collect();

    let peak = db
        .iter()
        .flatten()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let floor = peak - TOP_DB;
    for value in db.iter_mut().flatten() {
        *value = value.max(floor);
    }
    db
}
