// STFT module - Short-time Fourier transform with centered frames
//
// This module slices a waveform into overlapping Hann-windowed frames and
// computes the power spectrum of each one. The spectral features (chroma,
// Mel, MFCC) all derive from the same power spectrogram.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Power spectrogram stored frame-major: `frames[t][k]` is bin `k` of frame `t`
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrogram {
    pub n_fft: usize,
    pub frames: Vec<Vec<f64>>,
}

impl PowerSpectrogram {
    /// Number of frequency bins per frame (`n_fft / 2 + 1`)
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Time-axis mean of every bin
    pub fn mean_spectrum(&self) -> Vec<f64> {
        let mut mean = vec![0.0; self.n_bins()];
        if self.frames.is_empty() {
            return mean;
        }
        for frame in &self.frames {
            for (acc, &power) in mean.iter_mut().zip(frame) {
                *acc += power;
            }
        }
        let n = self.frames.len() as f64;
        mean.iter_mut().for_each(|v| *v /= n);
        mean
    }
}

/// STFT processor with a pre-planned forward FFT
pub struct StftProcessor {
    fft: Arc<dyn Fft<f64>>,
    n_fft: usize,
    hop_length: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f64>,
}

impl StftProcessor {
    /// Create a new STFT processor
    ///
    /// # Arguments
    /// * `n_fft` - FFT and window size
    /// * `hop_length` - Distance between successive frame starts
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        let window = periodic_hann(n_fft);
        let fft = FftPlanner::new().plan_fft_forward(n_fft);

        Self {
            fft,
            n_fft,
            hop_length,
            window,
        }
    }

    /// Number of centered frames produced for a signal of `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_length
    }

    /// Compute the power spectrogram of `audio`
    ///
    /// The signal is zero-padded by `n_fft / 2` on both sides so frame `t`
    /// is centered on sample `t * hop_length`.
    pub fn power_spectrogram(&self, audio: &[f32]) -> PowerSpectrogram {
        let pad = self.n_fft / 2;
        let mut padded = vec![0.0f64; audio.len() + 2 * pad];
        for (dst, &src) in padded[pad..pad + audio.len()].iter_mut().zip(audio) {
            *dst = src as f64;
        }

        let n_frames = self.frame_count(audio.len());
        let n_bins = self.n_fft / 2 + 1;
        let mut buffer = vec![Complex::new(0.0, 0.0); self.n_fft];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut frames = Vec::with_capacity(n_frames);

        for t in 0..n_frames {
            let start = t * self.hop_length;
            let segment = &padded[start..start + self.n_fft];
            for ((slot, &sample), &w) in buffer.iter_mut().zip(segment).zip(&self.window) {
                *slot = Complex::new(sample * w, 0.0);
            }

            self.fft.process_with_scratch(&mut buffer, &mut scratch);

            frames.push(buffer[..n_bins].iter().map(|c| c.norm_sqr()).collect());
        }

        PowerSpectrogram {
            n_fft: self.n_fft,
            frames,
        }
    }
}

/// Periodic Hann window: `0.5 - 0.5 cos(2πn / N)`
fn periodic_hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * std::f64::consts::PI * i as f64) / n as f64).cos())
        .collect()
}

/// Center frequency of every FFT bin, `k * sr / n_fft`
pub fn fft_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f64> {
    (0..=n_fft / 2)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect()
}
