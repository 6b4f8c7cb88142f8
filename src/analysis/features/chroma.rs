// Chroma module - pitch-class energy profile
//
// The power spectrogram is projected onto 12 pitch classes with a bank of
// Gaussian bumps in log-frequency space, after estimating how far the
// recording's tuning deviates from A440. Each frame is then scaled so its
// strongest pitch class is 1.0, and frames are averaged.
//
// Tuning estimation:
// 1. Track spectral peaks (150-4000 Hz) per frame with parabolic interpolation
// 2. Keep peaks at or above the median peak magnitude
// 3. Histogram their deviation from the equal-tempered grid (0.01 bin steps)
// 4. The most populated deviation is the tuning offset

use super::stft::{fft_frequencies, PowerSpectrogram};

/// Centre octave of the octave weighting (C5 region)
const CENTER_OCTAVE: f64 = 5.0;

/// Standard deviation of the octave weighting, in octaves
const OCTAVE_WIDTH: f64 = 2.0;

/// Peak tracking range in Hz
const PITCH_FMIN: f64 = 150.0;
const PITCH_FMAX: f64 = 4000.0;

/// Peaks below this fraction of the frame maximum are ignored
const PITCH_THRESHOLD: f64 = 0.1;

/// Tuning histogram resolution, in fractions of a chroma bin
const TUNING_RESOLUTION: f64 = 0.01;

/// Log2 distance in octaves from C0-ish reference (A440 / 16), shifted by `tuning` bins
fn hz_to_octs(freq: f64, tuning: f64, bins_per_octave: usize) -> f64 {
    let a440 = 440.0 * 2f64.powf(tuning / bins_per_octave as f64);
    (freq / (a440 / 16.0)).log2()
}

/// Chroma projection for one sample rate / FFT size / tuning combination
#[derive(Debug, Clone)]
pub struct ChromaFilterBank {
    /// `weights[c][k]`: contribution of FFT bin `k` to pitch class `c` (C first)
    weights: Vec<Vec<f64>>,
}

impl ChromaFilterBank {
    pub fn new(sample_rate: u32, n_fft: usize, tuning: f64, n_chroma: usize) -> Self {
        let n_chroma_f = n_chroma as f64;

        // Fractional chroma bin of every FFT bin; bin 0 (DC) is placed 1.5
        // octaves below bin 1
        let mut frqbins = Vec::with_capacity(n_fft);
        for k in 1..n_fft {
            let freq = k as f64 * sample_rate as f64 / n_fft as f64;
            frqbins.push(n_chroma_f * hz_to_octs(freq, tuning, n_chroma));
        }
        frqbins.insert(0, frqbins[0] - 1.5 * n_chroma_f);

        let mut binwidths: Vec<f64> = frqbins
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).max(1.0))
            .collect();
        binwidths.push(1.0);

        let half = (n_chroma_f / 2.0).round();
        let mut weights = vec![vec![0.0; n_fft]; n_chroma];
        for (c, row) in weights.iter_mut().enumerate() {
            for (k, w) in row.iter_mut().enumerate() {
                let distance =
                    (frqbins[k] - c as f64 + half + 10.0 * n_chroma_f).rem_euclid(n_chroma_f) - half;
                *w = (-0.5 * (2.0 * distance / binwidths[k]).powi(2)).exp();
            }
        }

        // L2-normalize each FFT bin's column across pitch classes
        for k in 0..n_fft {
            let norm = weights.iter().map(|row| row[k] * row[k]).sum::<f64>().sqrt();
            if norm > f64::MIN_POSITIVE {
                for row in weights.iter_mut() {
                    row[k] /= norm;
                }
            }
        }

        // Emphasise the octaves around the centre
        for k in 0..n_fft {
            let octave_weight =
                (-0.5 * ((frqbins[k] / n_chroma_f - CENTER_OCTAVE) / OCTAVE_WIDTH).powi(2)).exp();
            for row in weights.iter_mut() {
                row[k] *= octave_weight;
            }
        }

        // Rows are A-based at this point; rotate so row 0 is C
        weights.rotate_left(3 * (n_chroma / 12));

        let n_bins = n_fft / 2 + 1;
        for row in weights.iter_mut() {
            row.truncate(n_bins);
        }

        Self { weights }
    }

    /// Chroma of a single power spectrum, scaled so the largest class is 1.0
    pub fn apply(&self, spectrum: &[f64]) -> Vec<f64> {
        let mut chroma: Vec<f64> = self
            .weights
            .iter()
            .map(|row| row.iter().zip(spectrum).map(|(w, p)| w * p).sum())
            .collect();

        let peak = chroma.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if peak > f64::MIN_POSITIVE {
            chroma.iter_mut().for_each(|v| *v /= peak);
        }
        chroma
    }
}

/// Time-axis mean of the max-normalised chromagram
pub fn mean_chroma(
    spec: &PowerSpectrogram,
    sample_rate: u32,
    n_chroma: usize,
) -> Vec<f64> {
    let tuning = estimate_tuning(spec, sample_rate, n_chroma);
    log::trace!("[Chroma] Estimated tuning offset {:.2} bins", tuning);

    let bank = ChromaFilterBank::new(sample_rate, spec.n_fft, tuning, n_chroma);
    let mut mean = vec![0.0; n_chroma];
    if spec.frames.is_empty() {
        return mean;
    }

    for frame in &spec.frames {
        for (acc, value) in mean.iter_mut().zip(bank.apply(frame)) {
            *acc += value;
        }
    }
    let n = spec.n_frames() as f64;
    mean.iter_mut().for_each(|v| *v /= n);
    mean
}

/// Interpolated spectral peak: frequency in Hz and magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
struct Peak {
    freq: f64,
    magnitude: f64,
}

/// Parabolic-interpolation peak picking over one frame
fn track_peaks(frame: &[f64], sample_rate: u32, n_fft: usize, fft_freqs: &[f64]) -> Vec<Peak> {
    let n = frame.len();
    if n < 3 {
        return Vec::new();
    }

    let fmax = PITCH_FMAX.min(sample_rate as f64 / 2.0);
    let ref_value = PITCH_THRESHOLD * frame.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let gated: Vec<f64> = frame
        .iter()
        .map(|&s| if s > ref_value { s } else { 0.0 })
        .collect();

    let mut peaks = Vec::new();
    for k in 0..n {
        if !(PITCH_FMIN <= fft_freqs[k] && fft_freqs[k] < fmax) {
            continue;
        }

        // Local maximum with edge replication: strictly above the left
        // neighbour, not below the right one
        let left = gated[k.saturating_sub(1)];
        let right = gated[(k + 1).min(n - 1)];
        if !(gated[k] > left && gated[k] >= right) {
            continue;
        }

        let shift = if k == 0 || k == n - 1 {
            0.0
        } else {
            let a = frame[k - 1] + frame[k + 1] - 2.0 * frame[k];
            let b = (frame[k + 1] - frame[k - 1]) / 2.0;
            if b.abs() >= a.abs() {
                0.0
            } else {
                -b / a
            }
        };

        let gradient = if k == 0 {
            frame[1] - frame[0]
        } else if k == n - 1 {
            frame[n - 1] - frame[n - 2]
        } else {
            (frame[k + 1] - frame[k - 1]) / 2.0
        };

        peaks.push(Peak {
            freq: (k as f64 + shift) * sample_rate as f64 / n_fft as f64,
            magnitude: frame[k] + 0.5 * gradient * shift,
        });
    }
    peaks
}

/// Estimate the tuning offset of a recording, in fractions of a chroma bin
///
/// Returns a value in `[-0.5, 0.5)`; `0.0` when no usable peaks exist.
pub fn estimate_tuning(spec: &PowerSpectrogram, sample_rate: u32, bins_per_octave: usize) -> f64 {
    let fft_freqs = fft_frequencies(sample_rate, spec.n_fft);
    let peaks: Vec<Peak> = spec
        .frames
        .iter()
        .flat_map(|frame| track_peaks(frame, sample_rate, spec.n_fft, &fft_freqs))
        .filter(|peak| peak.freq > 0.0)
        .collect();

    if peaks.is_empty() {
        return 0.0;
    }

    let mut magnitudes: Vec<f64> = peaks.iter().map(|p| p.magnitude).collect();
    let threshold = median(&mut magnitudes);

    let frequencies: Vec<f64> = peaks
        .iter()
        .filter(|p| p.magnitude >= threshold)
        .map(|p| p.freq)
        .collect();

    pitch_tuning(&frequencies, bins_per_octave)
}

/// Most common deviation of `frequencies` from the equal-tempered grid
pub fn pitch_tuning(frequencies: &[f64], bins_per_octave: usize) -> f64 {
    let residuals: Vec<f64> = frequencies
        .iter()
        .filter(|&&f| f > 0.0)
        .map(|&f| {
            let r = (bins_per_octave as f64 * hz_to_octs(f, 0.0, bins_per_octave)).rem_euclid(1.0);
            if r >= 0.5 {
                r - 1.0
            } else {
                r
            }
        })
        .collect();

    if residuals.is_empty() {
        return 0.0;
    }

    let n_bins = (1.0 / TUNING_RESOLUTION).ceil() as usize;
    let edges: Vec<f64> = (0..=n_bins)
        .map(|i| -0.5 + i as f64 / n_bins as f64)
        .collect();

    let mut counts = vec![0usize; n_bins];
    for r in residuals {
        if r < edges[0] || r > edges[n_bins] {
            continue;
        }
        let idx = edges.partition_point(|&e| e <= r).saturating_sub(1).min(n_bins - 1);
        counts[idx] += 1;
    }

    // First maximum wins on ties
    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    edges[best]
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::stft::StftProcessor;

    fn tone(freq: f64, sample_rate: u32, seconds: f64) -> Vec<f32> {
        let n = (sample_rate as f64 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn test_filter_bank_shape() {
        let bank = ChromaFilterBank::new(22_050, 2048, 0.0, 12);
        assert_eq!(bank.weights.len(), 12);
        assert!(bank.weights.iter().all(|row| row.len() == 1025));
        assert!(bank.weights.iter().flatten().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_pitch_tuning_in_tune() {
        // A4 and E5 on the equal-tempered grid
        let tuning = pitch_tuning(&[440.0, 659.2551138257398], 12);
        assert!(tuning.abs() <= 0.011, "tuning {}", tuning);
    }

    #[test]
    fn test_pitch_tuning_detects_sharp_recording() {
        // A quarter of a semitone sharp
        let sharp = 440.0 * 2f64.powf(0.25 / 12.0);
        let tuning = pitch_tuning(&[sharp, sharp, 440.0], 12);
        assert!((tuning - 0.25).abs() <= 0.011, "tuning {}", tuning);
    }

    #[test]
    fn test_pitch_tuning_without_frequencies() {
        assert_eq!(pitch_tuning(&[], 12), 0.0);
        assert_eq!(pitch_tuning(&[0.0, -1.0], 12), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_a440_tone_peaks_at_pitch_class_a() {
        let sample_rate = 22_050;
        let stft = StftProcessor::new(2048, 512);
        let spec = stft.power_spectrogram(&tone(440.0, sample_rate, 1.0));

        let chroma = mean_chroma(&spec, sample_rate, 12);
        let (argmax, _) = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();

        // C, C#, D, D#, E, F, F#, G, G#, A
        assert_eq!(argmax, 9, "chroma {:?}", chroma);
        assert!(chroma.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn test_silence_has_zero_chroma() {
        let stft = StftProcessor::new(2048, 512);
        let spec = stft.power_spectrogram(&[0.0; 4096]);
        assert_eq!(estimate_tuning(&spec, 16_000, 12), 0.0);
        assert!(mean_chroma(&spec, 16_000, 12).iter().all(|&c| c == 0.0));
    }
}
