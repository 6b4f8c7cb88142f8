// Temporal module - Time-domain feature extraction
//
// This module computes features directly from time-domain audio signals.
// Currently that is the frame-wise zero-crossing rate, summarised as its
// mean across frames.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// Samples with magnitude at or below this are treated as exact zeros
const ZERO_THRESHOLD: f64 = 1e-10;

/// Frame-wise temporal feature computation
pub struct TemporalFeatures {
    frame_length: usize,
    hop_length: usize,
}

impl TemporalFeatures {
    /// Create a new temporal features processor
    ///
    /// # Arguments
    /// * `frame_length` - Samples per analysis frame
    /// * `hop_length` - Distance between successive frame starts
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }

    /// Zero-crossing rate of every centered frame
    ///
    /// The signal is edge-padded by `frame_length / 2` on each side. Within a
    /// frame, a crossing is counted at position `i > 0` when the sign of
    /// sample `i` differs from sample `i - 1` (zero counts as positive).
    /// The count is divided by the frame length, so each value is in `[0, 1)`.
    pub fn zcr_frames(&self, audio: &[f32]) -> Vec<f64> {
        if audio.is_empty() {
            return Vec::new();
        }

        let pad = self.frame_length / 2;
        let first = audio[0];
        let last = audio[audio.len() - 1];
        let negative: Vec<bool> = std::iter::repeat(first)
            .take(pad)
            .chain(audio.iter().copied())
            .chain(std::iter::repeat(last).take(pad))
            .map(|x| (x as f64) < -ZERO_THRESHOLD)
            .collect();

        // crossings_prefix[j] = number of sign changes at positions 1..j
        let mut crossings_prefix = vec![0usize; negative.len() + 1];
        for j in 1..negative.len() {
            crossings_prefix[j + 1] =
                crossings_prefix[j] + usize::from(negative[j] != negative[j - 1]);
        }

        let n_frames = 1 + (negative.len() - self.frame_length) / self.hop_length;
        (0..n_frames)
            .map(|t| {
                let start = t * self.hop_length;
                let end = start + self.frame_length;
                // Position `start` is the frame's first sample and never a crossing
                let count = crossings_prefix[end] - crossings_prefix[start + 1];
                count as f64 / self.frame_length as f64
            })
            .collect()
    }

    /// Mean zero-crossing rate across frames
    pub fn mean_zcr(&self, audio: &[f32]) -> f64 {
        let frames = self.zcr_frames(audio);
        if frames.is_empty() {
            return 0.0;
        }
        frames.iter().sum::<f64>() / frames.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_count_is_centered() {
        let temporal = TemporalFeatures::new(2048, 512);
        assert_eq!(temporal.zcr_frames(&[0.1; 1]).len(), 1);
        assert_eq!(temporal.zcr_frames(&[0.1; 1024]).len(), 3);
    }

    #[test]
    fn test_constant_signal_has_no_crossings() {
        let temporal = TemporalFeatures::new(2048, 512);
        assert_eq!(temporal.mean_zcr(&[0.5; 4096]), 0.0);
        assert_eq!(temporal.mean_zcr(&[-0.5; 4096]), 0.0);
        assert_eq!(temporal.mean_zcr(&[0.0; 4096]), 0.0);
    }

    #[test]
    fn test_alternating_signal_crosses_every_sample() {
        let temporal = TemporalFeatures::new(8, 4);
        let signal: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let frames = temporal.zcr_frames(&signal);

        // Interior frames see 7 crossings out of 8 positions
        assert_relative_eq!(frames[4], 7.0 / 8.0);
    }

    #[test]
    fn test_tiny_values_count_as_zero() {
        let temporal = TemporalFeatures::new(8, 4);
        let signal = [1.0e-12f32, -1.0e-12, 1.0e-12, -1.0e-12, 0.5, 0.5, 0.5, 0.5];
        assert_eq!(temporal.mean_zcr(&signal), 0.0);
    }

    #[test]
    fn test_sine_zcr_tracks_frequency() {
        let sample_rate = 16_000.0f32;
        let temporal = TemporalFeatures::new(2048, 512);
        let tone = |freq: f32| -> Vec<f32> {
            (0..16_000)
                .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
                .collect()
        };

        let low = temporal.mean_zcr(&tone(100.0));
        let high = temporal.mean_zcr(&tone(2000.0));

        // Expected rate is 2 * f / sr, pulled down slightly by the padded edge frames
        assert!((low - 0.0125).abs() < 0.003, "low tone zcr {}", low);
        assert!((high - 0.25).abs() < 0.02, "high tone zcr {}", high);
        assert!(high > low);
    }
}
