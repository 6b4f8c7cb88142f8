// Cepstral module - Mel-frequency cepstral coefficients
//
// MFCCs are the orthonormal DCT-II of the log-power (dB) Mel spectrogram,
// truncated to the first `n_mfcc` coefficients.

use super::mel::power_to_db;

/// Orthonormal DCT-II basis truncated to the first `n_out` coefficients
pub struct DctBasis {
    /// `rows[k][n]`: weight of input `n` in coefficient `k`
    rows: Vec<Vec<f64>>,
}

impl DctBasis {
    pub fn new(n_out: usize, n_in: usize) -> Self {
        let n = n_in as f64;
        let rows = (0..n_out)
            .map(|k| {
                let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                (0..n_in)
                    .map(|i| {
                        scale
                            * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0)
                                / (2.0 * n))
                                .cos()
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn transform(&self, input: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(input).map(|(w, x)| w * x).sum())
            .collect()
    }
}

/// Time-axis mean of the MFCC matrix
///
/// The DCT is linear, so the mean of per-frame coefficients is the DCT of
/// the mean dB Mel spectrum. The dB conversion itself is not linear and is
/// applied per frame first.
pub fn mean_mfcc(mel_frames: &[Vec<f64>], n_mfcc: usize) -> Vec<f64> {
    let Some(n_mels) = mel_frames.first().map(Vec::len) else {
        return vec![0.0; n_mfcc];
    };

    let db = power_to_db(mel_frames);
    let mut mean_db = vec![0.0; n_mels];
    for frame in &db {
        for (acc, &value) in mean_db.iter_mut().zip(frame) {
            *acc += value;
        }
    }
    let n_frames = db.len() as f64;
    mean_db.iter_mut().for_each(|v| *v /= n_frames);

    DctBasis::new(n_mfcc, n_mels).transform(&mean_db)
}
