// Types module - Data structures for audio features
//
// The feature vector layout is a compatibility contract with the pretrained
// scaler and classifier: sub-vectors are concatenated in a fixed order and
// their lengths must match what the artifacts were fit on.

use crate::config::FeatureConfig;

/// Named sub-vectors of the feature vector, in concatenation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureBlock {
    /// Mean zero-crossing rate
    ZeroCrossingRate,
    /// Mean chroma energy per pitch class
    Chroma,
    /// Mean Mel-frequency cepstral coefficients
    Mfcc,
    /// Mean Mel spectrogram energy per band
    MelSpectrogram,
}

/// Lengths of each block in the concatenated feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FeatureLayout {
    pub n_chroma: usize,
    pub n_mfcc: usize,
    pub n_mels: usize,
}

impl FeatureLayout {
    pub const ORDER: [FeatureBlock; 4] = [
        FeatureBlock::ZeroCrossingRate,
        FeatureBlock::Chroma,
        FeatureBlock::Mfcc,
        FeatureBlock::MelSpectrogram,
    ];

    pub fn from_config(config: &FeatureConfig) -> Self {
        Self {
            n_chroma: config.n_chroma,
            n_mfcc: config.n_mfcc,
            n_mels: config.n_mels,
        }
    }

    pub fn block_len(&self, block: FeatureBlock) -> usize {
        match block {
            FeatureBlock::ZeroCrossingRate => 1,
            FeatureBlock::Chroma => self.n_chroma,
            FeatureBlock::Mfcc => self.n_mfcc,
            FeatureBlock::MelSpectrogram => self.n_mels,
        }
    }

    /// Index range of `block` within the feature vector
    pub fn range(&self, block: FeatureBlock) -> std::ops::Range<usize> {
        let start: usize = Self::ORDER
            .iter()
            .take_while(|&&b| b != block)
            .map(|&b| self.block_len(b))
            .sum();
        start..start + self.block_len(block)
    }

    /// Total feature vector length
    pub fn len(&self) -> usize {
        Self::ORDER.iter().map(|&b| self.block_len(b)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self::from_config(&FeatureConfig::default())
    }
}

/// Fixed-length summary of an audio clip, used as classifier input
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FeatureVector {
    values: Vec<f64>,
    #[serde(skip)]
    layout: FeatureLayout,
}

impl FeatureVector {
    /// Concatenate the four blocks in layout order
    pub(crate) fn from_blocks(
        zcr: f64,
        chroma: Vec<f64>,
        mfcc: Vec<f64>,
        mel: Vec<f64>,
    ) -> Self {
        let layout = FeatureLayout {
            n_chroma: chroma.len(),
            n_mfcc: mfcc.len(),
            n_mels: mel.len(),
        };
        let mut values = Vec::with_capacity(layout.len());
        values.push(zcr);
        values.extend(chroma);
        values.extend(mfcc);
        values.extend(mel);

        Self { values, layout }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn block(&self, block: FeatureBlock) -> &[f64] {
        &self.values[self.layout.range(block)]
    }

    pub fn zero_crossing_rate(&self) -> f64 {
        self.values[0]
    }
}
