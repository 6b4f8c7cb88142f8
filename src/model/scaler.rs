// Scaler - per-feature standardisation fitted at training time

use serde::Deserialize;

use crate::error::{ArtifactError, ClassificationError};

/// Transform applied to feature vectors before classification
///
/// Implementations must be read-only after construction; one instance is
/// shared across concurrent requests.
pub trait FeatureScaler: Send + Sync {
    /// Width of the vectors the scaler was fit on
    fn n_features(&self) -> usize;

    /// Transform a batch of feature vectors
    ///
    /// # Errors
    /// - `EmptyBatch` if `batch` has no rows
    /// - `DimensionMismatch` if any row has the wrong width
    fn transform(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ClassificationError>;
}

/// Standard scaler: `(x - mean) / scale`
///
/// Either statistic may be absent, in which case centring or scaling is
/// skipped for every feature.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
    n_features_in: usize,
}

impl StandardScaler {
    pub fn new(
        mean: Option<Vec<f64>>,
        scale: Option<Vec<f64>>,
        n_features_in: usize,
    ) -> Result<Self, ArtifactError> {
        let scaler = Self {
            mean,
            scale,
            n_features_in,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check statistic lengths and that every scale is finite and non-zero
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.n_features_in == 0 {
            return Err(ArtifactError::Invalid {
                reason: "scaler has zero input features".to_string(),
            });
        }

        for (name, stat) in [("mean", &self.mean), ("scale", &self.scale)] {
            if let Some(values) = stat {
                if values.len() != self.n_features_in {
                    return Err(ArtifactError::Invalid {
                        reason: format!(
                            "scaler {} has {} entries, expected {}",
                            name,
                            values.len(),
                            self.n_features_in
                        ),
                    });
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(ArtifactError::Invalid {
                        reason: format!("scaler {} contains non-finite values", name),
                    });
                }
            }
        }

        if let Some(scale) = &self.scale {
            if let Some(i) = scale.iter().position(|&s| s == 0.0) {
                return Err(ArtifactError::Invalid {
                    reason: format!("scaler scale is zero at feature {}", i),
                });
            }
        }

        Ok(())
    }

    fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(i, &x)| {
                let centred = match &self.mean {
                    Some(mean) => x - mean[i],
                    None => x,
                };
                match &self.scale {
                    Some(scale) => centred / scale[i],
                    None => centred,
                }
            })
            .collect()
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.n_features_in
    }

    fn transform(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ClassificationError> {
        if batch.is_empty() {
            return Err(ClassificationError::EmptyBatch);
        }

        batch
            .iter()
            .map(|row| {
                if row.len() != self.n_features_in {
                    return Err(ClassificationError::DimensionMismatch {
                        expected: self.n_features_in,
                        actual: row.len(),
                    });
                }
                Ok(self.transform_row(row))
            })
            .collect()
    }
}
