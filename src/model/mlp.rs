// MLP - feed-forward network evaluation for a fitted multi-layer perceptron
//
// Weights are stored the way they were exported: `coefs[l]` is an
// `n_in × n_out` matrix, `intercepts[l]` has `n_out` entries. Hidden layers
// share one activation; the output layer uses softmax for multi-class models
// and a single logistic unit for binary ones.

use serde::Deserialize;

use crate::error::{ArtifactError, ClassificationError};

/// A classifier that produces a probability distribution over classes
///
/// Implementations must be read-only after construction; one instance is
/// shared across concurrent requests.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Width of the input vectors
    fn n_features(&self) -> usize;

    /// Number of classes in each output distribution
    fn n_classes(&self) -> usize;

    /// Encoded class value for each output position
    fn classes(&self) -> Vec<i64> {
        (0..self.n_classes() as i64).collect()
    }

    /// Class probability distribution for every row of `batch`
    fn predict_proba(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ClassificationError>;

    /// Most probable output position for every row of `batch`
    ///
    /// Ties resolve to the lowest position.
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<usize>, ClassificationError> {
        Ok(self
            .predict_proba(batch)?
            .iter()
            .map(|probs| argmax(probs))
            .collect())
    }
}

/// Index of the first maximum
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Hidden layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Identity,
    Logistic,
    Tanh,
    Relu,
}

impl Activation {
    fn apply(self, values: &mut [f64]) {
        match self {
            Activation::Identity => {}
            Activation::Logistic => values.iter_mut().for_each(|v| *v = logistic(*v)),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
        }
    }
}

/// Output layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    Softmax,
    Logistic,
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    values.iter_mut().for_each(|v| *v /= sum);
}

/// One dense layer
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    /// `weights[i][j]`: input `i` to output `j`
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl Layer {
    fn n_in(&self) -> usize {
        self.weights.len()
    }

    fn n_out(&self) -> usize {
        self.biases.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.biases.clone();
        for (x, row) in input.iter().zip(&self.weights) {
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        out
    }
}

/// Serialized form of `mlp_emotion_model.json`
#[derive(Debug, Clone, Deserialize)]
pub struct MlpModelFile {
    pub activation: Activation,
    pub out_activation: OutputActivation,
    pub coefs: Vec<Vec<Vec<f64>>>,
    pub intercepts: Vec<Vec<f64>>,
    #[serde(default)]
    pub classes: Option<Vec<i64>>,
}

/// Fitted multi-layer perceptron classifier
#[derive(Debug, Clone, PartialEq)]
pub struct MlpClassifier {
    layers: Vec<Layer>,
    activation: Activation,
    out_activation: OutputActivation,
    classes: Vec<i64>,
}

impl MlpClassifier {
    /// Build a classifier from exported weights, checking every shape
    pub fn from_file(file: MlpModelFile) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid { reason };

        if file.coefs.is_empty() {
            return Err(invalid("network has no layers".to_string()));
        }
        if file.coefs.len() != file.intercepts.len() {
            return Err(invalid(format!(
                "network has {} weight matrices but {} bias vectors",
                file.coefs.len(),
                file.intercepts.len()
            )));
        }

        let mut layers = Vec::with_capacity(file.coefs.len());
        for (l, (weights, biases)) in file.coefs.into_iter().zip(file.intercepts).enumerate() {
            if weights.is_empty() || biases.is_empty() {
                return Err(invalid(format!("layer {} is empty", l)));
            }
            if let Some(row) = weights.iter().position(|row| row.len() != biases.len()) {
                return Err(invalid(format!(
                    "layer {} row {} has {} outputs, expected {}",
                    l,
                    row,
                    weights[row].len(),
                    biases.len()
                )));
            }
            if weights.iter().flatten().chain(&biases).any(|v| !v.is_finite()) {
                return Err(invalid(format!("layer {} contains non-finite weights", l)));
            }
            if let Some(prev) = layers.last().map(Layer::n_out) {
                if weights.len() != prev {
                    return Err(invalid(format!(
                        "layer {} expects {} inputs but previous layer has {} outputs",
                        l,
                        weights.len(),
                        prev
                    )));
                }
            }
            layers.push(Layer { weights, biases });
        }

        let n_out = layers.last().map(Layer::n_out).unwrap_or(0);
        let n_classes = match (file.out_activation, n_out) {
            (OutputActivation::Logistic, 1) => 2,
            (OutputActivation::Softmax, n) if n >= 2 => n,
            (activation, n) => {
                return Err(invalid(format!(
                    "{:?} output layer with {} units is not a single-label classifier",
                    activation, n
                )))
            }
        };

        let classes = match file.classes {
            Some(classes) if classes.len() != n_classes => {
                return Err(invalid(format!(
                    "network lists {} classes but produces {} probabilities",
                    classes.len(),
                    n_classes
                )))
            }
            Some(classes) => classes,
            None => (0..n_classes as i64).collect(),
        };

        Ok(Self {
            layers,
            activation: file.activation,
            out_activation: file.out_activation,
            classes,
        })
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let last = self.layers.len() - 1;
        let mut values = input.to_vec();
        for (l, layer) in self.layers.iter().enumerate() {
            values = layer.forward(&values);
            if l < last {
                self.activation.apply(&mut values);
            }
        }

        match self.out_activation {
            OutputActivation::Softmax => {
                softmax(&mut values);
                values
            }
            OutputActivation::Logistic => {
                let p = logistic(values[0]);
                vec![1.0 - p, p]
            }
        }
    }
}

impl ProbabilisticClassifier for MlpClassifier {
    fn n_features(&self) -> usize {
        self.layers[0].n_in()
    }

    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn classes(&self) -> Vec<i64> {
        self.classes.clone()
    }

    fn predict_proba(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ClassificationError> {
        if batch.is_empty() {
            return Err(ClassificationError::EmptyBatch);
        }

        let n_features = self.n_features();
        batch
            .iter()
            .map(|row| {
                if row.len() != n_features {
                    return Err(ClassificationError::DimensionMismatch {
                        expected: n_features,
                        actual: row.len(),
                    });
                }
                let probs = self.forward(row);
                if probs.iter().any(|p| !p.is_finite()) {
                    return Err(ClassificationError::Prediction {
                        reason: "network produced non-finite probabilities".to_string(),
                    });
                }
                Ok(probs)
            })
            .collect()
    }
}
