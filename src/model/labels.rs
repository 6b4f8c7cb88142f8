// Label decoder - maps encoded class indices back to canonical labels

use serde::Deserialize;

use crate::error::{ArtifactError, ClassificationError};

/// Inverse of the label encoding applied at training time
///
/// Class `i` of the classifier decodes to `classes[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, ArtifactError> {
        let encoder = Self { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Labels must be non-empty and unique
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.classes.is_empty() {
            return Err(ArtifactError::Invalid {
                reason: "label encoder has no classes".to_string(),
            });
        }
        for (i, label) in self.classes.iter().enumerate() {
            if label.is_empty() {
                return Err(ArtifactError::Invalid {
                    reason: format!("label encoder class {} is empty", i),
                });
            }
            if self.classes[..i].contains(label) {
                return Err(ArtifactError::Invalid {
                    reason: format!("label encoder class '{}' is duplicated", label),
                });
            }
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Decode an encoded class value
    pub fn decode(&self, code: i64) -> Result<&str, ClassificationError> {
        usize::try_from(code)
            .ok()
            .and_then(|index| self.classes.get(index))
            .map(String::as_str)
            .ok_or(ClassificationError::UnknownClass {
                index: code,
                known: self.classes.len(),
            })
    }
}
