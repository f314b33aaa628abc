//! Classifier port: Trait for a pre-trained binary probabilistic classifier.
//!
//! The model is trained outside this crate and loaded as an opaque artifact;
//! the application only needs per-class probabilities for one row.

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, SchemaMismatchError};

/// Errors raised while scoring a row.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Classifier produced an invalid output: {0}")]
    InvalidOutput(String),
}

/// Trait for binary classifiers.
///
/// Implementations must be deterministic and side-effect free so a single
/// instance can be shared across requests without locking.
pub trait BinaryClassifier: Send + Sync {
    /// Number of input columns the model was trained on.
    fn n_features(&self) -> usize;

    /// Per-class probabilities `[p(no condition), p(condition)]` for one row.
    ///
    /// # Errors
    /// Returns `ClassifierError::FeatureCount` if `row` has the wrong width.
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], ClassifierError>;

    /// Hard class label using the classifier's own rule: argmax of the
    /// class probabilities, ties going to class 0.
    ///
    /// # Errors
    /// Propagates `predict_proba` errors.
    fn predict(&self, row: &[f64]) -> Result<u8, ClassifierError> {
        Ok(label_of(self.predict_proba(row)?))
    }
}

/// Argmax of `[p(no condition), p(condition)]`, ties going to class 0.
#[must_use]
pub fn label_of(proba: [f64; 2]) -> u8 {
    let [negative, positive] = proba;
    u8::from(positive > negative)
}

/// Informational model card exported with the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub training_data: Option<String>,
    #[serde(default)]
    pub metrics: Option<ModelMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// A loaded classifier together with the ordered feature list it expects.
///
/// Immutable once built; share it behind an `Arc`.
pub struct ClassifierArtifact<C: BinaryClassifier> {
    classifier: C,
    schema: FeatureSchema,
    metadata: ModelMetadata,
    fingerprint: Option<String>,
}

impl<C: BinaryClassifier> ClassifierArtifact<C> {
    /// Pair a classifier with its feature list.
    ///
    /// # Errors
    /// Returns `SchemaMismatchError::WidthMismatch` if the classifier and the
    /// feature list disagree on the number of columns.
    pub fn new(classifier: C, schema: FeatureSchema) -> Result<Self, SchemaMismatchError> {
        if classifier.n_features() != schema.len() {
            return Err(SchemaMismatchError::WidthMismatch {
                expected: classifier.n_features(),
                actual: schema.len(),
            });
        }
        Ok(Self {
            classifier,
            schema,
            metadata: ModelMetadata::default(),
            fingerprint: None,
        })
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach the SHA-256 of the model file.
    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

impl<C: BinaryClassifier> std::fmt::Debug for ClassifierArtifact<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierArtifact")
            .field("n_features", &self.schema.len())
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}
