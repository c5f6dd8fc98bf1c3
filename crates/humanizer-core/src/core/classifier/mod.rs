//! Humanness classifiers and the model wrapper consumed by the engine.
//!
//! The engine only depends on the [`Classifier`] trait. A trained model is paired
//! with the schema it was trained on, its decision threshold and the chain type it
//! recognizes in a [`ModelWrapper`], which is shared by reference for a whole run.

pub mod position_weight;

use crate::core::models::chain::ChainType;
use crate::core::models::schema::Schema;
use crate::core::models::sequence::PositionalSequence;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Sequence has {actual} positions but the model expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Classifier returned a probability outside [0, 1]: {0}")]
    OutOfRange(f64),

    #[error("Classifier inference failed: {0}")]
    Inference(String),
}

/// A binary human/non-human classifier over aligned sequences.
///
/// `predict_probability` must be side-effect free: scoring the same sequence twice
/// yields the same probability.
pub trait Classifier: Send + Sync {
    fn predict_probability(&self, sequence: &PositionalSequence) -> Result<f64, ModelError>;
}

pub struct ModelWrapper {
    classifier: Box<dyn Classifier>,
    schema: Arc<Schema>,
    threshold: f64,
    chain_type: ChainType,
}

impl ModelWrapper {
    pub fn new(
        classifier: Box<dyn Classifier>,
        schema: Arc<Schema>,
        threshold: f64,
        chain_type: ChainType,
    ) -> Self {
        Self {
            classifier,
            schema,
            threshold,
            chain_type,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    /// Human-likeness probability of `sequence`.
    pub fn score(&self, sequence: &PositionalSequence) -> Result<f64, ModelError> {
        if sequence.len() != self.schema.len() {
            return Err(ModelError::LengthMismatch {
                expected: self.schema.len(),
                actual: sequence.len(),
            });
        }
        let probability = self.classifier.predict_probability(sequence)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ModelError::OutOfRange(probability));
        }
        Ok(probability)
    }

    pub fn is_human(&self, sequence: &PositionalSequence) -> Result<bool, ModelError> {
        Ok(self.score(sequence)? >= self.threshold)
    }
}

impl std::fmt::Debug for ModelWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelWrapper")
            .field("schema", &self.schema.name())
            .field("threshold", &self.threshold)
            .field("chain_type", &self.chain_type)
            .finish_non_exhaustive()
    }
}
