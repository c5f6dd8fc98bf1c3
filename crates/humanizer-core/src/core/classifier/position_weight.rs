use super::{Classifier, ModelError, ModelWrapper};
use crate::core::models::chain::{ChainType, ParseChainTypeError};
use crate::core::models::schema::Schema;
use crate::core::models::sequence::PositionalSequence;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PositionWeightFile {
    chain_type: String,
    threshold: f64,
    #[serde(default)]
    intercept: f64,
    #[serde(default)]
    weights: HashMap<String, HashMap<String, f64>>,
}

/// Logistic classifier over per-position residue weights.
///
/// `p = 1 / (1 + exp(-(intercept + sum_i w[i][residue_i])))`; residues without a weight contribute zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionWeightModel {
    intercept: f64,
    weights: Vec<HashMap<char, f64>>,
}

impl PositionWeightModel {
    pub fn new(intercept: f64, weights: Vec<HashMap<char, f64>>) -> Self {
        Self { intercept, weights }
    }

    fn logit(&self, sequence: &PositionalSequence) -> f64 {
        self.intercept
            + sequence
                .residues()
                .iter()
                .zip(self.weights.iter())
                .filter_map(|(residue, table)| table.get(residue))
                .sum::<f64>()
    }
}

impl Classifier for PositionWeightModel {
    fn predict_probability(&self, sequence: &PositionalSequence) -> Result<f64, ModelError> {
        if sequence.len() != self.weights.len() {
            return Err(ModelError::LengthMismatch {
                expected: self.weights.len(),
                actual: sequence.len(),
            });
        }
        let logit = self.logit(sequence);
        if !logit.is_finite() {
            return Err(ModelError::Inference(format!(
                "non-finite logit {} for sequence {}",
                logit, sequence
            )));
        }
        Ok(1.0 / (1.0 + (-logit).exp()))
    }
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid chain type in '{path}': {source}")]
    ChainType {
        path: String,
        source: ParseChainTypeError,
    },
    #[error("Model '{path}' references position '{position}' which is not in schema '{schema}'")]
    UnknownPosition {
        path: String,
        position: String,
        schema: String,
    },
    #[error("Model '{path}' has an invalid residue key '{residue}' at position '{position}'")]
    InvalidResidue {
        path: String,
        position: String,
        residue: String,
    },
    #[error("Model '{path}' has a threshold outside [0, 1]: {threshold}")]
    InvalidThreshold { path: String, threshold: f64 },
}

/// Loads a position-weight model from TOML and wraps it together with its schema.
pub fn load(path: &Path, schema: Arc<Schema>) -> Result<ModelWrapper, ModelLoadError> {
    let path_str = path.to_string_lossy().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ModelLoadError::Io {
        path: path_str.clone(),
        source: e,
    })?;
    let file: PositionWeightFile = toml::from_str(&content).map_err(|e| ModelLoadError::Toml {
        path: path_str.clone(),
        source: e,
    })?;

    let chain_type: ChainType =
        file.chain_type
            .parse()
            .map_err(|e| ModelLoadError::ChainType {
                path: path_str.clone(),
                source: e,
            })?;
    if !(0.0..=1.0).contains(&file.threshold) {
        return Err(ModelLoadError::InvalidThreshold {
            path: path_str,
            threshold: file.threshold,
        });
    }

    let mut weights = vec![HashMap::new(); schema.len()];
    for (position, table) in file.weights {
        let idx = schema
            .position_index(&position)
            .ok_or_else(|| ModelLoadError::UnknownPosition {
                path: path_str.clone(),
                position: position.clone(),
                schema: schema.name().to_string(),
            })?;
        for (residue, weight) in table {
            let mut chars = residue.chars();
            let aa = match (chars.next(), chars.next()) {
                (Some(aa), None) => aa.to_ascii_uppercase(),
                _ => {
                    return Err(ModelLoadError::InvalidResidue {
                        path: path_str.clone(),
                        position: position.clone(),
                        residue,
                    });
                }
            };
            weights[idx].insert(aa, weight);
        }
    }

    let model = PositionWeightModel::new(file.intercept, weights);
    Ok(ModelWrapper::new(
        Box::new(model),
        schema,
        file.threshold,
        chain_type,
    ))
}
