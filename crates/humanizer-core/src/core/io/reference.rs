use crate::core::models::chain::{ChainType, NOT_HUMAN_LABEL};
use crate::core::models::schema::Schema;
use crate::core::models::sequence::{PositionalSequence, WILDCARD};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Column holding the V-gene call (or `NOT_HUMAN`) in annotated datasets.
pub const LABEL_COLUMN: &str = "v_call";

/// Human sequences and their labels, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanSamples {
    pub sequences: Vec<PositionalSequence>,
    pub labels: Vec<String>,
}

impl HumanSamples {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Dataset '{path}' has no column '{column}'")]
    MissingColumn { path: String, column: String },
    #[error("Dataset '{path}', row {row}: cell for position '{position}' must hold one residue, got '{value}'")]
    InvalidCell {
        path: String,
        row: usize,
        position: String,
        value: String,
    },
}

/// Shortens allele-level calls to the V-gene family, e.g. `IGHV3-23*01` -> `IGHV3`.
pub fn normalize_v_call(v_call: &str) -> String {
    let trimmed = v_call.trim();
    if trimmed == NOT_HUMAN_LABEL {
        return trimmed.to_string();
    }
    let prefix: String = trimmed.chars().take(4).collect();
    let digits: String = trimmed
        .chars()
        .skip(4)
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if prefix.chars().count() < 4 || digits.is_empty() {
        return trimmed.to_string();
    }
    format!("{}{}", prefix, digits)
}

/// Reads the human rows of an annotated dataset.
///
/// Rows labelled `NOT_HUMAN` are dropped. When `chain_type` is given, only rows of that
/// V-gene family are kept. Rows violating the schema's required positions and exact
/// duplicates are skipped; the original row order is preserved.
pub fn read_human_samples(
    path: &Path,
    schema: &Schema,
    chain_type: Option<&ChainType>,
) -> Result<HumanSamples, ReferenceLoadError> {
    let path_str = path.to_string_lossy().to_string();
    let csv_err = |e: csv::Error| ReferenceLoadError::Csv {
        path: path_str.clone(),
        source: e,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let column_of = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ReferenceLoadError::MissingColumn {
                path: path_str.clone(),
                column: name.to_string(),
            })
    };

    let label_column = column_of(LABEL_COLUMN)?;
    let position_columns = schema
        .segmented_positions()
        .iter()
        .map(|name| column_of(name))
        .collect::<Result<Vec<_>, _>>()?;

    let wanted_label = chain_type.map(ChainType::label);
    let mut seen = HashSet::new();
    let mut samples = HumanSamples::default();
    let mut total_rows = 0usize;

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        total_rows += 1;

        let label = normalize_v_call(record.get(label_column).unwrap_or_default());
        let keep = match &wanted_label {
            Some(wanted) => &label == wanted,
            None => label != NOT_HUMAN_LABEL,
        };
        if !keep {
            continue;
        }

        let mut residues = Vec::with_capacity(position_columns.len());
        for (position, &column) in schema.segmented_positions().iter().zip(&position_columns) {
            let cell = record.get(column).unwrap_or_default().trim();
            let mut chars = cell.chars();
            let residue = match (chars.next(), chars.next()) {
                (None, _) => WILDCARD,
                (Some(aa), None) => aa.to_ascii_uppercase(),
                _ => {
                    return Err(ReferenceLoadError::InvalidCell {
                        path: path_str.clone(),
                        row: row_idx + 1,
                        position: position.clone(),
                        value: cell.to_string(),
                    });
                }
            };
            residues.push(residue);
        }

        let sequence = PositionalSequence::new(residues);
        if !schema.satisfies_required_positions(&sequence) {
            continue;
        }
        if !seen.insert((sequence.clone(), label.clone())) {
            continue;
        }
        samples.sequences.push(sequence);
        samples.labels.push(label);
    }

    debug!(total_rows, kept = samples.len(), "Filtered reference dataset.");
    info!(
        "Loaded {} human samples from '{}'",
        samples.len(),
        path_str
    );
    Ok(samples)
}
