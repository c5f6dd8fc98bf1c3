use super::sequence::PositionalSequence;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Position-name prefix identifying framework (non-CDR) regions.
pub const FRAMEWORK_TAG: &str = "fwr";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SchemaFile {
    name: String,
    v_gene_end: usize,
    positions: Vec<String>,
    #[serde(default)]
    required_positions: BTreeMap<String, String>,
}

/// Ordered set of named alignment positions shared by the annotator, the model
/// and the V-gene scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    segmented_positions: Vec<String>,
    required_positions: BTreeMap<String, char>,
    v_gene_end: usize,
    index_by_name: HashMap<String, usize>,
}

impl Schema {
    pub fn new(
        name: impl Into<String>,
        segmented_positions: Vec<String>,
        required_positions: BTreeMap<String, char>,
        v_gene_end: usize,
    ) -> Result<Self, SchemaError> {
        if v_gene_end >= segmented_positions.len() {
            return Err(SchemaError::VGeneEndOutOfRange {
                v_gene_end,
                len: segmented_positions.len(),
            });
        }

        let mut index_by_name = HashMap::with_capacity(segmented_positions.len());
        for (idx, position) in segmented_positions.iter().enumerate() {
            if index_by_name.insert(position.clone(), idx).is_some() {
                return Err(SchemaError::DuplicatePosition(position.clone()));
            }
        }
        if let Some(unknown) = required_positions
            .keys()
            .find(|name| !index_by_name.contains_key(*name))
        {
            return Err(SchemaError::UnknownRequiredPosition(unknown.clone()));
        }

        Ok(Self {
            name: name.into(),
            segmented_positions,
            required_positions,
            v_gene_end,
            index_by_name,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: SchemaFile = toml::from_str(&content).map_err(|e| SchemaError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut required_positions = BTreeMap::new();
        for (position, residue) in file.required_positions {
            let mut chars = residue.chars();
            match (chars.next(), chars.next()) {
                (Some(aa), None) => {
                    required_positions.insert(position, aa.to_ascii_uppercase());
                }
                _ => {
                    return Err(SchemaError::InvalidRequiredResidue { position, residue });
                }
            }
        }

        Self::new(file.name, file.positions, required_positions, file.v_gene_end)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.segmented_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segmented_positions.is_empty()
    }

    pub fn segmented_positions(&self) -> &[String] {
        &self.segmented_positions
    }

    pub fn required_positions(&self) -> &BTreeMap<String, char> {
        &self.required_positions
    }

    /// Last position (inclusive) taken into account by V-gene similarity.
    pub fn v_gene_end(&self) -> usize {
        self.v_gene_end
    }

    pub fn position_index(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn position_name(&self, index: usize) -> Option<&str> {
        self.segmented_positions.get(index).map(String::as_str)
    }

    pub fn is_framework(&self, index: usize) -> bool {
        self.segmented_positions
            .get(index)
            .is_some_and(|name| name.starts_with(FRAMEWORK_TAG))
    }

    pub fn framework_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&idx| self.is_framework(idx))
    }

    /// Whether `sequence` carries the fixed residue at every required position.
    pub fn satisfies_required_positions(&self, sequence: &PositionalSequence) -> bool {
        self.required_positions.iter().all(|(name, aa)| {
            self.position_index(name)
                .and_then(|idx| sequence.get(idx))
                .is_some_and(|residue| residue == *aa)
        })
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
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
    #[error("v-gene-end {v_gene_end} is outside a schema of {len} positions")]
    VGeneEndOutOfRange { v_gene_end: usize, len: usize },
    #[error("Duplicate position name: '{0}'")]
    DuplicatePosition(String),
    #[error("Required position '{0}' is not part of the schema")]
    UnknownRequiredPosition(String),
    #[error("Required residue for position '{position}' must be a single amino acid, got '{residue}'")]
    InvalidRequiredResidue { position: String, residue: String },
}
