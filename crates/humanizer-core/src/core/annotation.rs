//! Alignment of raw amino-acid strings onto schema positions.
//!
//! Real numbering tools (ANARCI-style aligners) live outside this crate and plug in
//! through the [`Annotator`] trait. [`AlignedAnnotator`] covers the common case where
//! the input has already been numbered and only needs to be validated.

use crate::core::models::residue::is_valid_residue;
use crate::core::models::schema::Schema;
use crate::core::models::sequence::{PositionalSequence, WILDCARD};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("Sequence '{sequence}' cannot be annotated: {reason}")]
    NotAnnotatable { sequence: String, reason: String },
}

/// Aligns a raw residue string onto the positions of a schema.
///
/// Implementations must be deterministic and always yield exactly `schema.len()` positions.
pub trait Annotator: Send + Sync {
    fn annotate(&self, raw: &str, schema: &Schema) -> Result<PositionalSequence, AnnotationError>;
}

/// Accepts sequences that already carry one character per schema position.
///
/// Gap characters (`-`, `.`) are mapped to the wildcard token and residues are upper-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignedAnnotator;

impl Annotator for AlignedAnnotator {
    fn annotate(&self, raw: &str, schema: &Schema) -> Result<PositionalSequence, AnnotationError> {
        let not_annotatable = |reason: String| AnnotationError::NotAnnotatable {
            sequence: raw.to_string(),
            reason,
        };

        let residues: Vec<char> = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '-' | '.' => WILDCARD,
                other => other.to_ascii_uppercase(),
            })
            .collect();

        if residues.len() != schema.len() {
            return Err(not_annotatable(format!(
                "expected {} aligned positions for schema '{}', found {}",
                schema.len(),
                schema.name(),
                residues.len()
            )));
        }
        if let Some((idx, residue)) = residues
            .iter()
            .enumerate()
            .find(|(_, c)| !is_valid_residue(**c))
        {
            return Err(not_annotatable(format!(
                "invalid residue '{}' at position {}",
                residue, idx
            )));
        }

        Ok(PositionalSequence::new(residues))
    }
}
