//! # Core Models Module
//!
//! Data structures describing aligned antibody sequences and the positional
//! schema they are aligned to.
//!
//! ## Key Components
//!
//! - [`schema`] - Named alignment positions, framework/CDR classification and the V-gene boundary
//! - [`sequence`] - [`sequence::PositionalSequence`], one residue per schema position
//! - [`chain`] - Antibody chain kinds and V-gene family tags used to label reference data
//! - [`residue`] - Amino-acid alphabet and BLOSUM62 substitution scores
//!
//! ## Usage
//!
//! ```ignore
//! use humanizer::core::models::{schema::Schema, sequence::PositionalSequence};
//!
//! let schema = Schema::load(Path::new("chothia_heavy.toml"))?;
//! let sequence = PositionalSequence::from("QVQLVQSGAEVKKPGAS");
//! assert!(schema.is_framework(0));
//! ```

pub mod chain;
pub mod residue;
pub mod schema;
pub mod sequence;
