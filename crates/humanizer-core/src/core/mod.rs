//! # Core Module
//!
//! The stateless building blocks of the humanizer: sequence and schema models,
//! the annotation and classification contracts, and file I/O.
//!
//! ## Architecture
//!
//! - **Models** ([`models`]) - Positional schemas, aligned sequences, chain types and residue similarity
//! - **Annotation** ([`annotation`]) - The [`annotation::Annotator`] contract and a pre-aligned implementation
//! - **Classification** ([`classifier`]) - The [`classifier::Classifier`] contract, the model wrapper and a position-weight model
//! - **File I/O** ([`io`]) - FASTA records and the reference-population loader
//!
//! Nothing in this layer holds search state; the [`crate::engine`] layer drives the
//! optimization on top of these types.

pub mod annotation;
pub mod classifier;
pub mod io;
pub mod models;
