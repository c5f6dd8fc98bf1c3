//! Provides input/output functionality for sequence data.
//!
//! This module contains readers and writers for the file formats the humanizer
//! consumes: FASTA files of raw antibody sequences and annotated CSV datasets
//! from which the human reference population is drawn.

pub mod fasta;
pub mod reference;
