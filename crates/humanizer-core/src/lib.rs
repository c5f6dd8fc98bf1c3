//! # Humanizer Core Library
//!
//! Reverse humanization of antibody variable-domain sequences: a non-human sequence is
//! grafted onto a human framework and then walked back toward its original residues, one
//! position at a time, while a humanness classifier and germline similarity stay on target.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Positional sequences, schemas, chain types, the BLOSUM62
//!   table, the [`Classifier`](core::classifier::Classifier) and
//!   [`Annotator`](core::annotation::Annotator) seams, and file loaders.
//!
//! - **[`engine`]: The Logic Core.** Search configuration, candidate ordering, the V-gene
//!   scorer and the per-round tasks.
//!
//! - **[`workflows`]: The Public API.** Complete procedures such as humanizing a batch of
//!   sequences or reporting their closest human samples.

pub mod core;
pub mod engine;
pub mod workflows;
