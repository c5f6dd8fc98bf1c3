//! # Engine Module
//!
//! The search machinery behind reverse humanization.
//!
//! ## Overview
//!
//! Starting from a chimeric seed (human framework, original CDRs), the engine repeatedly
//! evaluates single-position reversions back toward the original sequence and accepts the
//! best one as long as both the classifier and the V-gene similarity targets still hold.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Targets, change budget, skipped positions and the tie-break strategy
//! - **Changes** ([`change`]) - Candidate substitutions and their total ordering
//! - **State Tracking** ([`state`]) - The iteration trail and termination reasons
//! - **V-Gene Scoring** ([`v_gene`]) - Nearest-human-sample search over a reference population
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod change;
pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod state;
pub(crate) mod tasks;
pub mod v_gene;
