//! Computational units of a humanization round.
//!
//! - [`best_change`] scores every eligible single-position reversion and selects the best one.
//! - [`v_gene_scoring`] measures how close a state stays to the human germline.

pub mod best_change;
pub mod v_gene_scoring;
