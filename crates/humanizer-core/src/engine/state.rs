use super::change::SequenceChange;
use crate::core::models::sequence::PositionalSequence;
use std::fmt;

/// One accepted step of the search. Iteration 0 is the seed baseline and carries no change.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationDetails {
    pub iteration: usize,
    pub model_score: f64,
    pub v_gene_score: Option<f64>,
    pub change: Option<SequenceChange>,
}

impl IterationDetails {
    pub fn seed(model_score: f64, v_gene_score: Option<f64>) -> Self {
        Self {
            iteration: 0,
            model_score,
            v_gene_score,
            change: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every eligible position already matches the original sequence.
    NoCandidate,
    /// The best candidate of the last round failed the acceptance gate and was reverted.
    TargetNotMet,
    /// `max_changes` rounds were accepted.
    IterationLimit,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::NoCandidate => "no candidate change left",
            Termination::TargetNotMet => "best candidate missed the targets",
            Termination::IterationLimit => "change budget exhausted",
        };
        f.write_str(text)
    }
}

/// Mutable search state threaded through the round loop.
///
/// Scores are carried forward from the last accepted round instead of being recomputed
/// at the start of the next one.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    pub current: PositionalSequence,
    pub model_score: f64,
    pub v_gene_score: Option<f64>,
    pub trail: Vec<IterationDetails>,
}

impl SearchState {
    pub fn new(
        seed: PositionalSequence,
        model_score: f64,
        v_gene_score: Option<f64>,
    ) -> Self {
        Self {
            current: seed,
            model_score,
            v_gene_score,
            trail: vec![IterationDetails::seed(model_score, v_gene_score)],
        }
    }

    pub fn accepted_changes(&self) -> usize {
        self.trail.len() - 1
    }

    pub fn accept(&mut self, change: SequenceChange, model_score: f64, v_gene_score: Option<f64>) {
        self.model_score = model_score;
        self.v_gene_score = v_gene_score;
        let iteration = self.trail.len();
        self.trail.push(IterationDetails {
            iteration,
            model_score,
            v_gene_score,
            change: Some(change),
        });
    }
}
