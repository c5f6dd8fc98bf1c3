use crate::core::models::residue::substitution_score;
use std::cmp::Ordering;

/// Model score carried by the null change; lower than any probability.
pub const NULL_CHANGE_SCORE: f64 = -1.0;

/// A candidate single-position substitution and the model score it would produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceChange {
    pub position: Option<usize>,
    pub old_aa: Option<char>,
    pub new_aa: Option<char>,
    pub value: f64,
}

impl SequenceChange {
    pub fn new(position: usize, old_aa: char, new_aa: char, value: f64) -> Self {
        Self {
            position: Some(position),
            old_aa: Some(old_aa),
            new_aa: Some(new_aa),
            value,
        }
    }

    /// "No improving change found".
    pub fn null() -> Self {
        Self {
            position: None,
            old_aa: None,
            new_aa: None,
            value: NULL_CHANGE_SCORE,
        }
    }

    /// The null change produced for a position already matching its target residue.
    pub fn unchanged(current_aa: char) -> Self {
        Self {
            old_aa: Some(current_aa),
            ..Self::null()
        }
    }

    pub fn is_defined(&self) -> bool {
        self.position.is_some()
    }

    fn similarity(&self) -> i32 {
        match (self.old_aa, self.new_aa) {
            (Some(old), Some(new)) => substitution_score(old, new),
            _ => i32::MIN,
        }
    }
}

/// Strategy used to rank candidate changes within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeOrdering {
    /// Highest model score wins.
    #[default]
    ScoreOnly,
    /// Highest model score wins; equal scores prefer the more conservative substitution (BLOSUM62).
    ScoreThenSimilarity,
}

impl ChangeOrdering {
    /// Total order over changes; `Greater` means `a` is the better candidate.
    ///
    /// Null changes rank below every defined change. Remaining ties go to the lower
    /// position index, which keeps the selection independent of evaluation order.
    pub fn compare(&self, a: &SequenceChange, b: &SequenceChange) -> Ordering {
        match (a.position, b.position) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(pos_a), Some(pos_b)) => {
                let by_score = a.value.total_cmp(&b.value);
                let by_similarity = match self {
                    ChangeOrdering::ScoreOnly => Ordering::Equal,
                    ChangeOrdering::ScoreThenSimilarity => a.similarity().cmp(&b.similarity()),
                };
                by_score
                    .then(by_similarity)
                    .then_with(|| pos_b.cmp(&pos_a))
            }
        }
    }

    pub fn is_change_less(&self, a: &SequenceChange, b: &SequenceChange) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}
