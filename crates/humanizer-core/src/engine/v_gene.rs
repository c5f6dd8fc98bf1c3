use super::error::EngineError;
use crate::core::io::reference::HumanSamples;
use crate::core::models::schema::Schema;
use crate::core::models::sequence::{PositionalSequence, WILDCARD};
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of closest reference samples returned by a query.
pub const TOP_K: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct VGeneMatch<'a> {
    /// Index of the sample in the reference population.
    pub index: usize,
    pub sample: &'a PositionalSequence,
    pub score: f64,
    pub label: &'a str,
}

/// Fraction of identical residues over the V-gene region `0..=v_gene_end`.
///
/// Positions where both sequences hold the wildcard are not informative and are left out
/// of the denominator. Both sequences must share one alignment length.
pub fn v_gene_similarity(
    query: &PositionalSequence,
    reference: &PositionalSequence,
    v_gene_end: usize,
) -> Result<f64, EngineError> {
    if query.len() != reference.len() {
        return Err(EngineError::LengthMismatch {
            expected: reference.len(),
            actual: query.len(),
        });
    }
    let end = v_gene_end.min(query.len().saturating_sub(1));
    let (mut same, mut total) = (0usize, 0usize);
    if !query.is_empty() {
        for i in 0..=end {
            let (a, b) = (query[i], reference[i]);
            if a != WILDCARD || b != WILDCARD {
                total += 1;
                if a == b {
                    same += 1;
                }
            }
        }
    }
    if total == 0 {
        return Err(EngineError::NoInformativePositions { v_gene_end });
    }
    Ok(same as f64 / total as f64)
}

/// `true` when either score is unknown, otherwise `a < b`.
pub fn is_v_gene_score_less(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a < b,
        _ => true,
    }
}

/// Acceptance check for the V-gene objective: an unset target or unknown score passes.
///
/// A score equal to the target is accepted. This is looser than a strict
/// `is_v_gene_score_less(target, score)` test, which would reject a state sitting exactly
/// on the target.
pub fn meets_v_gene_target(target: Option<f64>, score: Option<f64>) -> bool {
    is_v_gene_score_less(target, score) || target == score
}

/// Nearest-neighbour search over a fixed population of human reference sequences.
#[derive(Debug, Clone)]
pub struct VGeneScorer {
    schema: Arc<Schema>,
    samples: Vec<PositionalSequence>,
    labels: Vec<String>,
}

impl VGeneScorer {
    pub fn new(
        schema: Arc<Schema>,
        samples: Vec<PositionalSequence>,
        labels: Vec<String>,
    ) -> Result<Self, EngineError> {
        if samples.len() != labels.len() {
            return Err(EngineError::ReferenceMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        if let Some(sample) = samples.iter().find(|s| s.len() != schema.len()) {
            return Err(EngineError::LengthMismatch {
                expected: schema.len(),
                actual: sample.len(),
            });
        }
        info!("Created V-gene scorer with {} samples", samples.len());
        Ok(Self {
            schema,
            samples,
            labels,
        })
    }

    pub fn from_samples(schema: Arc<Schema>, samples: HumanSamples) -> Result<Self, EngineError> {
        Self::new(schema, samples.sequences, samples.labels)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns up to [`TOP_K`] reference samples, most similar first.
    ///
    /// Equal scores keep their population order.
    pub fn query(&self, sequence: &PositionalSequence) -> Result<Vec<VGeneMatch<'_>>, EngineError> {
        if sequence.len() != self.schema.len() {
            return Err(EngineError::LengthMismatch {
                expected: self.schema.len(),
                actual: sequence.len(),
            });
        }
        let v_gene_end = self.schema.v_gene_end();

        #[cfg(not(feature = "parallel"))]
        let iterator = self.samples.iter();

        #[cfg(feature = "parallel")]
        let iterator = self.samples.par_iter();

        let scores = iterator
            .map(|sample| v_gene_similarity(sequence, sample, v_gene_end))
            .collect::<Result<Vec<f64>, EngineError>>()?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let matches: Vec<_> = order
            .into_iter()
            .take(TOP_K)
            .enumerate()
            .map(|(rank, index)| {
                debug!(rank = rank + 1, index, score = scores[index], "V-gene candidate.");
                VGeneMatch {
                    index,
                    sample: &self.samples[index],
                    score: scores[index],
                    label: &self.labels[index],
                }
            })
            .collect();
        Ok(matches)
    }

    /// Similarity of the closest reference sample, or `None` for an empty population.
    pub fn best_score(&self, sequence: &PositionalSequence) -> Result<Option<f64>, EngineError> {
        Ok(self.query(sequence)?.first().map(|m| m.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn schema(len: usize, v_gene_end: usize) -> Arc<Schema> {
        let positions = (0..len).map(|i| format!("fwr1_{}", i + 1)).collect();
        Arc::new(Schema::new("test", positions, BTreeMap::new(), v_gene_end).unwrap())
    }

    fn seq(s: &str) -> PositionalSequence {
        PositionalSequence::from(s)
    }

    #[test]
    fn similarity_counts_matches_over_informative_positions() {
        assert_eq!(v_gene_similarity(&seq("ABCD"), &seq("ABCE"), 3).unwrap(), 0.75);
        // Position 3 lies outside the V-gene region.
        assert_eq!(v_gene_similarity(&seq("ABCD"), &seq("ABCE"), 2).unwrap(), 1.0);
    }

    #[test]
    fn similarity_skips_positions_where_both_are_wildcards() {
        let score = v_gene_similarity(&seq("AXXD"), &seq("AXCD"), 3).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(v_gene_similarity(&seq("AXXD"), &seq("AXXD"), 3).unwrap(), 1.0);
    }

    #[test]
    fn similarity_without_informative_positions_is_an_error() {
        let result = v_gene_similarity(&seq("XXA"), &seq("XXB"), 1);
        assert!(matches!(
            result,
            Err(EngineError::NoInformativePositions { v_gene_end: 1 })
        ));
    }

    #[test]
    fn v_gene_score_less_treats_missing_scores_as_less() {
        assert!(is_v_gene_score_less(None, Some(0.5)));
        assert!(is_v_gene_score_less(Some(0.5), None));
        assert!(is_v_gene_score_less(Some(0.4), Some(0.5)));
        assert!(!is_v_gene_score_less(Some(0.5), Some(0.5)));
        assert!(!is_v_gene_score_less(Some(0.6), Some(0.5)));
    }

    #[test]
    fn meets_target_accepts_equality_and_unset_target() {
        assert!(meets_v_gene_target(Some(0.5), Some(0.5)));
        assert!(meets_v_gene_target(None, Some(0.1)));
        assert!(!meets_v_gene_target(Some(0.6), Some(0.5)));
    }

    #[test]
    fn new_rejects_mismatched_labels() {
        let result = VGeneScorer::new(schema(2, 1), vec![seq("AB")], vec![]);
        assert!(matches!(
            result,
            Err(EngineError::ReferenceMismatch {
                samples: 1,
                labels: 0
            })
        ));
    }

    #[test]
    fn similarity_rejects_sequences_of_different_lengths() {
        let result = v_gene_similarity(&seq("AAAA"), &seq("A"), 3);
        assert!(matches!(
            result,
            Err(EngineError::LengthMismatch {
                expected: 1,
                actual: 4
            })
        ));
    }

    #[test]
    fn new_rejects_samples_shorter_than_the_schema() {
        let result = VGeneScorer::new(schema(4, 3), vec![seq("A")], vec!["IGHV3".into()]);
        assert!(matches!(
            result,
            Err(EngineError::LengthMismatch {
                expected: 4,
                actual: 1
            })
        ));
    }

    #[test]
    fn query_rejects_sequences_off_the_schema_length() {
        let scorer =
            VGeneScorer::new(schema(4, 3), vec![seq("AAAA")], vec!["IGHV3".into()]).unwrap();
        assert!(matches!(
            scorer.query(&seq("AA")),
            Err(EngineError::LengthMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn query_returns_top_two_with_stable_tie_order() {
        // Scores against "AAAAAAAAAA": 0.9, 0.5, 0.9, 0.1.
        let samples = vec![
            seq("AAAAAAAAAB"),
            seq("AAAAABBBBB"),
            seq("BAAAAAAAAA"),
            seq("ABBBBBBBBB"),
        ];
        let labels = vec!["IGHV1", "IGHV2", "IGHV3", "IGHV4"]
            .into_iter()
            .map(String::from)
            .collect();
        let scorer = VGeneScorer::new(schema(10, 9), samples, labels).unwrap();

        let matches = scorer.query(&seq("AAAAAAAAAA")).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].index, matches[0].label), (0, "IGHV1"));
        assert_eq!((matches[1].index, matches[1].label), (2, "IGHV3"));
        assert!((matches[0].score - 0.9).abs() < 1e-12);
        assert!((matches[1].score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn query_is_idempotent() {
        let samples = vec![seq("ABCD"), seq("ABCE"), seq("DCBA")];
        let labels = vec!["a".into(), "b".into(), "c".into()];
        let scorer = VGeneScorer::new(schema(4, 3), samples, labels).unwrap();
        let query = seq("ABCE");
        assert_eq!(scorer.query(&query).unwrap(), scorer.query(&query).unwrap());
    }

    #[test]
    fn query_on_empty_population_returns_nothing() {
        let scorer = VGeneScorer::new(schema(2, 1), vec![], vec![]).unwrap();
        assert!(scorer.query(&seq("AB")).unwrap().is_empty());
        assert_eq!(scorer.best_score(&seq("AB")).unwrap(), None);
    }
}
