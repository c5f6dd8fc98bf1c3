use crate::core::models::sequence::PositionalSequence;
use crate::engine::context::HumanizationContext;
use crate::engine::error::EngineError;
use crate::engine::v_gene::v_gene_similarity;
use tracing::instrument;

/// V-gene score of a state: the closest reference sample when a scorer is present,
/// otherwise the similarity to the explicit human sample.
#[instrument(skip_all, name = "v_gene_scoring_task")]
pub fn run(
    sequence: &PositionalSequence,
    human_sample: Option<&PositionalSequence>,
    context: &HumanizationContext,
) -> Result<Option<f64>, EngineError> {
    if let Some(scorer) = context.v_gene_scorer {
        if let Some(score) = scorer.best_score(sequence)? {
            return Ok(Some(score));
        }
    }
    human_sample
        .map(|sample| v_gene_similarity(sequence, sample, context.schema().v_gene_end()))
        .transpose()
}
