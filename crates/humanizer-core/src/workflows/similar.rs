use crate::core::annotation::Annotator;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::v_gene::VGeneScorer;
use tracing::{instrument, warn};

/// A reference human sample close to a query sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarSample {
    pub sequence: String,
    pub score: f64,
    pub label: String,
}

/// Closest human reference samples for one raw sequence, best first.
pub fn run(
    raw: &str,
    annotator: &dyn Annotator,
    scorer: &VGeneScorer,
) -> Result<Vec<SimilarSample>, EngineError> {
    let aligned = annotator.annotate(raw, scorer.schema())?;
    Ok(scorer
        .query(&aligned)?
        .into_iter()
        .map(|m| SimilarSample {
            sequence: m.sample.to_linear_string(),
            score: m.score,
            label: m.label.to_string(),
        })
        .collect())
}

#[instrument(skip_all, name = "similar_samples_workflow")]
pub fn run_batch(
    sequences: &[String],
    annotator: &dyn Annotator,
    scorer: &VGeneScorer,
    reporter: &ProgressReporter,
) -> Vec<Result<Vec<SimilarSample>, EngineError>> {
    reporter.report(Progress::TaskStart {
        total_steps: sequences.len() as u64,
    });
    let results = sequences
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let result = run(raw, annotator, scorer);
            if let Err(e) = &result {
                warn!(index = idx, error = %e, "Similar-sample lookup failed.");
            }
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();
    reporter.report(Progress::TaskFinish);
    results
}
