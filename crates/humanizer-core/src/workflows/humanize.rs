use crate::core::models::sequence::PositionalSequence;
use crate::engine::context::HumanizationContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::state::{IterationDetails, SearchState, Termination};
use crate::engine::tasks;
use crate::engine::v_gene::meets_v_gene_target;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct HumanizationResult {
    /// Final residues with wildcards removed.
    pub sequence: String,
    pub aligned: PositionalSequence,
    pub iterations: Vec<IterationDetails>,
    pub termination: Termination,
}

#[instrument(skip_all, name = "humanization_workflow")]
pub fn run(
    raw: &str,
    human_sample: Option<&str>,
    context: &HumanizationContext,
) -> Result<HumanizationResult, EngineError> {
    let reporter = context.reporter;
    let schema = context.schema();

    // === Phase 1: Chimeric seed ===
    reporter.report(Progress::PhaseStart { name: "Seeding" });

    let original = context.annotator.annotate(raw, schema)?;
    debug!("Annotated sequence: {}", original.to_aligned_string());

    let reference = match human_sample {
        Some(sample) => context.annotator.annotate(sample, schema)?,
        None => {
            debug!("Retrieving human sample from the V-gene scorer.");
            let scorer = context.v_gene_scorer.ok_or(EngineError::NoHumanSample)?;
            let matches = scorer.query(&original)?;
            let best = matches.first().ok_or(EngineError::NoHumanSample)?;
            info!(label = best.label, score = best.score, "Closest human sample found.");
            best.sample.clone()
        }
    };
    info!("Used human sample: {}", reference.to_aligned_string());

    let mut seed = original.clone();
    for idx in schema.framework_indices() {
        seed.set(idx, reference[idx]);
    }
    info!("Chimeric sequence: {}", seed.to_aligned_string());

    let model_score = context.model.score(&seed)?;
    let v_gene_score = tasks::v_gene_scoring::run(&seed, Some(&reference), context)?;
    let mut state = SearchState::new(seed, model_score, v_gene_score);

    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Greedy reversion rounds ===
    reporter.report(Progress::PhaseStart {
        name: "Reverse humanization",
    });

    let targets = &context.config.targets;
    let skip_mask = context.skip_mask();
    let mut termination = Termination::IterationLimit;

    for iteration in 1..=context.config.max_changes {
        info!(
            "Iteration {}. Current model score = {:.6}, V-gene score = {:?}",
            iteration, state.model_score, state.v_gene_score
        );
        reporter.report(Progress::StatusUpdate {
            text: format!("Round {}, score {:.4}", iteration, state.model_score),
        });

        let best = tasks::best_change::run(&state.current, &original, &skip_mask, context)?;
        let (Some(position), Some(new_aa)) = (best.position, best.new_aa) else {
            info!(
                "No effective changes found. Stopping at model score {:.6}",
                state.model_score
            );
            termination = Termination::NoCandidate;
            break;
        };

        let previous_aa = state.current.set(position, new_aa);
        let best_value = context.model.score(&state.current)?;
        let best_v_gene = tasks::v_gene_scoring::run(&state.current, Some(&reference), context)?;

        if !(best_value >= targets.model_score
            && meets_v_gene_target(targets.v_gene_score, best_v_gene))
        {
            state.current.set(position, previous_aa);
            info!(
                "Current metrics are best (model score {:.6}); best candidate reaches {:.6}",
                state.model_score, best_value
            );
            termination = Termination::TargetNotMet;
            break;
        }

        info!(
            "Best change position {}: {} -> {}",
            schema.position_name(position).unwrap_or("?"),
            previous_aa,
            new_aa
        );
        state.accept(best, best_value, best_v_gene);
    }

    reporter.report(Progress::PhaseFinish);
    info!(
        changes = state.accepted_changes(),
        "Humanization finished: {}.", termination
    );

    Ok(HumanizationResult {
        sequence: state.current.to_linear_string(),
        aligned: state.current,
        iterations: state.trail,
        termination,
    })
}

/// Humanizes every input independently; a failing record is logged and reported in place.
#[instrument(skip_all, name = "humanization_batch_workflow")]
pub fn run_batch(
    sequences: &[String],
    human_sample: Option<&str>,
    context: &HumanizationContext,
) -> Vec<Result<HumanizationResult, EngineError>> {
    sequences
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            context.reporter.report(Progress::Message(format!(
                "Processing sequence {}/{}",
                idx + 1,
                sequences.len()
            )));
            let result = run(raw, human_sample, context);
            if let Err(e) = &result {
                warn!(index = idx, error = %e, "Humanization failed; continuing with next sequence.");
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::AlignedAnnotator;
    use crate::core::classifier::{Classifier, ModelError, ModelWrapper};
    use crate::core::models::chain::{ChainKind, ChainType};
    use crate::core::models::schema::Schema;
    use crate::engine::config::{HumanizationConfig, HumanizationConfigBuilder};
    use crate::engine::progress::ProgressReporter;
    use crate::engine::v_gene::VGeneScorer;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// Weighted fraction of positions holding 'A'.
    struct WeightedA(Vec<f64>);

    impl Classifier for WeightedA {
        fn predict_probability(&self, sequence: &PositionalSequence) -> Result<f64, ModelError> {
            let total: f64 = self.0.iter().sum();
            let hit: f64 = sequence
                .residues()
                .iter()
                .zip(&self.0)
                .filter(|(c, _)| **c == 'A')
                .map(|(_, w)| w)
                .sum();
            Ok(hit / total)
        }
    }

    /// Positions 0 and 2 are framework, 1 and 3 are CDR.
    fn model(weights: Vec<f64>) -> ModelWrapper {
        let positions = vec![
            "fwr1_1".to_string(),
            "cdr1_1".to_string(),
            "fwr2_1".to_string(),
            "cdr2_1".to_string(),
        ];
        let schema = Schema::new("test", positions, BTreeMap::new(), 3).unwrap();
        ModelWrapper::new(
            Box::new(WeightedA(weights)),
            Arc::new(schema),
            0.5,
            ChainType::new(ChainKind::Heavy, 3),
        )
    }

    fn config(target: f64, v_gene: Option<f64>, max_changes: usize) -> HumanizationConfig {
        HumanizationConfigBuilder::new()
            .target_model_score(target)
            .target_v_gene_score(v_gene)
            .max_changes(max_changes)
            .build()
            .unwrap()
    }

    fn humanize(
        model: &ModelWrapper,
        scorer: Option<&VGeneScorer>,
        config: &HumanizationConfig,
        raw: &str,
        human_sample: Option<&str>,
    ) -> Result<HumanizationResult, EngineError> {
        let reporter = ProgressReporter::new();
        let context = HumanizationContext::new(model, scorer, &AlignedAnnotator, config, &reporter);
        run(raw, human_sample, &context)
    }

    fn changed_positions(result: &HumanizationResult) -> Vec<usize> {
        result
            .iterations
            .iter()
            .filter_map(|d| d.change.and_then(|c| c.position))
            .collect()
    }

    #[test]
    fn reverts_framework_positions_in_order_of_score_gain() {
        let model = model(vec![1.0, 1.0, 3.0, 1.0]);
        let config = config(0.3, None, 10);

        let result = humanize(&model, None, &config, "AAAA", Some("GGGG")).unwrap();

        assert_eq!(result.iterations[0], IterationDetails::seed(2.0 / 6.0, Some(0.5)));
        assert_eq!(changed_positions(&result), vec![2, 0]);
        assert_eq!(result.sequence, "AAAA");
        assert_eq!(result.termination, Termination::NoCandidate);
        assert_eq!(result.iterations.last().map(|d| d.model_score), Some(1.0));
    }

    #[test]
    fn zero_budget_returns_the_chimeric_seed() {
        let model = model(vec![1.0; 4]);
        let config = config(0.5, None, 0);

        let result = humanize(&model, None, &config, "AAAA", Some("GGGG")).unwrap();

        assert_eq!(result.sequence, "GAGA");
        assert_eq!(result.iterations.len(), 1);
        assert_eq!(result.iterations[0].iteration, 0);
        assert_eq!(result.termination, Termination::IterationLimit);
    }

    #[test]
    fn budget_limits_accepted_changes() {
        let model = model(vec![1.0; 4]);
        let config = config(0.5, None, 1);

        let result = humanize(&model, None, &config, "AAAA", Some("GGGG")).unwrap();

        assert_eq!(changed_positions(&result), vec![0]);
        assert_eq!(result.sequence, "AAGA");
        assert_eq!(result.termination, Termination::IterationLimit);
    }

    #[test]
    fn missing_human_sample_and_empty_population_fail() {
        let model = model(vec![1.0; 4]);
        let config = config(0.5, None, 5);

        let result = humanize(&model, None, &config, "AAAA", None);
        assert!(matches!(result, Err(EngineError::NoHumanSample)));

        let empty = VGeneScorer::new(model.shared_schema(), vec![], vec![]).unwrap();
        let result = humanize(&model, Some(&empty), &config, "AAAA", None);
        assert!(matches!(result, Err(EngineError::NoHumanSample)));
    }

    #[test]
    fn rejected_candidate_is_reverted() {
        let model = model(vec![1.0; 4]);
        let config = config(0.9, None, 5);

        let result = humanize(&model, None, &config, "AAAA", Some("GGGG")).unwrap();

        assert_eq!(result.termination, Termination::TargetNotMet);
        assert_eq!(result.sequence, "GAGA");
        assert_eq!(result.iterations.len(), 1);
    }

    #[test]
    fn v_gene_target_gates_acceptance() {
        let model = model(vec![1.0; 4]);
        // Seed "GAGA" keeps similarity 0.5 to "GGGG"; any reversion drops it to 0.25.
        let config = config(0.0, Some(0.5), 5);

        let result = humanize(&model, None, &config, "AAAA", Some("GGGG")).unwrap();

        assert_eq!(result.termination, Termination::TargetNotMet);
        assert_eq!(result.sequence, "GAGA");
    }

    #[test]
    fn accepted_rounds_satisfy_both_targets_and_never_cycle() {
        let model = model(vec![2.0, 1.0, 1.0, 1.0]);
        let config = config(0.4, Some(0.2), 10);
        let scorer = VGeneScorer::new(
            model.shared_schema(),
            vec![PositionalSequence::from("GGGG"), PositionalSequence::from("GAGG")],
            vec!["IGHV3".into(), "IGHV3".into()],
        )
        .unwrap();

        let result = humanize(&model, Some(&scorer), &config, "AAAA", None).unwrap();
        let original = PositionalSequence::from("AAAA");

        let mut replay = PositionalSequence::from("GAGA");
        let mut differing = replay.diff_positions(&original).len();
        for details in result.iterations.iter().skip(1) {
            assert!(details.model_score >= 0.4);
            assert!(meets_v_gene_target(Some(0.2), details.v_gene_score));

            let change = details.change.unwrap();
            replay.set(change.position.unwrap(), change.new_aa.unwrap());
            let now = replay.diff_positions(&original).len();
            assert_eq!(now + 1, differing);
            differing = now;
        }
        assert_eq!(replay, result.aligned);
    }

    #[test]
    fn skipped_positions_keep_the_human_residue() {
        let model = model(vec![1.0; 4]);
        let mut config = config(0.0, None, 10);
        config.skip_positions = vec!["fwr1_1".to_string()];

        let result = humanize(&model, None, &config, "AAAA", Some("GGGG")).unwrap();

        assert_eq!(result.sequence, "GAAA");
        assert_eq!(changed_positions(&result), vec![2]);
    }

    #[test]
    fn annotation_failure_is_an_error() {
        let model = model(vec![1.0; 4]);
        let config = config(0.5, None, 5);

        let result = humanize(&model, None, &config, "AAA", Some("GGGG"));
        assert!(matches!(result, Err(EngineError::Annotation { .. })));
    }

    #[test]
    fn batch_continues_past_failures() {
        let model = model(vec![1.0; 4]);
        let config = config(0.0, None, 10);
        let reporter = ProgressReporter::new();
        let context = HumanizationContext::new(&model, None, &AlignedAnnotator, &config, &reporter);

        let inputs = vec!["AAAA".to_string(), "AA".to_string(), "AAAC".to_string()];
        let results = run_batch(&inputs, Some("GGGG"), &context);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().sequence, "AAAA");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().sequence, "AAAC");
    }
}
