use super::config::HumanizationConfig;
use super::progress::ProgressReporter;
use super::v_gene::VGeneScorer;
use crate::core::annotation::Annotator;
use crate::core::classifier::ModelWrapper;
use crate::core::models::schema::Schema;
use tracing::warn;

/// Everything a humanization run reads but never mutates.
#[derive(Clone, Copy)]
pub struct HumanizationContext<'a> {
    pub model: &'a ModelWrapper,
    pub v_gene_scorer: Option<&'a VGeneScorer>,
    pub annotator: &'a dyn Annotator,
    pub config: &'a HumanizationConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> HumanizationContext<'a> {
    pub fn new(
        model: &'a ModelWrapper,
        v_gene_scorer: Option<&'a VGeneScorer>,
        annotator: &'a dyn Annotator,
        config: &'a HumanizationConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            model,
            v_gene_scorer,
            annotator,
            config,
            reporter,
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.model.schema()
    }

    /// Per-position flags, `true` where the search must leave the residue alone.
    ///
    /// Names missing from the schema are reported and ignored.
    pub fn skip_mask(&self) -> Vec<bool> {
        let schema = self.schema();
        let mut mask = vec![false; schema.len()];
        for name in &self.config.skip_positions {
            match schema.position_index(name) {
                Some(idx) => mask[idx] = true,
                None => warn!(
                    position = name.as_str(),
                    schema = schema.name(),
                    "Skip position is not part of the schema; ignoring."
                ),
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::AlignedAnnotator;
    use crate::core::classifier::{Classifier, ModelError};
    use crate::core::models::chain::{ChainKind, ChainType};
    use crate::core::models::sequence::PositionalSequence;
    use crate::engine::config::HumanizationConfigBuilder;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct Constant;

    impl Classifier for Constant {
        fn predict_probability(&self, _: &PositionalSequence) -> Result<f64, ModelError> {
            Ok(0.5)
        }
    }

    #[test]
    fn skip_mask_marks_known_positions_and_ignores_unknown_ones() {
        let positions = vec!["fwr1_1".into(), "cdr1_1".into(), "fwr2_1".into()];
        let schema = Arc::new(Schema::new("test", positions, BTreeMap::new(), 2).unwrap());
        let model = ModelWrapper::new(
            Box::new(Constant),
            schema,
            0.5,
            ChainType::new(ChainKind::Kappa, 1),
        );
        let config = HumanizationConfigBuilder::new()
            .target_model_score(0.5)
            .max_changes(1)
            .skip_positions(vec!["cdr1_1".into(), "cdr9_9".into()])
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let context = HumanizationContext::new(&model, None, &AlignedAnnotator, &config, &reporter);

        assert_eq!(context.skip_mask(), vec![false, true, false]);
    }
}
