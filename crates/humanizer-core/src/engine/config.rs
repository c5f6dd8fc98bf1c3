use super::change::ChangeOrdering;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    /// Minimum classifier probability an accepted round must reach.
    pub model_score: f64,
    /// Minimum V-gene similarity an accepted round must keep; `None` disables the check.
    pub v_gene_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HumanizationConfig {
    pub targets: TargetConfig,
    pub max_changes: usize,
    pub skip_positions: Vec<String>,
    pub change_ordering: ChangeOrdering,
}

#[derive(Default)]
pub struct HumanizationConfigBuilder {
    target_model_score: Option<f64>,
    target_v_gene_score: Option<f64>,
    max_changes: Option<usize>,
    skip_positions: Option<Vec<String>>,
    change_ordering: Option<ChangeOrdering>,
}

impl HumanizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_model_score(mut self, score: f64) -> Self {
        self.target_model_score = Some(score);
        self
    }
    pub fn target_v_gene_score(mut self, score: Option<f64>) -> Self {
        self.target_v_gene_score = score;
        self
    }
    pub fn max_changes(mut self, changes: usize) -> Self {
        self.max_changes = Some(changes);
        self
    }
    pub fn skip_positions(mut self, positions: Vec<String>) -> Self {
        self.skip_positions = Some(positions);
        self
    }
    pub fn change_ordering(mut self, ordering: ChangeOrdering) -> Self {
        self.change_ordering = Some(ordering);
        self
    }
    pub fn use_aa_similarity(self, enabled: bool) -> Self {
        self.change_ordering(if enabled {
            ChangeOrdering::ScoreThenSimilarity
        } else {
            ChangeOrdering::ScoreOnly
        })
    }

    pub fn build(self) -> Result<HumanizationConfig, ConfigError> {
        let model_score = self
            .target_model_score
            .ok_or(ConfigError::MissingParameter("target_model_score"))?;
        validate_probability("target_model_score", model_score)?;
        if let Some(v_gene_score) = self.target_v_gene_score {
            validate_probability("target_v_gene_score", v_gene_score)?;
        }

        Ok(HumanizationConfig {
            targets: TargetConfig {
                model_score,
                v_gene_score: self.target_v_gene_score,
            },
            max_changes: self
                .max_changes
                .ok_or(ConfigError::MissingParameter("max_changes"))?,
            skip_positions: self.skip_positions.unwrap_or_default(),
            change_ordering: self.change_ordering.unwrap_or_default(),
        })
    }
}

fn validate_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("{} is outside [0, 1]", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_succeeds_with_required_parameters_and_defaults() {
        let config = HumanizationConfigBuilder::new()
            .target_model_score(0.9)
            .max_changes(10)
            .build()
            .unwrap();

        assert_eq!(config.targets.model_score, 0.9);
        assert_eq!(config.targets.v_gene_score, None);
        assert_eq!(config.max_changes, 10);
        assert!(config.skip_positions.is_empty());
        assert_eq!(config.change_ordering, ChangeOrdering::ScoreOnly);
    }

    #[test]
    fn build_fails_when_target_model_score_is_missing() {
        let result = HumanizationConfigBuilder::new().max_changes(5).build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("target_model_score"))
        );
    }

    #[test]
    fn build_fails_when_max_changes_is_missing() {
        let result = HumanizationConfigBuilder::new()
            .target_model_score(0.5)
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("max_changes")));
    }

    #[test]
    fn build_rejects_out_of_range_targets() {
        let result = HumanizationConfigBuilder::new()
            .target_model_score(1.2)
            .max_changes(5)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "target_model_score",
                ..
            })
        ));

        let result = HumanizationConfigBuilder::new()
            .target_model_score(0.5)
            .target_v_gene_score(Some(-0.1))
            .max_changes(5)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "target_v_gene_score",
                ..
            })
        ));
    }

    #[test]
    fn use_aa_similarity_selects_similarity_ordering() {
        let config = HumanizationConfigBuilder::new()
            .target_model_score(0.5)
            .max_changes(1)
            .use_aa_similarity(true)
            .skip_positions(vec!["cdr3_1".to_string()])
            .build()
            .unwrap();
        assert_eq!(config.change_ordering, ChangeOrdering::ScoreThenSimilarity);
        assert_eq!(config.skip_positions, vec!["cdr3_1".to_string()]);
    }
}
