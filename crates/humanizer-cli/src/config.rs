mod defaults;

use crate::cli::{HumanizeArgs, ResourceArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use humanizer::core::models::chain::ChainType;
use humanizer::engine::config::{HumanizationConfig, HumanizationConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialModelConfig {
    path: Option<PathBuf>,
    schema: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSearchConfig {
    #[serde(rename = "target-model-score")]
    target_model_score: Option<f64>,
    #[serde(rename = "target-v-gene-score")]
    target_v_gene_score: Option<f64>,
    #[serde(rename = "max-changes")]
    max_changes: Option<usize>,
    #[serde(rename = "skip-positions")]
    skip_positions: Option<Vec<String>>,
    #[serde(rename = "use-aa-similarity")]
    use_aa_similarity: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialReferenceConfig {
    dataset: Option<PathBuf>,
    #[serde(rename = "chain-type")]
    chain_type: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    model: Option<PartialModelConfig>,
    search: Option<PartialSearchConfig>,
    reference: Option<PartialReferenceConfig>,
}

/// Files a run reads its collaborators from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePaths {
    pub schema: PathBuf,
    pub dataset: Option<PathBuf>,
    pub chain_type: Option<ChainType>,
}

/// Fully merged settings of the `humanize` subcommand.
///
/// The target model score stays optional until the model is loaded: an unset target
/// falls back to the model's own decision threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct HumanizeSettings {
    pub resources: ResourcePaths,
    pub model_path: PathBuf,
    pub target_model_score: Option<f64>,
    pub target_v_gene_score: Option<f64>,
    pub max_changes: usize,
    pub skip_positions: Vec<String>,
    pub use_aa_similarity: bool,
}

impl HumanizeSettings {
    pub fn humanization_config(&self, model_threshold: f64) -> Result<HumanizationConfig> {
        HumanizationConfigBuilder::new()
            .target_model_score(self.target_model_score.unwrap_or(model_threshold))
            .target_v_gene_score(self.target_v_gene_score)
            .max_changes(self.max_changes)
            .skip_positions(self.skip_positions.clone())
            .use_aa_similarity(self.use_aa_similarity)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_humanize(mut self, args: &HumanizeArgs) -> Result<HumanizeSettings> {
        self.apply_set_values(&args.resources.set_values)?;
        let defaults = DefaultsConfig::default();

        let model_path = args
            .model
            .clone()
            .or_else(|| self.model.as_mut().and_then(|m| m.path.take()))
            .ok_or_else(|| {
                CliError::Config(
                    "A model path is required either in the config file (`model.path`) or via --model."
                        .to_string(),
                )
            })?;
        let resources = self.merge_resources(&args.resources)?;
        let search = self.search.take().unwrap_or_default();

        let skip_positions = if args.skip_positions.is_empty() {
            search.skip_positions.unwrap_or_default()
        } else {
            args.skip_positions.clone()
        };

        Ok(HumanizeSettings {
            resources,
            model_path,
            target_model_score: args.target_model_score.or(search.target_model_score),
            target_v_gene_score: args.target_v_gene_score.or(search.target_v_gene_score),
            max_changes: args
                .max_changes
                .or(search.max_changes)
                .unwrap_or(defaults.max_changes),
            skip_positions,
            use_aa_similarity: args.use_aa_similarity
                || search
                    .use_aa_similarity
                    .unwrap_or(defaults.use_aa_similarity),
        })
    }

    pub fn merge_similar(mut self, args: &ResourceArgs) -> Result<ResourcePaths> {
        self.apply_set_values(&args.set_values)?;
        let resources = self.merge_resources(args)?;
        if resources.dataset.is_none() {
            return Err(CliError::Config(
                "A reference dataset is required either in the config file (`reference.dataset`) or via --dataset."
                    .to_string(),
            ));
        }
        Ok(resources)
    }

    fn merge_resources(&mut self, args: &ResourceArgs) -> Result<ResourcePaths> {
        let model = self.model.take().unwrap_or_default();
        let reference = self.reference.take().unwrap_or_default();

        let schema = args.schema.clone().or(model.schema).ok_or_else(|| {
            CliError::Config(
                "A schema path is required either in the config file (`model.schema`) or via --schema."
                    .to_string(),
            )
        })?;
        let chain_type = args
            .chain_type
            .clone()
            .or(reference.chain_type)
            .map(|raw| {
                raw.parse::<ChainType>()
                    .map_err(|e| CliError::Argument(e.to_string()))
            })
            .transpose()?;

        Ok(ResourcePaths {
            schema,
            dataset: args.dataset.clone().or(reference.dataset),
            chain_type,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let invalid =
                |kind: &str| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str));

            match key {
                "model.path" => {
                    self.model.get_or_insert_with(Default::default).path =
                        Some(PathBuf::from(value_str));
                }
                "model.schema" => {
                    self.model.get_or_insert_with(Default::default).schema =
                        Some(PathBuf::from(value_str));
                }
                "search.target-model-score" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .target_model_score = Some(value_str.parse().map_err(|_| invalid("float"))?);
                }
                "search.target-v-gene-score" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .target_v_gene_score = Some(value_str.parse().map_err(|_| invalid("float"))?);
                }
                "search.max-changes" => {
                    self.search.get_or_insert_with(Default::default).max_changes =
                        Some(value_str.parse().map_err(|_| invalid("integer"))?);
                }
                "search.skip-positions" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .skip_positions = Some(
                        value_str
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect(),
                    );
                }
                "search.use-aa-similarity" => {
                    self.search
                        .get_or_insert_with(Default::default)
                        .use_aa_similarity = Some(value_str.parse().map_err(|_| invalid("boolean"))?);
                }
                "reference.dataset" => {
                    self.reference.get_or_insert_with(Default::default).dataset =
                        Some(PathBuf::from(value_str));
                }
                "reference.chain-type" => {
                    self.reference
                        .get_or_insert_with(Default::default)
                        .chain_type = Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use humanizer::core::models::chain::ChainKind;
    use humanizer::engine::change::ChangeOrdering;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const CONFIG: &str = r#"
        [model]
        path = "models/heavy.toml"
        schema = "schemas/chothia.toml"

        [search]
        target-model-score = 0.8
        max-changes = 7
        skip-positions = ["cdr3_1"]

        [reference]
        dataset = "data/human.csv"
        chain-type = "HV3"
    "#;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn humanize_args(config_path: &Path, extra: &[&str]) -> HumanizeArgs {
        let mut argv = vec![
            "humanize",
            "humanize",
            "-i",
            "in.fasta",
            "-o",
            "out.fasta",
            "-c",
            config_path.to_str().unwrap(),
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Humanize(args) => args,
            _ => panic!("Expected 'humanize' subcommand"),
        }
    }

    #[test]
    fn load_from_file_and_merge_with_defaults() {
        let (_dir, path) = write_config(CONFIG);
        let args = humanize_args(&path, &[]);

        let settings = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_humanize(&args)
            .unwrap();

        assert_eq!(settings.model_path, PathBuf::from("models/heavy.toml"));
        assert_eq!(settings.resources.schema, PathBuf::from("schemas/chothia.toml"));
        assert_eq!(settings.resources.dataset, Some(PathBuf::from("data/human.csv")));
        assert_eq!(
            settings.resources.chain_type,
            Some(ChainType::new(ChainKind::Heavy, 3))
        );
        assert_eq!(settings.target_model_score, Some(0.8));
        assert_eq!(settings.target_v_gene_score, None);
        assert_eq!(settings.max_changes, 7);
        assert_eq!(settings.skip_positions, vec!["cdr3_1"]);
        assert!(!settings.use_aa_similarity);
    }

    #[test]
    fn cli_args_override_set_values_and_file() {
        let (_dir, path) = write_config(CONFIG);
        let args = humanize_args(
            &path,
            &[
                "--max-changes",
                "2",
                "--use-aa-similarity",
                "--chain-type",
                "KV1",
                "-S",
                "search.max-changes=20",
                "-S",
                "search.target-v-gene-score=0.85",
            ],
        );

        let settings = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_humanize(&args)
            .unwrap();

        assert_eq!(settings.max_changes, 2);
        assert_eq!(settings.target_v_gene_score, Some(0.85));
        assert!(settings.use_aa_similarity);
        assert_eq!(
            settings.resources.chain_type,
            Some(ChainType::new(ChainKind::Kappa, 1))
        );
    }

    #[test]
    fn target_model_score_falls_back_to_model_threshold() {
        let (_dir, path) = write_config(
            r#"
            [model]
            path = "m.toml"
            schema = "s.toml"
            "#,
        );
        let args = humanize_args(&path, &["--use-aa-similarity"]);

        let settings = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_humanize(&args)
            .unwrap();
        let config = settings.humanization_config(0.65).unwrap();

        assert_eq!(config.targets.model_score, 0.65);
        assert_eq!(config.max_changes, DefaultsConfig::default().max_changes);
        assert_eq!(config.change_ordering, ChangeOrdering::ScoreThenSimilarity);
    }

    #[test]
    fn missing_model_path_returns_error() {
        let (_dir, path) = write_config("[model]\nschema = \"s.toml\"\n");
        let args = humanize_args(&path, &[]);

        let result = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_humanize(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("model")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_dir, path) = write_config("[search]\nmax-iterations = 3\n");
        let result = PartialAppConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));

        let mut partial = PartialAppConfig::default();
        let result = partial.apply_set_values(&["search.unknown=1".to_string()]);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_chain_type_is_an_argument_error() {
        let (_dir, path) = write_config(CONFIG);
        let args = humanize_args(&path, &["--chain-type", "QV9"]);
        let result = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_humanize(&args);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn similar_requires_a_dataset() {
        let (_dir, path) = write_config("[model]\nschema = \"s.toml\"\n");
        let cli = Cli::parse_from(["humanize", "similar", "-i", "in.fasta", "-c", path.to_str().unwrap()]);
        let Commands::Similar(args) = cli.command else {
            panic!("Expected 'similar' subcommand");
        };

        let result = PartialAppConfig::from_file(&path)
            .unwrap()
            .merge_similar(&args.resources);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("dataset")));
    }
}
