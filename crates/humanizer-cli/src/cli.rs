use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Antibody humanizer - grafts non-human variable domains onto human frameworks and reverts as many positions as the humanness targets allow.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Humanize every sequence of a FASTA file with the reverse (framework-graft) strategy.
    Humanize(HumanizeArgs),
    /// Report the closest human reference samples for every sequence of a FASTA file.
    Similar(SimilarArgs),
}

/// Sources shared by every subcommand; each overrides the config file.
#[derive(Args, Debug)]
pub struct ResourceArgs {
    /// Path to the main configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the position schema file.
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Override the annotated reference dataset (CSV) used for V-gene scoring.
    #[arg(short, long, value_name = "PATH")]
    pub dataset: Option<PathBuf>,

    /// Restrict the reference population to one V-gene family (e.g. 'HV3', 'KV1').
    #[arg(long, value_name = "TYPE")]
    pub chain_type: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.max-changes=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `humanize` subcommand.
#[derive(Args, Debug)]
pub struct HumanizeArgs {
    // --- Core Arguments ---
    /// Path to the input FASTA file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output FASTA file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub resources: ResourceArgs,

    /// Override the humanness model file.
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Human sample used to build the chimeric sequence instead of the closest reference.
    #[arg(long, value_name = "SEQUENCE")]
    pub human_sample: Option<String>,

    // --- Search Overrides ---
    /// Override the minimal model score an accepted change must reach.
    #[arg(long, value_name = "FLOAT")]
    pub target_model_score: Option<f64>,

    /// Override the minimal V-gene similarity an accepted change must keep.
    #[arg(long, value_name = "FLOAT")]
    pub target_v_gene_score: Option<f64>,

    /// Override the maximum number of accepted changes.
    #[arg(long, value_name = "INT")]
    pub max_changes: Option<usize>,

    /// Positions that must never be reverted, comma separated (e.g. 'cdr3_1,cdr3_2').
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub skip_positions: Vec<String>,

    /// Break model-score ties by amino-acid similarity (BLOSUM62).
    #[arg(long)]
    pub use_aa_similarity: bool,
}

/// Arguments for the `similar` subcommand.
#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Path to the input FASTA file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub resources: ResourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn humanize_parses_overrides_and_global_flags() {
        let cli = Cli::parse_from([
            "humanize",
            "-vv",
            "-j",
            "4",
            "humanize",
            "-i",
            "in.fasta",
            "-o",
            "out.fasta",
            "-c",
            "config.toml",
            "--skip-positions",
            "cdr3_1,cdr3_2",
            "--use-aa-similarity",
            "-S",
            "search.max-changes=3",
        ]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        let Commands::Humanize(args) = cli.command else {
            panic!("Expected 'humanize' subcommand");
        };
        assert_eq!(args.skip_positions, vec!["cdr3_1", "cdr3_2"]);
        assert!(args.use_aa_similarity);
        assert_eq!(args.resources.set_values, vec!["search.max-changes=3"]);
        assert_eq!(args.resources.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn similar_requires_config() {
        let result = Cli::try_parse_from(["humanize", "similar", "-i", "in.fasta"]);
        assert!(result.is_err());
    }
}
