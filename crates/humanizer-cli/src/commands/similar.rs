use crate::cli::SimilarArgs;
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use humanizer::{
    core::{
        annotation::AlignedAnnotator,
        io::{fasta::FastaFile, reference::read_human_samples},
        models::schema::Schema,
    },
    engine::{progress::ProgressReporter, v_gene::VGeneScorer},
    workflows,
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn run(args: SimilarArgs) -> Result<()> {
    let partial_config = PartialAppConfig::from_file(&args.resources.config)?;
    let resources = partial_config.merge_similar(&args.resources)?;
    let dataset = resources
        .dataset
        .as_ref()
        .ok_or_else(|| CliError::Config("A reference dataset is required.".to_string()))?;

    info!("Loading schema from {:?}", &resources.schema);
    let schema = Arc::new(
        Schema::load(&resources.schema).map_err(|e| CliError::file_parsing(&resources.schema, e))?,
    );
    let samples = read_human_samples(dataset, &schema, resources.chain_type.as_ref())
        .map_err(|e| CliError::file_parsing(dataset, e))?;
    let scorer = VGeneScorer::from_samples(Arc::clone(&schema), samples)?;

    let records =
        FastaFile::read_from_path(&args.input).map_err(|e| CliError::file_parsing(&args.input, e))?;
    let sequences: Vec<String> = records.iter().map(|r| r.sequence.clone()).collect();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let results = workflows::similar::run_batch(&sequences, &AlignedAnnotator, &scorer, &reporter);

    for (record, result) in records.iter().zip(results) {
        match result {
            Ok(matches) if matches.is_empty() => {
                println!("{}: no human samples in the reference population", record.name);
            }
            Ok(matches) => {
                println!("{}:", record.name);
                for (rank, sample) in matches.iter().enumerate() {
                    println!(
                        "  {}. {} (V-gene score {:.4}) {}",
                        rank + 1,
                        sample.label,
                        sample.score,
                        sample.sequence
                    );
                }
            }
            Err(e) => {
                warn!("Skipping '{}': {}", record.name, e);
                println!("{}: cannot be annotated ({})", record.name, e);
            }
        }
    }

    Ok(())
}
