use crate::cli::HumanizeArgs;
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use humanizer::{
    core::{
        annotation::AlignedAnnotator,
        classifier::position_weight,
        io::{
            fasta::{FastaFile, FastaRecord},
            reference::read_human_samples,
        },
        models::schema::Schema,
    },
    engine::{context::HumanizationContext, progress::ProgressReporter, v_gene::VGeneScorer},
    workflows,
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn run(args: HumanizeArgs) -> Result<()> {
    let partial_config = PartialAppConfig::from_file(&args.resources.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_humanize(&args)?;

    info!("Loading schema from {:?}", &settings.resources.schema);
    let schema = Arc::new(
        Schema::load(&settings.resources.schema)
            .map_err(|e| CliError::file_parsing(&settings.resources.schema, e))?,
    );

    info!("Loading model from {:?}", &settings.model_path);
    let model = position_weight::load(&settings.model_path, Arc::clone(&schema))
        .map_err(|e| CliError::file_parsing(&settings.model_path, e))?;
    info!(
        chain_type = %model.chain_type(),
        threshold = model.threshold(),
        "Model loaded."
    );
    let config = settings.humanization_config(model.threshold())?;

    let v_gene_scorer = match &settings.resources.dataset {
        Some(dataset) => {
            let samples =
                read_human_samples(dataset, &schema, settings.resources.chain_type.as_ref())
                    .map_err(|e| CliError::file_parsing(dataset, e))?;
            Some(VGeneScorer::from_samples(Arc::clone(&schema), samples)?)
        }
        None => {
            info!("No reference dataset configured; V-gene scoring uses the explicit human sample.");
            None
        }
    };

    info!("Loading input sequences from {:?}", &args.input);
    let records =
        FastaFile::read_from_path(&args.input).map_err(|e| CliError::file_parsing(&args.input, e))?;
    let sequences: Vec<String> = records.iter().map(|r| r.sequence.clone()).collect();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let annotator = AlignedAnnotator;
    let context = HumanizationContext::new(
        &model,
        v_gene_scorer.as_ref(),
        &annotator,
        &config,
        &reporter,
    );

    println!("Humanizing {} sequence(s)...", records.len());
    let results = workflows::humanize::run_batch(&sequences, args.human_sample.as_deref(), &context);

    let mut humanized = Vec::with_capacity(records.len());
    for (record, result) in records.iter().zip(results) {
        match result {
            Ok(result) => {
                let last = result.iterations.last();
                info!(
                    "{}: {} change(s), {} ({})",
                    record.name,
                    result.iterations.len() - 1,
                    last.map(|d| format!("model score {:.4}", d.model_score))
                        .unwrap_or_default(),
                    result.termination
                );
                humanized.push(FastaRecord::new(record.name.clone(), result.sequence));
            }
            Err(e) => {
                warn!("Skipping '{}': {}", record.name, e);
                eprintln!("Warning: '{}' could not be humanized: {}", record.name, e);
            }
        }
    }

    FastaFile::write_to_path(&humanized, &args.output)
        .map_err(|e| CliError::file_parsing(&args.output, e))?;
    println!(
        "✓ {} of {} sequence(s) humanized, written to: {}",
        humanized.len(),
        records.len(),
        args.output.display()
    );

    Ok(())
}
