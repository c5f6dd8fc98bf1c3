use crate::core::annotation::AnnotationError;
use crate::core::classifier::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Annotation failed: {source}")]
    Annotation {
        #[from]
        source: AnnotationError,
    },

    #[error("Model scoring failed: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Reference population has {samples} samples but {labels} labels")]
    ReferenceMismatch { samples: usize, labels: usize },

    #[error(
        "V-gene similarity is undefined: no informative positions up to index {v_gene_end} \
         (both sequences hold only wildcards)"
    )]
    NoInformativePositions { v_gene_end: usize },

    #[error("No human sample available: supply one explicitly or provide a reference population")]
    NoHumanSample,

    #[error("Sequence has {actual} positions but the schema defines {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
