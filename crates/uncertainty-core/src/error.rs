use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UncertaintyError {
    #[error("Malformed trace: {0}")]
    MalformedTrace(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "Degenerate evidence at step {step}: no positive evidence among the top-{kappa} scores"
    )]
    DegenerateEvidence { step: usize, kappa: usize },

    #[error("Unsupported batch size {0}: only single-sequence generation results are accepted")]
    UnsupportedBatch(usize),
}

pub type UncertaintyResult<T> = Result<T, UncertaintyError>;
