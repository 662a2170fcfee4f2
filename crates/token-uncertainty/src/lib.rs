//! Token Uncertainty Module
//!
//! Scalar uncertainty estimates for one autoregressively generated sequence,
//! computed from the per-step score vectors the generator produced.
//! Implements the LogTokU aleatoric/epistemic decomposition plus the naive
//! and vanilla token-confidence baselines.

pub mod adapter;
pub mod baseline;
pub mod confidence;
pub mod config;
pub mod digamma;
pub mod dirichlet;
pub mod estimator;
pub mod evidence;
pub mod reducer;
#[cfg(test)]
mod tests;

use rayon::prelude::*;

pub use adapter::trace_from_output;
pub use baseline::{naive_uncertainty, vanilla_uncertainty, NaiveScorer, VanillaScorer};
pub use confidence::{chosen_confidence, softmax, top_k_confidence};
pub use config::{DegeneratePolicy, LogTokUConfig};
pub use digamma::digamma;
pub use estimator::{log_tok_u, LogTokU};
pub use evidence::{evidence_from_scores, select_top_k};
pub use reducer::{reduce, Reduction};
pub use uncertainty_core::{
    EvidenceVector, GenerationOutput, GenerationTrace, SequenceScorer, SequenceUncertainty,
    StepRecord, StepUncertainty, UncertaintyError, UncertaintyResult,
};

/// Apply `f` to every step, on the rayon pool when `parallel` is set.
/// Results always come back in step order.
pub(crate) fn map_steps<T, F>(trace: &GenerationTrace, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, &StepRecord) -> T + Sync + Send,
{
    if parallel {
        trace
            .steps()
            .par_iter()
            .enumerate()
            .map(|(i, step)| f(i, step))
            .collect()
    } else {
        trace
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| f(i, step))
            .collect()
    }
}
