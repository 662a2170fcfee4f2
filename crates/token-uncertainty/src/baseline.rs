//! Baseline Uncertainty
//!
//! Naive and vanilla token-confidence aggregates. Both only look at the
//! probability of the emitted token at every step.

use uncertainty_core::{GenerationTrace, SequenceScorer, UncertaintyResult};

use crate::confidence::chosen_confidence;
use crate::map_steps;

/// Probability of the emitted token at every step, in generation order
pub fn step_confidences(trace: &GenerationTrace, parallel: bool) -> Vec<f64> {
    map_steps(trace, parallel, |_, step| chosen_confidence(step))
}

/// `1 - Π c_i`, accumulated as a sum of logs so long sequences do not underflow
pub fn naive_from_confidences(confidences: &[f64]) -> f64 {
    let log_joint: f64 = confidences.iter().map(|c| c.clamp(0.0, 1.0).ln()).sum();
    (1.0 - log_joint.exp()).clamp(0.0, 1.0)
}

/// `1 - mean(c_i)`; an empty slice counts as fully uncertain
pub fn vanilla_from_confidences(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return 1.0;
    }
    let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
    (1.0 - mean).clamp(0.0, 1.0)
}

/// Probability that at least one emitted token was "wrong" under the model's own distribution
pub fn naive_uncertainty(trace: &GenerationTrace) -> f64 {
    naive_from_confidences(&step_confidences(trace, false))
}

/// One minus the average emitted-token probability
pub fn vanilla_uncertainty(trace: &GenerationTrace) -> f64 {
    vanilla_from_confidences(&step_confidences(trace, false))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveScorer;

impl SequenceScorer for NaiveScorer {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn score(&self, trace: &GenerationTrace) -> UncertaintyResult<f64> {
        Ok(naive_uncertainty(trace))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VanillaScorer;

impl SequenceScorer for VanillaScorer {
    fn name(&self) -> &'static str {
        "vanilla"
    }

    fn score(&self, trace: &GenerationTrace) -> UncertaintyResult<f64> {
        Ok(vanilla_uncertainty(trace))
    }
}
