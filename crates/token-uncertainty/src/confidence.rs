//! Confidence Extraction
//!
//! Softmax over a step's raw scores and the probability of the chosen token.

use uncertainty_core::{StepRecord, UncertaintyError, UncertaintyResult};

use crate::evidence::select_top_k;

/// Numerically stable softmax: the maximum is subtracted before exponentiating.
///
/// A slice with no finite maximum (empty or fully masked) falls back to the
/// uniform distribution.
pub fn softmax(scores: &[f32]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max = max_score(scores);
    if !max.is_finite() {
        let uniform = 1.0 / scores.len() as f64;
        return vec![uniform; scores.len()];
    }

    let mut exps: Vec<f64> = scores.iter().map(|&s| (f64::from(s) - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    for p in exps.iter_mut() {
        *p /= sum;
    }
    exps
}

/// Probability the step's distribution assigned to the token that was emitted.
///
/// Computed without materialising the full distribution.
pub fn chosen_confidence(step: &StepRecord) -> f64 {
    let scores = &step.raw_scores;
    let max = max_score(scores);
    if !max.is_finite() {
        return 1.0 / scores.len().max(1) as f64;
    }

    let partition: f64 = scores.iter().map(|&s| (f64::from(s) - max).exp()).sum();
    let chosen = scores
        .get(step.chosen_token_id as usize)
        .map(|&s| (f64::from(s) - max).exp())
        .unwrap_or(0.0);

    chosen / partition
}

/// The `k` highest values of a step, best first.
///
/// With `apply_softmax` the values are probabilities, otherwise the raw
/// scores widened to `f64`.
pub fn top_k_confidence(
    step: &StepRecord,
    k: usize,
    apply_softmax: bool,
) -> UncertaintyResult<Vec<f64>> {
    if k == 0 || k > step.vocab_size() {
        return Err(UncertaintyError::InvalidParameter(format!(
            "top-k width {} must be within 1..={}",
            k,
            step.vocab_size()
        )));
    }

    let selected = select_top_k(&step.raw_scores, k);
    if !apply_softmax {
        return Ok(selected.into_iter().map(|(_, s)| f64::from(s)).collect());
    }

    let max = max_score(&step.raw_scores);
    let partition: f64 = step
        .raw_scores
        .iter()
        .map(|&s| (f64::from(s) - max).exp())
        .sum();
    Ok(selected
        .into_iter()
        .map(|(_, s)| (f64::from(s) - max).exp() / partition)
        .collect())
}

fn max_score(scores: &[f32]) -> f64 {
    scores
        .iter()
        .fold(f64::NEG_INFINITY, |acc, &s| acc.max(f64::from(s)))
}
