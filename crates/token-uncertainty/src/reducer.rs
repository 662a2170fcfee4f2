//! Unreliability Reducer
//!
//! Collapses per-step unreliability into one sequence-level score, optionally
//! averaging only the most unreliable steps.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uncertainty_core::{StepUncertainty, UncertaintyError, UncertaintyResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    /// Mean unreliability over `selected_steps`
    pub total: f64,
    /// Contributing step indices, most unreliable first
    pub selected_steps: Vec<usize>,
}

/// Check a `top_k_inconfident` setting before any work is done
pub fn validate_top_k_inconfident(top_k_inconfident: Option<usize>) -> UncertaintyResult<()> {
    match top_k_inconfident {
        Some(0) => Err(UncertaintyError::InvalidParameter(
            "top_k_inconfident must be at least 1".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Rank steps by unreliability (descending, ties by lower index) and average
/// the first `top_k_inconfident`. `None`, or a window at least as long as the
/// sequence, averages every step.
pub fn reduce(
    per_step: &[StepUncertainty],
    top_k_inconfident: Option<usize>,
) -> UncertaintyResult<Reduction> {
    validate_top_k_inconfident(top_k_inconfident)?;
    if per_step.is_empty() {
        return Err(UncertaintyError::MalformedTrace(
            "no steps to reduce".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..per_step.len()).collect();
    // sort_by is stable, so equal values keep ascending step order.
    // partial_cmp treats -0.0 and 0.0 as equal; decompose never yields NaN.
    order.sort_by(|&a, &b| {
        per_step[b]
            .unreliability
            .partial_cmp(&per_step[a].unreliability)
            .unwrap_or(Ordering::Equal)
    });

    let window = top_k_inconfident
        .unwrap_or(per_step.len())
        .min(per_step.len());
    order.truncate(window);

    let total = order
        .iter()
        .map(|&i| per_step[i].unreliability)
        .sum::<f64>()
        / window as f64;

    Ok(Reduction {
        total,
        selected_steps: order,
    })
}
