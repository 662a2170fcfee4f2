//! Aleatoric / Epistemic Decomposition
//!
//! Treats a step's evidence vector α as the parameters of a Dirichlet
//! distribution over the κ selected candidates:
//!
//! - aleatoric = -Σ (α_t / α₀) · (ψ(α_t + 1) - ψ(α₀ + 1))
//! - epistemic = κ / Σ (α_t + 1)
//!
//! Steps with no surviving evidence (α₀ = 0), or whose values are not finite,
//! are resolved through [`DegeneratePolicy`].

use uncertainty_core::{EvidenceVector, StepUncertainty, UncertaintyError, UncertaintyResult};

use crate::config::DegeneratePolicy;
use crate::digamma::digamma;

/// Unclamped `-Σ (α_t / α₀) · (ψ(α_t + 1) - ψ(α₀ + 1))`. `None` when α₀ is zero.
fn spread(evidence: &EvidenceVector) -> Option<f64> {
    let alpha_0 = evidence.total;
    if alpha_0 <= 0.0 {
        return None;
    }

    let psi_total = digamma(alpha_0 + 1.0);
    let weighted: f64 = evidence
        .values
        .iter()
        .filter(|&&alpha| alpha > 0.0)
        .map(|&alpha| (alpha / alpha_0) * (digamma(alpha + 1.0) - psi_total))
        .sum();
    Some(-weighted)
}

/// Expected entropy-style spread of the evidence. `None` when α₀ is zero.
///
/// Every summand is ≤ 0 since ψ is increasing and α_t ≤ α₀, so anything not
/// positive is rounding and comes back as `+0.0`. NaN is kept for the caller
/// to detect.
pub fn aleatoric(evidence: &EvidenceVector) -> Option<f64> {
    spread(evidence).map(|s| if s > 0.0 || s.is_nan() { s } else { 0.0 })
}

/// κ over the total Dirichlet concentration; 1 when there is no evidence at all
pub fn epistemic(evidence: &EvidenceVector) -> f64 {
    let kappa = evidence.width() as f64;
    let concentration: f64 = evidence.values.iter().map(|alpha| alpha + 1.0).sum();
    kappa / concentration
}

/// Decompose one step, applying `policy` when the evidence is degenerate
pub fn decompose(
    step: usize,
    evidence: &EvidenceVector,
    policy: DegeneratePolicy,
) -> UncertaintyResult<StepUncertainty> {
    let epistemic = epistemic(evidence);
    let resolved = aleatoric(evidence)
        .filter(|a| a.is_finite() && epistemic.is_finite())
        .map(|aleatoric| StepUncertainty {
            aleatoric,
            epistemic,
            unreliability: epistemic * aleatoric,
            total_evidence: evidence.total,
            degenerate: false,
        });

    if let Some(uncertainty) = resolved {
        return Ok(uncertainty);
    }

    match policy {
        DegeneratePolicy::MaxEpistemic => {
            tracing::warn!(
                step,
                total_evidence = evidence.total,
                "Degenerate evidence, falling back to maximal epistemic uncertainty"
            );
            Ok(StepUncertainty {
                aleatoric: 0.0,
                epistemic: 1.0,
                unreliability: 0.0,
                total_evidence: evidence.total,
                degenerate: true,
            })
        }
        DegeneratePolicy::Reject => Err(UncertaintyError::DegenerateEvidence {
            step,
            kappa: evidence.width(),
        }),
    }
}
