//! LogTokU Estimator
//!
//! Logits-induced token uncertainty (https://arxiv.org/abs/2412.14737).
//! Runs the full pipeline over a trace: baselines from the emitted-token
//! probabilities, then evidence → Dirichlet decomposition → reduction.

use uncertainty_core::{
    GenerationTrace, SequenceScorer, SequenceUncertainty, StepUncertainty, UncertaintyResult,
};

use crate::baseline::{naive_from_confidences, step_confidences, vanilla_from_confidences};
use crate::config::LogTokUConfig;
use crate::dirichlet::decompose;
use crate::evidence::evidence_from_scores;
use crate::map_steps;
use crate::reducer::reduce;

#[derive(Debug, Clone)]
pub struct LogTokU {
    config: LogTokUConfig,
}

impl LogTokU {
    pub fn new(config: LogTokUConfig) -> UncertaintyResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LogTokUConfig {
        &self.config
    }

    /// Per-step decomposition without the sequence-level reduction
    pub fn step_uncertainties(
        &self,
        trace: &GenerationTrace,
    ) -> UncertaintyResult<Vec<StepUncertainty>> {
        self.config.validate_for_vocab(trace.vocab_size())?;

        let kappa = self.config.kappa;
        let policy = self.config.degenerate_policy;
        map_steps(trace, self.config.parallel, |i, step| {
            let evidence = evidence_from_scores(&step.raw_scores, kappa);
            decompose(i, &evidence, policy)
        })
        .into_iter()
        .collect()
    }

    /// Evaluate a trace into a full uncertainty report
    pub fn evaluate(&self, trace: &GenerationTrace) -> UncertaintyResult<SequenceUncertainty> {
        let per_step = self.step_uncertainties(trace)?;
        let reduction = reduce(&per_step, self.config.top_k_inconfident)?;

        let confidences = step_confidences(trace, self.config.parallel);
        let naive = naive_from_confidences(&confidences);
        let vanilla = vanilla_from_confidences(&confidences);

        let degenerate = per_step.iter().filter(|s| s.degenerate).count();
        tracing::debug!(
            steps = trace.len(),
            kappa = self.config.kappa,
            selected = reduction.selected_steps.len(),
            degenerate,
            unreliability_total = reduction.total,
            "LogTokU evaluation complete"
        );

        Ok(SequenceUncertainty {
            naive,
            vanilla,
            unreliability_total: reduction.total,
            per_step,
            selected_steps: reduction.selected_steps,
            kappa: self.config.kappa,
        })
    }
}

impl SequenceScorer for LogTokU {
    fn name(&self) -> &'static str {
        "logtoku"
    }

    fn score(&self, trace: &GenerationTrace) -> UncertaintyResult<f64> {
        Ok(self.evaluate(trace)?.unreliability_total)
    }
}

/// One-shot LogTokU evaluation with the default degenerate-evidence policy
pub fn log_tok_u(
    trace: &GenerationTrace,
    kappa: usize,
    top_k_inconfident: Option<usize>,
) -> UncertaintyResult<SequenceUncertainty> {
    LogTokU::new(LogTokUConfig::new(kappa, top_k_inconfident)?)?.evaluate(trace)
}
