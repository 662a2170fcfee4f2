use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uncertainty_core::{UncertaintyError, UncertaintyResult};

use crate::evidence::validate_kappa;
use crate::reducer::validate_top_k_inconfident;

/// What to do with a step whose top-κ scores leave no positive evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Treat the step as total indecision: epistemic = 1, aleatoric = 0
    #[default]
    MaxEpistemic,
    /// Fail the whole call with `DegenerateEvidence`
    Reject,
}

impl DegeneratePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegeneratePolicy::MaxEpistemic => "max_epistemic",
            DegeneratePolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `max_epistemic` (also `max-epistemic`, `fallback`) and `reject`
/// (also `error`), case-insensitively
impl FromStr for DegeneratePolicy {
    type Err = UncertaintyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max_epistemic" | "max-epistemic" | "fallback" => Ok(DegeneratePolicy::MaxEpistemic),
            "reject" | "error" => Ok(DegeneratePolicy::Reject),
            other => Err(UncertaintyError::InvalidParameter(format!(
                "unknown degenerate evidence policy '{}'",
                other
            ))),
        }
    }
}

/// Parameters for a LogTokU evaluation.
///
/// `kappa` has no default: the evidence width depends on the model and must
/// be chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTokUConfig {
    /// Evidence width κ (number of top raw scores per step)
    pub kappa: usize,
    /// Average only this many of the most unreliable steps
    #[serde(default)]
    pub top_k_inconfident: Option<usize>,
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,
    /// Evaluate per-step work on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

impl LogTokUConfig {
    pub fn new(kappa: usize, top_k_inconfident: Option<usize>) -> UncertaintyResult<Self> {
        let config = Self {
            kappa,
            top_k_inconfident,
            degenerate_policy: DegeneratePolicy::default(),
            parallel: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks that do not depend on the trace
    pub fn validate(&self) -> UncertaintyResult<()> {
        if self.kappa == 0 {
            return Err(UncertaintyError::InvalidParameter(
                "kappa must be at least 1".to_string(),
            ));
        }
        validate_top_k_inconfident(self.top_k_inconfident)
    }

    /// Full validation against a concrete vocabulary size
    pub fn validate_for_vocab(&self, vocab_size: usize) -> UncertaintyResult<()> {
        self.validate()?;
        validate_kappa(self.kappa, vocab_size)
    }
}
