use serde::{Deserialize, Serialize};

use crate::{UncertaintyError, UncertaintyResult};

/// Raw output of a "generate with per-step scores" call.
///
/// `sequences` is batch-major (one row per generated sequence, prompt
/// included). `scores` is step-major: `scores[step][row]` is the score vector
/// over the vocabulary produced when generating token `prompt_len + step` of
/// `sequences[row]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub sequences: Vec<Vec<u32>>,
    pub scores: Vec<Vec<Vec<f32>>>,
    /// Number of prompt tokens at the head of every row in `sequences`
    pub prompt_len: usize,
}

/// One generation step: the token that was emitted and the scores it was chosen from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub chosen_token_id: u32,
    pub raw_scores: Vec<f32>,
}

impl StepRecord {
    pub fn new(chosen_token_id: u32, raw_scores: Vec<f32>) -> Self {
        Self {
            chosen_token_id,
            raw_scores,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.raw_scores.len()
    }
}

/// Ordered, validated sequence of generation steps.
///
/// Every step shares the same vocabulary size, has a chosen token inside
/// that vocabulary, and carries no NaN or `+inf` scores. `-inf` is allowed
/// (masked tokens) as long as each step keeps at least one finite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationTrace {
    steps: Vec<StepRecord>,
    vocab_size: usize,
}

impl GenerationTrace {
    pub fn new(steps: Vec<StepRecord>) -> UncertaintyResult<Self> {
        let first = steps.first().ok_or_else(|| {
            UncertaintyError::MalformedTrace("trace contains no generated steps".to_string())
        })?;
        let vocab_size = first.vocab_size();
        if vocab_size == 0 {
            return Err(UncertaintyError::MalformedTrace(
                "score vectors are empty".to_string(),
            ));
        }

        for (i, step) in steps.iter().enumerate() {
            if step.vocab_size() != vocab_size {
                return Err(UncertaintyError::MalformedTrace(format!(
                    "step {} has {} scores, expected {}",
                    i,
                    step.vocab_size(),
                    vocab_size
                )));
            }
            if step.chosen_token_id as usize >= vocab_size {
                return Err(UncertaintyError::MalformedTrace(format!(
                    "step {} chose token {} outside vocabulary of size {}",
                    i, step.chosen_token_id, vocab_size
                )));
            }
            if let Some(pos) = step
                .raw_scores
                .iter()
                .position(|s| s.is_nan() || *s == f32::INFINITY)
            {
                return Err(UncertaintyError::MalformedTrace(format!(
                    "step {} has a non-finite score at index {}",
                    i, pos
                )));
            }
            if step.raw_scores.iter().all(|s| *s == f32::NEG_INFINITY) {
                return Err(UncertaintyError::MalformedTrace(format!(
                    "step {} has every score masked",
                    i
                )));
            }
        }

        Ok(Self { steps, vocab_size })
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Number of generated tokens
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// A constructed trace always holds at least one step
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn token_ids(&self) -> Vec<u32> {
        self.steps.iter().map(|s| s.chosen_token_id).collect()
    }
}

/// Non-negative evidence mass taken from the top-κ raw scores of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceVector {
    /// Vocabulary indices of the selected scores, best first
    pub indices: Vec<usize>,
    /// Clipped scores (α_t), aligned with `indices`
    pub values: Vec<f64>,
    /// Sum of `values` (α₀)
    pub total: f64,
}

impl EvidenceVector {
    /// Evidence width κ
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// True when no selected score survived clipping
    pub fn is_empty_mass(&self) -> bool {
        self.total <= 0.0
    }
}

/// Per-step decomposition of uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepUncertainty {
    /// Aleatoric uncertainty (spread of evidence across candidates)
    pub aleatoric: f64,
    /// Epistemic uncertainty (lack of total evidence), in (0, 1]
    pub epistemic: f64,
    /// `epistemic * aleatoric`
    pub unreliability: f64,
    /// α₀ of the step's evidence
    pub total_evidence: f64,
    /// Set when the values came from the degenerate-evidence fallback
    pub degenerate: bool,
}

/// Final uncertainty report for one generated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceUncertainty {
    pub naive: f64,
    pub vanilla: f64,
    pub unreliability_total: f64,
    pub per_step: Vec<StepUncertainty>,
    /// Steps averaged into `unreliability_total`, most unreliable first
    pub selected_steps: Vec<usize>,
    /// Evidence width used for the decomposition
    pub kappa: usize,
}

impl SequenceUncertainty {
    /// Reliability score: negated `unreliability_total`, higher is more trustworthy
    pub fn reliability(&self) -> f64 {
        -self.unreliability_total
    }

    pub fn most_unreliable_step(&self) -> Option<usize> {
        self.selected_steps.first().copied()
    }

    pub fn degenerate_steps(&self) -> Vec<usize> {
        self.per_step
            .iter()
            .enumerate()
            .filter(|(_, s)| s.degenerate)
            .map(|(i, _)| i)
            .collect()
    }
}
