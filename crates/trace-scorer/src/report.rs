use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use token_uncertainty::{trace_from_output, GenerationOutput, LogTokU, SequenceUncertainty};

/// Uncertainty report for one recorded generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub source: String,
    pub generated_tokens: usize,
    pub vocab_size: usize,
    pub token_ids: Vec<u32>,
    pub uncertainty: SequenceUncertainty,
}

/// Score an in-memory generation result
pub fn score_output(
    estimator: &LogTokU,
    source: &str,
    output: GenerationOutput,
) -> Result<ScoreReport> {
    let trace = trace_from_output(output)
        .with_context(|| format!("{}: invalid generation output", source))?;
    let uncertainty = estimator
        .evaluate(&trace)
        .with_context(|| format!("{}: uncertainty evaluation failed", source))?;

    Ok(ScoreReport {
        source: source.to_string(),
        generated_tokens: trace.len(),
        vocab_size: trace.vocab_size(),
        token_ids: trace.token_ids(),
        uncertainty,
    })
}

/// Load a JSON-encoded generation result from disk and score it
pub fn score_file(estimator: &LogTokU, path: &Path) -> Result<ScoreReport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let output: GenerationOutput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} as a generation output", path.display()))?;

    score_output(estimator, &path.display().to_string(), output)
}

pub fn render(report: &ScoreReport, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(rendered)
}
