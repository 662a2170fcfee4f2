//! Trace Adapter
//!
//! Converts a raw generation result into a validated [`GenerationTrace`],
//! pairing every newly generated token with the scores it was sampled from.

use uncertainty_core::{
    GenerationOutput, GenerationTrace, StepRecord, UncertaintyError, UncertaintyResult,
};

/// Build a trace from a single-sequence generation result.
///
/// Takes the output by value so the score vectors move into the trace
/// without copying.
pub fn trace_from_output(output: GenerationOutput) -> UncertaintyResult<GenerationTrace> {
    let GenerationOutput {
        sequences,
        scores,
        prompt_len,
    } = output;

    let sequence = single_row(sequences, "sequences")?;
    if prompt_len > sequence.len() {
        return Err(UncertaintyError::MalformedTrace(format!(
            "prompt length {} exceeds sequence length {}",
            prompt_len,
            sequence.len()
        )));
    }

    let generated = &sequence[prompt_len..];
    if generated.is_empty() {
        return Err(UncertaintyError::MalformedTrace(
            "no tokens were generated".to_string(),
        ));
    }
    if scores.len() != generated.len() {
        return Err(UncertaintyError::MalformedTrace(format!(
            "{} score vectors for {} generated tokens",
            scores.len(),
            generated.len()
        )));
    }

    let steps = generated
        .iter()
        .zip(scores)
        .map(|(&token, rows)| single_row(rows, "scores").map(|s| StepRecord::new(token, s)))
        .collect::<UncertaintyResult<Vec<_>>>()?;

    let trace = GenerationTrace::new(steps)?;
    tracing::debug!(
        steps = trace.len(),
        vocab_size = trace.vocab_size(),
        prompt_len,
        "Adapted generation output"
    );
    Ok(trace)
}

/// Unwrap a batch dimension that must hold exactly one row
fn single_row<T>(rows: Vec<T>, field: &str) -> UncertaintyResult<T> {
    match rows.len() {
        0 => Err(UncertaintyError::MalformedTrace(format!(
            "{} has an empty batch dimension",
            field
        ))),
        1 => rows.into_iter().next().ok_or_else(|| {
            UncertaintyError::MalformedTrace(format!("{} has an empty batch dimension", field))
        }),
        n => Err(UncertaintyError::UnsupportedBatch(n)),
    }
}
