//! Evidence Transformer
//!
//! Turns the raw scores of a step into Dirichlet-style evidence: keep the κ
//! largest scores, clip negatives to zero, and sum the survivors into α₀.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use uncertainty_core::{EvidenceVector, UncertaintyError, UncertaintyResult};

/// A scored vocabulary entry, ordered so that "greater" means "ranks higher".
///
/// Higher score ranks higher; on equal scores the lower vocabulary index
/// ranks higher. `-0.0` and `0.0` count as equal scores.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Adding 0.0 turns -0.0 into 0.0 before the total order sees it
        (self.score + 0.0)
            .total_cmp(&(other.score + 0.0))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Select the `k` highest scores as `(index, score)`, best first.
///
/// Runs a bounded min-heap over the slice, O(V log k). Equal scores are
/// resolved in favour of the lower index, so the result is deterministic.
/// `k` larger than the slice returns every entry.
pub fn select_top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(k + 1);
    for (index, &score) in scores.iter().enumerate() {
        let candidate = Candidate { index, score };
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(weakest)) = heap.peek() {
            if candidate > *weakest {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // Ascending order of Reverse<_> is descending rank
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| (c.index, c.score))
        .collect()
}

/// Check that an evidence width is usable for a vocabulary of `vocab_size`
pub fn validate_kappa(kappa: usize, vocab_size: usize) -> UncertaintyResult<()> {
    if kappa == 0 {
        return Err(UncertaintyError::InvalidParameter(
            "kappa must be at least 1".to_string(),
        ));
    }
    if kappa > vocab_size {
        return Err(UncertaintyError::InvalidParameter(format!(
            "kappa {} exceeds vocabulary size {}",
            kappa, vocab_size
        )));
    }
    Ok(())
}

/// Build the evidence vector for one step's raw scores.
///
/// Callers are expected to have validated `kappa` against the vocabulary.
pub fn evidence_from_scores(scores: &[f32], kappa: usize) -> EvidenceVector {
    let selected = select_top_k(scores, kappa);

    let mut indices = Vec::with_capacity(selected.len());
    let mut values = Vec::with_capacity(selected.len());
    for (index, score) in selected {
        indices.push(index);
        values.push(f64::from(score).max(0.0));
    }
    let total = values.iter().sum();

    EvidenceVector {
        indices,
        values,
        total,
    }
}
