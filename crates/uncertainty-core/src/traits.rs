use crate::{GenerationTrace, UncertaintyResult};

/// A method that reduces a generation trace to a single uncertainty score.
///
/// Higher scores always mean a less trustworthy response, so traces can be
/// ranked the same way regardless of which scorer produced the number.
pub trait SequenceScorer: Send + Sync {
    /// Short identifier used in reports and logs
    fn name(&self) -> &'static str;

    fn score(&self, trace: &GenerationTrace) -> UncertaintyResult<f64>;
}
