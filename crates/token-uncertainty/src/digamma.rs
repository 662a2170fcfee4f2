//! Digamma Function
//!
//! ψ(x) = d/dx ln Γ(x). Evaluated by shifting the argument above
//! `ASYMPTOTIC_THRESHOLD` with the recurrence ψ(x) = ψ(x + 1) - 1/x and then
//! summing the asymptotic (Stirling) series. Negative non-integer arguments
//! go through the reflection formula.

use std::f64::consts::PI;

/// Below this the asymptotic series is not accurate enough
const ASYMPTOTIC_THRESHOLD: f64 = 6.0;

/// |B_2n| / 2n for n = 1..=7, alternating in sign starting negative
const SERIES: [f64; 7] = [
    1.0 / 12.0,
    1.0 / 120.0,
    1.0 / 252.0,
    1.0 / 240.0,
    1.0 / 132.0,
    691.0 / 32760.0,
    1.0 / 12.0,
];

/// Digamma function ψ(x).
///
/// Returns NaN at the poles (zero and negative integers) and for NaN or
/// `-inf` input, `+inf` for `+inf`. Absolute error is below 1e-12 for x ≥ 1.
pub fn digamma(x: f64) -> f64 {
    if x.is_nan() || x == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return f64::INFINITY;
    }
    if x <= 0.0 {
        if x == x.floor() {
            return f64::NAN;
        }
        return digamma(1.0 - x) - PI / (PI * x).tan();
    }

    let mut x = x;
    let mut shift = 0.0;
    while x < ASYMPTOTIC_THRESHOLD {
        shift -= 1.0 / x;
        x += 1.0;
    }

    let z = 1.0 / (x * x);
    let tail = SERIES
        .iter()
        .rev()
        .fold(0.0, |acc, coeff| coeff - z * acc);

    shift + x.ln() - 0.5 / x - z * tail
}
