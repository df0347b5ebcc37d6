//! Patient-to-patient comparison on a single subcriterion.
//!
//! Patients are compared with a continuous ratio of their severity scores rather than the
//! discrete Saaty scale. Each ratio is clamped independently, so the resulting matrix is
//! only approximately reciprocal. That is expected: the consistency ratio of these matrices
//! is diagnostic only.

use crate::ahp::{calculate_ahp, AhpResult, ComparisonMatrix};
use crate::constants::{MAX_COMPARISON_RATIO, MIN_COMPARISON_RATIO};

/// How many times more severe `score_a` is than `score_b`, clamped to `[1/9, 9]`.
///
/// Zero or `NaN` scores count as 1.
pub fn compare_scores(score_a: f64, score_b: f64) -> f64 {
    let a = non_zero(score_a);
    let b = non_zero(score_b);
    (a / b).clamp(MIN_COMPARISON_RATIO, MAX_COMPARISON_RATIO)
}

fn non_zero(score: f64) -> f64 {
    if score == 0.0 || score.is_nan() {
        1.0
    } else {
        score
    }
}

/// Builds the N x N matrix comparing every patient's score with every other's.
pub fn patient_comparison_matrix(scores: &[f64]) -> ComparisonMatrix {
    ComparisonMatrix::from_fn(scores.len(), |i, k| compare_scores(scores[i], scores[k]))
}

/// Local priority of each patient for one subcriterion, in input order.
pub fn local_priorities(scores: &[f64]) -> AhpResult {
    calculate_ahp(&patient_comparison_matrix(scores))
}
