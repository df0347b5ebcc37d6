//! Analytic Hierarchy Process weight solver.
//!
//! Priority weights are approximated with the column-normalisation method: every column is
//! divided by its sum and each row's mean becomes that element's weight. The dominant
//! eigenvalue estimate (`lambda_max`) then drives the consistency index and ratio.
//!
//! Degenerate matrices never produce `NaN`: a zero (or non-finite) column sum yields equal
//! weights, and a zero weight switches `lambda_max` to the column-sum estimate.

use crate::constants::{
    CONSISTENCY_THRESHOLD, RANDOM_INDEX, RANDOM_INDEX_BEYOND_TABLE,
    RANDOM_INDEX_ZERO_WEIGHT_FALLBACK, RECIPROCAL_TOLERANCE,
};
use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};

/// Square matrix of pairwise comparisons.
///
/// Entry `(i, j)` states how many times more important or severe element `i` is than
/// element `j`. Hand-authored matrices are reciprocal; matrices generated from patient
/// ratios are only approximately so.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ComparisonMatrix {
    rows: Vec<Vec<f64>>,
}

impl ComparisonMatrix {
    /// Creates a matrix from rows, rejecting anything that is not square.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::MatrixNotSquare`] if any row length differs from the row count.
    pub fn new(rows: Vec<Vec<f64>>) -> TriageResult<Self> {
        let size = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(TriageError::MatrixNotSquare {
                rows: size,
                row,
                len: values.len(),
            });
        }
        Ok(Self { rows })
    }

    /// Builds a matrix from a fixed-size array, which is square by construction.
    pub fn from_array<const N: usize>(values: &[[f64; N]; N]) -> Self {
        Self {
            rows: values.iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// Builds an `n x n` matrix whose entry `(i, j)` is `f(i, j)`.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        Self {
            rows: (0..size)
                .map(|i| (0..size).map(|j| f(i, j)).collect())
                .collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Checks that a hand-authored matrix is usable on the Saaty scale.
    ///
    /// Entries must be positive and finite, the diagonal must be one, and
    /// `m[i][j] * m[j][i]` must equal one within [`RECIPROCAL_TOLERANCE`].
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidInput`] for non-positive or non-finite entries and
    /// [`TriageError::NotReciprocal`] for the first cell that breaks reciprocity.
    pub fn validate_reciprocal(&self, name: &str) -> TriageResult<()> {
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(TriageError::InvalidInput(format!(
                        "matrix '{name}' has a non-positive entry at ({i}, {j})"
                    )));
                }
                let mirrored = self.rows[j][i];
                if (value * mirrored - 1.0).abs() > RECIPROCAL_TOLERANCE {
                    return Err(TriageError::NotReciprocal {
                        name: name.to_string(),
                        row: i,
                        col: j,
                    });
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for ComparisonMatrix {
    type Error = TriageError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<ComparisonMatrix> for Vec<Vec<f64>> {
    fn from(matrix: ComparisonMatrix) -> Self {
        matrix.rows
    }
}

/// Outcome of solving one comparison matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AhpResult {
    pub weights: Vec<f64>,
    pub lambda_max: f64,
    #[serde(rename = "CI")]
    pub ci: f64,
    #[serde(rename = "CR")]
    pub cr: f64,
    pub is_consistent: bool,
}

impl AhpResult {
    fn empty() -> Self {
        Self {
            weights: Vec::new(),
            lambda_max: 0.0,
            ci: 0.0,
            cr: 0.0,
            is_consistent: true,
        }
    }

    fn equal_weights(size: usize) -> Self {
        Self {
            weights: vec![1.0 / size as f64; size],
            lambda_max: size as f64,
            ci: 0.0,
            cr: 0.0,
            is_consistent: true,
        }
    }
}

/// Saaty random index for a matrix of `size` elements.
///
/// Sizes past the end of the table use [`RANDOM_INDEX_BEYOND_TABLE`].
pub fn random_index(size: usize) -> f64 {
    lookup_random_index(size).unwrap_or(RANDOM_INDEX_BEYOND_TABLE)
}

fn lookup_random_index(size: usize) -> Option<f64> {
    size.checked_sub(1)
        .and_then(|idx| RANDOM_INDEX.get(idx))
        .copied()
}

/// Computes priority weights and consistency measures for `matrix`.
///
/// The result is a pure function of the matrix. Consistency is informational: an
/// inconsistent matrix still yields usable weights.
pub fn calculate_ahp(matrix: &ComparisonMatrix) -> AhpResult {
    let size = matrix.size();
    match size {
        0 => return AhpResult::empty(),
        1 => return AhpResult::equal_weights(1),
        _ => {}
    }

    let rows = matrix.rows();
    let column_sums: Vec<f64> = (0..size)
        .map(|j| rows.iter().map(|row| row[j]).sum())
        .collect();

    if column_sums.iter().any(|sum| *sum == 0.0 || !sum.is_finite()) {
        tracing::error!(
            size,
            "degenerate comparison matrix (zero column sum), using equal weights"
        );
        return AhpResult::equal_weights(size);
    }

    let n = size as f64;
    let weights: Vec<f64> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&column_sums)
                .map(|(value, sum)| value / sum)
                .sum::<f64>()
                / n
        })
        .collect();

    let (lambda_max, ri) = if weights.iter().any(|w| *w == 0.0) {
        tracing::warn!(
            size,
            "zero priority weight, approximating lambda_max from column sums"
        );
        let lambda_max = column_sums
            .iter()
            .zip(&weights)
            .map(|(sum, weight)| sum * weight)
            .sum();
        (
            lambda_max,
            lookup_random_index(size).unwrap_or(RANDOM_INDEX_ZERO_WEIGHT_FALLBACK),
        )
    } else {
        let lambda_max = rows
            .iter()
            .zip(&weights)
            .map(|(row, weight)| {
                let weighted_sum: f64 = row.iter().zip(&weights).map(|(v, w)| v * w).sum();
                weighted_sum / weight
            })
            .sum::<f64>()
            / n;
        (lambda_max, random_index(size))
    };

    let ci = (lambda_max - n) / (n - 1.0);
    let cr = if ri != 0.0 { ci / ri } else { 0.0 };

    AhpResult {
        weights,
        lambda_max,
        ci,
        cr,
        is_consistent: cr < CONSISTENCY_THRESHOLD,
    }
}
