//! Small dense-matrix support for the correlation routines.
//!
//! The only linear-algebra primitive the engine needs is the inverse of a
//! (small, symmetric) correlation or covariance matrix. Gauss–Jordan
//! elimination with partial pivoting is plenty at feature-set sizes, and a
//! singular matrix is reported as `None` so callers can surface NaN instead
//! of failing.

/// Near-zero pivot threshold below which a matrix is treated as singular.
const PIVOT_EPSILON: f64 = 1e-12;

/// Invert a square matrix by Gauss–Jordan elimination with partial pivoting.
///
/// Returns `None` when the matrix is singular (a pivot collapses below
/// threshold) or contains non-finite entries.
///
/// # Panics
///
/// Panics if `matrix` is not square.
///
/// # Examples
///
/// ```
/// use oxiscore_stats::matrix::invert;
///
/// let m = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
/// let inv = invert(&m).unwrap();
/// assert!((inv[0][0] - 0.6).abs() < 1e-12);
/// assert!((inv[0][1] + 0.7).abs() < 1e-12);
///
/// let singular = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
/// assert!(invert(&singular).is_none());
/// ```
#[must_use]
pub fn invert(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    for row in matrix {
        assert_eq!(row.len(), n, "matrix must be square");
    }
    if matrix
        .iter()
        .any(|row| row.iter().any(|v| !v.is_finite()))
    {
        return None;
    }

    // Augment with the identity and reduce in place.
    let mut work: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut augmented = row.clone();
            augmented.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            augmented
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| work[a][col].abs().total_cmp(&work[b][col].abs()))?;
        if work[pivot_row][col].abs() < PIVOT_EPSILON {
            return None;
        }
        work.swap(col, pivot_row);

        let pivot = work[col][col];
        for value in &mut work[col] {
            *value /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = work[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..2 * n {
                work[row][k] -= factor * work[col][k];
            }
        }
    }

    Some(work.into_iter().map(|row| row[n..].to_vec()).collect())
}
