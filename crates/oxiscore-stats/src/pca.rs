//! Deterministic principal component decomposition.
//!
//! Columns are centered, their sample covariance (one delta degree of
//! freedom) is diagonalized with cyclic Jacobi rotations, and components are
//! emitted in decreasing-eigenvalue order. There is no randomization
//! anywhere: identical input in identical column order produces identical
//! output. Column order matters because the sign of each component is
//! canonicalized against its largest-magnitude loading (first such loading
//! on ties), so reordering columns can legitimately flip signs.

use crate::descriptive::mean;

/// Maximum Jacobi sweeps before the decomposition gives up converging
/// further; symmetric matrices at feature-set sizes converge in a handful.
const MAX_SWEEPS: usize = 100;

/// Off-diagonal Frobenius norm below which the matrix counts as diagonal.
const CONVERGENCE_EPSILON: f64 = 1e-14;

/// A full-rank principal component decomposition.
///
/// `components[c][f]` is the loading of feature `f` on component `c`;
/// components are ordered by decreasing eigenvalue, ties keeping their
/// diagonalization order.
#[derive(Debug, Clone)]
pub struct PrincipalComponents {
    /// Eigenvalues of the sample covariance matrix, decreasing.
    pub eigenvalues: Vec<f64>,
    /// Fraction of total variance captured per component.
    pub explained_variance_ratio: Vec<f64>,
    /// Running sum of the explained-variance fractions.
    pub cumulative_variance_ratio: Vec<f64>,
    /// Component loadings, one row per component.
    pub components: Vec<Vec<f64>>,
}

impl PrincipalComponents {
    /// Fit the decomposition over equal-length columns.
    ///
    /// Returns `None` for no columns, fewer than two observations, or
    /// non-finite values.
    ///
    /// # Panics
    ///
    /// Panics if the columns differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxiscore_stats::pca::PrincipalComponents;
    ///
    /// // Two perfectly correlated features: all variance on PC1.
    /// let columns = vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]];
    /// let pca = PrincipalComponents::fit(&columns).unwrap();
    /// assert!((pca.explained_variance_ratio[0] - 1.0).abs() < 1e-12);
    /// assert!(pca.explained_variance_ratio[1].abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(columns: &[Vec<f64>]) -> Option<Self> {
        let k = columns.len();
        if k == 0 {
            return None;
        }
        let n = columns[0].len();
        for column in columns {
            assert_eq!(column.len(), n, "columns must be equal length");
        }
        if n < 2 || columns.iter().any(|c| c.iter().any(|v| !v.is_finite())) {
            return None;
        }

        let centered: Vec<Vec<f64>> = columns
            .iter()
            .map(|column| {
                let m = mean(column);
                column.iter().map(|v| v - m).collect()
            })
            .collect();

        let mut covariance = vec![vec![0.0; k]; k];
        for i in 0..k {
            for j in i..k {
                let dot: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
                let value = dot / (n - 1) as f64;
                covariance[i][j] = value;
                covariance[j][i] = value;
            }
        }

        let (eigenvalues, vectors) = jacobi_eigen(covariance);

        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let sorted_eigenvalues: Vec<f64> = order.iter().map(|&i| eigenvalues[i]).collect();
        let total: f64 = sorted_eigenvalues.iter().sum();
        let explained_variance_ratio: Vec<f64> =
            sorted_eigenvalues.iter().map(|e| e / total).collect();
        let cumulative_variance_ratio: Vec<f64> = explained_variance_ratio
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect();

        let components = order
            .iter()
            .map(|&i| {
                let mut loadings: Vec<f64> = (0..k).map(|f| vectors[f][i]).collect();
                canonicalize_sign(&mut loadings);
                loadings
            })
            .collect();

        Some(PrincipalComponents {
            eigenvalues: sorted_eigenvalues,
            explained_variance_ratio,
            cumulative_variance_ratio,
            components,
        })
    }

    /// Number of components (equals the number of input columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Whether the decomposition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

/// Flip the vector so its largest-magnitude entry (first on ties) is
/// non-negative.
fn canonicalize_sign(loadings: &mut [f64]) {
    let Some(dominant) = loadings
        .iter()
        .copied()
        .reduce(|best, v| if v.abs() > best.abs() { v } else { best })
    else {
        return;
    };
    if dominant < 0.0 {
        for value in loadings {
            *value = -*value;
        }
    }
}

/// Diagonalize a symmetric matrix with cyclic Jacobi rotations.
///
/// Returns the eigenvalues (diagonal of the rotated matrix) and the
/// accumulated rotation matrix whose *columns* are the eigenvectors.
fn jacobi_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let k = a.len();
    let mut v = vec![vec![0.0; k]; k];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..k)
            .flat_map(|p| (0..k).filter(move |&q| q != p).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum::<f64>()
            .sqrt();
        if off < CONVERGENCE_EPSILON {
            break;
        }

        for p in 0..k.saturating_sub(1) {
            for q in (p + 1)..k {
                if a[p][q].abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = if theta == 0.0 {
                    1.0
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                let app = a[p][p];
                let aqq = a[q][q];
                let apq = a[p][q];
                a[p][p] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
                a[q][q] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
                a[p][q] = 0.0;
                a[q][p] = 0.0;
                for r in 0..k {
                    if r == p || r == q {
                        continue;
                    }
                    let arp = a[r][p];
                    let arq = a[r][q];
                    a[r][p] = c * arp - s * arq;
                    a[p][r] = a[r][p];
                    a[r][q] = s * arp + c * arq;
                    a[q][r] = a[r][q];
                }
                for row in &mut v {
                    let vrp = row[p];
                    let vrq = row[q];
                    row[p] = c * vrp - s * vrq;
                    row[q] = s * vrp + c * vrq;
                }
            }
        }
    }

    let eigenvalues = (0..k).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_correlated_features_collapse_to_one_component() {
        let columns = vec![vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0]];
        let pca = PrincipalComponents::fit(&columns).unwrap();
        assert!((pca.eigenvalues[0] - 10.0 / 3.0).abs() < 1e-10);
        assert!(pca.eigenvalues[1].abs() < 1e-10);
        let inv_sqrt2 = 1.0 / 2.0_f64.sqrt();
        assert!((pca.components[0][0] - inv_sqrt2).abs() < 1e-10);
        assert!((pca.components[0][1] - inv_sqrt2).abs() < 1e-10);
    }

    #[test]
    fn anticorrelated_features_keep_canonical_sign() {
        let columns = vec![vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 3.0, 2.0, 1.0]];
        let pca = PrincipalComponents::fit(&columns).unwrap();
        // The first loading of PC1 is positive by the sign convention.
        assert!(pca.components[0][0] > 0.0);
        assert!(pca.components[0][1] < 0.0);
    }

    #[test]
    fn three_feature_decomposition_matches_reference() {
        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 4.0, 3.0, 6.0],
            vec![0.5, 0.9, 0.1, 0.8, 0.3],
        ];
        let pca = PrincipalComponents::fit(&columns).unwrap();
        let expected_eigenvalues = [5.7048181710571635, 0.5939000156694604, 0.013281813273377099];
        for (actual, expected) in pca.eigenvalues.iter().zip(expected_eigenvalues) {
            assert!((actual - expected).abs() < 1e-9);
        }
        let expected_pc1 = [0.6150944704326363, 0.7846273615676812, -0.07758025472073583];
        for (actual, expected) in pca.components[0].iter().zip(expected_pc1) {
            assert!((actual - expected).abs() < 1e-9);
        }
        assert!((pca.explained_variance_ratio[0] - 0.903805160180159).abs() < 1e-9);
        let last = *pca.cumulative_variance_ratio.last().unwrap();
        assert!((last - 1.0).abs() < 1e-12);
    }

    #[test]
    fn decomposition_is_deterministic() {
        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 4.0, 3.0, 6.0],
        ];
        let first = PrincipalComponents::fit(&columns).unwrap();
        let second = PrincipalComponents::fit(&columns).unwrap();
        assert_eq!(first.eigenvalues, second.eigenvalues);
        assert_eq!(first.components, second.components);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(PrincipalComponents::fit(&[]).is_none());
        assert!(PrincipalComponents::fit(&[vec![1.0]]).is_none());
        assert!(PrincipalComponents::fit(&[vec![1.0, f64::NAN]]).is_none());
    }
}
