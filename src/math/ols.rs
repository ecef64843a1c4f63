//! Least squares for autoregressive return models.
//!
//! Training solves
//!
//! ```text
//! minimize Σ (s_t - β0 - β1 s_{t-1} - ... - βp s_{t-p})^2
//! ```
//!
//! over the scaled return series `s`. The design matrix is tall (thousands of
//! rows, `p + 1` columns) so we solve via SVD rather than the normal equations.

use nalgebra::{DMatrix, DVector};

/// Build the lagged design matrix and target vector for an AR(`lags`) fit.
///
/// Row `i` is `[1, s[t-1], s[t-2], ..., s[t-lags]]` with target `s[t]`,
/// for `t = lags..series.len()`. Returns `None` if there are no rows.
pub fn lagged_design(series: &[f64], lags: usize) -> Option<(DMatrix<f64>, DVector<f64>)> {
    if lags == 0 || series.len() <= lags {
        return None;
    }
    let rows = series.len() - lags;
    let cols = lags + 1;

    let mut x = DMatrix::zeros(rows, cols);
    let mut y = DVector::zeros(rows);
    for (r, t) in (lags..series.len()).enumerate() {
        x[(r, 0)] = 1.0;
        for k in 1..=lags {
            x[(r, k)] = series[t - k];
        }
        y[r] = series[t];
    }
    Some((x, y))
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Lagged returns can be close to collinear; loosen the tolerance step by step.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lagged_design_layout() {
        let (x, y) = lagged_design(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(x.nrows(), 2);
        assert_eq!(x.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 1.0]);
        assert_eq!(x.row(1).iter().copied().collect::<Vec<_>>(), vec![1.0, 3.0, 2.0]);
        assert_eq!(y.iter().copied().collect::<Vec<_>>(), vec![3.0, 4.0]);
        assert!(lagged_design(&[1.0, 2.0], 2).is_none());
    }

    #[test]
    fn recovers_ar1_coefficients() {
        // s_t = 0.1 + 0.5 s_{t-1}, exactly.
        let mut s = vec![0.9];
        for _ in 0..20 {
            let prev = *s.last().unwrap();
            s.push(0.1 + 0.5 * prev);
        }
        let (x, y) = lagged_design(&s, 1).unwrap();
        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 0.1).abs() < 1e-8);
        assert!((beta[1] - 0.5).abs() < 1e-8);
    }
}
