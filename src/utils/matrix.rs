//! Matrix utility functions.

use faer::{Col, Mat};

/// Detect columns that are constant (zero variance).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; n_cols];
    }

    let mut constant = vec![false; n_cols];

    for j in 0..n_cols {
        let first = x[(0, j)];
        let all_same = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
        constant[j] = all_same;
    }

    constant
}

/// Prepend a column of ones to a design matrix.
pub fn with_intercept(x: &Mat<f64>) -> Mat<f64> {
    let n_samples = x.nrows();
    let n_features = x.ncols();

    let mut x_aug = Mat::zeros(n_samples, n_features + 1);
    for i in 0..n_samples {
        x_aug[(i, 0)] = 1.0;
        for j in 0..n_features {
            x_aug[(i, j + 1)] = x[(i, j)];
        }
    }
    x_aug
}

/// Mean and sample standard deviation of a slice.
pub fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, f64::NAN);
    }
    let ss: f64 = values.iter().map(|&v| (v - mean).powi(2)).sum();
    (mean, (ss / (n - 1) as f64).sqrt())
}

/// Solve the least squares problem `min ||x b - z||` with column-pivoted QR.
///
/// Columns whose pivot falls below `rank_tolerance` get a zero coefficient.
pub fn solve_least_squares(x: &Mat<f64>, z: &Col<f64>, rank_tolerance: f64) -> Col<f64> {
    let n_params = x.ncols();

    let qr = x.col_piv_qr();
    let q = qr.compute_Q();
    let r = qr.R();
    let perm = qr.P();

    let qtz = q.transpose() * z.as_ref();

    let mut beta_perm = Col::zeros(n_params);
    for i in (0..n_params).rev() {
        let mut sum = qtz[i];
        for j in (i + 1)..n_params {
            sum -= r[(i, j)] * beta_perm[j];
        }
        if r[(i, i)].abs() > rank_tolerance {
            beta_perm[i] = sum / r[(i, i)];
        } else {
            beta_perm[i] = 0.0;
        }
    }

    let mut beta = Col::zeros(n_params);
    for i in 0..n_params {
        beta[perm.inverse().arrays().0[i]] = beta_perm[i];
    }

    beta
}

/// Invert a square matrix through its QR decomposition.
///
/// Returns `None` when a diagonal entry of R is numerically zero.
pub fn invert_square(a: &Mat<f64>) -> Option<Mat<f64>> {
    let n = a.nrows();
    if n == 0 || a.ncols() != n {
        return None;
    }

    let qr = a.qr();
    let q = qr.compute_Q();
    let r = qr.R().to_owned();

    let scale = (0..n).map(|i| r[(i, i)].abs()).fold(0.0_f64, f64::max);
    if !scale.is_finite() || scale == 0.0 {
        return None;
    }
    if (0..n).any(|i| r[(i, i)].abs() <= 1e-14 * scale) {
        return None;
    }

    let mut inverse: Mat<f64> = Mat::zeros(n, n);
    for col in 0..n {
        let mut e = Col::zeros(n);
        e[col] = 1.0;
        let qte = q.transpose() * e;

        let mut sol = Col::zeros(n);
        for i in (0..n).rev() {
            let mut sum = qte[i];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * sol[j];
            }
            sol[i] = sum / r[(i, i)];
        }

        for i in 0..n {
            inverse[(i, col)] = sol[i];
        }
    }

    Some(inverse)
}
