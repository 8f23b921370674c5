//! Iteratively Reweighted Least Squares shared by the GLM solvers.

use crate::core::GlmFamily;
use crate::inference::CoefficientInference;
use crate::utils::{invert_square, solve_least_squares};
use faer::{Col, Mat};
use log::debug;

/// Raw outcome of an IRLS run on a design matrix that already carries the
/// intercept column.
#[derive(Debug, Clone)]
pub(crate) struct IrlsFit {
    pub beta: Col<f64>,
    pub mu: Vec<f64>,
    pub deviance: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Run IRLS until the relative deviance change drops below `tolerance`.
///
/// Non-convergence is reported through the flag rather than an error so that
/// callers that only need starting values can still use the last iterate.
pub(crate) fn irls<F: GlmFamily>(
    family: &F,
    design: &Mat<f64>,
    y: &[f64],
    max_iterations: usize,
    tolerance: f64,
    rank_tolerance: f64,
) -> IrlsFit {
    let n = design.nrows();
    let p = design.ncols();

    let mut mu = family.initialize_mu(y);
    let mut eta: Vec<f64> = mu.iter().map(|&m| family.link(m)).collect();
    let mut deviance_old = family.deviance(y, &mu);
    let mut beta = Col::zeros(p);
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..max_iterations {
        iterations = iter + 1;

        let mut x_weighted = Mat::zeros(n, p);
        let mut z_weighted = Col::zeros(n);
        for i in 0..n {
            let sqrt_w = family.irls_weight(mu[i]).sqrt();
            let z = eta[i] + (y[i] - mu[i]) * family.link_derivative(mu[i]);
            for j in 0..p {
                x_weighted[(i, j)] = sqrt_w * design[(i, j)];
            }
            z_weighted[i] = sqrt_w * z;
        }

        beta = solve_least_squares(&x_weighted, &z_weighted, rank_tolerance);

        for i in 0..n {
            eta[i] = (0..p).map(|j| design[(i, j)] * beta[j]).sum();
            mu[i] = family.link_inverse(eta[i]);
        }

        let deviance = family.deviance(y, &mu);
        let change = (deviance - deviance_old).abs() / (deviance.abs() + 0.1);
        deviance_old = deviance;
        if change < tolerance {
            converged = true;
            break;
        }
    }

    debug!(
        "IRLS finished after {} iterations (converged: {}, deviance: {:.6})",
        iterations, converged, deviance_old
    );

    IrlsFit {
        beta,
        mu,
        deviance: deviance_old,
        iterations,
        converged,
    }
}

/// Standard errors from (X'WX)⁻¹ with unit dispersion.
pub(crate) fn glm_standard_errors<F: GlmFamily>(
    family: &F,
    design: &Mat<f64>,
    mu: &[f64],
) -> Option<Col<f64>> {
    let n = design.nrows();
    let p = design.ncols();

    let mut xtwx = Mat::zeros(p, p);
    for i in 0..n {
        let w = family.irls_weight(mu[i]);
        for j in 0..p {
            for k in j..p {
                xtwx[(j, k)] += w * design[(i, j)] * design[(i, k)];
            }
        }
    }
    for j in 0..p {
        for k in 0..j {
            xtwx[(j, k)] = xtwx[(k, j)];
        }
    }

    invert_square(&xtwx).map(|cov| CoefficientInference::standard_errors(&cov))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PoissonFamily;

    #[test]
    fn test_intercept_only_poisson_matches_mean() {
        let y = [0.0, 1.0, 2.0, 5.0, 2.0];
        let design = Mat::from_fn(5, 1, |_, _| 1.0);

        let fit = irls(&PoissonFamily, &design, &y, 50, 1e-10, 1e-10);

        assert!(fit.converged);
        assert!((fit.beta[0] - 2.0_f64.ln()).abs() < 1e-8);
    }

    #[test]
    fn test_standard_errors_intercept_only() {
        // Var(β₀) = 1 / Σμ for an intercept-only Poisson model.
        let design = Mat::from_fn(4, 1, |_, _| 1.0);
        let mu = [2.0; 4];
        let se = glm_standard_errors(&PoissonFamily, &design, &mu).expect("invertible");
        assert!((se[0] - (1.0_f64 / 8.0).sqrt()).abs() < 1e-10);
    }
}
