//! Quasi-Newton minimization (BFGS) with a backtracking line search.
//!
//! The inverse Hessian approximation starts at the identity and is reset
//! whenever the curvature condition fails or the search direction stops
//! being a descent direction.

use faer::{Col, Mat};
use log::trace;

/// A smooth function to minimize.
pub trait Objective {
    /// Function value; may return a non-finite value outside the domain.
    fn value(&self, params: &Col<f64>) -> f64;

    /// Analytic gradient at `params`.
    fn gradient(&self, params: &Col<f64>) -> Col<f64>;
}

/// Stopping rules for [`minimize`].
#[derive(Debug, Clone, Copy)]
pub struct BfgsConfig {
    pub max_iterations: usize,
    /// Relative change of the objective that counts as converged.
    pub tolerance: f64,
    /// Max-norm of the gradient that counts as converged.
    pub gradient_tolerance: f64,
}

/// Where the minimizer stopped.
#[derive(Debug, Clone)]
pub struct BfgsOutcome {
    pub params: Col<f64>,
    pub value: f64,
    pub gradient: Col<f64>,
    pub iterations: usize,
    pub converged: bool,
}

const ACCEPT_TOLERANCE: f64 = 1e-4;
const STEP_SHRINK: f64 = 0.2;
const MAX_BACKTRACKS: usize = 30;

/// Minimize `objective` from `start`.
///
/// Returns `None` if the objective is not finite at the starting point.
pub fn minimize<O: Objective>(
    objective: &O,
    start: Col<f64>,
    config: &BfgsConfig,
) -> Option<BfgsOutcome> {
    let p = start.nrows();
    let mut x = start;
    let mut f = objective.value(&x);
    if !f.is_finite() {
        return None;
    }
    let mut g = objective.gradient(&x);

    let mut h_inv = identity(p);
    let mut just_reset = true;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        if max_abs(&g) < config.gradient_tolerance {
            converged = true;
            break;
        }
        iterations += 1;

        let mut direction = Col::from_fn(p, |i| -(0..p).map(|j| h_inv[(i, j)] * g[j]).sum::<f64>());
        let mut slope = dot(&g, &direction);
        if slope >= 0.0 {
            h_inv = identity(p);
            just_reset = true;
            direction = Col::from_fn(p, |i| -g[i]);
            slope = -dot(&g, &g);
        }

        let mut step = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = Col::from_fn(p, |i| x[i] + step * direction[i]);
            let f_candidate = objective.value(&candidate);
            if f_candidate.is_finite() && f_candidate <= f + ACCEPT_TOLERANCE * step * slope {
                accepted = Some((candidate, f_candidate));
                break;
            }
            step *= STEP_SHRINK;
        }

        let Some((x_new, f_new)) = accepted else {
            if just_reset {
                // steepest descent cannot improve either: a stall only counts
                // as convergence next to a stationary point
                converged = max_abs(&g) < config.gradient_tolerance.sqrt();
                break;
            }
            h_inv = identity(p);
            just_reset = true;
            continue;
        };

        let g_new = objective.gradient(&x_new);
        let s = Col::from_fn(p, |i| x_new[i] - x[i]);
        let y = Col::from_fn(p, |i| g_new[i] - g[i]);
        let small_change = (f - f_new).abs() <= config.tolerance * (f.abs() + config.tolerance);

        x = x_new;
        f = f_new;
        g = g_new;
        trace!("BFGS iteration {}: objective {:.10}, step {:.3e}", iterations, f, step);

        if small_change {
            converged = true;
            break;
        }

        let sy = dot(&s, &y);
        if sy > 0.0 {
            let hy = Col::from_fn(p, |i| (0..p).map(|j| h_inv[(i, j)] * y[j]).sum::<f64>());
            let yhy = dot(&y, &hy);
            let scale = (1.0 + yhy / sy) / sy;
            for i in 0..p {
                for j in 0..p {
                    h_inv[(i, j)] += scale * s[i] * s[j] - (s[i] * hy[j] + hy[i] * s[j]) / sy;
                }
            }
            just_reset = false;
        } else {
            h_inv = identity(p);
            just_reset = true;
        }
    }

    if !converged && max_abs(&g) < config.gradient_tolerance {
        converged = true;
    }

    Some(BfgsOutcome {
        params: x,
        value: f,
        gradient: g,
        iterations,
        converged,
    })
}

fn identity(p: usize) -> Mat<f64> {
    Mat::from_fn(p, p, |i, j| if i == j { 1.0 } else { 0.0 })
}

fn dot(a: &Col<f64>, b: &Col<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
}

fn max_abs(v: &Col<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, &x| m.max(x.abs()))
}
