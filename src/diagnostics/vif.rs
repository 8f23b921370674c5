//! Collinearity among the predictors: variance inflation factors and the
//! auxiliary OLS regression of complaints on every predictor.

use super::DiagnosticError;
use crate::core::{CoefficientRow, CoefficientTable, Predictor, INTERCEPT_LABEL};
use crate::data::Dataset;
use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
use faer::{Col, Mat};
use log::debug;
use serde::Serialize;
use std::fmt;

/// Compute Variance Inflation Factor for each predictor.
///
/// For predictor j: VIF_j = 1 / (1 - R²_j), where R²_j is the R² from
/// regressing x_j on all other predictors (with intercept).
///
/// # Returns
/// Vector of VIF values, one per predictor column. A VIF whose auxiliary
/// regression cannot be fit is NaN.
pub fn variance_inflation_factor(x: &Mat<f64>) -> Col<f64> {
    let n = x.nrows();
    let p = x.ncols();

    if p < 2 {
        return Col::from_fn(p, |_| 1.0);
    }

    let mut vif = Col::zeros(p);
    let model = OlsRegressor::builder().compute_inference(false).build();

    for j in 0..p {
        let x_other = Mat::from_fn(n, p - 1, |i, k| x[(i, if k < j { k } else { k + 1 })]);
        let y_j = Col::from_fn(n, |i| x[(i, j)]);

        vif[j] = match model.fit(&x_other, &y_j) {
            Ok(fitted) => {
                let r_squared = fitted.r_squared();
                let vif_j = if r_squared < 1.0 - 1e-14 {
                    1.0 / (1.0 - r_squared)
                } else {
                    f64::INFINITY
                };
                vif_j.max(1.0)
            }
            Err(err) => {
                debug!("VIF of column {j} undefined: {err}");
                f64::NAN
            }
        };
    }

    vif
}

/// Severity bands of a VIF value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VifSeverity {
    /// VIF ≤ 5.
    Low,
    /// 5 < VIF ≤ 10.
    Moderate,
    /// VIF > 10.
    Serious,
    /// The auxiliary regression could not be fit.
    Undefined,
}

impl VifSeverity {
    pub fn from_vif(vif: f64) -> Self {
        if vif.is_nan() {
            VifSeverity::Undefined
        } else if vif > 10.0 {
            VifSeverity::Serious
        } else if vif > 5.0 {
            VifSeverity::Moderate
        } else {
            VifSeverity::Low
        }
    }
}

/// VIF of one predictor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VifEntry {
    pub predictor: Predictor,
    pub vif: f64,
    pub severity: VifSeverity,
}

/// Auxiliary OLS fit and VIF table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollinearityReport {
    /// OLS of complaints on every predictor; t-based inference.
    pub coefficients: CoefficientTable,
    pub r_squared: f64,
    pub vif: Vec<VifEntry>,
}

impl CollinearityReport {
    /// Predictors with VIF above 5.
    pub fn flagged(&self) -> Vec<Predictor> {
        self.vif
            .iter()
            .filter(|e| matches!(e.severity, VifSeverity::Moderate | VifSeverity::Serious))
            .map(|e| e.predictor)
            .collect()
    }
}

/// Run the auxiliary regression and compute VIFs for every predictor.
pub fn collinearity(data: &Dataset) -> Result<CollinearityReport, DiagnosticError> {
    let predictors = Predictor::ALL;
    let n = data.len();
    let x = Mat::from_fn(n, predictors.len(), |i, j| {
        predictors[j].value(&data.observations()[i])
    });
    let y = data.complaints();

    let fitted = OlsRegressor::builder().build().fit(&x, &y)?;
    let result = fitted.result();

    let mut rows = Vec::with_capacity(predictors.len() + 1);
    rows.push(CoefficientRow {
        term: INTERCEPT_LABEL.to_string(),
        estimate: result.intercept.unwrap_or(f64::NAN),
        std_error: result.intercept_std_error.unwrap_or(f64::NAN),
        z_value: match (result.intercept, result.intercept_std_error) {
            (Some(b), Some(se)) if se > 0.0 => b / se,
            _ => f64::NAN,
        },
        p_value: result.intercept_p_value.unwrap_or(f64::NAN),
    });
    for (j, predictor) in predictors.iter().enumerate() {
        let pick = |c: &Option<Col<f64>>| c.as_ref().map_or(f64::NAN, |c| c[j]);
        rows.push(CoefficientRow {
            term: predictor.label().to_string(),
            estimate: result.coefficients[j],
            std_error: pick(&result.std_errors),
            z_value: pick(&result.t_statistics),
            p_value: pick(&result.p_values),
        });
    }

    let vif = variance_inflation_factor(&x);
    Ok(CollinearityReport {
        coefficients: CoefficientTable { rows },
        r_squared: result.r_squared,
        vif: predictors
            .iter()
            .enumerate()
            .map(|(j, &predictor)| VifEntry {
                predictor,
                vif: vif[j],
                severity: VifSeverity::from_vif(vif[j]),
            })
            .collect(),
    })
}

impl fmt::Display for CollinearityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OLS of complaints on all predictors (R² = {:.4}):", self.r_squared)?;
        write!(f, "{}", self.coefficients)?;
        for entry in &self.vif {
            writeln!(
                f,
                "VIF {:<10} {:>8.3}  {:?}",
                entry.predictor.name(),
                entry.vif,
                entry.severity
            )?;
        }
        Ok(())
    }
}
