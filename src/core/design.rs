//! Design matrix construction from a dataset and a term list.

use super::spec::{Predictor, Term};
use crate::data::Dataset;
use crate::utils::{detect_constant_columns, mean_and_sd};
use faer::Mat;
use serde::Serialize;
use thiserror::Error;

/// Label of the intercept column.
pub const INTERCEPT_LABEL: &str = "(Intercept)";

/// Problems building a design matrix.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("predictor '{0}' has zero variance")]
    ZeroVariance(Predictor),
    #[error("column '{0}' is constant")]
    ConstantColumn(String),
}

/// Centering and scaling applied to one continuous predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standardization {
    pub predictor: Predictor,
    pub mean: f64,
    pub sd: f64,
}

/// A design matrix with a leading intercept column.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub matrix: Mat<f64>,
    /// One label per column, intercept first.
    pub labels: Vec<String>,
    /// Predictors that were centered and scaled.
    pub standardized: Vec<Standardization>,
}

impl DesignMatrix {
    /// Number of columns including the intercept.
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }
}

/// Build `[1 | terms...]` for the given dataset.
///
/// With `standardize_interactions`, every continuous predictor that appears
/// in an interaction is centered and scaled in all of this sub-model's terms,
/// so main effects and products stay on the same scale.
pub fn build_design(
    data: &Dataset,
    terms: &[Term],
    standardize_interactions: bool,
) -> Result<DesignMatrix, DesignError> {
    let n = data.len();
    if n == 0 {
        return Err(DesignError::EmptyDataset);
    }

    let mut standardized: Vec<Standardization> = Vec::new();
    if standardize_interactions {
        let mut scaled: Vec<Predictor> = terms
            .iter()
            .filter(|t| matches!(t, Term::Interaction(..)))
            .flat_map(|t| t.predictors())
            .filter(|p| !p.is_categorical())
            .collect();
        scaled.sort();
        scaled.dedup();

        for predictor in scaled {
            let values: Vec<f64> = data
                .observations()
                .iter()
                .map(|o| predictor.value(o))
                .collect();
            let (mean, sd) = mean_and_sd(&values);
            if sd.is_nan() || sd <= 0.0 {
                return Err(DesignError::ZeroVariance(predictor));
            }
            standardized.push(Standardization {
                predictor,
                mean,
                sd,
            });
        }
    }

    let column = |predictor: Predictor, i: usize| -> f64 {
        let raw = predictor.value(&data.observations()[i]);
        match standardized.iter().find(|s| s.predictor == predictor) {
            Some(s) => (raw - s.mean) / s.sd,
            None => raw,
        }
    };

    let p = terms.len() + 1;
    let matrix = Mat::from_fn(n, p, |i, j| {
        if j == 0 {
            return 1.0;
        }
        match terms[j - 1] {
            Term::Main(a) => column(a, i),
            Term::Interaction(a, b) => column(a, i) * column(b, i),
        }
    });

    let mut labels = Vec::with_capacity(p);
    labels.push(INTERCEPT_LABEL.to_string());
    labels.extend(terms.iter().map(Term::label));

    if n > 1 {
        let constant = detect_constant_columns(&matrix, 1e-12);
        if let Some(j) = (1..p).find(|&j| constant[j]) {
            return Err(match terms[j - 1] {
                Term::Main(a) => DesignError::ZeroVariance(a),
                _ => DesignError::ConstantColumn(labels[j].clone()),
            });
        }
    }

    Ok(DesignMatrix {
        matrix,
        labels,
        standardized,
    })
}
