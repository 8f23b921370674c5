//! Perfect separation scan for the zero-inflation sub-model.
//!
//! A predictor separates the `complaints == 0` indicator when the logistic
//! likelihood can be pushed towards 1 by sending its coefficient to
//! infinity. The scan looks at each predictor on its own.

use crate::core::Predictor;
use crate::data::Dataset;
use serde::Serialize;
use std::fmt;

/// A predictor that perfectly separates zeros from non-zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeparationFinding {
    pub predictor: Predictor,
    pub reason: String,
}

impl fmt::Display for SeparationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.predictor, self.reason)
    }
}

/// Check each predictor for perfect separation of the zero indicator.
///
/// Returns nothing when the response has only zeros or only non-zeros,
/// since there is then no second class to separate.
pub fn detect_separation(data: &Dataset, predictors: &[Predictor]) -> Vec<SeparationFinding> {
    let zero = data.zero_indicator();
    let n_zero = zero.iter().filter(|&&z| z).count();
    if n_zero == 0 || n_zero == zero.len() {
        return Vec::new();
    }

    predictors
        .iter()
        .filter_map(|&predictor| {
            let values: Vec<f64> = data
                .observations()
                .iter()
                .map(|o| predictor.value(o))
                .collect();
            let reason = if predictor.is_categorical() {
                categorical_separation(predictor, &values, &zero)
            } else {
                continuous_separation(&values, &zero)
            }?;
            Some(SeparationFinding { predictor, reason })
        })
        .collect()
}

/// Categorical predictors with a level whose rows all have zero complaints.
///
/// In the count model such a level sends its mean to zero, so the
/// coefficient has no finite estimate.
pub fn detect_zero_levels(data: &Dataset, predictors: &[Predictor]) -> Vec<SeparationFinding> {
    let zero = data.zero_indicator();
    predictors
        .iter()
        .filter(|p| p.is_categorical())
        .filter_map(|&predictor| {
            [0.0, 1.0].into_iter().find_map(|level| {
                let rows: Vec<bool> = data
                    .observations()
                    .iter()
                    .zip(&zero)
                    .filter(|(o, _)| predictor.value(o) == level)
                    .map(|(_, &z)| z)
                    .collect();
                (!rows.is_empty() && rows.iter().all(|&z| z)).then(|| SeparationFinding {
                    predictor,
                    reason: format!(
                        "every row with level {} ({} rows) has a zero count",
                        level_label(predictor, level),
                        rows.len()
                    ),
                })
            })
        })
        .collect()
}

/// A level whose rows are all zeros or all non-zeros.
fn categorical_separation(predictor: Predictor, values: &[f64], zero: &[bool]) -> Option<String> {
    for level in [0.0, 1.0] {
        let outcomes: Vec<bool> = values
            .iter()
            .zip(zero)
            .filter(|(&v, _)| v == level)
            .map(|(_, &z)| z)
            .collect();
        if outcomes.is_empty() {
            continue;
        }
        if outcomes.iter().all(|&z| z) || outcomes.iter().all(|&z| !z) {
            let kind = if outcomes[0] { "zero" } else { "non-zero" };
            let label = level_label(predictor, level);
            return Some(format!(
                "every row with level {label} ({} rows) has a {kind} count",
                outcomes.len()
            ));
        }
    }
    None
}

/// A threshold with all zeros on one side and all non-zeros on the other.
fn continuous_separation(values: &[f64], zero: &[bool]) -> Option<String> {
    let range = |class: bool| {
        values
            .iter()
            .zip(zero)
            .filter(|(_, &z)| z == class)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (&v, _)| {
                (lo.min(v), hi.max(v))
            })
    };
    let (zero_min, zero_max) = range(true);
    let (pos_min, pos_max) = range(false);

    if zero_max < pos_min {
        Some(format!(
            "all zero counts have values <= {zero_max} and all non-zero counts >= {pos_min}"
        ))
    } else if pos_max < zero_min {
        Some(format!(
            "all non-zero counts have values <= {pos_max} and all zero counts >= {zero_min}"
        ))
    } else {
        None
    }
}

fn level_label(predictor: Predictor, level: f64) -> &'static str {
    match (predictor, level == 1.0) {
        (Predictor::Residency, true) => "Y",
        (Predictor::Residency, false) => "N",
        (Predictor::Gender, true) => "M",
        (Predictor::Gender, false) => "F",
        (_, true) => "1",
        (_, false) => "0",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Gender, Observation, Residency};

    fn obs(complaints: u64, residency: Residency, revenue: f64) -> Observation {
        Observation {
            visits: 100,
            complaints,
            residency,
            gender: Gender::Female,
            revenue,
            hours: 1000.0,
        }
    }

    #[test]
    fn test_categorical_level_without_variation() {
        // Residents always have complaints.
        let data: Dataset = vec![
            obs(0, Residency::No, 200.0),
            obs(2, Residency::No, 210.0),
            obs(1, Residency::Yes, 205.0),
            obs(3, Residency::Yes, 215.0),
        ]
        .into_iter()
        .collect();

        let findings = detect_separation(&data, &[Predictor::Residency]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].predictor, Predictor::Residency);
        assert!(findings[0].reason.contains("level Y"));
    }

    #[test]
    fn test_continuous_threshold() {
        let data: Dataset = vec![
            obs(0, Residency::No, 100.0),
            obs(0, Residency::Yes, 120.0),
            obs(1, Residency::No, 200.0),
            obs(4, Residency::Yes, 250.0),
        ]
        .into_iter()
        .collect();

        let findings = detect_separation(&data, &[Predictor::Revenue, Predictor::Residency]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].predictor, Predictor::Revenue);
    }

    #[test]
    fn test_overlap_is_not_separation() {
        let data: Dataset = vec![
            obs(0, Residency::No, 100.0),
            obs(2, Residency::No, 150.0),
            obs(0, Residency::Yes, 200.0),
            obs(1, Residency::Yes, 120.0),
        ]
        .into_iter()
        .collect();

        assert!(detect_separation(&data, &[Predictor::Revenue, Predictor::Residency]).is_empty());
    }

    #[test]
    fn test_zero_level_only_for_all_zero_rows() {
        // residents always complain, non-residents never do
        let data: Dataset = vec![
            obs(0, Residency::No, 200.0),
            obs(0, Residency::No, 210.0),
            obs(1, Residency::Yes, 205.0),
            obs(3, Residency::Yes, 215.0),
        ]
        .into_iter()
        .collect();

        let findings = detect_zero_levels(&data, &[Predictor::Revenue, Predictor::Residency]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].predictor, Predictor::Residency);
        assert!(findings[0].reason.contains("level N"), "{}", findings[0].reason);

        let mixed: Dataset = vec![obs(0, Residency::No, 1.0), obs(2, Residency::No, 2.0)]
            .into_iter()
            .collect();
        assert!(detect_zero_levels(&mixed, &[Predictor::Residency]).is_empty());
    }

    #[test]
    fn test_single_class_response() {
        let data: Dataset = vec![obs(1, Residency::No, 1.0), obs(2, Residency::Yes, 2.0)]
            .into_iter()
            .collect();
        assert!(detect_separation(&data, &[Predictor::Revenue]).is_empty());
    }
}
