//! Complaint data: typed observations, TSV loading and cleaning.
//!
//! The loader only parses; the cleaner decides which rows survive. A
//! [`Dataset`] is produced once and is read-only afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! use complaint_zinb::data::{clean, load_tsv};
//!
//! let raw = load_tsv("data/complaints.tsv")?;
//! let (dataset, report) = clean(raw);
//! println!("kept {} of {} rows", report.rows_kept, report.rows_read);
//! ```

mod cleaner;
mod loader;

pub use cleaner::{clean, CleaningReport};
pub use loader::{load_tsv, parse_tsv, DataError, RawObservation};

use faer::Col;
use serde::Serialize;
use std::fmt;

/// Whether the doctor is in residency training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Residency {
    No,
    Yes,
}

impl Residency {
    /// Map a raw label onto a level, case-insensitively.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Some(Residency::Yes),
            "n" | "no" | "false" | "0" => Some(Residency::No),
            _ => None,
        }
    }

    /// 0/1 indicator of the non-reference level (`Yes`).
    pub fn indicator(self) -> f64 {
        match self {
            Residency::No => 0.0,
            Residency::Yes => 1.0,
        }
    }
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Residency::No => write!(f, "N"),
            Residency::Yes => write!(f, "Y"),
        }
    }
}

/// Gender of the doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Map a raw label onto a level, case-insensitively.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "f" | "female" => Some(Gender::Female),
            "m" | "male" => Some(Gender::Male),
            _ => None,
        }
    }

    /// 0/1 indicator of the non-reference level (`Male`).
    pub fn indicator(self) -> f64 {
        match self {
            Gender::Female => 0.0,
            Gender::Male => 1.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "F"),
            Gender::Male => write!(f, "M"),
        }
    }
}

/// One doctor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Number of patient visits.
    pub visits: u64,
    /// Number of complaints (the response).
    pub complaints: u64,
    pub residency: Residency,
    pub gender: Gender,
    /// Hourly revenue.
    pub revenue: f64,
    /// Total hours worked.
    pub hours: f64,
}

/// Cleaned, read-only collection of observations.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    /// Wrap already-validated observations.
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Borrow the observations.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// The response column as floats.
    pub fn complaints(&self) -> Col<f64> {
        Col::from_fn(self.len(), |i| self.observations[i].complaints as f64)
    }

    /// The response column as a plain vector.
    pub fn complaints_vec(&self) -> Vec<f64> {
        self.observations
            .iter()
            .map(|o| o.complaints as f64)
            .collect()
    }

    /// Indicator of `complaints == 0` per row.
    pub fn zero_indicator(&self) -> Vec<bool> {
        self.observations.iter().map(|o| o.complaints == 0).collect()
    }

    /// Split the response by gender as `(female, male)`.
    pub fn complaints_by_gender(&self) -> (Vec<f64>, Vec<f64>) {
        let mut female = Vec::new();
        let mut male = Vec::new();
        for o in &self.observations {
            match o.gender {
                Gender::Female => female.push(o.complaints as f64),
                Gender::Male => male.push(o.complaints as f64),
            }
        }
        (female, male)
    }
}

impl FromIterator<Observation> for Dataset {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(complaints: u64, gender: Gender) -> Observation {
        Observation {
            visits: 10,
            complaints,
            residency: Residency::No,
            gender,
            revenue: 250.0,
            hours: 1200.0,
        }
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(Residency::parse_label(" Y "), Some(Residency::Yes));
        assert_eq!(Residency::parse_label("no"), Some(Residency::No));
        assert_eq!(Residency::parse_label("maybe"), None);
        assert_eq!(Gender::parse_label("F"), Some(Gender::Female));
        assert_eq!(Gender::parse_label("MALE"), Some(Gender::Male));
        assert_eq!(Gender::parse_label("x"), None);
    }

    #[test]
    fn test_complaints_by_gender() {
        let data: Dataset = vec![
            obs(0, Gender::Female),
            obs(3, Gender::Male),
            obs(1, Gender::Female),
        ]
        .into_iter()
        .collect();

        let (female, male) = data.complaints_by_gender();
        assert_eq!(female, vec![0.0, 1.0]);
        assert_eq!(male, vec![3.0]);
        assert_eq!(data.zero_indicator(), vec![true, false, false]);
    }
}
