//! Row filtering for count regression.

use super::{Dataset, Observation, RawObservation};
use serde::Serialize;

/// What the cleaner did to the raw rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows dropped for a negative `visits` or `complaints` value.
    pub rows_dropped: usize,
}

/// Keep only rows with `visits >= 0` and `complaints >= 0`.
///
/// Dropped rows are filtered silently; the report records how many.
pub fn clean(raw: Vec<RawObservation>) -> (Dataset, CleaningReport) {
    let rows_read = raw.len();

    let observations: Vec<Observation> = raw
        .into_iter()
        .filter_map(|r| {
            let visits = u64::try_from(r.visits).ok()?;
            let complaints = u64::try_from(r.complaints).ok()?;
            Some(Observation {
                visits,
                complaints,
                residency: r.residency,
                gender: r.gender,
                revenue: r.revenue,
                hours: r.hours,
            })
        })
        .collect();

    let report = CleaningReport {
        rows_read,
        rows_kept: observations.len(),
        rows_dropped: rows_read - observations.len(),
    };
    if report.rows_dropped > 0 {
        log::debug!(
            "dropped {} of {} rows with negative counts",
            report.rows_dropped,
            rows_read
        );
    }

    (Dataset::new(observations), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Gender, Residency};

    fn raw(visits: i64, complaints: i64) -> RawObservation {
        RawObservation {
            visits,
            complaints,
            residency: Residency::Yes,
            gender: Gender::Female,
            revenue: 200.0,
            hours: 1000.0,
        }
    }

    #[test]
    fn test_negative_rows_dropped() {
        let (data, report) = clean(vec![raw(3, 0), raw(-1, 2), raw(4, -2), raw(0, 1)]);

        assert_eq!(data.len(), 2);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(data.observations()[1].visits, 0);
    }

    #[test]
    fn test_clean_keeps_order() {
        let (data, _) = clean(vec![raw(1, 5), raw(2, 0), raw(3, 1)]);
        let complaints: Vec<u64> = data.observations().iter().map(|o| o.complaints).collect();
        assert_eq!(complaints, vec![5, 0, 1]);
    }
}
