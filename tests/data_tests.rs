//! Loader and cleaner tests.

mod common;

use approx::assert_relative_eq;
use complaint_zinb::data::{clean, load_tsv, parse_tsv, DataError, Gender, Residency};
use std::io::Write;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_from_file() {
    let data = common::fifty_doctors();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(common::to_tsv(&data).as_bytes())
        .expect("write tsv");

    let rows = load_tsv(file.path()).expect("load should succeed");
    assert_eq!(rows.len(), 50);

    let (cleaned, report) = clean(rows);
    assert_eq!(report.rows_kept, 50);
    assert_eq!(report.rows_dropped, 0);
    for (a, b) in cleaned.observations().iter().zip(data.observations()) {
        assert_eq!(a.complaints, b.complaints);
        assert_eq!(a.gender, b.gender);
        assert_relative_eq!(a.hours, b.hours, epsilon = 1e-9);
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_tsv(dir.path().join("absent.tsv")).unwrap_err();
    assert!(matches!(err, DataError::Io(_)));
}

#[test]
fn test_categorical_coercion() {
    let text = "visits\tcomplaints\tresidency\tgender\trevenue\thours\n\
                10\t1\tyes\tfemale\t250\t1000\n\
                11\t0\tN\tM\t251\t1001\n\
                12\t2\ttrue\tMale\t252\t1002\n";
    let rows = parse_tsv(text.as_bytes()).expect("parses");
    assert_eq!(rows[0].residency, Residency::Yes);
    assert_eq!(rows[0].gender, Gender::Female);
    assert_eq!(rows[1].residency, Residency::No);
    assert_eq!(rows[2].residency, Residency::Yes);
    assert_eq!(rows[2].gender, Gender::Male);
}

#[test]
fn test_invalid_value_reports_line_and_column() {
    let text = "visits\tcomplaints\tresidency\tgender\trevenue\thours\n\
                10\t1\tY\tF\t250\t1000\n\
                11\tmany\tN\tM\t251\t1001\n";
    match parse_tsv(text.as_bytes()) {
        Err(DataError::InvalidValue { line, column, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(column, "complaints");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_unknown_level() {
    let text = "visits\tcomplaints\tresidency\tgender\trevenue\thours\n\
                10\t1\tY\tX\t250\t1000\n";
    assert!(matches!(
        parse_tsv(text.as_bytes()),
        Err(DataError::UnknownLevel { line: 2, .. })
    ));
}

#[test]
fn test_empty_input_has_no_header() {
    assert!(matches!(
        parse_tsv("\n\n".as_bytes()),
        Err(DataError::MissingHeader)
    ));
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_negative_counts_dropped() {
    let text = "visits\tcomplaints\tresidency\tgender\trevenue\thours\n\
                10\t1\tY\tF\t250\t1000\n\
                -3\t0\tN\tM\t251\t1001\n\
                12\t-1\tY\tM\t252\t1002\n\
                13\t0\tN\tF\t253\t1003\n";
    let (data, report) = clean(parse_tsv(text.as_bytes()).expect("parses"));

    assert_eq!(report.rows_read, 4);
    assert_eq!(report.rows_kept, 2);
    assert_eq!(report.rows_dropped, 2);
    assert_eq!(data.len(), 2);
    assert_eq!(data.complaints_vec(), vec![1.0, 0.0]);
}

#[test]
fn test_zero_counts_kept() {
    let counts = vec![0u64; 10];
    let (data, report) = clean(
        parse_tsv(common::to_tsv(&common::dataset_with_counts(&counts)).as_bytes())
            .expect("parses"),
    );
    assert_eq!(report.rows_dropped, 0);
    assert!(data.zero_indicator().iter().all(|&z| z));
}
