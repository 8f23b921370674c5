//! End-to-end pipeline tests.

mod common;

use complaint_zinb::comparison::InformationCriterion;
use complaint_zinb::core::{ModelSpec, Predictor, SeparationPolicy};
use complaint_zinb::pipeline::{AnalysisPipeline, PipelineConfig, PipelineError};
use std::io::Write;

fn small_candidates() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("full")
            .count([Predictor::Visits, Predictor::Gender, Predictor::Hours])
            .zero([Predictor::Gender]),
        ModelSpec::new("reduced")
            .count([Predictor::Visits])
            .zero([Predictor::Gender]),
        ModelSpec::new("broken").count_interaction(Predictor::Gender, Predictor::Gender),
        ModelSpec::new("negbin")
            .count([Predictor::Visits, Predictor::Gender, Predictor::Hours])
            .without_zero_model(),
    ]
}

fn config() -> PipelineConfig {
    PipelineConfig {
        candidates: small_candidates(),
        nested_pairs: vec![("reduced".to_string(), "full".to_string())],
        ..PipelineConfig::default()
    }
}

#[test]
fn test_pipeline_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    let mut text = common::to_tsv(&common::fifty_doctors());
    // one row with a negative count is dropped by the cleaner
    text.push_str("1200\t-1\tY\tF\t250.00\t1000.00\n");
    file.write_all(text.as_bytes()).expect("write tsv");

    let report = AnalysisPipeline::new(config())
        .run(file.path())
        .expect("pipeline should succeed");

    assert_eq!(report.cleaning.rows_read, 51);
    assert_eq!(report.cleaning.rows_kept, 50);
    assert_eq!(report.cleaning.rows_dropped, 1);

    assert_eq!(report.fits.len(), 3);
    assert_eq!(report.comparison.ranked.len(), 3);
    assert_eq!(report.comparison.excluded.len(), 1);
    assert_eq!(report.comparison.excluded[0].name, "broken");

    assert_eq!(report.likelihood_ratio_tests.len(), 1);
    assert_eq!(report.likelihood_ratio_tests[0].df, 2);

    let best = report.best_fit().expect("a best model");
    assert_eq!(best.name, report.comparison.ranked[0].name);
    assert!(report.vuong.is_some());
}

#[test]
fn test_report_renders_as_text_and_json() {
    let report = AnalysisPipeline::new(PipelineConfig {
        criterion: InformationCriterion::Bic,
        ..config()
    })
    .run_dataset(&common::fifty_doctors())
    .expect("pipeline should succeed");

    let text = report.to_string();
    assert!(text.contains("Models ranked by BIC"));
    assert!(text.contains("Count model coefficients"));

    let json = serde_json::to_value(&report).expect("serializes");
    assert!(json["diagnostics"]["summary"]["n"].as_u64() == Some(50));
    assert_eq!(json["fits"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_separation_adjustment_recorded_in_report() {
    let config = PipelineConfig {
        candidates: vec![
            ModelSpec::new("separated")
                .count([Predictor::Visits, Predictor::Gender])
                .zero([Predictor::Hours, Predictor::Gender]),
            ModelSpec::new("negbin")
                .count([Predictor::Visits, Predictor::Gender])
                .without_zero_model(),
        ],
        nested_pairs: Vec::new(),
        separation_policy: SeparationPolicy::DropFromZeroModel,
        ..PipelineConfig::default()
    };
    let report = AnalysisPipeline::new(config)
        .run_dataset(&common::hours_separated())
        .expect("pipeline should succeed");

    assert!(report
        .diagnostics
        .separation
        .iter()
        .any(|s| s.predictor == Predictor::Hours));
    let fit = report.fit("separated").expect("adjusted fit present");
    assert!(fit.was_adjusted());
    assert!(report.comparison.get("separated").map_or(false, |r| r.was_adjusted));
}

#[test]
fn test_missing_file_is_data_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = AnalysisPipeline::default()
        .run(dir.path().join("missing.tsv"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Data(_)));
}

#[test]
fn test_invalid_config_rejected_before_fitting() {
    let config = PipelineConfig {
        candidates: Vec::new(),
        ..PipelineConfig::default()
    };
    let err = AnalysisPipeline::new(config)
        .run_dataset(&common::fifty_doctors())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
