//! Model comparison tests on real fits.

mod common;

use approx::assert_relative_eq;
use complaint_zinb::comparison::{
    likelihood_ratio_test, vuong_test, FitOutcome, InformationCriterion, ModelComparison,
};
use complaint_zinb::core::{ModelSpec, Predictor};
use complaint_zinb::solvers::ZinbRegressor;

fn fit_all(specs: &[ModelSpec]) -> Vec<FitOutcome> {
    let data = common::fifty_doctors();
    let regressor = ZinbRegressor::builder().build();
    specs
        .iter()
        .map(|spec| FitOutcome::new(spec.name.clone(), regressor.fit(&data, spec)))
        .collect()
}

#[test]
fn test_aic_monotone_in_log_likelihood_at_equal_k() {
    // same parameter count, different predictors
    let specs = vec![
        ModelSpec::new("visits").count([Predictor::Visits]).zero([Predictor::Gender]),
        ModelSpec::new("revenue").count([Predictor::Revenue]).zero([Predictor::Gender]),
        ModelSpec::new("hours").count([Predictor::Hours]).zero([Predictor::Gender]),
    ];
    let outcomes = fit_all(&specs);
    let cmp = ModelComparison::compare(&outcomes, InformationCriterion::Aic);
    assert_eq!(cmp.ranked.len(), 3);

    for pair in cmp.ranked.windows(2) {
        assert_eq!(pair[0].n_parameters, pair[1].n_parameters);
        assert!(pair[0].aic <= pair[1].aic);
        assert!(pair[0].log_likelihood >= pair[1].log_likelihood);
    }
    let weights: f64 = cmp.ranked.iter().map(|r| r.weight).sum();
    assert_relative_eq!(weights, 1.0, epsilon = 1e-12);
}

#[test]
fn test_partial_failures_do_not_abort_ranking() {
    let specs = vec![
        ModelSpec::new("good").count([Predictor::Visits]).zero([Predictor::Gender]),
        ModelSpec::new("self_interaction").count_interaction(Predictor::Visits, Predictor::Visits),
        ModelSpec::new("negbin")
            .count([Predictor::Visits])
            .without_zero_model(),
    ];
    let outcomes = fit_all(&specs);
    let cmp = ModelComparison::compare(&outcomes, InformationCriterion::Bic);

    assert_eq!(cmp.ranked.len(), 2);
    assert_eq!(cmp.excluded.len(), 1);
    assert_eq!(cmp.excluded[0].name, "self_interaction");
    assert!(cmp.excluded[0].reason.contains("itself"));
    assert!(cmp.to_string().contains("excluded"));

    let json = serde_json::to_value(&cmp).expect("serializes");
    assert_eq!(json["ranked"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_pairwise_tests_on_real_fits() {
    let specs = vec![
        ModelSpec::new("restricted").count([Predictor::Visits]).zero([Predictor::Gender]),
        ModelSpec::new("full")
            .count([Predictor::Visits, Predictor::Gender, Predictor::Hours])
            .zero([Predictor::Gender]),
        ModelSpec::new("negbin")
            .count([Predictor::Visits, Predictor::Gender, Predictor::Hours])
            .without_zero_model(),
    ];
    let outcomes = fit_all(&specs);
    let fits: Vec<_> = outcomes
        .iter()
        .map(|o| o.fitted().expect("all candidates fit"))
        .collect();

    let lr = likelihood_ratio_test(fits[0], fits[1]).expect("nested test");
    assert_eq!(lr.df, 2);
    assert!(lr.statistic >= 0.0);
    assert!((0.0..=1.0).contains(&lr.p_value));

    let vuong = vuong_test(fits[1], fits[2]).expect("vuong test");
    assert_eq!(vuong.n, 50);
    assert_relative_eq!(vuong.p_first_better + vuong.p_second_better, 1.0, epsilon = 1e-12);
    // the zero model adds two parameters
    assert!(vuong.aic_corrected < vuong.statistic);
    assert!(vuong.bic_corrected < vuong.aic_corrected);
}
