//! Explicit model specifications.
//!
//! A [`ModelSpec`] names the terms of each sub-model of a zero-inflated fit.
//! There is no formula parsing: predictors are an enum and interactions are
//! pairs of predictors.

use crate::data::Observation;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A modeling column of the complaint data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Predictor {
    Visits,
    Residency,
    Gender,
    Revenue,
    Hours,
}

impl Predictor {
    /// Every predictor, in table order.
    pub const ALL: [Predictor; 5] = [
        Predictor::Visits,
        Predictor::Residency,
        Predictor::Gender,
        Predictor::Revenue,
        Predictor::Hours,
    ];

    /// The continuous predictors.
    pub const CONTINUOUS: [Predictor; 3] = [Predictor::Visits, Predictor::Revenue, Predictor::Hours];

    /// The two-level categorical predictors.
    pub const CATEGORICAL: [Predictor; 2] = [Predictor::Residency, Predictor::Gender];

    /// Column name in the input table.
    pub fn name(self) -> &'static str {
        match self {
            Predictor::Visits => "visits",
            Predictor::Residency => "residency",
            Predictor::Gender => "gender",
            Predictor::Revenue => "revenue",
            Predictor::Hours => "hours",
        }
    }

    /// Coefficient label; categorical predictors carry their non-reference level.
    pub fn label(self) -> &'static str {
        match self {
            Predictor::Residency => "residencyY",
            Predictor::Gender => "genderM",
            other => other.name(),
        }
    }

    /// Whether the predictor is a two-level categorical.
    pub fn is_categorical(self) -> bool {
        matches!(self, Predictor::Residency | Predictor::Gender)
    }

    /// Numeric value for one observation; categoricals give their 0/1 indicator.
    pub fn value(self, obs: &Observation) -> f64 {
        match self {
            Predictor::Visits => obs.visits as f64,
            Predictor::Residency => obs.residency.indicator(),
            Predictor::Gender => obs.gender.indicator(),
            Predictor::Revenue => obs.revenue,
            Predictor::Hours => obs.hours,
        }
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Predictor {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Predictor::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or_else(|| SpecError::UnknownPredictor(s.to_string()))
    }
}

/// A single model term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Term {
    Main(Predictor),
    /// Product of two distinct predictors.
    Interaction(Predictor, Predictor),
}

impl Term {
    /// Predictors the term is built from.
    pub fn predictors(&self) -> Vec<Predictor> {
        match *self {
            Term::Main(p) => vec![p],
            Term::Interaction(a, b) => vec![a, b],
        }
    }

    /// Whether the term involves `predictor`.
    pub fn uses(&self, predictor: Predictor) -> bool {
        match *self {
            Term::Main(p) => p == predictor,
            Term::Interaction(a, b) => a == predictor || b == predictor,
        }
    }

    /// Coefficient label, e.g. `visits:genderM`.
    pub fn label(&self) -> String {
        match *self {
            Term::Main(p) => p.label().to_string(),
            Term::Interaction(a, b) => format!("{}:{}", a.label(), b.label()),
        }
    }
}

/// Problems with the structure of a specification.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    #[error("unknown predictor '{0}'")]
    UnknownPredictor(String),
    #[error("interaction of '{0}' with itself")]
    SelfInteraction(Predictor),
    #[error("interaction of two categorical predictors '{0}' and '{1}' is not supported")]
    CategoricalInteraction(Predictor, Predictor),
    #[error("term '{0}' appears more than once in the {1} model")]
    DuplicateTerm(String, &'static str),
}

/// Predictor sets for the two sub-models of a zero-inflated fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    /// Name used in logs and comparison tables.
    pub name: String,
    /// Terms of the negative binomial count model (intercept implied).
    pub count_terms: Vec<Term>,
    /// Terms of the logistic zero model; `None` fits plain negative binomial.
    pub zero_terms: Option<Vec<Term>>,
    /// Center and scale continuous predictors used in interactions.
    pub standardize_interactions: bool,
}

impl ModelSpec {
    /// An intercept-only ZINB specification.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count_terms: Vec::new(),
            zero_terms: Some(Vec::new()),
            standardize_interactions: true,
        }
    }

    /// Add main effects to the count model.
    pub fn count<I: IntoIterator<Item = Predictor>>(mut self, predictors: I) -> Self {
        self.count_terms
            .extend(predictors.into_iter().map(Term::Main));
        self
    }

    /// Add main effects to the zero model.
    pub fn zero<I: IntoIterator<Item = Predictor>>(mut self, predictors: I) -> Self {
        self.zero_terms
            .get_or_insert_with(Vec::new)
            .extend(predictors.into_iter().map(Term::Main));
        self
    }

    /// Add an interaction to the count model.
    pub fn count_interaction(mut self, a: Predictor, b: Predictor) -> Self {
        self.count_terms.push(Term::Interaction(a, b));
        self
    }

    /// Add an interaction to the zero model.
    pub fn zero_interaction(mut self, a: Predictor, b: Predictor) -> Self {
        self.zero_terms
            .get_or_insert_with(Vec::new)
            .push(Term::Interaction(a, b));
        self
    }

    /// Drop the zero model entirely (plain negative binomial).
    pub fn without_zero_model(mut self) -> Self {
        self.zero_terms = None;
        self
    }

    /// Toggle centering and scaling for interaction predictors.
    pub fn standardize_interactions(mut self, standardize: bool) -> Self {
        self.standardize_interactions = standardize;
        self
    }

    /// Whether the specification has a zero-inflation component.
    pub fn is_zero_inflated(&self) -> bool {
        self.zero_terms.is_some()
    }

    /// Number of count coefficients including the intercept.
    pub fn n_count_params(&self) -> usize {
        self.count_terms.len() + 1
    }

    /// Number of zero-model coefficients including the intercept.
    pub fn n_zero_params(&self) -> usize {
        self.zero_terms.as_ref().map_or(0, |t| t.len() + 1)
    }

    /// Free parameters: both coefficient vectors plus θ.
    pub fn n_parameters(&self) -> usize {
        self.n_count_params() + self.n_zero_params() + 1
    }

    /// Predictors used by the count model, without duplicates.
    pub fn count_predictors(&self) -> Vec<Predictor> {
        let mut predictors: Vec<Predictor> = self
            .count_terms
            .iter()
            .flat_map(|t| t.predictors())
            .collect();
        predictors.sort();
        predictors.dedup();
        predictors
    }

    /// Predictors used by the zero model, without duplicates.
    pub fn zero_predictors(&self) -> Vec<Predictor> {
        let mut predictors: Vec<Predictor> = self
            .zero_terms
            .iter()
            .flatten()
            .flat_map(|t| t.predictors())
            .collect();
        predictors.sort();
        predictors.dedup();
        predictors
    }

    /// Copy of the specification with every zero-model term using
    /// `predictor` removed. The count model is untouched.
    pub fn without_zero_predictor(&self, predictor: Predictor) -> Self {
        let mut spec = self.clone();
        if let Some(terms) = spec.zero_terms.as_mut() {
            terms.retain(|t| !t.uses(predictor));
        }
        spec
    }

    /// Check structural validity of both term lists.
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_terms(&self.count_terms, "count")?;
        if let Some(terms) = &self.zero_terms {
            validate_terms(terms, "zero")?;
        }
        Ok(())
    }

    /// The candidate sequence of the complaint analysis.
    ///
    /// Starts from the full model, removes `visits` from the zero model,
    /// tries two interactions and a reduced model, and ends with a plain
    /// negative binomial baseline.
    pub fn report_candidates() -> Vec<ModelSpec> {
        use Predictor::*;

        vec![
            ModelSpec::new("full").count(Predictor::ALL).zero(Predictor::ALL),
            ModelSpec::new("zero_without_visits")
                .count(Predictor::ALL)
                .zero([Residency, Gender, Revenue, Hours]),
            ModelSpec::new("revenue_x_hours")
                .count(Predictor::ALL)
                .count_interaction(Revenue, Hours)
                .zero([Residency, Gender, Revenue, Hours]),
            ModelSpec::new("visits_x_gender")
                .count(Predictor::ALL)
                .count_interaction(Visits, Gender)
                .zero([Residency, Gender]),
            ModelSpec::new("reduced")
                .count([Visits, Gender, Hours])
                .zero([Gender]),
            ModelSpec::new("negbin")
                .count(Predictor::ALL)
                .without_zero_model(),
        ]
    }
}

fn validate_terms(terms: &[Term], part: &'static str) -> Result<(), SpecError> {
    for (i, term) in terms.iter().enumerate() {
        if let Term::Interaction(a, b) = *term {
            if a == b {
                return Err(SpecError::SelfInteraction(a));
            }
            if a.is_categorical() && b.is_categorical() {
                return Err(SpecError::CategoricalInteraction(a, b));
            }
        }
        if terms[..i].iter().any(|t| same_term(t, term)) {
            return Err(SpecError::DuplicateTerm(term.label(), part));
        }
    }
    Ok(())
}

fn same_term(a: &Term, b: &Term) -> bool {
    match (*a, *b) {
        (Term::Main(p), Term::Main(q)) => p == q,
        (Term::Interaction(a1, b1), Term::Interaction(a2, b2)) => {
            (a1 == a2 && b1 == b2) || (a1 == b2 && b1 == a2)
        }
        _ => false,
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |terms: &[Term]| {
            if terms.is_empty() {
                "1".to_string()
            } else {
                terms.iter().map(Term::label).collect::<Vec<_>>().join(" + ")
            }
        };
        write!(f, "complaints ~ {}", join(&self.count_terms))?;
        if let Some(zero) = &self.zero_terms {
            write!(f, " | {}", join(zero))?;
        }
        Ok(())
    }
}
