use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{FeatureKey, catalog};
use crate::error::{FeatureError, Result};
use crate::opponent::{FeatureTable, Side};

pub const PLAN_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelKind {
    XGBoost,
    LinearRegression,
    RandomForest,
    LogisticRegression,
    KNearest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::XGBoost,
        ModelKind::LinearRegression,
        ModelKind::RandomForest,
        ModelKind::LogisticRegression,
        ModelKind::KNearest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::XGBoost => "XGBoost",
            ModelKind::LinearRegression => "LinearRegression",
            ModelKind::RandomForest => "RandomForest",
            ModelKind::LogisticRegression => "LogisticRegression",
            ModelKind::KNearest => "KNearest",
        }
    }

    pub fn target(self) -> Target {
        match self {
            ModelKind::XGBoost | ModelKind::LinearRegression | ModelKind::RandomForest => {
                Target::PointDifferential
            }
            ModelKind::LogisticRegression | ModelKind::KNearest => Target::Win,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| FeatureError::InvalidModel(s.to_string()))
    }
}

impl TryFrom<String> for ModelKind {
    type Error = FeatureError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModelKind> for String {
    fn from(model: ModelKind) -> Self {
        model.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    PointDifferential,
    Win,
}

impl Target {
    pub fn column(self) -> &'static str {
        match self {
            Target::PointDifferential => "point_differential",
            Target::Win => "win",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExperiment")]
pub struct Experiment {
    pub model: ModelKind,
    pub features: Vec<FeatureKey>,
}

#[derive(Deserialize)]
struct RawExperiment {
    model: String,
    features: Vec<String>,
}

impl TryFrom<RawExperiment> for Experiment {
    type Error = FeatureError;

    fn try_from(raw: RawExperiment) -> Result<Self> {
        let model = raw.model.parse()?;
        Experiment::new(model, &raw.features)
    }
}

impl Experiment {
    pub fn new<S: AsRef<str>>(model: ModelKind, features: &[S]) -> Result<Self> {
        if features.is_empty() {
            return Err(FeatureError::InvalidExperimentPlan(format!(
                "{model} experiment has no features"
            )));
        }
        let features = catalog().validate(features)?;
        Ok(Self { model, features })
    }

    pub fn target(&self) -> Target {
        self.model.target()
    }

    pub fn columns(&self) -> Vec<String> {
        model_columns(self.target(), &self.features)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan")]
pub struct ExperimentPlan {
    experiments: Vec<Experiment>,
}

#[derive(Deserialize)]
struct RawPlan {
    experiments: Vec<RawExperiment>,
}

impl TryFrom<RawPlan> for ExperimentPlan {
    type Error = FeatureError;

    fn try_from(raw: RawPlan) -> Result<Self> {
        let experiments = raw
            .experiments
            .into_iter()
            .map(Experiment::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(experiments)
    }
}

impl ExperimentPlan {
    pub fn new(experiments: Vec<Experiment>) -> Result<Self> {
        if experiments.len() != PLAN_SIZE {
            return Err(FeatureError::InvalidExperimentPlan(format!(
                "expected {PLAN_SIZE} experiments, got {}",
                experiments.len()
            )));
        }
        Ok(Self { experiments })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let plan: RawPlan = serde_json::from_str(raw)
            .map_err(|err| FeatureError::InvalidExperimentPlan(err.to_string()))?;
        Self::try_from(plan)
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }
}

pub fn model_columns(target: Target, features: &[FeatureKey]) -> Vec<String> {
    let mut out = Vec::with_capacity(1 + features.len() * 2);
    out.push(format!("team_a_{}", target.column()));
    for key in features {
        for side in [Side::A, Side::B] {
            out.push(format!("{}_{}", side.prefix(), key.name()));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    pub columns: Vec<String>,
    pub event_ids: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    pub dropped: usize,
}

impl DesignMatrix {
    pub fn training<R: FeatureTable>(rows: &[R], experiment: &Experiment) -> Self {
        Self::assemble(rows, &experiment.features, Some(experiment.target()))
    }

    pub fn prediction<R: FeatureTable>(rows: &[R], features: &[FeatureKey]) -> Self {
        Self::assemble(rows, features, None)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn assemble<R: FeatureTable>(rows: &[R], features: &[FeatureKey], target: Option<Target>) -> Self {
        let columns: Vec<String> = model_columns(target.unwrap_or(Target::Win), features)
            .into_iter()
            .skip(1)
            .collect();
        let mut event_ids = Vec::new();
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut dropped = 0;

        for row in rows {
            let values: Option<Vec<f64>> = features
                .iter()
                .flat_map(|key| [row.feature(Side::A, *key), row.feature(Side::B, *key)])
                .collect();
            let label = match target {
                Some(t) => row.target(t.column()).map(Some),
                None => Some(None),
            };
            match (values, label) {
                (Some(values), Some(label)) => {
                    event_ids.push(row.event_id().to_string());
                    x.push(values);
                    if let Some(label) = label {
                        y.push(label);
                    }
                }
                _ => dropped += 1,
            }
        }

        Self {
            columns,
            event_ids,
            x,
            y: target.map(|_| y),
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_and_regressor_targets() {
        assert_eq!(ModelKind::XGBoost.target(), Target::PointDifferential);
        assert_eq!(ModelKind::RandomForest.target(), Target::PointDifferential);
        assert_eq!(ModelKind::KNearest.target(), Target::Win);
        assert_eq!(ModelKind::LogisticRegression.target().column(), "win");
    }

    #[test]
    fn unknown_model_is_rejected() {
        let err = "SVM".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, FeatureError::InvalidModel(name) if name == "SVM"));
    }

    #[test]
    fn columns_pair_each_feature() {
        let exp = Experiment::new(ModelKind::XGBoost, &["elo_rating", "days_rest"]).unwrap();
        assert_eq!(
            exp.columns(),
            vec![
                "team_a_point_differential",
                "team_a_elo_rating",
                "team_b_elo_rating",
                "team_a_days_rest",
                "team_b_days_rest",
            ]
        );
    }
}
