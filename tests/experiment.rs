use gridiron_forecast::aggregate::DataAggregate;
use gridiron_forecast::config::PipelineConfig;
use gridiron_forecast::error::FeatureError;
use gridiron_forecast::experiment::{DesignMatrix, Experiment, ExperimentPlan, ModelKind};
use gridiron_forecast::game_log::GameLog;
use gridiron_forecast::synthetic::{self, LeagueShape};

fn plan_json(count: usize, model: &str, features: &[&str]) -> String {
    let exp = serde_json::json!({ "model": model, "features": features });
    serde_json::json!({ "experiments": vec![exp; count] }).to_string()
}

#[test]
fn plan_needs_exactly_ten_experiments() {
    let features = ["elo_rating", "avg_points_scored_l5"];
    let plan = ExperimentPlan::from_json(&plan_json(10, "XGBoost", &features)).unwrap();
    assert_eq!(plan.experiments().len(), 10);
    assert_eq!(plan.experiments()[0].model, ModelKind::XGBoost);

    let err = ExperimentPlan::from_json(&plan_json(9, "XGBoost", &features)).unwrap_err();
    assert!(matches!(err, FeatureError::InvalidExperimentPlan(_)));
}

#[test]
fn plan_rejects_unknown_model_and_features() {
    let err = ExperimentPlan::from_json(&plan_json(10, "NeuralNet", &["elo_rating"])).unwrap_err();
    assert!(matches!(err, FeatureError::InvalidModel(name) if name == "NeuralNet"));

    let err = ExperimentPlan::from_json(&plan_json(10, "KNearest", &["elo", "rpi_rating", "rest"]))
        .unwrap_err();
    match err {
        FeatureError::InvalidFeatureNames(bad) => assert_eq!(bad, vec!["elo", "rest"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn deserializing_a_plan_enforces_its_size() {
    let json = plan_json(9, "RandomForest", &["elo_rating"]);
    let err = serde_json::from_str::<ExperimentPlan>(&json).unwrap_err();
    assert!(err.to_string().contains("expected 10 experiments, got 9"));

    let plan: ExperimentPlan =
        serde_json::from_str(&plan_json(10, "RandomForest", &["elo_rating"])).unwrap();
    assert_eq!(plan.experiments().len(), 10);
}

#[test]
fn experiment_without_features_is_rejected() {
    let none: [&str; 0] = [];
    let err = Experiment::new(ModelKind::KNearest, &none).unwrap_err();
    assert!(matches!(err, FeatureError::InvalidExperimentPlan(_)));
    assert_eq!(
        err.to_string(),
        "invalid experiment plan: KNearest experiment has no features"
    );

    let err = ExperimentPlan::from_json(&plan_json(10, "XGBoost", &[])).unwrap_err();
    assert!(matches!(err, FeatureError::InvalidExperimentPlan(msg) if msg.contains("no features")));
}

#[test]
fn experiment_round_trips_through_json() {
    let exp = Experiment::new(ModelKind::LogisticRegression, &["rpi_rating", "trend_elo_rating_l5"])
        .unwrap();
    let json = serde_json::to_string(&exp).unwrap();
    assert_eq!(
        json,
        r#"{"model":"LogisticRegression","features":["rpi_rating","trend_elo_rating_l5"]}"#
    );
    let back: Experiment = serde_json::from_str(&json).unwrap();
    assert_eq!(back, exp);
}

#[test]
fn design_matrix_drops_incomplete_rows() {
    let league = synthetic::generate(
        5,
        LeagueShape {
            seasons: 1,
            weeks: 8,
            unplayed_weeks: 1,
            ..LeagueShape::default()
        },
    );
    let (log, _) = GameLog::from_raw(league.rows).unwrap();
    let agg = DataAggregate::build(log, &league.events, PipelineConfig::default()).unwrap();

    let exp = Experiment::new(ModelKind::LinearRegression, &["elo_rating", "avg_points_scored_l3"])
        .unwrap();
    let train = DesignMatrix::training(agg.training(), &exp);
    // Week one rows have no trailing window.
    assert_eq!(train.dropped, 16);
    assert_eq!(train.len(), agg.training().len() - 16);
    assert_eq!(train.columns.len(), 4);
    assert_eq!(train.columns[0], "team_a_elo_rating");
    let y = train.y.as_ref().unwrap();
    assert_eq!(y.len(), train.len());
    for (row, id) in train.x.iter().zip(&train.event_ids) {
        assert_eq!(row.len(), 4);
        assert!(!id.is_empty());
    }

    let predict = DesignMatrix::prediction(agg.prediction_set(), &exp.features);
    assert_eq!(predict.len(), 16);
    assert!(predict.y.is_none());
}
