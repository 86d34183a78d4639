use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use gridiron_forecast::aggregate::DataAggregate;
use gridiron_forecast::catalog::{BaseFeature, FeatureKey};
use gridiron_forecast::config::{self, PipelineConfig};
use gridiron_forecast::export;
use gridiron_forecast::game_log::GameLog;
use gridiron_forecast::history_db;

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let db_path = config::resolve_db_path(&args);
    if !db_path.exists() {
        return Err(anyhow!("no history database at {}", db_path.display()));
    }
    let cfg = match config::arg_value(&args, "--config") {
        Some(path) => PipelineConfig::load(Path::new(&path))?,
        None => PipelineConfig::from_env(),
    };

    let conn = history_db::open_db(&db_path)?;
    let raw = history_db::load_team_results(&conn)?;
    let mut events = history_db::load_events(&conn, None)?;
    let (log, rejected) = GameLog::from_raw(raw).context("validate game log")?;

    let dropped: HashSet<&str> = rejected.iter().map(|r| r.event_id.as_str()).collect();
    if !dropped.is_empty() {
        warn!(events = dropped.len(), "events without a usable row pair skipped");
        events.retain(|e| !dropped.contains(e.event_id.as_str()));
    }

    let aggregate = DataAggregate::build(log, &events, cfg).context("build aggregate")?;

    println!("Feature aggregate built");
    println!("DB: {}", db_path.display());
    println!("Team rows: {}", aggregate.log().len());
    println!("Training events: {}", aggregate.training().len());
    println!("Rejected events: {}", rejected.len());
    for item in rejected.iter().take(6) {
        println!("   - {}: {}", item.event_id, item.reason);
    }

    let elo = FeatureKey::Base(BaseFeature::EloRating);
    let rpi = FeatureKey::Base(BaseFeature::RpiRating);
    println!(
        "Upcoming ({:?} snapshot): {}",
        cfg.snapshot,
        aggregate.prediction_set().len()
    );
    for row in aggregate.prediction_set() {
        println!(
            "  {} {} vs {}  elo {:.1}/{:.1}  rpi {:.3}/{:.3}",
            row.date,
            row.team_a.full_name(),
            row.team_b.full_name(),
            row.team_a_features.get(elo).unwrap_or(f64::NAN),
            row.team_b_features.get(elo).unwrap_or(f64::NAN),
            row.team_a_features.get(rpi).unwrap_or(f64::NAN),
            row.team_b_features.get(rpi).unwrap_or(f64::NAN),
        );
    }

    if let Some(path) = config::arg_value(&args, "--xlsx") {
        let report = export::export_aggregate(&aggregate, Path::new(&path))?;
        println!(
            "Wrote {path}: {} training rows, {} prediction rows, {} columns",
            report.training_rows, report.prediction_rows, report.columns
        );
    }
    if let Some(path) = config::arg_value(&args, "--save-config") {
        cfg.save(Path::new(&path))?;
        println!("Saved config to {path}");
    }

    Ok(())
}
