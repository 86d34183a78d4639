use std::path::PathBuf;

use anyhow::{Context, Result};

use gridiron_forecast::aggregate::DataAggregate;
use gridiron_forecast::config::{self, PipelineConfig};
use gridiron_forecast::export;
use gridiron_forecast::game_log::GameLog;
use gridiron_forecast::history_db;
use gridiron_forecast::synthetic::{self, LeagueShape};

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let seed = config::arg_value(&args, "--seed")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(2024);
    let seasons = config::arg_value(&args, "--seasons")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(3)
        .clamp(1, 30);
    let shape = LeagueShape {
        seasons,
        ..LeagueShape::default()
    };

    let league = synthetic::generate(seed, shape);
    println!(
        "Synthetic league: seed={seed} seasons={seasons} events={} team_rows={}",
        league.events.len(),
        league.rows.len()
    );

    if let Some(path) = config::arg_value(&args, "--db") {
        let db_path = PathBuf::from(path);
        let mut conn = history_db::open_db(&db_path)?;
        let tx = conn.transaction().context("begin sqlite transaction")?;
        for event in &league.events {
            history_db::upsert_event(&tx, event)?;
        }
        for row in &league.rows {
            history_db::upsert_team_result(&tx, row)?;
        }
        tx.commit().context("commit synthetic league")?;
        println!("DB: {}", db_path.display());
    }

    let (log, _) = GameLog::from_raw(league.rows).context("validate game log")?;
    let aggregate = DataAggregate::build(log, &league.events, PipelineConfig::from_env())?;
    println!(
        "Training events: {}  upcoming: {}",
        aggregate.training().len(),
        aggregate.prediction_set().len()
    );

    if let Some(path) = config::arg_value(&args, "--xlsx") {
        let report = export::export_aggregate(&aggregate, PathBuf::from(&path).as_path())?;
        println!(
            "Wrote {path}: {} training rows, {} prediction rows",
            report.training_rows, report.prediction_rows
        );
    }

    Ok(())
}
