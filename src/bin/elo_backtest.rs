use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};

use gridiron_forecast::config::{self, PipelineConfig};
use gridiron_forecast::evaluation::{self, EloForecast};
use gridiron_forecast::game_log::GameLog;
use gridiron_forecast::history_db;

const DEFAULT_HOME_BONUS: f64 = 48.0;

fn main() -> Result<()> {
    config::load_dotenv();
    config::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let db_path = config::resolve_db_path(&args);
    if !db_path.exists() {
        return Err(anyhow!("no history database at {}", db_path.display()));
    }
    let home_bonus = config::arg_value(&args, "--home-bonus")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(DEFAULT_HOME_BONUS)
        .clamp(0.0, 150.0);
    let cfg = PipelineConfig::from_env();

    let conn = history_db::open_db(&db_path)?;
    let raw = history_db::load_team_results(&conn)?;
    let (log, rejected) = GameLog::from_raw(raw).context("validate game log")?;
    let forecasts = evaluation::walk_forward_elo(&log, cfg.elo, home_bonus);
    if forecasts.is_empty() {
        return Err(anyhow!("no completed events in {}", db_path.display()));
    }

    let mut by_season: BTreeMap<i32, Vec<&EloForecast>> = BTreeMap::new();
    for f in &forecasts {
        by_season.entry(f.season).or_default().push(f);
    }

    println!("Walk-forward Elo backtest");
    println!("DB: {}", db_path.display());
    println!(
        "k={:.1} carryover={:.2} home_bonus={:.0} rejected_events={}",
        cfg.elo.k,
        cfg.elo.season_carryover,
        home_bonus,
        rejected.len()
    );
    println!("season  games  brier   logloss  acc");
    for (season, items) in &by_season {
        let (probs, outcomes) = split(items);
        let m = evaluation::evaluate_probs(&probs, &outcomes);
        println!(
            "{season}  {:>5}  {:.4}  {:.4}   {:.3}",
            m.samples, m.brier, m.log_loss, m.accuracy
        );
    }

    let all: Vec<&EloForecast> = forecasts.iter().collect();
    let (probs, outcomes) = split(&all);
    let m = evaluation::evaluate_probs(&probs, &outcomes);
    println!(
        "all     {:>5}  {:.4}  {:.4}   {:.3}",
        m.samples, m.brier, m.log_loss, m.accuracy
    );

    println!("calibration (home win):");
    for bin in evaluation::calibration_bins(&probs, &outcomes, 10) {
        if bin.count == 0 {
            continue;
        }
        println!(
            "  [{:.1}, {:.1})  n={:<5} pred={:.3} actual={:.3}",
            bin.bucket_start, bin.bucket_end, bin.count, bin.avg_pred, bin.actual_rate
        );
    }

    Ok(())
}

fn split(items: &[&EloForecast]) -> (Vec<f64>, Vec<f64>) {
    items.iter().map(|f| (f.prob_home, f.outcome)).unzip()
}
