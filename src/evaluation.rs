use serde::Serialize;

use crate::elo::{EloConfig, compute_elo, expected_score};
use crate::game_log::GameLog;
use crate::teams::Team;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

pub fn evaluate_probs(predictions: &[f64], outcomes: &[f64]) -> Metrics {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return Metrics {
            samples: 0,
            brier: 0.0,
            log_loss: 0.0,
            accuracy: 0.0,
        };
    }

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for (p, y) in predictions.iter().zip(outcomes) {
        let p = p.clamp(1e-12, 1.0 - 1e-12);
        brier_sum += (p - y).powi(2);
        log_loss_sum += -(y * p.ln() + (1.0 - y) * (1.0 - p).ln());
        if (p >= 0.5 && *y == 1.0) || (p < 0.5 && *y == 0.0) {
            correct += 1;
        }
    }

    let n = predictions.len() as f64;
    Metrics {
        samples: predictions.len(),
        brier: brier_sum / n,
        log_loss: log_loss_sum / n,
        accuracy: correct as f64 / n,
    }
}

pub fn calibration_bins(predictions: &[f64], outcomes: &[f64], bins: usize) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (p, y) in predictions.iter().zip(outcomes) {
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += p;
        actual_sum[idx] += y;
    }

    (0..bins)
        .map(|i| {
            let count = counts[i];
            let (avg_pred, actual_rate) = if count > 0 {
                (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
            } else {
                (0.0, 0.0)
            };
            CalibrationBin {
                bucket_start: i as f64 / bins as f64,
                bucket_end: (i + 1) as f64 / bins as f64,
                count,
                avg_pred,
                actual_rate,
            }
        })
        .collect()
}

pub fn mae(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }
    let sum: f64 = predicted.iter().zip(actual).map(|(p, a)| (p - a).abs()).sum();
    Some(sum / predicted.len() as f64)
}

pub fn rmse(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }
    let sum: f64 = predicted.iter().zip(actual).map(|(p, a)| (p - a).powi(2)).sum();
    Some((sum / predicted.len() as f64).sqrt())
}

pub fn elo_win_probability(team_elo: f64, opp_elo: f64, home_bonus: f64) -> f64 {
    expected_score(team_elo + home_bonus, opp_elo)
}

#[derive(Debug, Clone, Serialize)]
pub struct EloForecast {
    pub event_id: String,
    pub season: i32,
    pub week: u32,
    pub home: Team,
    pub away: Team,
    pub home_elo: f64,
    pub away_elo: f64,
    pub prob_home: f64,
    pub outcome: f64,
    pub margin: f64,
}

pub fn walk_forward_elo(log: &GameLog, cfg: EloConfig, home_bonus: f64) -> Vec<EloForecast> {
    let elo = compute_elo(log, cfg);
    log.schedule()
        .into_iter()
        .filter_map(|event| {
            let idx = log.position(&event.event_id, event.home_team)?;
            let record = &log.records()[idx];
            let bonus = if event.is_neutral { 0.0 } else { home_bonus };
            let snap = elo[idx];
            Some(EloForecast {
                event_id: event.event_id,
                season: event.season,
                week: event.week,
                home: event.home_team,
                away: event.away_team,
                home_elo: snap.team,
                away_elo: snap.opponent,
                prob_home: elo_win_probability(snap.team, snap.opponent, bonus),
                outcome: record.result().score(),
                margin: record.point_differential(),
            })
        })
        .collect()
}
