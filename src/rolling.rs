use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{
    AvgWindow, BaseFeature, FEATURE_COUNT, FeatureKey, TrendStat, TrendWindow, WindowedStat,
    catalog,
};
use crate::game_log::GameLog;
use crate::opponent::TeamGame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingConfig {
    pub split_window: usize,
    pub default_days_rest: f64,
    pub max_days_rest: f64,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            split_window: 7,
            default_days_rest: 7.0,
            max_days_rest: 21.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<Option<f64>>,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: vec![None; FEATURE_COUNT],
        }
    }
}

impl FeatureVector {
    pub fn neutral(initial_elo: f64, cfg: &RollingConfig) -> Self {
        let mut out = Self::default();
        out.set(FeatureKey::Base(BaseFeature::EloRating), Some(initial_elo));
        out.set(FeatureKey::Base(BaseFeature::RpiRating), Some(0.5));
        out.set(
            FeatureKey::Base(BaseFeature::DaysRest),
            Some(cfg.default_days_rest),
        );
        out
    }

    pub fn get(&self, key: FeatureKey) -> Option<f64> {
        self.values[key.index()]
    }

    pub fn set(&mut self, key: FeatureKey, value: Option<f64>) {
        self.values[key.index()] = value.filter(|v| v.is_finite());
    }

    pub fn get_named(&self, name: &str) -> Option<f64> {
        catalog().key(name).and_then(|key| self.get(key))
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Option<f64> {
    let start = values.len().saturating_sub(window);
    mean(values[start..].iter().flatten().copied())
}

pub fn trailing_slope(values: &[Option<f64>], window: usize) -> Option<f64> {
    let start = values.len().saturating_sub(window);
    let points: Vec<(f64, f64)> = values[start..]
        .iter()
        .enumerate()
        .filter_map(|(x, v)| v.map(|y| (x as f64, y)))
        .collect();
    if points.len() < 2 {
        return None;
    }
    let mean_x = mean(points.iter().map(|p| p.0))?;
    let mean_y = mean(points.iter().map(|p| p.1))?;
    let (cov, var) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        (cov + (x - mean_x) * (y - mean_y), var + (x - mean_x).powi(2))
    });
    (var > 0.0).then(|| cov / var)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffRatings {
    pub elo: f64,
    pub rpi: f64,
}

/// Features for one team using `games[..end]` as history. `games` is the
/// team's date-ordered timeline and `kickoff` the date of the game being
/// described.
pub fn features_as_of(
    games: &[TeamGame<'_>],
    end: usize,
    kickoff: NaiveDate,
    ratings: CutoffRatings,
    cfg: &RollingConfig,
) -> FeatureVector {
    let history = &games[..end.min(games.len())];
    let mut out = FeatureVector::default();

    out.set(FeatureKey::Base(BaseFeature::EloRating), Some(ratings.elo));
    out.set(FeatureKey::Base(BaseFeature::RpiRating), Some(ratings.rpi));
    let rest = match history.last() {
        Some(prev) => ((kickoff - prev.record.date).num_days() as f64).min(cfg.max_days_rest),
        None => cfg.default_days_rest,
    };
    out.set(FeatureKey::Base(BaseFeature::DaysRest), Some(rest));

    for stat in WindowedStat::ALL {
        let source = stat.source();
        let all: Vec<Option<f64>> = history.iter().map(|g| g.value(source)).collect();
        let split = |home: bool| -> Option<f64> {
            let side: Vec<Option<f64>> = history
                .iter()
                .filter(|g| g.record.is_home == home)
                .map(|g| g.value(source))
                .collect();
            // Before the first home (or away) game, fall back to the
            // all-location trailing mean over the same window.
            trailing_mean(&side, cfg.split_window)
                .or_else(|| trailing_mean(&all, cfg.split_window))
        };

        for window in AvgWindow::ALL {
            let value = match window {
                AvgWindow::L3 => trailing_mean(&all, 3),
                AvgWindow::L5 => trailing_mean(&all, 5),
                AvgWindow::L7 => trailing_mean(&all, 7),
                AvgWindow::Home => split(true),
                AvgWindow::Away => split(false),
            };
            out.set(FeatureKey::Average(stat, window), value);
        }
    }

    for stat in TrendStat::all() {
        let source = stat.source();
        let all: Vec<Option<f64>> = history.iter().map(|g| g.value(source)).collect();
        for window in TrendWindow::ALL {
            out.set(
                FeatureKey::Trend(stat, window),
                trailing_slope(&all, window.games()),
            );
        }
    }

    out
}

pub fn rolling_features(
    log: &GameLog,
    team_games: &[TeamGame<'_>],
    cfg: &RollingConfig,
) -> Vec<FeatureVector> {
    let timelines: Vec<Vec<usize>> = log.team_timelines().into_values().collect();

    let per_team: Vec<Vec<(usize, FeatureVector)>> = timelines
        .par_iter()
        .map(|idxs| {
            let games: Vec<TeamGame<'_>> = idxs.iter().map(|&i| team_games[i]).collect();
            idxs.iter()
                .enumerate()
                .map(|(pos, &idx)| {
                    let game = &games[pos];
                    let ratings = CutoffRatings {
                        elo: game.elo,
                        rpi: game.rpi,
                    };
                    let features = features_as_of(&games, pos, game.record.date, ratings, cfg);
                    (idx, features)
                })
                .collect()
        })
        .collect();

    let mut out = vec![FeatureVector::default(); log.len()];
    for (idx, features) in per_team.into_iter().flatten() {
        out[idx] = features;
    }
    debug!(rows = out.len(), teams = timelines.len(), "rolling features computed");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_mean_uses_partial_window() {
        let values = [Some(10.0), Some(20.0)];
        assert_eq!(trailing_mean(&values, 3), Some(15.0));
        assert_eq!(trailing_mean(&values, 1), Some(20.0));
        assert_eq!(trailing_mean(&[], 3), None);
    }

    #[test]
    fn trailing_mean_skips_missing_cells() {
        let values = [Some(4.0), None, Some(8.0)];
        assert_eq!(trailing_mean(&values, 3), Some(6.0));
        assert_eq!(trailing_mean(&[None, None], 2), None);
    }

    #[test]
    fn slope_of_linear_series() {
        let values = [Some(1.0), Some(3.0), Some(5.0), Some(7.0)];
        let slope = trailing_slope(&values, 5).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        // only the last two points
        let slope = trailing_slope(&[Some(100.0), Some(1.0), Some(0.0)], 2).unwrap();
        assert!((slope + 1.0).abs() < 1e-12);
    }

    #[test]
    fn slope_needs_two_points() {
        assert_eq!(trailing_slope(&[Some(3.0)], 5), None);
        assert_eq!(trailing_slope(&[None, Some(3.0)], 5), None);
    }

    #[test]
    fn neutral_vector_has_ratings_only() {
        let v = FeatureVector::neutral(1500.0, &RollingConfig::default());
        assert_eq!(v.get_named("elo_rating"), Some(1500.0));
        assert_eq!(v.get_named("rpi_rating"), Some(0.5));
        assert_eq!(v.get_named("days_rest"), Some(7.0));
        assert_eq!(v.get_named("avg_points_scored_l3"), None);
        assert_eq!(v.values().iter().filter(|v| v.is_some()).count(), 3);
    }
}
