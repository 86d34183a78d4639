use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{FeatureKey, SourceColumn, catalog};
use crate::elo::EloSnapshot;
use crate::error::{FeatureError, Result};
use crate::game_log::{GameLog, GameRecord, ScheduledGame};
use crate::rolling::FeatureVector;
use crate::teams::Team;

#[derive(Debug, Clone, Copy)]
pub struct TeamGame<'a> {
    pub record: &'a GameRecord,
    pub opponent: &'a GameRecord,
    pub elo: f64,
    pub rpi: f64,
}

impl TeamGame<'_> {
    pub fn value(&self, source: SourceColumn) -> Option<f64> {
        let v = match source {
            SourceColumn::PointsScored => Some(self.record.points_scored),
            SourceColumn::OppPointsScored => Some(self.opponent.points_scored),
            SourceColumn::PointDifferential => {
                Some(self.record.points_scored - self.opponent.points_scored)
            }
            SourceColumn::Own(stat) => self.record.stats.get(stat),
            SourceColumn::Opp(stat) => self.opponent.stats.get(stat),
            SourceColumn::EloRating => Some(self.elo),
        };
        v.filter(|x| x.is_finite())
    }
}

pub fn attach_opponents<'a>(
    log: &'a GameLog,
    elo: &[EloSnapshot],
    rpi: &[f64],
) -> Vec<TeamGame<'a>> {
    let records = log.records();
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| TeamGame {
            record,
            opponent: &records[log.opponent_position(idx)],
            elo: elo[idx].team,
            rpi: rpi[idx],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub event_id: String,
    pub season: i32,
    pub week: u32,
    pub date: NaiveDate,
    pub team_a: Team,
    pub team_b: Team,
    pub team_a_is_home: bool,
    pub team_b_is_home: bool,
    pub team_a_points_scored: f64,
    pub team_b_points_scored: f64,
    pub team_a_win: bool,
    /// `team_b_points_scored - team_a_points_scored`: negative when team_a
    /// won, i.e. a betting-line style spread for the home side.
    pub team_a_point_differential: f64,
    pub team_a_features: FeatureVector,
    pub team_b_features: FeatureVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingGameRow {
    pub event_id: String,
    pub season: i32,
    pub week: u32,
    pub date: NaiveDate,
    pub team_a: Team,
    pub team_b: Team,
    pub team_a_win: Option<bool>,
    pub team_a_point_differential: Option<f64>,
    pub team_a_features: FeatureVector,
    pub team_b_features: FeatureVector,
}

pub trait FeatureTable {
    fn event_id(&self) -> &str;
    fn side_features(&self, side: Side) -> &FeatureVector;
    fn target(&self, column: &str) -> Option<f64>;

    fn column(&self, name: &str) -> Option<f64> {
        let (side, rest) = if let Some(rest) = name.strip_prefix("team_a_") {
            (Side::A, rest)
        } else if let Some(rest) = name.strip_prefix("team_b_") {
            (Side::B, rest)
        } else {
            return None;
        };
        match catalog().key(rest) {
            Some(key) => self.side_features(side).get(key),
            None if side == Side::A => self.target(rest),
            None => None,
        }
    }

    fn feature(&self, side: Side, key: FeatureKey) -> Option<f64> {
        self.side_features(side).get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn prefix(self) -> &'static str {
        match self {
            Side::A => "team_a",
            Side::B => "team_b",
        }
    }
}

impl FeatureTable for FeatureRow {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn side_features(&self, side: Side) -> &FeatureVector {
        match side {
            Side::A => &self.team_a_features,
            Side::B => &self.team_b_features,
        }
    }

    fn target(&self, column: &str) -> Option<f64> {
        match column {
            "point_differential" => Some(self.team_a_point_differential),
            "win" => Some(if self.team_a_win { 1.0 } else { 0.0 }),
            "points_scored" => Some(self.team_a_points_scored),
            _ => None,
        }
    }
}

impl FeatureTable for UpcomingGameRow {
    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn side_features(&self, side: Side) -> &FeatureVector {
        match side {
            Side::A => &self.team_a_features,
            Side::B => &self.team_b_features,
        }
    }

    fn target(&self, column: &str) -> Option<f64> {
        match column {
            "point_differential" => self.team_a_point_differential,
            "win" => self.team_a_win.map(|w| if w { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

pub fn join_events(
    schedule: &[ScheduledGame],
    log: &GameLog,
    features: &[FeatureVector],
) -> Result<Vec<FeatureRow>> {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(schedule.len());

    for event in schedule.iter().filter(|e| e.is_complete) {
        if !seen.insert(event.event_id.as_str()) {
            warn!(event_id = %event.event_id, "duplicate schedule entry ignored");
            continue;
        }
        let a_idx = side_position(log, event, event.home_team)?;
        let b_idx = side_position(log, event, event.away_team)?;
        let a = &log.records()[a_idx];
        let b = &log.records()[b_idx];
        if a.opponent != b.team {
            return Err(FeatureError::MissingOpponentRow {
                event_id: event.event_id.clone(),
                team: a.team.to_string(),
                opponent: b.team.to_string(),
            });
        }

        rows.push(FeatureRow {
            event_id: event.event_id.clone(),
            season: event.season,
            week: event.week,
            date: event.date,
            team_a: a.team,
            team_b: b.team,
            team_a_is_home: a.is_home,
            team_b_is_home: b.is_home,
            team_a_points_scored: a.points_scored,
            team_b_points_scored: b.points_scored,
            team_a_win: a.points_scored > b.points_scored,
            team_a_point_differential: b.points_scored - a.points_scored,
            team_a_features: features[a_idx].clone(),
            team_b_features: features[b_idx].clone(),
        });
    }

    debug!(events = rows.len(), "joined completed events");
    Ok(rows)
}

fn side_position(log: &GameLog, event: &ScheduledGame, team: Team) -> Result<usize> {
    log.position(&event.event_id, team)
        .ok_or_else(|| FeatureError::MissingEvent {
            event_id: event.event_id.clone(),
            team: team.to_string(),
        })
}
