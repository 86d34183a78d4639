use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::game_log::{GameLog, GameResult};
use crate::teams::Team;

const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpiWeights {
    pub wp: f64,
    pub owp: f64,
    pub oowp: f64,
}

impl Default for RpiWeights {
    fn default() -> Self {
        Self {
            wp: 0.25,
            owp: 0.50,
            oowp: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpiComponents {
    pub wp: f64,
    pub owp: f64,
    pub oowp: f64,
}

#[derive(Debug, Clone, Default)]
struct TeamRecord {
    wins: f64,
    games: u32,
    opponents: Vec<Team>,
}

#[derive(Debug, Clone, Default)]
pub struct RpiState {
    weights: RpiWeights,
    records: BTreeMap<Team, TeamRecord>,
}

impl RpiState {
    pub fn new(weights: RpiWeights) -> Self {
        Self {
            weights,
            records: BTreeMap::new(),
        }
    }

    pub fn games_played(&self, team: Team) -> u32 {
        self.records.get(&team).map_or(0, |r| r.games)
    }

    pub fn winning_pct(&self, team: Team) -> f64 {
        match self.records.get(&team) {
            Some(r) if r.games > 0 => r.wins / f64::from(r.games),
            _ => NEUTRAL,
        }
    }

    fn opponents_wp(&self, team: Team) -> f64 {
        let Some(record) = self.records.get(&team) else {
            return NEUTRAL;
        };
        mean_or_neutral(record.opponents.iter().map(|opp| self.winning_pct(*opp)))
    }

    pub fn components(&self, team: Team) -> RpiComponents {
        let Some(record) = self.records.get(&team).filter(|r| r.games > 0) else {
            return RpiComponents {
                wp: NEUTRAL,
                owp: NEUTRAL,
                oowp: NEUTRAL,
            };
        };
        RpiComponents {
            wp: self.winning_pct(team),
            owp: self.opponents_wp(team),
            oowp: mean_or_neutral(record.opponents.iter().map(|opp| self.opponents_wp(*opp))),
        }
    }

    pub fn rpi(&self, team: Team) -> f64 {
        let c = self.components(team);
        let w = self.weights;
        w.wp * c.wp + w.owp * c.owp + w.oowp * c.oowp
    }

    pub fn record_event(&mut self, team: Team, opponent: Team, team_result: GameResult) {
        let opp_result = match team_result {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            GameResult::Tie => GameResult::Tie,
        };
        for (side, other, result) in [(team, opponent, team_result), (opponent, team, opp_result)] {
            let record = self.records.entry(side).or_default();
            record.wins += result.score();
            record.games += 1;
            record.opponents.push(other);
        }
    }
}

fn mean_or_neutral(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { NEUTRAL } else { sum / n as f64 }
}

/// RPI for every record using only games dated strictly before it. All rows
/// sharing a date are rated first, then that date's events are booked once
/// each, so neither row of an event sees its own result.
pub fn compute_rpi(log: &GameLog, weights: RpiWeights) -> Vec<f64> {
    let mut out = vec![NEUTRAL; log.len()];
    let mut state = RpiState::new(weights);

    for (_, batch) in log.date_batches() {
        for &idx in &batch {
            out[idx] = state.rpi(log.records()[idx].team);
        }
        for &idx in &batch {
            if log.opponent_position(idx) < idx {
                continue;
            }
            let record = &log.records()[idx];
            state.record_event(record.team, record.opponent, record.result());
        }
    }

    out
}

pub fn rpi_as_of(log: &GameLog, weights: RpiWeights, cutoff: NaiveDate) -> RpiState {
    let mut state = RpiState::new(weights);
    for (idx, record) in log.records().iter().enumerate() {
        if record.date >= cutoff {
            break;
        }
        if log.opponent_position(idx) < idx {
            continue;
        }
        state.record_event(record.team, record.opponent, record.result());
    }
    state
}
