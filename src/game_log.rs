use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FeatureError, Result};
use crate::teams::{Team, resolve_opponent, resolve_team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RawStat {
    PassCompletions,
    PassAttempts,
    PassYards,
    PassTds,
    PassYardsPerAttempt,
    PassAdjustedYardsPerAttempt,
    PassRating,
    SacksAllowed,
    SackYardsLost,
    RushingAttempts,
    RushingYards,
    RushingTds,
    RushingYardsPerAttempt,
    OffensivePlays,
    TotalYards,
    YardsPerPlay,
    FirstDowns,
    ThirdDownConversions,
    ThirdDownAttempts,
    Penalties,
    PenaltyYards,
    FumblesLost,
    InterceptionsThrown,
    Turnovers,
}

impl RawStat {
    pub const COUNT: usize = 24;

    pub const ALL: [RawStat; RawStat::COUNT] = [
        RawStat::PassCompletions,
        RawStat::PassAttempts,
        RawStat::PassYards,
        RawStat::PassTds,
        RawStat::PassYardsPerAttempt,
        RawStat::PassAdjustedYardsPerAttempt,
        RawStat::PassRating,
        RawStat::SacksAllowed,
        RawStat::SackYardsLost,
        RawStat::RushingAttempts,
        RawStat::RushingYards,
        RawStat::RushingTds,
        RawStat::RushingYardsPerAttempt,
        RawStat::OffensivePlays,
        RawStat::TotalYards,
        RawStat::YardsPerPlay,
        RawStat::FirstDowns,
        RawStat::ThirdDownConversions,
        RawStat::ThirdDownAttempts,
        RawStat::Penalties,
        RawStat::PenaltyYards,
        RawStat::FumblesLost,
        RawStat::InterceptionsThrown,
        RawStat::Turnovers,
    ];

    pub fn column(self) -> &'static str {
        match self {
            RawStat::PassCompletions => "pass_completions",
            RawStat::PassAttempts => "pass_attempts",
            RawStat::PassYards => "pass_yds",
            RawStat::PassTds => "pass_tds",
            RawStat::PassYardsPerAttempt => "pass_yards_per_attempt",
            RawStat::PassAdjustedYardsPerAttempt => "pass_adjusted_yards_per_attempt",
            RawStat::PassRating => "pass_rating",
            RawStat::SacksAllowed => "sacks_allowed",
            RawStat::SackYardsLost => "sack_yards_lost",
            RawStat::RushingAttempts => "rushing_attempts",
            RawStat::RushingYards => "rushing_yards",
            RawStat::RushingTds => "rushing_tds",
            RawStat::RushingYardsPerAttempt => "rushing_yards_per_attempt",
            RawStat::OffensivePlays => "offensive_plays",
            RawStat::TotalYards => "total_yards",
            RawStat::YardsPerPlay => "yards_per_play",
            RawStat::FirstDowns => "first_downs",
            RawStat::ThirdDownConversions => "third_down_conversions",
            RawStat::ThirdDownAttempts => "third_down_attempts",
            RawStat::Penalties => "penalties",
            RawStat::PenaltyYards => "penalty_yards",
            RawStat::FumblesLost => "fumbles_lost",
            RawStat::InterceptionsThrown => "interceptions_thrown",
            RawStat::Turnovers => "turnovers",
        }
    }

    pub fn from_column(column: &str) -> Option<RawStat> {
        RawStat::ALL.into_iter().find(|stat| stat.column() == column)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One value per [`RawStat`]. Missing box-score cells stay `None`, never 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatLine([Option<f64>; RawStat::COUNT]);

impl StatLine {
    pub fn get(&self, stat: RawStat) -> Option<f64> {
        self.0[stat.index()]
    }

    pub fn set(&mut self, stat: RawStat, value: Option<f64>) {
        self.0[stat.index()] = value.filter(|v| v.is_finite());
    }

    pub fn with(mut self, stat: RawStat, value: f64) -> Self {
        self.set(stat, Some(value));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

impl GameResult {
    pub fn from_points(scored: f64, allowed: f64) -> Self {
        if scored > allowed {
            GameResult::Win
        } else if scored < allowed {
            GameResult::Loss
        } else {
            GameResult::Tie
        }
    }

    pub fn score(self) -> f64 {
        match self {
            GameResult::Win => 1.0,
            GameResult::Tie => 0.5,
            GameResult::Loss => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub event_id: String,
    pub season: i32,
    pub week: u32,
    pub date: NaiveDate,
    pub team: Team,
    pub opponent: Team,
    pub is_home: bool,
    pub win: bool,
    pub points_scored: f64,
    pub points_allowed: f64,
    pub stats: StatLine,
}

impl GameRecord {
    pub fn result(&self) -> GameResult {
        GameResult::from_points(self.points_scored, self.points_allowed)
    }

    pub fn point_differential(&self) -> f64 {
        self.points_scored - self.points_allowed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGameRow {
    pub event_id: String,
    pub season: i32,
    pub week: u32,
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub is_home: bool,
    pub win: bool,
    pub points_scored: f64,
    pub points_allowed: Option<f64>,
    pub stats: StatLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub event_id: String,
    pub season: i32,
    pub week: u32,
    pub date: NaiveDate,
    pub home_team: Team,
    pub away_team: Team,
    pub is_neutral: bool,
    pub is_playoffs: bool,
    pub is_complete: bool,
}

/// Deterministic event id. Neutral-site games have no real home side, so the
/// codes are ordered alphabetically to make both teams' rows agree.
pub fn event_id(season: i32, week: u32, home: Team, away: Team, neutral: bool) -> String {
    let (first, second) = if neutral && away.code() < home.code() {
        (away, home)
    } else {
        (home, away)
    };
    format!("{season}_{week}_{}_{}", first.code(), second.code())
}

pub fn next_unplayed_week(events: &[ScheduledGame]) -> Vec<ScheduledGame> {
    let Some(season) = events
        .iter()
        .filter(|e| !e.is_complete)
        .map(|e| e.season)
        .min()
    else {
        return Vec::new();
    };
    let Some(week) = events
        .iter()
        .filter(|e| !e.is_complete && e.season == season)
        .map(|e| e.week)
        .min()
    else {
        return Vec::new();
    };

    let mut out: Vec<ScheduledGame> = events
        .iter()
        .filter(|e| !e.is_complete && e.season == season && e.week == week)
        .cloned()
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then(a.event_id.cmp(&b.event_id)));
    out.dedup_by(|a, b| a.event_id == b.event_id);
    out
}

#[derive(Debug)]
pub struct RejectedEvent {
    pub event_id: String,
    pub reason: FeatureError,
}

#[derive(Debug, Clone)]
pub struct GameLog {
    records: Vec<GameRecord>,
    index: HashMap<(String, Team), usize>,
}

impl GameLog {
    pub fn new(mut records: Vec<GameRecord>) -> Result<Self> {
        records.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.event_id.cmp(&b.event_id))
                .then_with(|| a.team.cmp(&b.team))
        });

        let mut index = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if index
                .insert((record.event_id.clone(), record.team), idx)
                .is_some()
            {
                return Err(FeatureError::DuplicateRecord {
                    event_id: record.event_id.clone(),
                    team: record.team.to_string(),
                });
            }
        }

        for record in &records {
            let Some(&opp_idx) = index.get(&(record.event_id.clone(), record.opponent)) else {
                return Err(missing_pair(record));
            };
            let opp = &records[opp_idx];
            if opp.opponent != record.team || opp.team == record.team {
                return Err(missing_pair(record));
            }
            check_pair(record, opp)?;
            if opp.points_scored != record.points_allowed {
                return Err(FeatureError::InconsistentScore {
                    event_id: record.event_id.clone(),
                    team: record.team.to_string(),
                    reported: record.points_allowed,
                    actual: opp.points_scored,
                });
            }
        }

        Ok(Self { records, index })
    }

    pub fn from_raw(rows: Vec<RawGameRow>) -> Result<(Self, Vec<RejectedEvent>)> {
        let mut by_event: BTreeMap<String, Vec<RawGameRow>> = BTreeMap::new();
        for row in rows {
            by_event.entry(row.event_id.clone()).or_default().push(row);
        }

        let mut records = Vec::new();
        let mut rejected = Vec::new();
        for (event_id, rows) in by_event {
            match resolve_event(&rows) {
                Ok(pair) => records.extend(pair),
                Err(reason) => {
                    warn!(event_id = %event_id, error = %reason, "dropping raw event");
                    rejected.push(RejectedEvent { event_id, reason });
                }
            }
        }

        debug!(
            records = records.len(),
            rejected = rejected.len(),
            "resolved raw game rows"
        );
        Ok((Self::new(records)?, rejected))
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn position(&self, event_id: &str, team: Team) -> Option<usize> {
        self.index.get(&(event_id.to_string(), team)).copied()
    }

    pub fn get(&self, event_id: &str, team: Team) -> Option<&GameRecord> {
        self.position(event_id, team).map(|idx| &self.records[idx])
    }

    pub fn opponent_position(&self, idx: usize) -> usize {
        let record = &self.records[idx];
        self.index[&(record.event_id.clone(), record.opponent)]
    }

    pub fn team_timelines(&self) -> BTreeMap<Team, Vec<usize>> {
        let mut out: BTreeMap<Team, Vec<usize>> = BTreeMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            out.entry(record.team).or_default().push(idx);
        }
        out
    }

    pub fn date_batches(&self) -> Vec<(NaiveDate, Vec<usize>)> {
        let mut out: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
        for (idx, record) in self.records.iter().enumerate() {
            match out.last_mut() {
                Some((date, batch)) if *date == record.date => batch.push(idx),
                _ => out.push((record.date, vec![idx])),
            }
        }
        out
    }

    pub fn schedule(&self) -> Vec<ScheduledGame> {
        let mut out = Vec::new();
        for (idx, record) in self.records.iter().enumerate() {
            let opp = &self.records[self.opponent_position(idx)];
            if record.team.code() > opp.team.code() {
                continue;
            }
            let is_neutral = record.is_home == opp.is_home;
            let (home, away) = if is_neutral || record.is_home {
                (record.team, opp.team)
            } else {
                (opp.team, record.team)
            };
            out.push(ScheduledGame {
                event_id: record.event_id.clone(),
                season: record.season,
                week: record.week,
                date: record.date,
                home_team: home,
                away_team: away,
                is_neutral,
                is_playoffs: false,
                is_complete: true,
            });
        }
        out
    }
}

/// Both rows of an event must describe the same game, and `win` must agree
/// with the score; otherwise ratings would book the game on one row's date
/// and read it back on the other.
fn check_pair(record: &GameRecord, opp: &GameRecord) -> Result<()> {
    let field = if record.date != opp.date {
        Some("date")
    } else if record.season != opp.season {
        Some("season")
    } else if record.week != opp.week {
        Some("week")
    } else {
        None
    };
    if let Some(field) = field {
        return Err(FeatureError::MismatchedPair {
            event_id: record.event_id.clone(),
            team: record.team.to_string(),
            field,
        });
    }
    for row in [record, opp] {
        if row.win != (row.result() == GameResult::Win) {
            return Err(FeatureError::InconsistentWin {
                event_id: row.event_id.clone(),
                team: row.team.to_string(),
            });
        }
    }
    Ok(())
}

fn missing_pair(record: &GameRecord) -> FeatureError {
    FeatureError::MissingOpponentRow {
        event_id: record.event_id.clone(),
        team: record.team.to_string(),
        opponent: record.opponent.to_string(),
    }
}

fn resolve_event(rows: &[RawGameRow]) -> Result<[GameRecord; 2]> {
    let [first, second] = rows else {
        let row = &rows[0];
        return Err(FeatureError::MissingOpponentRow {
            event_id: row.event_id.clone(),
            team: row.team.clone(),
            opponent: row.opponent.clone(),
        });
    };
    let a = resolve_row(first, second.points_scored)?;
    let b = resolve_row(second, first.points_scored)?;
    if a.opponent != b.team || b.opponent != a.team {
        return Err(FeatureError::MissingOpponentRow {
            event_id: a.event_id.clone(),
            team: a.team.to_string(),
            opponent: a.opponent.to_string(),
        });
    }
    check_pair(&a, &b)?;
    Ok([a, b])
}

fn resolve_row(row: &RawGameRow, opponent_points: f64) -> Result<GameRecord> {
    let team = resolve_team(&row.event_id, &row.team)?;
    let opponent = resolve_opponent(&row.event_id, team, &row.opponent)?;
    if let Some(reported) = row.points_allowed
        && reported != opponent_points
    {
        return Err(FeatureError::InconsistentScore {
            event_id: row.event_id.clone(),
            team: team.to_string(),
            reported,
            actual: opponent_points,
        });
    }
    Ok(GameRecord {
        event_id: row.event_id.clone(),
        season: row.season,
        week: row.week,
        date: row.date,
        team,
        opponent,
        is_home: row.is_home,
        win: row.win,
        points_scored: row.points_scored,
        points_allowed: opponent_points,
        stats: row.stats,
    })
}
