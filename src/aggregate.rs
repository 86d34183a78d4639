use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info, info_span};

use crate::config::{PipelineConfig, SnapshotPolicy};
use crate::elo::{EloSnapshot, EloState, compute_elo, elo_as_of};
use crate::error::Result;
use crate::game_log::{GameLog, GameRecord, ScheduledGame, next_unplayed_week};
use crate::opponent::{FeatureRow, TeamGame, UpcomingGameRow, attach_opponents, join_events};
use crate::rolling::{CutoffRatings, FeatureVector, features_as_of, rolling_features};
use crate::rpi::{RpiState, compute_rpi, rpi_as_of};
use crate::teams::Team;

#[derive(Debug, Clone)]
pub struct DataAggregate {
    cfg: PipelineConfig,
    log: GameLog,
    elo: Vec<EloSnapshot>,
    rpi: Vec<f64>,
    team_features: Vec<FeatureVector>,
    training: Vec<FeatureRow>,
    prediction_set: Vec<UpcomingGameRow>,
}

impl DataAggregate {
    pub fn build(log: GameLog, events: &[ScheduledGame], cfg: PipelineConfig) -> Result<Self> {
        let _span = info_span!("aggregate_build", records = log.len()).entered();

        let elo = compute_elo(&log, cfg.elo);
        let rpi = compute_rpi(&log, cfg.rpi);
        debug!("ratings attached");

        let team_games = attach_opponents(&log, &elo, &rpi);
        let team_features = rolling_features(&log, &team_games, &cfg.rolling);

        let training = join_events(events, &log, &team_features)?;
        let upcoming = next_unplayed_week(events);
        let prediction_set =
            upcoming_rows(&log, &team_games, &team_features, &upcoming, &cfg);

        info!(
            training = training.len(),
            upcoming = prediction_set.len(),
            "aggregate built"
        );
        Ok(Self {
            cfg,
            log,
            elo,
            rpi,
            team_features,
            training,
            prediction_set,
        })
    }

    pub fn from_log(log: GameLog, upcoming: &[ScheduledGame], cfg: PipelineConfig) -> Result<Self> {
        let mut events = log.schedule();
        events.extend(upcoming.iter().filter(|e| !e.is_complete).cloned());
        Self::build(log, &events, cfg)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn training(&self) -> &[FeatureRow] {
        &self.training
    }

    pub fn prediction_set(&self) -> &[UpcomingGameRow] {
        &self.prediction_set
    }

    pub fn team_rows(&self) -> impl Iterator<Item = TeamRow<'_>> {
        self.log
            .records()
            .iter()
            .enumerate()
            .map(|(idx, record)| TeamRow {
                record,
                elo: self.elo[idx],
                rpi: self.rpi[idx],
                features: &self.team_features[idx],
            })
    }

    pub fn latest_features(&self, team: Team) -> Option<&FeatureVector> {
        self.log
            .records()
            .iter()
            .rposition(|r| r.team == team)
            .map(|idx| &self.team_features[idx])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TeamRow<'a> {
    pub record: &'a GameRecord,
    pub elo: EloSnapshot,
    pub rpi: f64,
    pub features: &'a FeatureVector,
}

struct KickoffRatings {
    elo: EloState,
    rpi: RpiState,
}

fn upcoming_rows(
    log: &GameLog,
    team_games: &[TeamGame<'_>],
    team_features: &[FeatureVector],
    upcoming: &[ScheduledGame],
    cfg: &PipelineConfig,
) -> Vec<UpcomingGameRow> {
    let timelines = log.team_timelines();
    let mut kickoff_cache: BTreeMap<NaiveDate, KickoffRatings> = BTreeMap::new();

    let mut snapshot = |team: Team, event: &ScheduledGame| -> FeatureVector {
        let Some(idxs) = timelines.get(&team).filter(|idxs| !idxs.is_empty()) else {
            return FeatureVector::neutral(cfg.elo.initial, &cfg.rolling);
        };
        match cfg.snapshot {
            SnapshotPolicy::LastPlayed => idxs
                .last()
                .map(|&idx| team_features[idx].clone())
                .unwrap_or_else(|| FeatureVector::neutral(cfg.elo.initial, &cfg.rolling)),
            SnapshotPolicy::AsOfKickoff => {
                let ratings = kickoff_cache.entry(event.date).or_insert_with(|| KickoffRatings {
                    elo: elo_as_of(log, cfg.elo, event.date),
                    rpi: rpi_as_of(log, cfg.rpi, event.date),
                });
                let mut elo = ratings.elo.clone();
                elo.enter_season(event.season);
                let games: Vec<TeamGame<'_>> = idxs
                    .iter()
                    .map(|&i| team_games[i])
                    .filter(|g| g.record.date < event.date)
                    .collect();
                let cutoff = CutoffRatings {
                    elo: elo.rating(team),
                    rpi: ratings.rpi.rpi(team),
                };
                features_as_of(&games, games.len(), event.date, cutoff, &cfg.rolling)
            }
        }
    };

    upcoming
        .iter()
        .map(|event| UpcomingGameRow {
            event_id: event.event_id.clone(),
            season: event.season,
            week: event.week,
            date: event.date,
            team_a: event.home_team,
            team_b: event.away_team,
            team_a_win: None,
            team_a_point_differential: None,
            team_a_features: snapshot(event.home_team, event),
            team_b_features: snapshot(event.away_team, event),
        })
        .collect()
}
