use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::game_log::{RawGameRow, RawStat, ScheduledGame, StatLine, event_id};
use crate::teams::Team;

#[derive(Debug, Clone, Copy)]
pub struct LeagueShape {
    pub first_season: i32,
    pub seasons: u32,
    pub weeks: u32,
    pub unplayed_weeks: u32,
}

impl Default for LeagueShape {
    fn default() -> Self {
        Self {
            first_season: 2019,
            seasons: 3,
            weeks: 17,
            unplayed_weeks: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticLeague {
    pub rows: Vec<RawGameRow>,
    pub events: Vec<ScheduledGame>,
}

pub fn generate(seed: u64, shape: LeagueShape) -> SyntheticLeague {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut strength: Vec<(Team, f64)> = Team::ALL
        .iter()
        .map(|team| (*team, rng.gen_range(-6.0..6.0)))
        .collect();

    let mut rows = Vec::new();
    let mut events = Vec::new();

    for offset in 0..shape.seasons {
        let season = shape.first_season + offset as i32;
        let kickoff = season_opener(season);
        let last_season = offset + 1 == shape.seasons;

        for week in 1..=shape.weeks {
            let unplayed = last_season && week + shape.unplayed_weeks > shape.weeks;
            let sunday = kickoff + Days::new(u64::from(week - 1) * 7);

            strength.shuffle(&mut rng);
            for pair in strength.chunks(2) {
                let [(home, home_str), (away, away_str)] = [pair[0], pair[1]];
                let date = match rng.gen_range(0..16) {
                    0 => sunday - Days::new(3),
                    1 => sunday + Days::new(1),
                    _ => sunday,
                };
                let neutral = rng.gen_bool(0.01);
                let id = event_id(season, week, home, away, neutral);
                events.push(ScheduledGame {
                    event_id: id.clone(),
                    season,
                    week,
                    date,
                    home_team: home,
                    away_team: away,
                    is_neutral: neutral,
                    is_playoffs: false,
                    is_complete: !unplayed,
                });
                if unplayed {
                    continue;
                }

                let home_edge = if neutral { 0.0 } else { 1.5 };
                let home_pts = score(&mut rng, home_str - away_str + home_edge);
                let away_pts = score(&mut rng, away_str - home_str - home_edge);
                let home_stats = box_score(&mut rng, home_str);
                let away_stats = box_score(&mut rng, away_str);
                let [h, a] = played_game(
                    &id,
                    season,
                    week,
                    date,
                    (home, home_pts, home_stats),
                    (away, away_pts, away_stats),
                    neutral,
                );
                rows.push(h);
                rows.push(a);
            }
        }

        // Offseason drift.
        for (_, s) in strength.iter_mut() {
            *s = (*s * 0.7 + rng.gen_range(-3.0..3.0)).clamp(-10.0, 10.0);
        }
    }

    SyntheticLeague { rows, events }
}

pub fn played_game(
    event_id: &str,
    season: i32,
    week: u32,
    date: NaiveDate,
    home: (Team, f64, StatLine),
    away: (Team, f64, StatLine),
    neutral: bool,
) -> [RawGameRow; 2] {
    let row = |side: (Team, f64, StatLine), other: (Team, f64, StatLine), is_home: bool| RawGameRow {
        event_id: event_id.to_string(),
        season,
        week,
        date,
        team: side.0.code().to_string(),
        opponent: other.0.code().to_string(),
        is_home,
        win: side.1 > other.1,
        points_scored: side.1,
        points_allowed: Some(other.1),
        stats: side.2,
    };
    [row(home, away, true), row(away, home, neutral)]
}

fn season_opener(season: i32) -> NaiveDate {
    // Second Sunday of September is close enough.
    let first = NaiveDate::from_ymd_opt(season, 9, 1).unwrap_or_default();
    let to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    first + Days::new(u64::from(to_sunday) + 7)
}

fn score(rng: &mut StdRng, edge: f64) -> f64 {
    let raw = 21.0 + edge + rng.gen_range(-10.0..10.0) + rng.gen_range(-4.0..4.0);
    raw.round().max(0.0)
}

fn box_score(rng: &mut StdRng, strength: f64) -> StatLine {
    let attempts = rng.gen_range(25.0_f64..45.0).round();
    let completions = (attempts * rng.gen_range(0.55..0.72)).round();
    let pass_yds = (completions * rng.gen_range(9.0..12.5) + strength * 4.0).round().max(0.0);
    let rush_att = rng.gen_range(18.0_f64..35.0).round();
    let rush_yds = (rush_att * rng.gen_range(3.2..5.2)).round();
    let fumbles = f64::from(rng.gen_range(0u8..3));
    let ints = f64::from(rng.gen_range(0u8..3));
    let pass_tds = f64::from(rng.gen_range(0u8..4));
    let sacks = f64::from(rng.gen_range(0u8..5));
    let penalties = f64::from(rng.gen_range(3u8..11));

    StatLine::default()
        .with(RawStat::PassCompletions, completions)
        .with(RawStat::PassAttempts, attempts)
        .with(RawStat::PassYards, pass_yds)
        .with(RawStat::PassTds, pass_tds)
        .with(RawStat::PassYardsPerAttempt, pass_yds / attempts)
        .with(
            RawStat::PassAdjustedYardsPerAttempt,
            (pass_yds + 20.0 * pass_tds - 45.0 * ints) / attempts,
        )
        .with(RawStat::SacksAllowed, sacks)
        .with(RawStat::SackYardsLost, (sacks * rng.gen_range(5.0..8.0)).round())
        .with(RawStat::RushingAttempts, rush_att)
        .with(RawStat::RushingYards, rush_yds)
        .with(RawStat::RushingYardsPerAttempt, rush_yds / rush_att)
        .with(RawStat::OffensivePlays, attempts + rush_att + sacks)
        .with(RawStat::TotalYards, pass_yds + rush_yds)
        .with(RawStat::Penalties, penalties)
        .with(RawStat::PenaltyYards, (penalties * rng.gen_range(6.0..9.5)).round())
        .with(RawStat::FumblesLost, fumbles)
        .with(RawStat::InterceptionsThrown, ints)
        .with(RawStat::Turnovers, fumbles + ints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_log::GameLog;

    #[test]
    fn same_seed_same_league() {
        let a = generate(7, LeagueShape::default());
        let b = generate(7, LeagueShape::default());
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn every_played_event_has_two_rows() {
        let shape = LeagueShape {
            seasons: 1,
            weeks: 4,
            unplayed_weeks: 1,
            ..LeagueShape::default()
        };
        let league = generate(1, shape);
        assert_eq!(league.events.len(), 4 * 16);
        assert_eq!(league.rows.len(), 3 * 32);
        let (log, rejected) = GameLog::from_raw(league.rows).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(log.len(), 3 * 32);
    }
}
