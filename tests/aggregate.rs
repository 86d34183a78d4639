use chrono::NaiveDate;

use gridiron_forecast::aggregate::DataAggregate;
use gridiron_forecast::config::{PipelineConfig, SnapshotPolicy};
use gridiron_forecast::elo::elo_as_of;
use gridiron_forecast::error::FeatureError;
use gridiron_forecast::game_log::{GameLog, RawGameRow, ScheduledGame, StatLine, event_id};
use gridiron_forecast::opponent::FeatureTable;
use gridiron_forecast::synthetic::played_game;
use gridiron_forecast::teams::Team;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, m, d).unwrap()
}

fn game(week: u32, day: NaiveDate, home: (Team, f64), away: (Team, f64)) -> [RawGameRow; 2] {
    let id = event_id(2023, week, home.0, away.0, false);
    played_game(
        &id,
        2023,
        week,
        day,
        (home.0, home.1, StatLine::default()),
        (away.0, away.1, StatLine::default()),
        false,
    )
}

fn upcoming(week: u32, day: NaiveDate, home: Team, away: Team) -> ScheduledGame {
    ScheduledGame {
        event_id: event_id(2023, week, home, away, false),
        season: 2023,
        week,
        date: day,
        home_team: home,
        away_team: away,
        is_neutral: false,
        is_playoffs: false,
        is_complete: false,
    }
}

fn two_weeks() -> GameLog {
    let games = vec![
        game(1, date(9, 10), (Team::Chiefs, 27.0), (Team::Lions, 20.0)),
        game(1, date(9, 10), (Team::Bears, 13.0), (Team::Packers, 24.0)),
        game(2, date(9, 17), (Team::Lions, 31.0), (Team::Bears, 17.0)),
        game(2, date(9, 17), (Team::Packers, 10.0), (Team::Chiefs, 21.0)),
    ];
    GameLog::from_raw(games.into_iter().flatten().collect())
        .unwrap()
        .0
}

fn schedule_ahead() -> Vec<ScheduledGame> {
    vec![
        upcoming(3, date(9, 24), Team::Chiefs, Team::Bears),
        upcoming(3, date(9, 24), Team::Texans, Team::Lions),
        upcoming(4, date(10, 1), Team::Packers, Team::Lions),
    ]
}

#[test]
fn every_completed_event_yields_one_row() {
    let agg = DataAggregate::from_log(two_weeks(), &schedule_ahead(), PipelineConfig::default())
        .unwrap();
    let mut ids: Vec<&str> = agg.training().iter().map(|r| r.event_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(
        ids,
        vec!["2023_1_chi_gnb", "2023_1_kan_det", "2023_2_det_chi", "2023_2_gnb_kan"]
    );
    for row in agg.training() {
        assert!(row.team_a_is_home);
        assert!(!row.team_b_is_home);
        assert_ne!(row.team_a, row.team_b);
    }
}

#[test]
fn differential_is_away_minus_home() {
    let agg = DataAggregate::from_log(two_weeks(), &[], PipelineConfig::default()).unwrap();
    let row = agg
        .training()
        .iter()
        .find(|r| r.event_id == "2023_1_kan_det")
        .unwrap();
    assert_eq!(row.team_a, Team::Chiefs);
    assert!(row.team_a_win);
    assert_eq!(row.team_a_point_differential, -7.0);
    assert_eq!(row.column("team_a_point_differential"), Some(-7.0));
    assert_eq!(row.column("team_a_win"), Some(1.0));
    assert_eq!(row.column("team_b_elo_rating"), Some(1500.0));
    assert_eq!(row.column("team_b_win"), None);
}

#[test]
fn prediction_set_is_the_next_unplayed_week() {
    let agg = DataAggregate::from_log(two_weeks(), &schedule_ahead(), PipelineConfig::default())
        .unwrap();
    let ids: Vec<&str> = agg
        .prediction_set()
        .iter()
        .map(|r| r.event_id.as_str())
        .collect();
    assert_eq!(ids, vec!["2023_3_htx_det", "2023_3_kan_chi"]);
    for row in agg.prediction_set() {
        assert_eq!(row.team_a_win, None);
        assert_eq!(row.team_a_point_differential, None);
    }
}

#[test]
fn last_played_snapshot_is_the_tail_row() {
    let agg = DataAggregate::from_log(two_weeks(), &schedule_ahead(), PipelineConfig::default())
        .unwrap();
    let kan_chi = agg
        .prediction_set()
        .iter()
        .find(|r| r.team_a == Team::Chiefs)
        .unwrap();
    assert_eq!(
        Some(&kan_chi.team_a_features),
        agg.latest_features(Team::Chiefs)
    );
    assert_eq!(
        Some(&kan_chi.team_b_features),
        agg.latest_features(Team::Bears)
    );
}

#[test]
fn team_without_history_gets_neutral_features() {
    let agg = DataAggregate::from_log(two_weeks(), &schedule_ahead(), PipelineConfig::default())
        .unwrap();
    let row = agg
        .prediction_set()
        .iter()
        .find(|r| r.team_a == Team::Texans)
        .unwrap();
    assert_eq!(row.team_a_features.get_named("elo_rating"), Some(1500.0));
    assert_eq!(row.team_a_features.get_named("rpi_rating"), Some(0.5));
    assert_eq!(row.team_a_features.get_named("avg_points_scored_l3"), None);
}

#[test]
fn kickoff_snapshot_includes_the_last_game() {
    let cfg = PipelineConfig {
        snapshot: SnapshotPolicy::AsOfKickoff,
        ..PipelineConfig::default()
    };
    let log = two_weeks();
    let expected_elo = elo_as_of(&log, cfg.elo, date(9, 24)).rating(Team::Chiefs);
    let agg = DataAggregate::from_log(log, &schedule_ahead(), cfg).unwrap();
    let row = agg
        .prediction_set()
        .iter()
        .find(|r| r.team_a == Team::Chiefs)
        .unwrap();

    assert_eq!(row.team_a_features.get_named("elo_rating"), Some(expected_elo));
    assert!(expected_elo > 1510.0);
    assert_eq!(row.team_a_features.get_named("avg_points_scored_l3"), Some(24.0));
    assert_eq!(row.team_a_features.get_named("days_rest"), Some(7.0));
    // Chiefs are 2-0 against 1-1 Lions and 1-1 Packers.
    let rpi = row.team_a_features.get_named("rpi_rating").unwrap();
    assert!(rpi > 0.5 && rpi <= 1.0);
}

#[test]
fn completed_event_without_rows_is_an_error() {
    let log = two_weeks();
    let mut events = log.schedule();
    events.push(ScheduledGame {
        is_complete: true,
        ..upcoming(2, date(9, 17), Team::Jets, Team::Bills)
    });
    let err = DataAggregate::build(log, &events, PipelineConfig::default()).unwrap_err();
    match err {
        FeatureError::MissingEvent { event_id, team } => {
            assert_eq!(event_id, "2023_2_nyj_buf");
            assert_eq!(team, "nyj");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_schedule_entries_are_joined_once() {
    let log = two_weeks();
    let mut events = log.schedule();
    events.push(events[0].clone());
    let agg = DataAggregate::build(log, &events, PipelineConfig::default()).unwrap();
    assert_eq!(agg.training().len(), 4);
}
