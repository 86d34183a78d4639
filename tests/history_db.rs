use chrono::NaiveDate;
use rusqlite::Connection;

use gridiron_forecast::error::FeatureError;
use gridiron_forecast::game_log::{GameLog, RawStat, ScheduledGame, StatLine, event_id};
use gridiron_forecast::history_db;
use gridiron_forecast::synthetic::played_game;
use gridiron_forecast::teams::Team;

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    history_db::init_schema(&conn).unwrap();

    let day = NaiveDate::from_ymd_opt(2023, 9, 10).unwrap();
    let id = event_id(2023, 1, Team::Eagles, Team::Giants, false);
    let [home, away] = played_game(
        &id,
        2023,
        1,
        day,
        (Team::Eagles, 31.0, StatLine::default().with(RawStat::Turnovers, 1.0)),
        (Team::Giants, 17.0, StatLine::default()),
        false,
    );
    history_db::upsert_event(
        &conn,
        &ScheduledGame {
            event_id: id.clone(),
            season: 2023,
            week: 1,
            date: day,
            home_team: Team::Eagles,
            away_team: Team::Giants,
            is_neutral: false,
            is_playoffs: false,
            is_complete: true,
        },
    )
    .unwrap();
    history_db::upsert_team_result(&conn, &home).unwrap();
    history_db::upsert_team_result(&conn, &away).unwrap();

    for (week, home, away) in [(2, Team::Giants, Team::Cowboys), (3, Team::Eagles, Team::Giants)] {
        history_db::upsert_event(
            &conn,
            &ScheduledGame {
                event_id: event_id(2023, week, home, away, false),
                season: 2023,
                week,
                date: day + chrono::Days::new(7 * u64::from(week - 1)),
                home_team: home,
                away_team: away,
                is_neutral: false,
                is_playoffs: false,
                is_complete: false,
            },
        )
        .unwrap();
    }
    conn
}

#[test]
fn team_results_load_into_a_valid_log() {
    let conn = seeded();
    let rows = history_db::load_team_results(&conn).unwrap();
    assert_eq!(rows.len(), 2);
    let (log, rejected) = GameLog::from_raw(rows).unwrap();
    assert!(rejected.is_empty());
    let eagles = log.get("2023_1_phi_nyg", Team::Eagles).unwrap();
    assert_eq!(eagles.points_allowed, 17.0);
    assert_eq!(eagles.stats.get(RawStat::Turnovers), Some(1.0));
    assert_eq!(eagles.stats.get(RawStat::PassYards), None);
    assert!(eagles.is_home);
}

#[test]
fn events_filter_on_completion() {
    let conn = seeded();
    assert_eq!(history_db::load_events(&conn, None).unwrap().len(), 3);
    assert_eq!(history_db::load_events(&conn, Some(true)).unwrap().len(), 1);
    assert_eq!(history_db::count_events(&conn, false).unwrap(), 2);

    let next = history_db::load_upcoming_week(&conn).unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].week, 2);
    assert_eq!(next[0].home_team, Team::Giants);
}

#[test]
fn upserting_twice_keeps_one_row() {
    let conn = seeded();
    let rows = history_db::load_team_results(&conn).unwrap();
    history_db::upsert_team_result(&conn, &rows[0]).unwrap();
    assert_eq!(history_db::load_team_results(&conn).unwrap().len(), 2);
}

#[test]
fn missing_column_is_reported_by_name() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE event (event_id TEXT, season INTEGER, date TEXT,
            home_team TEXT, away_team TEXT, is_neutral INTEGER,
            is_playoffs INTEGER, is_complete INTEGER);",
    )
    .unwrap();
    let err = history_db::load_events(&conn, None).unwrap_err();
    match err.downcast_ref::<FeatureError>() {
        Some(FeatureError::MissingColumn { table, column }) => {
            assert_eq!(*table, "event");
            assert_eq!(column, "season_week_number");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_stat_column_is_reported_by_name() {
    let conn = Connection::open_in_memory().unwrap();
    let stats: String = RawStat::ALL
        .iter()
        .filter(|stat| **stat != RawStat::Turnovers)
        .map(|stat| format!(", {} REAL", stat.column()))
        .collect();
    conn.execute_batch(&format!(
        "CREATE TABLE team_result (event_id TEXT, team TEXT, opponent TEXT,
            date TEXT, is_home INTEGER, win INTEGER, points_scored REAL,
            points_allowed REAL{stats});"
    ))
    .unwrap();
    let err = history_db::load_team_results(&conn).unwrap_err();
    match err.downcast_ref::<FeatureError>() {
        Some(FeatureError::MissingColumn { table, column }) => {
            assert_eq!(*table, "team_result");
            assert_eq!(column, "turnovers");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn file_database_is_created_with_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db").join("historical_data.db");
    let conn = history_db::open_db(&path).unwrap();
    assert!(path.exists());
    assert!(history_db::load_events(&conn, None).unwrap().is_empty());
}
