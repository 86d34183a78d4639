use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use crate::error::FeatureError;
use crate::game_log::{RawGameRow, RawStat, ScheduledGame, StatLine};
use crate::teams::resolve_team;

const EVENT_COLUMNS: [&str; 9] = [
    "event_id",
    "season",
    "season_week_number",
    "date",
    "home_team",
    "away_team",
    "is_neutral",
    "is_playoffs",
    "is_complete",
];

const RESULT_COLUMNS: [&str; 8] = [
    "event_id",
    "team",
    "opponent",
    "date",
    "is_home",
    "win",
    "points_scored",
    "points_allowed",
];

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    let stat_columns: String = RawStat::ALL
        .iter()
        .map(|stat| format!(",\n            {} REAL NULL", stat.column()))
        .collect();
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS event (
            event_id TEXT PRIMARY KEY,
            season INTEGER NOT NULL,
            season_week_number INTEGER NOT NULL,
            date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            is_neutral INTEGER NOT NULL DEFAULT 0,
            is_playoffs INTEGER NOT NULL DEFAULT 0,
            is_complete INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_event_season_week ON event(season, season_week_number);

        CREATE TABLE IF NOT EXISTS team_result (
            event_id TEXT NOT NULL,
            team TEXT NOT NULL,
            opponent TEXT NOT NULL,
            date TEXT NOT NULL,
            is_home INTEGER NOT NULL,
            win INTEGER NOT NULL,
            points_scored REAL NOT NULL,
            points_allowed REAL NULL{stat_columns}
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_event_id_team_compound
            ON team_result(event_id, team);
        "#
    );
    conn.execute_batch(&sql).context("create sqlite schema")?;
    Ok(())
}

fn ensure_columns(conn: &Connection, table: &'static str, required: &[&str]) -> Result<()> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .context("prepare table_info")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("query table_info")?
        .collect::<rusqlite::Result<Vec<String>>>()
        .context("decode table_info")?;
    for column in required {
        if !present.iter().any(|c| c == column) {
            return Err(FeatureError::MissingColumn {
                table,
                column: column.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn parse_date(event_id: &str, raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        FeatureError::InvalidDate {
            event_id: event_id.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

pub fn load_events(conn: &Connection, complete: Option<bool>) -> Result<Vec<ScheduledGame>> {
    ensure_columns(conn, "event", &EVENT_COLUMNS)?;
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                event_id, season, season_week_number, date,
                home_team, away_team, is_neutral, is_playoffs, is_complete
            FROM event
            WHERE ?1 IS NULL OR is_complete = ?1
            ORDER BY season ASC, season_week_number ASC, date ASC, event_id ASC
            "#,
        )
        .context("prepare load events query")?;

    let rows = stmt
        .query_map(params![complete.map(i64::from)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)? != 0,
                row.get::<_, i64>(7)? != 0,
                row.get::<_, i64>(8)? != 0,
            ))
        })
        .context("query load events")?;

    let mut out = Vec::new();
    for row in rows {
        let (event_id, season, week, date, home, away, is_neutral, is_playoffs, is_complete) =
            row.context("decode event row")?;
        out.push(ScheduledGame {
            date: parse_date(&event_id, &date)?,
            home_team: resolve_team(&event_id, &home)?,
            away_team: resolve_team(&event_id, &away)?,
            event_id,
            season,
            week,
            is_neutral,
            is_playoffs,
            is_complete,
        });
    }
    Ok(out)
}

pub fn load_upcoming_week(conn: &Connection) -> Result<Vec<ScheduledGame>> {
    let events = load_events(conn, Some(false))?;
    Ok(crate::game_log::next_unplayed_week(&events))
}

pub fn load_team_results(conn: &Connection) -> Result<Vec<RawGameRow>> {
    let required: Vec<&str> = RESULT_COLUMNS
        .iter()
        .copied()
        .chain(RawStat::ALL.iter().map(|stat| stat.column()))
        .collect();
    ensure_columns(conn, "team_result", &required)?;
    let stat_select: String = RawStat::ALL
        .iter()
        .map(|stat| format!(", tr.{}", stat.column()))
        .collect();
    let sql = format!(
        r#"
        SELECT
            tr.event_id, e.season, e.season_week_number, tr.date,
            tr.team, tr.opponent, tr.is_home, tr.win,
            tr.points_scored, tr.points_allowed{stat_select}
        FROM team_result tr
        JOIN event e ON e.event_id = tr.event_id
        ORDER BY tr.date ASC, tr.event_id ASC, tr.team ASC
        "#
    );
    let mut stmt = conn.prepare(&sql).context("prepare load team results query")?;

    let rows = stmt
        .query_map([], |row| {
            let mut stats = StatLine::default();
            for (offset, stat) in RawStat::ALL.iter().enumerate() {
                stats.set(*stat, row.get::<_, Option<f64>>(10 + offset)?);
            }
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)? != 0,
                row.get::<_, i64>(7)? != 0,
                row.get::<_, f64>(8)?,
                row.get::<_, Option<f64>>(9)?,
                stats,
            ))
        })
        .context("query load team results")?;

    let mut out = Vec::new();
    for row in rows {
        let (event_id, season, week, date, team, opponent, is_home, win, scored, allowed, stats) =
            row.context("decode team result row")?;
        out.push(RawGameRow {
            date: parse_date(&event_id, &date)?,
            event_id,
            season,
            week,
            team,
            opponent,
            is_home,
            win,
            points_scored: scored,
            points_allowed: allowed,
            stats,
        });
    }
    Ok(out)
}

pub fn upsert_event(conn: &Connection, event: &ScheduledGame) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO event (
            event_id, season, season_week_number, date,
            home_team, away_team, is_neutral, is_playoffs, is_complete
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(event_id) DO UPDATE SET
            season = excluded.season,
            season_week_number = excluded.season_week_number,
            date = excluded.date,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            is_neutral = excluded.is_neutral,
            is_playoffs = excluded.is_playoffs,
            is_complete = excluded.is_complete
        "#,
        params![
            event.event_id,
            event.season,
            event.week,
            event.date.format("%Y-%m-%d").to_string(),
            event.home_team.code(),
            event.away_team.code(),
            i64::from(event.is_neutral),
            i64::from(event.is_playoffs),
            i64::from(event.is_complete),
        ],
    )
    .context("upsert event")?;
    Ok(())
}

pub fn upsert_team_result(conn: &Connection, row: &RawGameRow) -> Result<()> {
    let stat_names: Vec<&str> = RawStat::ALL.iter().map(|s| s.column()).collect();
    let columns = RESULT_COLUMNS
        .iter()
        .copied()
        .chain(stat_names.iter().copied())
        .collect::<Vec<_>>();
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO team_result ({}) VALUES ({placeholders})",
        columns.join(", ")
    );

    let mut values: Vec<rusqlite::types::Value> = vec![
        row.event_id.clone().into(),
        row.team.clone().into(),
        row.opponent.clone().into(),
        row.date.format("%Y-%m-%d").to_string().into(),
        i64::from(row.is_home).into(),
        i64::from(row.win).into(),
        row.points_scored.into(),
        row.points_allowed.into(),
    ];
    values.extend(RawStat::ALL.iter().map(|stat| row.stats.get(*stat).into()));

    conn.execute(&sql, params_from_iter(values))
        .context("upsert team result")?;
    Ok(())
}

pub fn count_events(conn: &Connection, complete: bool) -> Result<usize> {
    let count: Option<i64> = conn
        .query_row(
            "SELECT COUNT(*) FROM event WHERE is_complete = ?1",
            params![i64::from(complete)],
            |row| row.get(0),
        )
        .optional()
        .context("count events")?;
    Ok(count.unwrap_or(0).max(0) as usize)
}
