use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeatureError>;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("unknown team code `{code}` (event {event_id})")]
    UnknownTeam { event_id: String, code: String },

    #[error("opponent `{raw}` for {team} in event {event_id} has no team mapping")]
    MissingOpponentMapping {
        event_id: String,
        team: String,
        raw: String,
    },

    #[error("event {event_id}: {team} has no paired row for opponent {opponent}")]
    MissingOpponentRow {
        event_id: String,
        team: String,
        opponent: String,
    },

    #[error("event {event_id}: {team} row disagrees with its pair on {field}")]
    MismatchedPair {
        event_id: String,
        team: String,
        field: &'static str,
    },

    #[error("event {event_id}: {team} win flag contradicts the score")]
    InconsistentWin { event_id: String, team: String },

    #[error("event {event_id}: duplicate row for {team}")]
    DuplicateRecord { event_id: String, team: String },

    #[error("event {event_id}: {team} reports {reported} points allowed, opponent scored {actual}")]
    InconsistentScore {
        event_id: String,
        team: String,
        reported: f64,
        actual: f64,
    },

    #[error("event {event_id}: no feature row for {team}")]
    MissingEvent { event_id: String, team: String },

    #[error("invalid feature names: {}", .0.join(", "))]
    InvalidFeatureNames(Vec<String>),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid experiment plan: {0}")]
    InvalidExperimentPlan(String),

    #[error("missing column `{column}` in {table}")]
    MissingColumn { table: &'static str, column: String },

    #[error("invalid date `{value}` in event {event_id}")]
    InvalidDate { event_id: String, value: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
