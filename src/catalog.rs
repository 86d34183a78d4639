use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::game_log::RawStat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseFeature {
    EloRating,
    RpiRating,
    DaysRest,
}

impl BaseFeature {
    pub const ALL: [BaseFeature; 3] = [
        BaseFeature::EloRating,
        BaseFeature::RpiRating,
        BaseFeature::DaysRest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BaseFeature::EloRating => "elo_rating",
            BaseFeature::RpiRating => "rpi_rating",
            BaseFeature::DaysRest => "days_rest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceColumn {
    PointsScored,
    OppPointsScored,
    PointDifferential,
    Own(RawStat),
    Opp(RawStat),
    EloRating,
}

impl SourceColumn {
    pub fn column_name(self) -> String {
        match self {
            SourceColumn::PointsScored => "points_scored".to_string(),
            SourceColumn::OppPointsScored => "opp_points_scored".to_string(),
            SourceColumn::PointDifferential => "point_differential".to_string(),
            SourceColumn::Own(stat) => stat.column().to_string(),
            SourceColumn::Opp(stat) => format!("opp_{}", stat.column()),
            SourceColumn::EloRating => "elo_rating".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowedStat {
    PointsScored,
    PassAdjustedYardsPerAttempt,
    RushingYardsPerAttempt,
    Turnovers,
    PenaltyYards,
    SackYardsLost,
    PointsAllowed,
    PassAdjustedYardsPerAttemptAllowed,
    RushingYardsPerAttemptAllowed,
    TurnoversForced,
    SackYardsGained,
    PointDifferential,
}

impl WindowedStat {
    pub const ALL: [WindowedStat; 12] = [
        WindowedStat::PointsScored,
        WindowedStat::PassAdjustedYardsPerAttempt,
        WindowedStat::RushingYardsPerAttempt,
        WindowedStat::Turnovers,
        WindowedStat::PenaltyYards,
        WindowedStat::SackYardsLost,
        WindowedStat::PointsAllowed,
        WindowedStat::PassAdjustedYardsPerAttemptAllowed,
        WindowedStat::RushingYardsPerAttemptAllowed,
        WindowedStat::TurnoversForced,
        WindowedStat::SackYardsGained,
        WindowedStat::PointDifferential,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WindowedStat::PointsScored => "points_scored",
            WindowedStat::PassAdjustedYardsPerAttempt => "pass_adjusted_yards_per_attempt",
            WindowedStat::RushingYardsPerAttempt => "rushing_yards_per_attempt",
            WindowedStat::Turnovers => "turnovers",
            WindowedStat::PenaltyYards => "penalty_yards",
            WindowedStat::SackYardsLost => "sack_yards_lost",
            WindowedStat::PointsAllowed => "points_allowed",
            WindowedStat::PassAdjustedYardsPerAttemptAllowed => {
                "pass_adjusted_yards_per_attempt_allowed"
            }
            WindowedStat::RushingYardsPerAttemptAllowed => "rushing_yards_per_attempt_allowed",
            WindowedStat::TurnoversForced => "turnovers_forced",
            WindowedStat::SackYardsGained => "sack_yards_gained",
            WindowedStat::PointDifferential => "point_differential",
        }
    }

    pub fn source(self) -> SourceColumn {
        match self {
            WindowedStat::PointsScored => SourceColumn::PointsScored,
            WindowedStat::PassAdjustedYardsPerAttempt => {
                SourceColumn::Own(RawStat::PassAdjustedYardsPerAttempt)
            }
            WindowedStat::RushingYardsPerAttempt => {
                SourceColumn::Own(RawStat::RushingYardsPerAttempt)
            }
            WindowedStat::Turnovers => SourceColumn::Own(RawStat::Turnovers),
            WindowedStat::PenaltyYards => SourceColumn::Own(RawStat::PenaltyYards),
            WindowedStat::SackYardsLost => SourceColumn::Own(RawStat::SackYardsLost),
            WindowedStat::PointsAllowed => SourceColumn::OppPointsScored,
            WindowedStat::PassAdjustedYardsPerAttemptAllowed => {
                SourceColumn::Opp(RawStat::PassAdjustedYardsPerAttempt)
            }
            WindowedStat::RushingYardsPerAttemptAllowed => {
                SourceColumn::Opp(RawStat::RushingYardsPerAttempt)
            }
            WindowedStat::TurnoversForced => SourceColumn::Opp(RawStat::Turnovers),
            WindowedStat::SackYardsGained => SourceColumn::Opp(RawStat::SackYardsLost),
            WindowedStat::PointDifferential => SourceColumn::PointDifferential,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendStat {
    Windowed(WindowedStat),
    EloRating,
}

impl TrendStat {
    pub fn all() -> impl Iterator<Item = TrendStat> {
        WindowedStat::ALL
            .into_iter()
            .map(TrendStat::Windowed)
            .chain(std::iter::once(TrendStat::EloRating))
    }

    pub fn name(self) -> &'static str {
        match self {
            TrendStat::Windowed(stat) => stat.name(),
            TrendStat::EloRating => "elo_rating",
        }
    }

    pub fn source(self) -> SourceColumn {
        match self {
            TrendStat::Windowed(stat) => stat.source(),
            TrendStat::EloRating => SourceColumn::EloRating,
        }
    }

    fn index(self) -> usize {
        match self {
            TrendStat::Windowed(stat) => stat.index(),
            TrendStat::EloRating => WindowedStat::ALL.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvgWindow {
    L3,
    L5,
    L7,
    Home,
    Away,
}

impl AvgWindow {
    pub const ALL: [AvgWindow; 5] = [
        AvgWindow::L3,
        AvgWindow::L5,
        AvgWindow::L7,
        AvgWindow::Home,
        AvgWindow::Away,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            AvgWindow::L3 => "l3",
            AvgWindow::L5 => "l5",
            AvgWindow::L7 => "l7",
            AvgWindow::Home => "home",
            AvgWindow::Away => "away",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendWindow {
    L5,
    L7,
}

impl TrendWindow {
    pub const ALL: [TrendWindow; 2] = [TrendWindow::L5, TrendWindow::L7];

    pub fn suffix(self) -> &'static str {
        match self {
            TrendWindow::L5 => "l5",
            TrendWindow::L7 => "l7",
        }
    }

    pub fn games(self) -> usize {
        match self {
            TrendWindow::L5 => 5,
            TrendWindow::L7 => 7,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FeatureKey {
    Base(BaseFeature),
    Average(WindowedStat, AvgWindow),
    Trend(TrendStat, TrendWindow),
}

const AVG_OFFSET: usize = BaseFeature::ALL.len();
const TREND_OFFSET: usize = AVG_OFFSET + WindowedStat::ALL.len() * AvgWindow::ALL.len();

pub const FEATURE_COUNT: usize = TREND_OFFSET + (WindowedStat::ALL.len() + 1) * TrendWindow::ALL.len();

impl FeatureKey {
    pub fn name(self) -> String {
        match self {
            FeatureKey::Base(base) => base.name().to_string(),
            FeatureKey::Average(stat, window) => {
                format!("avg_{}_{}", stat.name(), window.suffix())
            }
            FeatureKey::Trend(stat, window) => {
                format!("trend_{}_{}", stat.name(), window.suffix())
            }
        }
    }

    pub fn index(self) -> usize {
        match self {
            FeatureKey::Base(base) => base as usize,
            FeatureKey::Average(stat, window) => {
                AVG_OFFSET + stat.index() * AvgWindow::ALL.len() + window.index()
            }
            FeatureKey::Trend(stat, window) => {
                TREND_OFFSET + stat.index() * TrendWindow::ALL.len() + window.index()
            }
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for FeatureKey {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        catalog()
            .key(s)
            .ok_or_else(|| FeatureError::InvalidFeatureNames(vec![s.to_string()]))
    }
}

impl TryFrom<String> for FeatureKey {
    type Error = FeatureError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.name()
    }
}

#[derive(Debug)]
pub struct FeatureCatalog {
    keys: Vec<FeatureKey>,
    names: Vec<String>,
    by_name: HashMap<String, FeatureKey>,
}

static CATALOG: Lazy<FeatureCatalog> = Lazy::new(FeatureCatalog::build);

pub fn catalog() -> &'static FeatureCatalog {
    &CATALOG
}

impl FeatureCatalog {
    fn build() -> Self {
        let mut keys = Vec::with_capacity(FEATURE_COUNT);
        keys.extend(BaseFeature::ALL.into_iter().map(FeatureKey::Base));
        for stat in WindowedStat::ALL {
            for window in AvgWindow::ALL {
                keys.push(FeatureKey::Average(stat, window));
            }
        }
        for stat in TrendStat::all() {
            for window in TrendWindow::ALL {
                keys.push(FeatureKey::Trend(stat, window));
            }
        }

        let names: Vec<String> = keys.iter().map(|k| k.name()).collect();
        let by_name = keys
            .iter()
            .zip(&names)
            .map(|(key, name)| (name.clone(), *key))
            .collect();
        Self {
            keys,
            names,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[FeatureKey] {
        &self.keys
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn key(&self, name: &str) -> Option<FeatureKey> {
        self.by_name.get(name).copied()
    }

    pub fn validate<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<FeatureKey>> {
        let mut keys = Vec::with_capacity(requested.len());
        let mut invalid = Vec::new();
        for name in requested {
            match self.key(name.as_ref()) {
                Some(key) => keys.push(key),
                None => invalid.push(name.as_ref().to_string()),
            }
        }
        if invalid.is_empty() {
            Ok(keys)
        } else {
            Err(FeatureError::InvalidFeatureNames(invalid))
        }
    }
}
