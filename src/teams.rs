use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "crd")]
    Cardinals,
    #[serde(rename = "atl")]
    Falcons,
    #[serde(rename = "rav")]
    Ravens,
    #[serde(rename = "buf")]
    Bills,
    #[serde(rename = "car")]
    Panthers,
    #[serde(rename = "chi")]
    Bears,
    #[serde(rename = "cin")]
    Bengals,
    #[serde(rename = "cle")]
    Browns,
    #[serde(rename = "dal")]
    Cowboys,
    #[serde(rename = "den")]
    Broncos,
    #[serde(rename = "det")]
    Lions,
    #[serde(rename = "gnb")]
    Packers,
    #[serde(rename = "htx")]
    Texans,
    #[serde(rename = "clt")]
    Colts,
    #[serde(rename = "jax")]
    Jaguars,
    #[serde(rename = "kan")]
    Chiefs,
    #[serde(rename = "sdg")]
    Chargers,
    #[serde(rename = "ram")]
    Rams,
    #[serde(rename = "rai")]
    Raiders,
    #[serde(rename = "mia")]
    Dolphins,
    #[serde(rename = "min")]
    Vikings,
    #[serde(rename = "nwe")]
    Patriots,
    #[serde(rename = "nor")]
    Saints,
    #[serde(rename = "nyg")]
    Giants,
    #[serde(rename = "nyj")]
    Jets,
    #[serde(rename = "phi")]
    Eagles,
    #[serde(rename = "pit")]
    Steelers,
    #[serde(rename = "sea")]
    Seahawks,
    #[serde(rename = "sfo")]
    FortyNiners,
    #[serde(rename = "tam")]
    Buccaneers,
    #[serde(rename = "oti")]
    Titans,
    #[serde(rename = "was")]
    Commanders,
}

impl Team {
    pub const ALL: [Team; 32] = [
        Team::Cardinals,
        Team::Falcons,
        Team::Ravens,
        Team::Bills,
        Team::Panthers,
        Team::Bears,
        Team::Bengals,
        Team::Browns,
        Team::Cowboys,
        Team::Broncos,
        Team::Lions,
        Team::Packers,
        Team::Texans,
        Team::Colts,
        Team::Jaguars,
        Team::Chiefs,
        Team::Chargers,
        Team::Rams,
        Team::Raiders,
        Team::Dolphins,
        Team::Vikings,
        Team::Patriots,
        Team::Saints,
        Team::Giants,
        Team::Jets,
        Team::Eagles,
        Team::Steelers,
        Team::Seahawks,
        Team::FortyNiners,
        Team::Buccaneers,
        Team::Titans,
        Team::Commanders,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Team::Cardinals => "crd",
            Team::Falcons => "atl",
            Team::Ravens => "rav",
            Team::Bills => "buf",
            Team::Panthers => "car",
            Team::Bears => "chi",
            Team::Bengals => "cin",
            Team::Browns => "cle",
            Team::Cowboys => "dal",
            Team::Broncos => "den",
            Team::Lions => "det",
            Team::Packers => "gnb",
            Team::Texans => "htx",
            Team::Colts => "clt",
            Team::Jaguars => "jax",
            Team::Chiefs => "kan",
            Team::Chargers => "sdg",
            Team::Rams => "ram",
            Team::Raiders => "rai",
            Team::Dolphins => "mia",
            Team::Vikings => "min",
            Team::Patriots => "nwe",
            Team::Saints => "nor",
            Team::Giants => "nyg",
            Team::Jets => "nyj",
            Team::Eagles => "phi",
            Team::Steelers => "pit",
            Team::Seahawks => "sea",
            Team::FortyNiners => "sfo",
            Team::Buccaneers => "tam",
            Team::Titans => "oti",
            Team::Commanders => "was",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Team::Cardinals => "Arizona Cardinals",
            Team::Falcons => "Atlanta Falcons",
            Team::Ravens => "Baltimore Ravens",
            Team::Bills => "Buffalo Bills",
            Team::Panthers => "Carolina Panthers",
            Team::Bears => "Chicago Bears",
            Team::Bengals => "Cincinnati Bengals",
            Team::Browns => "Cleveland Browns",
            Team::Cowboys => "Dallas Cowboys",
            Team::Broncos => "Denver Broncos",
            Team::Lions => "Detroit Lions",
            Team::Packers => "Green Bay Packers",
            Team::Texans => "Houston Texans",
            Team::Colts => "Indianapolis Colts",
            Team::Jaguars => "Jacksonville Jaguars",
            Team::Chiefs => "Kansas City Chiefs",
            Team::Chargers => "Los Angeles Chargers",
            Team::Rams => "Los Angeles Rams",
            Team::Raiders => "Las Vegas Raiders",
            Team::Dolphins => "Miami Dolphins",
            Team::Vikings => "Minnesota Vikings",
            Team::Patriots => "New England Patriots",
            Team::Saints => "New Orleans Saints",
            Team::Giants => "New York Giants",
            Team::Jets => "New York Jets",
            Team::Eagles => "Philadelphia Eagles",
            Team::Steelers => "Pittsburgh Steelers",
            Team::Seahawks => "Seattle Seahawks",
            Team::FortyNiners => "San Francisco 49ers",
            Team::Buccaneers => "Tampa Bay Buccaneers",
            Team::Titans => "Tennessee Titans",
            Team::Commanders => "Washington Commanders",
        }
    }

    pub fn from_code(code: &str) -> Option<Team> {
        let code = code.trim();
        Team::ALL
            .into_iter()
            .find(|team| team.code().eq_ignore_ascii_case(code))
    }

    pub fn from_raw_opponent(raw: &str) -> Option<Team> {
        let key = raw.trim().to_ascii_uppercase();
        let team = match key.as_str() {
            "ARI" => Team::Cardinals,
            "ATL" => Team::Falcons,
            "BAL" => Team::Ravens,
            "BUF" => Team::Bills,
            "CAR" => Team::Panthers,
            "CHI" => Team::Bears,
            "CIN" => Team::Bengals,
            "CLE" => Team::Browns,
            "DAL" => Team::Cowboys,
            "DEN" => Team::Broncos,
            "DET" => Team::Lions,
            "GNB" | "GB" => Team::Packers,
            "HOU" => Team::Texans,
            "IND" => Team::Colts,
            "JAX" | "JAC" => Team::Jaguars,
            "KAN" | "KC" => Team::Chiefs,
            "LVR" | "LV" | "OAK" => Team::Raiders,
            "LAC" | "SD" | "SDG" => Team::Chargers,
            "LAR" | "LA" | "STL" => Team::Rams,
            "MIA" => Team::Dolphins,
            "MIN" => Team::Vikings,
            "NE" | "NWE" => Team::Patriots,
            "NO" | "NOR" => Team::Saints,
            "NYG" => Team::Giants,
            "NYJ" => Team::Jets,
            "PHI" => Team::Eagles,
            "PIT" => Team::Steelers,
            "SF" | "SFO" => Team::FortyNiners,
            "SEA" => Team::Seahawks,
            "TB" | "TAM" => Team::Buccaneers,
            "TEN" => Team::Titans,
            "WAS" | "WSH" => Team::Commanders,
            _ => return Team::from_code(raw),
        };
        Some(team)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub fn resolve_team(event_id: &str, code: &str) -> Result<Team> {
    Team::from_code(code).ok_or_else(|| FeatureError::UnknownTeam {
        event_id: event_id.to_string(),
        code: code.to_string(),
    })
}

pub fn resolve_opponent(event_id: &str, team: Team, raw: &str) -> Result<Team> {
    Team::from_raw_opponent(raw).ok_or_else(|| FeatureError::MissingOpponentMapping {
        event_id: event_id.to_string(),
        team: team.code().to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_every_team() {
        for team in Team::ALL {
            assert_eq!(Team::from_code(team.code()), Some(team));
        }
    }

    #[test]
    fn relocated_franchises_resolve() {
        assert_eq!(Team::from_raw_opponent("OAK"), Some(Team::Raiders));
        assert_eq!(Team::from_raw_opponent("STL"), Some(Team::Rams));
        assert_eq!(Team::from_raw_opponent("SDG"), Some(Team::Chargers));
        assert_eq!(Team::from_raw_opponent("jac"), Some(Team::Jaguars));
        assert_eq!(Team::from_raw_opponent("htx"), Some(Team::Texans));
    }

    #[test]
    fn unmapped_opponent_is_an_error() {
        let err = resolve_opponent("2023_1_buf_nyj", Team::Bills, "XYZ").unwrap_err();
        assert!(matches!(err, FeatureError::MissingOpponentMapping { .. }));
    }
}
