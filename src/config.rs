use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::elo::EloConfig;
use crate::rolling::RollingConfig;
use crate::rpi::RpiWeights;

pub const DEFAULT_DB_PATH: &str = "db/historical_data.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    #[default]
    LastPlayed,
    AsOfKickoff,
}

impl FromStr for SnapshotPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_played" | "tail" => Ok(SnapshotPolicy::LastPlayed),
            "as_of_kickoff" | "kickoff" => Ok(SnapshotPolicy::AsOfKickoff),
            other => Err(format!("unknown snapshot policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub elo: EloConfig,
    pub rpi: RpiWeights,
    pub rolling: RollingConfig,
    pub snapshot: SnapshotPolicy,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.elo.k = env::var("GRIDIRON_ELO_K")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(cfg.elo.k)
            .clamp(1.0, 100.0);
        cfg.elo.season_carryover = env::var("GRIDIRON_ELO_CARRYOVER")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(cfg.elo.season_carryover)
            .clamp(0.0, 1.0);
        cfg.rolling.split_window = env::var("GRIDIRON_SPLIT_WINDOW")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(cfg.rolling.split_window)
            .clamp(1, 17);
        cfg.snapshot = opt_env("GRIDIRON_SNAPSHOT")
            .and_then(|val| val.parse().ok())
            .unwrap_or(cfg.snapshot);
        cfg
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("create config dir")?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize pipeline config")?;
        fs::write(&tmp, json).context("write pipeline config")?;
        fs::rename(&tmp, path).context("swap pipeline config")?;
        Ok(())
    }
}

pub fn resolve_db_path(args: &[String]) -> PathBuf {
    arg_value(args, "--db")
        .or_else(|| opt_env("HIST_DB_PATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            return Some(val.to_string());
        }
        if arg == name {
            return iter.next().cloned();
        }
    }
    None
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_value_accepts_both_forms() {
        let args = vec!["--db=a.db".to_string()];
        assert_eq!(arg_value(&args, "--db").as_deref(), Some("a.db"));
        let args = vec!["--xlsx".to_string(), "out.xlsx".to_string()];
        assert_eq!(arg_value(&args, "--xlsx").as_deref(), Some("out.xlsx"));
        assert_eq!(arg_value(&args, "--db"), None);
    }

    #[test]
    fn snapshot_policy_parses_aliases() {
        assert_eq!("tail".parse::<SnapshotPolicy>(), Ok(SnapshotPolicy::LastPlayed));
        assert_eq!(
            "as-of-kickoff".parse::<SnapshotPolicy>(),
            Ok(SnapshotPolicy::AsOfKickoff)
        );
        assert!("latest".parse::<SnapshotPolicy>().is_err());
    }

    #[test]
    fn config_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let mut cfg = PipelineConfig::default();
        cfg.snapshot = SnapshotPolicy::AsOfKickoff;
        cfg.rolling.split_window = 4;
        cfg.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), cfg);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
