//! TOML-based application configuration.
//!
//! Stores operator settings including:
//! - Shift layout and sign-up closing lead times
//! - Score table limits for the decomposition solver
//! - Plan search defaults
//! - Snapshot retention and charted ranks
//!
//! Configuration is stored at `~/.config/carshift/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::planner::{LiveMode, PlanQuery, SkillInput};
use crate::ranking::{DEFAULT_RETENTION, TRACKED_RANKS};
use crate::roster::BonusBounds;
use crate::schedule::{ClosingWindow, ShiftLayout};
use crate::scoring::CatalogLimits;

/// Schedule-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_leader")]
    pub leader: String,
    #[serde(default = "default_car_label")]
    pub car_label: String,
    #[serde(default = "default_close_hours")]
    pub close_hours: f64,
    #[serde(default = "default_alt_close_hours")]
    pub alt_close_hours: f64,
    #[serde(default = "default_bonus_min")]
    pub bonus_min: f64,
    #[serde(default = "default_bonus_max")]
    pub bonus_max: f64,
}

/// Score table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_max_repeats")]
    pub max_repeats: u64,
    #[serde(default = "default_bonus_cap")]
    pub bonus_cap: f64,
    #[serde(default = "default_range_ceiling")]
    pub range_ceiling: u64,
    /// Score table JSON; defaults to `score_table.json` in the data directory.
    #[serde(default)]
    pub table_path: Option<String>,
}

/// Plan search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    #[serde(default = "default_tiers")]
    pub tiers: Vec<u8>,
    #[serde(default = "default_candidates_per_tier")]
    pub candidates_per_tier: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_bonus_pct")]
    pub bonus_pct: f64,
    #[serde(default = "default_skill")]
    pub skill: f64,
    #[serde(default = "default_skill")]
    pub alt_skill: f64,
    #[serde(default)]
    pub mode: LiveMode,
    /// Song catalog JSON; defaults to `song_db.json` in the data directory.
    #[serde(default)]
    pub song_db_path: Option<String>,
}

/// Snapshot history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_retention")]
    pub retention: usize,
    #[serde(default = "default_tracked_ranks")]
    pub tracked_ranks: Vec<u32>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/carshift/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

// Default functions
fn default_leader() -> String {
    "host".into()
}
fn default_car_label() -> String {
    "standard".into()
}
fn default_close_hours() -> f64 {
    1.0
}
fn default_alt_close_hours() -> f64 {
    2.0
}
fn default_bonus_min() -> f64 {
    1.18
}
fn default_bonus_max() -> f64 {
    3.88
}
fn default_max_repeats() -> u64 {
    50
}
fn default_bonus_cap() -> f64 {
    2.50
}
fn default_range_ceiling() -> u64 {
    1_019_999
}
fn default_interval_secs() -> f64 {
    50.0
}
fn default_tiers() -> Vec<u8> {
    vec![5, 7, 10]
}
fn default_candidates_per_tier() -> usize {
    10
}
fn default_top_n() -> usize {
    5
}
fn default_bonus_pct() -> f64 {
    250.0
}
fn default_skill() -> f64 {
    3.2
}
fn default_retention() -> usize {
    DEFAULT_RETENTION
}
fn default_tracked_ranks() -> Vec<u32> {
    TRACKED_RANKS.to_vec()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            leader: default_leader(),
            car_label: default_car_label(),
            close_hours: default_close_hours(),
            alt_close_hours: default_alt_close_hours(),
            bonus_min: default_bonus_min(),
            bonus_max: default_bonus_max(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_repeats: default_max_repeats(),
            bonus_cap: default_bonus_cap(),
            range_ceiling: default_range_ceiling(),
            table_path: None,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            tiers: default_tiers(),
            candidates_per_tier: default_candidates_per_tier(),
            top_n: default_top_n(),
            bonus_pct: default_bonus_pct(),
            skill: default_skill(),
            alt_skill: default_skill(),
            mode: LiveMode::Multi,
            song_db_path: None,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            retention: default_retention(),
            tracked_ranks: default_tracked_ranks(),
        }
    }
}

impl ScheduleConfig {
    pub fn layout(&self) -> ShiftLayout {
        ShiftLayout {
            leader: self.leader.clone(),
            car_label: self.car_label.clone(),
        }
    }

    pub fn window(&self) -> ClosingWindow {
        ClosingWindow {
            close_hours: self.close_hours,
            alt_close_hours: self.alt_close_hours,
        }
    }

    pub fn bounds(&self) -> BonusBounds {
        BonusBounds {
            min: self.bonus_min,
            max: self.bonus_max,
        }
    }
}

impl ScoringConfig {
    pub fn limits(&self) -> CatalogLimits {
        CatalogLimits {
            bonus_cap: self.bonus_cap,
            range_ceiling: self.range_ceiling,
        }
    }
}

impl PlannerConfig {
    /// Query for `gap` and `power` with every other input from this config.
    pub fn query(&self, gap: i64, power: u64) -> PlanQuery {
        PlanQuery {
            bonus_pct: self.bonus_pct,
            skill: SkillInput(self.skill),
            alt_skill: SkillInput(self.alt_skill),
            mode: self.mode,
            interval_secs: self.interval_secs,
            tiers: self.tiers.clone(),
            candidates_per_tier: self.candidates_per_tier,
            top_n: self.top_n,
            ..PlanQuery::new(gap, power)
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `config.toml` inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Load from `dir`, writing the defaults there first if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(dir)?;
                Ok(cfg)
            }
        }
    }

    /// Persist into `dir`.
    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from the data directory or return default.
    pub fn load() -> Result<Self> {
        Self::load_from(&data_dir()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&data_dir()?)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory only. Returns error if key is
    /// unknown or the value does not fit the field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
