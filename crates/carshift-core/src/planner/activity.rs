//! Activity (song) catalog and per-play score formulas.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Coefficient vectors shorter than this are ignored.
pub const MIN_COEFFICIENTS: usize = 11;

const LEVEL: usize = 0;
const BASE: usize = 2;
const SOLO_SKILL: usize = 4;
const SOLO_ALT_SKILL: usize = 5;
const MULTI_SKILL: usize = 6;
const MULTI_ALT_SKILL: usize = 7;
const FEVER: usize = 10;

/// Score divisor of the EP formula.
const EP_SCORE_DIVISOR: f64 = 17_000.0;
/// Flat EP every play earns.
const EP_BASE: i64 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LiveMode {
    #[default]
    Multi,
    Solo,
}

impl std::str::FromStr for LiveMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "multi" => Ok(LiveMode::Multi),
            "solo" => Ok(LiveMode::Solo),
            other => Err(ValidationError::invalid(
                "mode",
                format!("'{other}' is not one of multi, solo"),
            )),
        }
    }
}

/// A skill value as players read it off their team (e.g. `3.2` for +220%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillInput(pub f64);

impl SkillInput {
    /// Multiplier used by the score formula: the displayed value minus one.
    pub fn effective(self) -> f64 {
        self.0 - 1.0
    }
}

/// One playable song with its difficulties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: u32,
    pub title: String,
    /// Play length in seconds.
    #[serde(rename = "time")]
    pub duration_secs: f64,
    /// Event rate in percent.
    #[serde(rename = "rate")]
    pub event_rate: f64,
    /// Difficulty key to coefficient vector, in catalog order.
    #[serde(default)]
    pub diffs: IndexMap<String, Vec<f64>>,
}

impl Song {
    /// Difficulties with a complete coefficient vector.
    pub fn playable_diffs(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.diffs
            .iter()
            .filter(|(_, c)| c.len() >= MIN_COEFFICIENTS)
            .map(|(k, c)| (k.as_str(), c.as_slice()))
    }
}

/// Difficulty level stored in a coefficient vector.
pub fn level(coefficients: &[f64]) -> f64 {
    coefficients.get(LEVEL).copied().unwrap_or_default()
}

/// Song catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongDb {
    songs: Vec<Song>,
}

impl SongDb {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let db: Self = serde_json::from_str(json)?;
        tracing::debug!(songs = db.songs.len(), "song catalog parsed");
        Ok(db)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// Raw score of one play.
///
/// `skill` and `alt_skill` are effective values (see [`SkillInput::effective`]).
/// Returns `None` for an incomplete coefficient vector.
pub fn song_score(
    coefficients: &[f64],
    mode: LiveMode,
    power: u64,
    skill: f64,
    alt_skill: f64,
) -> Option<i64> {
    if coefficients.len() < MIN_COEFFICIENTS {
        return None;
    }
    let (c_skill, c_alt) = match mode {
        LiveMode::Multi => (coefficients[MULTI_SKILL], coefficients[MULTI_ALT_SKILL]),
        LiveMode::Solo => (coefficients[SOLO_SKILL], coefficients[SOLO_ALT_SKILL]),
    };
    let rate = coefficients[BASE] + coefficients[FEVER] * 0.5 + c_skill * skill + c_alt * alt_skill;
    Some((rate * power as f64 * 4.0).trunc() as i64)
}

/// EP earned by one play.
///
/// Multi adds a power term to the score; solo scales the score by remaining
/// life (capped at 1000). `bonus_pct` is the event bonus in percent and
/// `multiplier` the stamina multiplier.
pub fn ep_value(
    mode: LiveMode,
    score: i64,
    event_rate: f64,
    bonus_pct: f64,
    multiplier: u64,
    power: u64,
    life: u32,
) -> i64 {
    let part = match mode {
        LiveMode::Multi => ((score as f64 + 0.075 * power as f64 * 5.0) / EP_SCORE_DIVISOR).trunc(),
        LiveMode::Solo => {
            let life = f64::from(life.min(1000)) / 1000.0;
            (score as f64 * life / EP_SCORE_DIVISOR).trunc()
        }
    };
    let per_play = ((part as i64 + EP_BASE) as f64 * (event_rate / 100.0) * (bonus_pct / 100.0 + 1.0)).trunc();
    per_play as i64 * multiplier as i64
}
