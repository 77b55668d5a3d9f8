//! Ranking feed contract and the live top-100 payload.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// EP gain over a trailing window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// EP per hour.
    #[serde(default)]
    pub speed: f64,
    /// Plays in the window.
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub rank: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub last_1h_stats: Option<WindowStats>,
    #[serde(default)]
    pub last_3h_stats: Option<WindowStats>,
    #[serde(default)]
    pub last_24h_stats: Option<WindowStats>,
    #[serde(default)]
    pub last_played_at: Option<String>,
}

/// A rate the target is climbing at, with the window it was measured over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSpeed {
    pub speed: f64,
    pub window: &'static str,
}

impl RankEntry {
    /// First positive speed among the 1h, 3h and 24h windows.
    pub fn border_speed(&self) -> Option<BorderSpeed> {
        [
            (self.last_1h_stats, "1h"),
            (self.last_3h_stats, "3h"),
            (self.last_24h_stats, "24h"),
        ]
        .into_iter()
        .find_map(|(stats, window)| {
            let speed = stats?.speed;
            (speed > 0.0).then_some(BorderSpeed { speed, window })
        })
    }
}

/// One fetch of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingPage {
    /// Event label.
    #[serde(default)]
    pub name: String,
    #[serde(
        rename = "top_100_player_rankings",
        alias = "border_player_rankings",
        default
    )]
    pub entries: Vec<RankEntry>,
}

/// Entries directly above and below a rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbours {
    pub prev: Option<RankEntry>,
    pub target: RankEntry,
    pub next: Option<RankEntry>,
}

impl RankingPage {
    /// Parse and validate a payload.
    pub fn from_json(json: &str) -> Result<Self, UpstreamError> {
        let page: Self =
            serde_json::from_str(json).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        page.validate()?;
        Ok(page)
    }

    /// A page is usable only with at least one entry and positive ranks.
    pub fn validate(&self) -> Result<(), UpstreamError> {
        if self.entries.is_empty() {
            return Err(UpstreamError::Malformed("no ranking entries".into()));
        }
        if let Some(entry) = self.entries.iter().find(|e| e.rank == 0) {
            return Err(UpstreamError::Malformed(format!(
                "entry '{}' has no rank",
                entry.name
            )));
        }
        Ok(())
    }

    pub fn entry(&self, rank: u32) -> Option<&RankEntry> {
        self.entries.iter().find(|e| e.rank == rank)
    }

    pub fn neighbours(&self, rank: u32) -> Option<Neighbours> {
        let target = self.entry(rank)?.clone();
        Some(Neighbours {
            prev: rank.checked_sub(1).and_then(|r| self.entry(r)).cloned(),
            target,
            next: self.entry(rank + 1).cloned(),
        })
    }

    /// Entries with rank in `first..=last`, in rank order.
    pub fn range(&self, first: u32, last: u32) -> Vec<&RankEntry> {
        let mut entries: Vec<&RankEntry> = self
            .entries
            .iter()
            .filter(|e| (first..=last).contains(&e.rank))
            .collect();
        entries.sort_by_key(|e| e.rank);
        entries
    }
}

/// Source of leaderboard pages.
pub trait RankingFeed: Send + Sync {
    /// Fetch the current page; incomplete pages are an error.
    fn fetch(&self) -> Result<RankingPage, UpstreamError>;
}

/// Feed over a JSON payload saved to disk.
#[derive(Debug, Clone)]
pub struct JsonPageFeed {
    path: PathBuf,
}

impl JsonPageFeed {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RankingFeed for JsonPageFeed {
    fn fetch(&self) -> Result<RankingPage, UpstreamError> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| UpstreamError::Unavailable(format!("{}: {e}", self.path.display())))?;
        RankingPage::from_json(&json).inspect_err(|err| {
            tracing::warn!(path = %self.path.display(), %err, "ranking page refused");
        })
    }
}
