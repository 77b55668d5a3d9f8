//! JSON persistence of the registry, schedule and ranking history.
//!
//! Two files live in the data directory: `board.json` (members, schedule
//! days, rewards and sign-up switches) and `ranking_history.json` (snapshots). A
//! missing file loads as empty state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ranking::{Snapshot, SnapshotStore};
use crate::rewards::RewardLedger;
use crate::roster::{MemberRegistry, RosterStats};
use crate::schedule::{ClosingWindow, DaySchedule, ScheduleBoard, ShiftLayout};

const BOARD_FILE: &str = "board.json";
const RANKING_FILE: &str = "ranking_history.json";

/// Operator switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub registration_open: bool,
    #[serde(default)]
    pub schedule_open: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registration_open: true,
            schedule_open: false,
        }
    }
}

/// Everything the schedule side persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub members: MemberRegistry,
    #[serde(default)]
    pub schedule: BTreeMap<NaiveDate, DaySchedule>,
    #[serde(default)]
    pub rewards: RewardLedger,
    #[serde(default)]
    pub settings: Settings,
}

impl BoardState {
    /// Live board over the stored days.
    pub fn board(&self, layout: ShiftLayout, window: ClosingWindow) -> ScheduleBoard {
        ScheduleBoard::from_days(
            self.schedule.clone(),
            layout,
            window,
            self.settings.schedule_open,
        )
    }

    /// Registry summary including the issued reward count.
    pub fn stats(&self) -> RosterStats {
        RosterStats {
            rewards: self.rewards.total(),
            ..self.members.stats()
        }
    }

    /// Copy a board's days and sign-up switch back into this state.
    pub fn absorb(&mut self, board: &ScheduleBoard) -> Result<()> {
        self.schedule = board.export_days()?;
        self.settings.schedule_open = board.signups_open();
        Ok(())
    }
}

/// Persisted snapshot series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingHistory {
    /// Label of the most recently recorded event.
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub records: Vec<Snapshot>,
}

impl RankingHistory {
    pub fn store(&self, retention: usize) -> SnapshotStore {
        SnapshotStore::from_snapshots(self.records.clone(), retention)
    }

    pub fn from_store(store: &SnapshotStore) -> Result<Self> {
        Ok(Self {
            event_name: store.latest_event()?.unwrap_or_default(),
            records: store.snapshots()?,
        })
    }
}

/// Reads and writes state files in one directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(self.dir.join(file), content)?;
        tracing::debug!(file, dir = %self.dir.display(), "state saved");
        Ok(())
    }

    pub fn load_board(&self) -> Result<BoardState> {
        self.read(BOARD_FILE)
    }

    pub fn save_board(&self, state: &BoardState) -> Result<()> {
        self.write(BOARD_FILE, state)
    }

    pub fn load_ranking(&self) -> Result<RankingHistory> {
        self.read(RANKING_FILE)
    }

    pub fn save_ranking(&self, history: &RankingHistory) -> Result<()> {
        self.write(RANKING_FILE, history)
    }
}
