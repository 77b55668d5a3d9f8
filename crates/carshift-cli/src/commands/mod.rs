pub mod config;
pub mod member;
pub mod plan;
pub mod ranking;
pub mod reward;
pub mod schedule;
pub mod score;

use std::path::{Path, PathBuf};

use carshift_core::storage::{data_dir, BoardState, Config, StateStore};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Data directory, its config and its state files.
pub struct Workspace {
    pub dir: PathBuf,
    pub config: Config,
    pub state: StateStore,
}

impl Workspace {
    pub fn open() -> CliResult<Self> {
        let dir = data_dir()?;
        let config = Config::load_from(&dir)?;
        let state = StateStore::new(&dir);
        Ok(Self { dir, config, state })
    }

    /// Registry and schedule with the configured bonus bounds applied.
    pub fn load_board(&self) -> CliResult<BoardState> {
        let mut board = self.state.load_board()?;
        board.members.set_bounds(self.config.schedule.bounds());
        Ok(board)
    }

    /// `explicit`, else the configured path, else `default_name` in the data dir.
    pub fn resolve(&self, explicit: Option<PathBuf>, configured: Option<&str>, default_name: &str) -> PathBuf {
        explicit
            .or_else(|| configured.map(PathBuf::from))
            .unwrap_or_else(|| self.dir.join(default_name))
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD`, today when omitted.
pub fn parse_date(date: Option<&str>) -> CliResult<NaiveDate> {
    match date {
        Some(s) => Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))?),
        None => Ok(Local::now().date_naive()),
    }
}

/// `YYYY-MM-DDTHH:MM[:SS]`, the local clock when omitted.
pub fn parse_now(at: Option<&str>) -> CliResult<NaiveDateTime> {
    let Some(s) = at else {
        return Ok(Local::now().naive_local());
    };
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("invalid time '{s}' (expected YYYY-MM-DDTHH:MM): {e}").into())
}

pub fn file_exists(path: &Path) -> CliResult<()> {
    if !path.exists() {
        return Err(format!("{} not found", path.display()).into());
    }
    Ok(())
}
