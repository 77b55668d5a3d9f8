mod config;
pub mod state;

pub use config::{Config, PlannerConfig, RankingConfig, ScheduleConfig, ScoringConfig};
pub use state::{BoardState, RankingHistory, Settings, StateStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/carshift[-dev]/` based on CARSHIFT_ENV.
///
/// Set CARSHIFT_ENV=dev to use the development data directory, or
/// CARSHIFT_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CARSHIFT_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CARSHIFT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("carshift-dev")
            } else {
                base_dir.join("carshift")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
