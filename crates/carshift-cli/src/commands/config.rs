use carshift_core::Config;
use clap::Subcommand;

use super::{CliResult, Workspace};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dotted key (e.g. "schedule.close_hours", "planner.tiers")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    let ws = Workspace::open()?;
    match action {
        ConfigAction::Get { key } => match ws.config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            let mut config = ws.config;
            config.set(&key, &value)?;
            config.save_to(&ws.dir)?;
            println!("ok");
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&ws.config)?);
        }
        ConfigAction::Reset => {
            Config::default().save_to(&ws.dir)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
