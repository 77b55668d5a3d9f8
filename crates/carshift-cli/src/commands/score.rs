use std::path::PathBuf;

use carshift_core::scoring::{solve, ScoreCatalog, STAMINA_MULTIPLIERS};
use clap::Subcommand;
use serde_json::json;

use super::{file_exists, print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum ScoreAction {
    /// Split a target total into at most two repeated per-play values
    Solve {
        /// Target total
        target: i64,
        /// Score table JSON (defaults to scoring.table_path or score_table.json)
        #[arg(long, conflicts_with = "values")]
        table: Option<PathBuf>,
        /// Use these per-play values instead of a table
        #[arg(long, value_delimiter = ',')]
        values: Vec<u64>,
        /// Cap on how often one value may repeat
        #[arg(long)]
        max_repeats: Option<u64>,
    },
    /// Per-play multiplier for each stamina tier
    Multipliers,
}

pub fn run(action: ScoreAction) -> CliResult {
    match action {
        ScoreAction::Solve {
            target,
            table,
            values,
            max_repeats,
        } => {
            let ws = Workspace::open()?;
            let catalog = if values.is_empty() {
                let path = ws.resolve(table, ws.config.scoring.table_path.as_deref(), "score_table.json");
                file_exists(&path)?;
                ScoreCatalog::load(&path, &ws.config.scoring.limits())?
            } else {
                ScoreCatalog::from_values(values)
            };
            tracing::debug!(values = catalog.len(), target, "solving");
            let max_repeats = max_repeats.unwrap_or(ws.config.scoring.max_repeats);
            let decomposition = solve(&catalog, target, max_repeats)?;
            print_json(&json!({ "target": target, "result": decomposition }))?;
        }
        ScoreAction::Multipliers => {
            let tiers: Vec<_> = STAMINA_MULTIPLIERS
                .iter()
                .enumerate()
                .map(|(tier, multiplier)| json!({ "stamina": tier, "multiplier": multiplier }))
                .collect();
            print_json(&tiers)?;
        }
    }
    Ok(())
}
