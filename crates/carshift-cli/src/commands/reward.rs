use carshift_core::rewards::Reward;
use chrono::Local;
use clap::Subcommand;
use serde_json::json;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Issue a reward to a participant
    Issue {
        id: String,
        /// Card number or code
        code: String,
        /// Card password
        #[arg(long, default_value = "")]
        secret: String,
        #[arg(long, default_value = "")]
        note: String,
        /// Who issued it
        #[arg(long, default_value = "")]
        by: String,
    },
    /// Rewards held by one participant
    List { id: String },
    /// Total issued and the participants holding the most
    Stats {
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

pub fn run(action: RewardAction) -> CliResult {
    let ws = Workspace::open()?;
    let mut board = ws.load_board()?;

    match action {
        RewardAction::Issue {
            id,
            code,
            secret,
            note,
            by,
        } => {
            if board.members.get(&id).is_none() {
                return Err(format!("participant '{id}' is not registered").into());
            }
            let reward = Reward {
                code,
                secret,
                note,
                issued_at: Local::now().naive_local(),
                issued_by: by,
            };
            let held = board.rewards.issue(id.clone(), reward)?;
            ws.state.save_board(&board)?;
            print_json(&json!({ "id": id, "rewards": held }))?;
        }
        RewardAction::List { id } => {
            print_json(&json!({ "id": id, "rewards": board.rewards.for_participant(&id) }))?;
        }
        RewardAction::Stats { top } => {
            print_json(&json!({
                "total": board.rewards.total(),
                "top": board.rewards.top(top, &board.members),
            }))?;
        }
    }
    Ok(())
}
