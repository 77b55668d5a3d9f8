use std::path::PathBuf;

use carshift_core::ranking::{JsonPageFeed, RankingFeed, SnapshotStore};
use carshift_core::storage::RankingHistory;
use clap::Subcommand;
use serde_json::json;

use super::{parse_now, print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum RankingAction {
    /// Record a ranking page as this hour's snapshot
    Record {
        /// Ranking page JSON
        page: PathBuf,
        /// Record at this time instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// Show a page: a rank with its neighbours, or the top ten
    Show {
        page: PathBuf,
        #[arg(long)]
        rank: Option<u32>,
    },
    /// Hourly scores of one rank
    Series {
        rank: u32,
        /// Event label, the latest recorded when omitted
        #[arg(long)]
        event: Option<String>,
    },
    /// Hourly scores of every tracked rank
    Chart {
        #[arg(long)]
        event: Option<String>,
        /// Ranks to chart (defaults to ranking.tracked_ranks)
        #[arg(long, value_delimiter = ',')]
        ranks: Vec<u32>,
    },
}

pub fn run(action: RankingAction) -> CliResult {
    let ws = Workspace::open()?;
    let retention = ws.config.ranking.retention;

    match action {
        RankingAction::Record { page, at } => {
            let page = JsonPageFeed::new(&page).fetch()?;
            let store = ws.state.load_ranking()?.store(retention);
            let outcome = store.record_page(&page, parse_now(at.as_deref())?)?;
            ws.state.save_ranking(&RankingHistory::from_store(&store)?)?;
            print_json(&json!({
                "event": page.name,
                "outcome": outcome,
                "snapshots": store.len()?,
            }))?;
        }
        RankingAction::Show { page, rank } => {
            let page = JsonPageFeed::new(&page).fetch()?;
            match rank {
                Some(rank) => {
                    let neighbours = page
                        .neighbours(rank)
                        .ok_or_else(|| format!("rank {rank} is not on the page"))?;
                    let speed = neighbours.target.border_speed();
                    print_json(&json!({ "neighbours": neighbours, "border_speed": speed }))?;
                }
                None => print_json(&page.range(1, 10))?,
            }
        }
        RankingAction::Series { rank, event } => {
            let store = ws.state.load_ranking()?.store(retention);
            let event = event_or_latest(&store, event)?;
            print_json(&store.series(&event, rank)?)?;
        }
        RankingAction::Chart { event, ranks } => {
            let store = ws.state.load_ranking()?.store(retention);
            let event = event_or_latest(&store, event)?;
            let ranks = if ranks.is_empty() {
                ws.config.ranking.tracked_ranks.clone()
            } else {
                ranks
            };
            print_json(&json!({ "event": event, "series": store.chart(&event, &ranks)? }))?;
        }
    }
    Ok(())
}

fn event_or_latest(store: &SnapshotStore, event: Option<String>) -> CliResult<String> {
    match event {
        Some(event) => Ok(event),
        None => Ok(store
            .latest_event()?
            .ok_or("no snapshots recorded yet")?),
    }
}
