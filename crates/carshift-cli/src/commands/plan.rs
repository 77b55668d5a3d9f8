use std::path::PathBuf;

use carshift_core::planner::{find_plans, LiveMode, SkillInput, SongDb};
use carshift_core::ranking::{JsonPageFeed, RankingFeed};
use clap::{Args, Subcommand};
use serde_json::json;

use super::{file_exists, print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Song, difficulty and stamina choices that close an EP gap
    Find(FindArgs),
}

#[derive(Args)]
pub struct FindArgs {
    /// Team power
    #[arg(long)]
    power: u64,
    /// EP still missing
    #[arg(long, conflicts_with_all = ["page", "rank", "current_ep"])]
    gap: Option<i64>,
    /// Ranking page JSON to read the target score and speed from
    #[arg(long, requires_all = ["rank", "current_ep"])]
    page: Option<PathBuf>,
    /// Rank to catch
    #[arg(long)]
    rank: Option<u32>,
    /// Your current EP
    #[arg(long)]
    current_ep: Option<i64>,
    /// Event bonus in percent
    #[arg(long)]
    bonus: Option<f64>,
    /// Leader skill magnitude as shown in game (e.g. 3.2)
    #[arg(long)]
    skill: Option<f64>,
    /// Skill magnitude of the other members
    #[arg(long)]
    alt_skill: Option<f64>,
    /// multi or solo
    #[arg(long)]
    mode: Option<LiveMode>,
    /// Remaining life (solo)
    #[arg(long)]
    life: Option<u32>,
    /// Seconds between plays
    #[arg(long)]
    interval: Option<f64>,
    /// Stamina tiers to consider
    #[arg(long, value_delimiter = ',')]
    tiers: Vec<u8>,
    /// EP per hour the target is gaining; read from the page when omitted
    #[arg(long)]
    border_speed: Option<f64>,
    /// Song catalog JSON (defaults to planner.song_db_path or song_db.json)
    #[arg(long)]
    songs: Option<PathBuf>,
}

pub fn run(action: PlanAction) -> CliResult {
    match action {
        PlanAction::Find(args) => find(args),
    }
}

fn find(args: FindArgs) -> CliResult {
    let ws = Workspace::open()?;

    let (gap, page_speed) = match (args.gap, &args.page) {
        (Some(gap), _) => (gap, None),
        (None, Some(path)) => {
            let page = JsonPageFeed::new(path).fetch()?;
            let rank = args.rank.ok_or("--rank is required with --page")?;
            let current = args.current_ep.ok_or("--current-ep is required with --page")?;
            let target = page
                .entry(rank)
                .ok_or_else(|| format!("rank {rank} is not on the page"))?;
            (target.score - current, target.border_speed())
        }
        (None, None) => return Err("either --gap or --page is required".into()),
    };

    if gap <= 0 {
        return print_json(&json!({ "outcome": "already_ahead", "gap": gap }));
    }

    let mut query = ws.config.planner.query(gap, args.power);
    if let Some(bonus) = args.bonus {
        query.bonus_pct = bonus;
    }
    if let Some(skill) = args.skill {
        query.skill = SkillInput(skill);
    }
    if let Some(skill) = args.alt_skill {
        query.alt_skill = SkillInput(skill);
    }
    if let Some(mode) = args.mode {
        query.mode = mode;
    }
    if let Some(life) = args.life {
        query.life = life;
    }
    if let Some(interval) = args.interval {
        query.interval_secs = interval;
    }
    if !args.tiers.is_empty() {
        query.tiers = args.tiers;
    }
    query.border_speed = args
        .border_speed
        .or(page_speed.map(|s| s.speed))
        .unwrap_or(0.0);

    let path = ws.resolve(args.songs, ws.config.planner.song_db_path.as_deref(), "song_db.json");
    file_exists(&path)?;
    let db = SongDb::load(&path)?;
    tracing::debug!(songs = db.len(), gap, border_speed = query.border_speed, "searching plans");

    let outcome = find_plans(&db, &query)?;
    print_json(&json!({
        "border_window": page_speed.filter(|_| args.border_speed.is_none()).map(|s| s.window),
        "result": outcome,
    }))
}
