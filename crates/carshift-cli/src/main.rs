use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "carshift", version, about = "Car shift scheduling and EP planning CLI")]
struct Cli {
    /// Log debug output to stderr (overridden by CARSHIFT_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Participant registry
    Member {
        #[command(subcommand)]
        action: commands::member::MemberAction,
    },
    /// Hourly car schedule
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Rewards issued to participants
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Score decomposition
    Score {
        #[command(subcommand)]
        action: commands::score::ScoreAction,
    },
    /// EP catch-up plans
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Leaderboard snapshots
    Ranking {
        #[command(subcommand)]
        action: commands::ranking::RankingAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CARSHIFT_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Member { action } => commands::member::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Reward { action } => commands::reward::run(action),
        Commands::Score { action } => commands::score::run(action),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Ranking { action } => commands::ranking::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
