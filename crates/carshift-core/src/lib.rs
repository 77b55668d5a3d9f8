//! # Carshift Core Library
//!
//! Core logic for coordinating hourly cooperative "car" shifts and for
//! planning how to close an EP gap on an event leaderboard. All operations
//! are available through the standalone `carshift` CLI, which is a thin
//! layer over this library.
//!
//! ## Architecture
//!
//! - **Schedule**: per-hour slots with a fixed leader, one alt, three pushers
//!   and one support; seats are re-derived from the applicant list on every
//!   change, with sign-ups closing a lead time before each slot
//! - **Scoring**: score-table catalog and a 1/2-value decomposition solver
//! - **Planner**: song-based EP formulas and tiered catch-up plan search
//! - **Ranking**: leaderboard feed contract and an hourly snapshot store
//! - **Storage**: TOML configuration and JSON state files
//!
//! ## Key Components
//!
//! - [`ScheduleBoard`]: per-day schedule state
//! - [`MemberRegistry`]: registered participants
//! - [`ScoreCatalog`] and [`solve`]: score decomposition
//! - [`find_plans`]: EP catch-up plans
//! - [`SnapshotStore`]: deduplicated ranking history
//! - [`Config`]: application configuration management

pub mod error;
pub mod planner;
pub mod ranking;
pub mod rewards;
pub mod roster;
pub mod schedule;
pub mod scoring;
pub mod storage;

pub use error::{ConfigError, CoreError, UpstreamError, ValidationError};
pub use planner::{find_plans, LiveMode, PlanOutcome, PlanQuery, SongDb};
pub use ranking::{AppendOutcome, JsonPageFeed, RankingFeed, RankingPage, SnapshotStore, Trend};
pub use rewards::{Reward, RewardLedger};
pub use roster::{team_bonus, Member, MemberRegistry, MemberUpdate, Multiplicity};
pub use schedule::{
    assign, is_slot_closed, parse_hour_range, Role, ScheduleBoard, Shift, SignupRequest, SlotStatus,
    SubmitOutcome,
};
pub use scoring::{solve, Decomposition, ScoreCatalog};
pub use storage::{data_dir, BoardState, Config, RankingHistory, StateStore};
