//! Leaderboard tracking.
//!
//! [`feed`] defines where pages come from and what a usable page looks like;
//! [`store`] keeps at most one snapshot per hour and event for trend charts.

pub mod feed;
pub mod store;

pub use feed::{BorderSpeed, JsonPageFeed, Neighbours, RankEntry, RankingFeed, RankingPage, WindowStats};
pub use store::{
    hour_floor, AppendOutcome, Border, Snapshot, SnapshotStore, Trend, TrendPoint, DEFAULT_RETENTION,
    TRACKED_RANKS,
};
