//! Hourly leaderboard snapshots.

use std::collections::{BTreeMap, VecDeque};
use std::sync::RwLock;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::feed::RankingPage;
use crate::error::Result;

/// Snapshots kept by default: two weeks of hourly records.
pub const DEFAULT_RETENTION: usize = 336;

/// Ranks charted when no explicit list is given.
pub const TRACKED_RANKS: [u32; 7] = [1, 2, 3, 10, 20, 50, 100];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub name: String,
    pub score: i64,
}

/// The leaderboard at one hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Truncated to the hour.
    pub time: NaiveDateTime,
    /// Event label.
    pub event: String,
    pub borders: BTreeMap<u32, Border>,
}

impl Snapshot {
    pub fn from_page(page: &RankingPage, now: NaiveDateTime) -> Self {
        let borders = page
            .entries
            .iter()
            .map(|e| {
                (
                    e.rank,
                    Border {
                        name: e.name.clone(),
                        score: e.score,
                    },
                )
            })
            .collect();
        Self {
            time: hour_floor(now),
            event: page.name.clone(),
            borders,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendOutcome {
    Recorded,
    /// A snapshot for the same hour and event already exists.
    Duplicate,
    /// Older than every retained snapshot of a full store.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: NaiveDateTime,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Trend {
    Series { rank: u32, points: Vec<TrendPoint> },
    /// Fewer than two points are available.
    InsufficientHistory { rank: u32, points: usize },
}

/// Drop minutes, seconds and sub-seconds.
pub fn hour_floor(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t)
}

/// Bounded, deduplicated series of snapshots.
#[derive(Debug)]
pub struct SnapshotStore {
    records: RwLock<VecDeque<Snapshot>>,
    retention: usize,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl SnapshotStore {
    pub fn new(retention: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            retention: retention.max(1),
        }
    }

    /// Restore from persisted records in any order.
    pub fn from_snapshots(mut records: Vec<Snapshot>, retention: usize) -> Self {
        records.sort_by_key(|r| r.time);
        let store = Self::new(retention);
        if let Ok(mut guard) = store.records.write() {
            guard.extend(records);
            while guard.len() > store.retention {
                guard.pop_front();
            }
        }
        store
    }

    /// Add a snapshot unless its (hour, event) is already stored.
    ///
    /// The check and the insert happen under one write lock. Records stay
    /// sorted by time, so a late snapshot lands in its place and the
    /// earliest timestamps are dropped beyond the retention limit.
    pub fn append(&self, mut snapshot: Snapshot) -> Result<AppendOutcome> {
        snapshot.time = hour_floor(snapshot.time);
        let mut records = self.records.write()?;
        if records
            .iter()
            .any(|r| r.time == snapshot.time && r.event == snapshot.event)
        {
            tracing::debug!(time = %snapshot.time, event = %snapshot.event, "snapshot already recorded");
            return Ok(AppendOutcome::Duplicate);
        }
        if records.len() >= self.retention
            && records.front().is_some_and(|oldest| snapshot.time < oldest.time)
        {
            tracing::debug!(time = %snapshot.time, "snapshot older than the retained window");
            return Ok(AppendOutcome::Expired);
        }
        tracing::info!(time = %snapshot.time, event = %snapshot.event, ranks = snapshot.borders.len(), "snapshot recorded");
        let at = records.partition_point(|r| r.time <= snapshot.time);
        records.insert(at, snapshot);
        while records.len() > self.retention {
            records.pop_front();
        }
        Ok(AppendOutcome::Recorded)
    }

    /// Validate a feed page and record it at `now`'s hour.
    pub fn record_page(&self, page: &RankingPage, now: NaiveDateTime) -> Result<AppendOutcome> {
        if let Err(err) = page.validate() {
            tracing::warn!(%err, "ranking page not recorded");
            return Err(err.into());
        }
        self.append(Snapshot::from_page(page, now))
    }

    /// Score history of one rank within one event.
    pub fn series(&self, event: &str, rank: u32) -> Result<Trend> {
        let records = self.records.read()?;
        let points: Vec<TrendPoint> = records
            .iter()
            .filter(|r| r.event == event)
            .filter_map(|r| {
                r.borders.get(&rank).map(|b| TrendPoint {
                    time: r.time,
                    score: b.score,
                })
            })
            .collect();
        if points.len() < 2 {
            return Ok(Trend::InsufficientHistory {
                rank,
                points: points.len(),
            });
        }
        Ok(Trend::Series { rank, points })
    }

    /// Series for every listed rank that has at least two points.
    pub fn chart(&self, event: &str, ranks: &[u32]) -> Result<Vec<Trend>> {
        let mut out = Vec::new();
        for &rank in ranks {
            let trend = self.series(event, rank)?;
            if matches!(trend, Trend::Series { .. }) {
                out.push(trend);
            }
        }
        Ok(out)
    }

    /// Event label of the newest snapshot.
    pub fn latest_event(&self) -> Result<Option<String>> {
        Ok(self.records.read()?.back().map(|r| r.event.clone()))
    }

    pub fn snapshots(&self) -> Result<Vec<Snapshot>> {
        Ok(self.records.read()?.iter().cloned().collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read()?.len())
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}
