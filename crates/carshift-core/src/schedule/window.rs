//! Sign-up closing window.
//!
//! A slot is always the next upcoming occurrence of its hour: "today at H",
//! rolled forward a day once that instant is more than 12 hours in the past.
//! Sign-ups close a fixed lead time before the slot starts, and earlier
//! still once the alt seat is taken.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{hour_label, Shift};

/// Why a slot no longer accepts sign-ups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CloseReason {
    /// Slot starts within the hard lead time.
    LeadTime { hour: u8, hours_until: f64 },
    /// Slot starts within the alt lead time and the alt seat is filled.
    AltSeated { hour: u8, hours_until: f64 },
}

impl CloseReason {
    pub fn hour(&self) -> u8 {
        match self {
            CloseReason::LeadTime { hour, .. } | CloseReason::AltSeated { hour, .. } => *hour,
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::LeadTime { hour, .. } => {
                write!(f, "{} closed (starts within the lead time)", hour_label(*hour))
            }
            CloseReason::AltSeated { hour, .. } => {
                write!(f, "{} closed (alt seated and starting soon)", hour_label(*hour))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotStatus {
    Open,
    Closed(CloseReason),
}

impl SlotStatus {
    pub fn is_closed(&self) -> bool {
        matches!(self, SlotStatus::Closed(_))
    }
}

/// Lead times, in hours, before a slot stops accepting sign-ups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosingWindow {
    pub close_hours: f64,
    pub alt_close_hours: f64,
}

impl Default for ClosingWindow {
    fn default() -> Self {
        Self {
            close_hours: 1.0,
            alt_close_hours: 2.0,
        }
    }
}

/// Start of the next upcoming occurrence of `hour` as seen from `now`.
pub fn slot_start(hour: u8, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_hms_opt(u32::from(hour) % 24, 0, 0).unwrap_or(now);
    if today < now - Duration::hours(12) {
        today + Duration::days(1)
    } else {
        today
    }
}

/// Fractional hours from `now` until the slot starts (negative once started).
pub fn hours_until(hour: u8, now: NaiveDateTime) -> f64 {
    let delta = slot_start(hour, now) - now;
    delta.num_milliseconds() as f64 / 3_600_000.0
}

impl ClosingWindow {
    pub fn status(&self, hour: u8, shift: Option<&Shift>, now: NaiveDateTime) -> SlotStatus {
        let hours_until = hours_until(hour, now);
        if hours_until <= self.close_hours {
            return SlotStatus::Closed(CloseReason::LeadTime { hour, hours_until });
        }
        let alt_filled = shift.map(Shift::alt_filled).unwrap_or(false);
        if hours_until <= self.alt_close_hours && alt_filled {
            return SlotStatus::Closed(CloseReason::AltSeated { hour, hours_until });
        }
        SlotStatus::Open
    }
}

/// Closing check with the default lead times (1h, and 2h once the alt is seated).
pub fn is_slot_closed(hour: u8, shift: Option<&Shift>, now: NaiveDateTime) -> SlotStatus {
    ClosingWindow::default().status(hour, shift, now)
}
