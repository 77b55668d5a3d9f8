//! Hourly car schedule.
//!
//! Each hour of a day is one slot with a fixed leader, one alt seat, three
//! ordered pusher seats and one support seat. Applicants sign up per hour;
//! the seats are always re-derived from the applicant list by [`assign`], so
//! the list is the only state that has to be persisted faithfully.
//!
//! - [`range`]: hour-range expressions (`"08-12"`) and hour labels
//! - [`window`]: sign-up closing rules relative to the slot start
//! - [`assign`]: deterministic seat assignment for one slot
//! - [`board`]: per-day state with serialized mutations

pub mod assign;
pub mod board;
pub mod range;
pub mod window;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::roster::{Member, Multiplicity};

pub use assign::{assign, bonus_bucket};
pub use board::{DaySchedule, HourTally, ScheduleBoard, SignupRequest, SlotEdit, SubmitOutcome};
pub use range::{hour_label, parse_hour_range, parse_hours};
pub use window::{is_slot_closed, ClosingWindow, CloseReason, SlotStatus};

/// Number of ordered pusher seats per slot.
pub const PUSHER_SEATS: usize = 3;

/// Hours per day; slots are keyed 0..24.
pub const SLOTS_PER_DAY: u8 = 24;

/// Role an applicant asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Pusher,
    Alt,
    Support,
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pusher" => Ok(Role::Pusher),
            "alt" => Ok(Role::Alt),
            "support" => Ok(Role::Support),
            other => Err(ValidationError::invalid(
                "role",
                format!("'{other}' is not one of pusher, alt, support"),
            )),
        }
    }
}

/// Immutable sign-up record for one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub participant_id: String,
    pub display_name: String,
    pub bonus: f64,
    #[serde(default)]
    pub bonus_2: f64,
    #[serde(default)]
    pub bonus_3: f64,
    #[serde(default)]
    pub alt_bonus: f64,
    #[serde(default)]
    pub power: u64,
    #[serde(default)]
    pub alt_power: u64,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub note: String,
    pub registered_at: NaiveDateTime,
}

impl Applicant {
    /// Snapshot a registry entry into an applicant.
    ///
    /// `multiplicity` overrides the member's declared value when given.
    pub fn from_member(
        participant_id: impl Into<String>,
        member: &Member,
        role: Role,
        multiplicity: Option<Multiplicity>,
        note: impl Into<String>,
        registered_at: NaiveDateTime,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            display_name: member.name.clone(),
            bonus: member.bonus,
            bonus_2: member.bonus_2,
            bonus_3: member.bonus_3,
            alt_bonus: member.alt_bonus,
            power: member.power,
            alt_power: member.alt_power,
            multiplicity: multiplicity.unwrap_or(member.multiplicity),
            role,
            note: note.into(),
            registered_at,
        }
    }
}

/// A seated occupant of one role position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    /// `None` for names entered by hand that match no registered member.
    pub participant_id: Option<String>,
    pub name: String,
    /// Display label; alternate accounts carry a `#2`/`#3` suffix.
    pub label: String,
    pub bonus: f64,
    #[serde(default)]
    pub power: u64,
    /// 1-based account index of the occupant.
    #[serde(default = "first_account")]
    pub account: u8,
}

fn first_account() -> u8 {
    1
}

impl Seat {
    fn unregistered(name: &str) -> Self {
        Self {
            participant_id: None,
            name: name.to_string(),
            label: name.to_string(),
            bonus: 0.0,
            power: 0,
            account: 1,
        }
    }
}

/// Fixed parts of every shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftLayout {
    /// Default leader seated in every slot; never removed.
    pub leader: String,
    pub car_label: String,
}

impl Default for ShiftLayout {
    fn default() -> Self {
        Self {
            leader: "host".to_string(),
            car_label: "standard".to_string(),
        }
    }
}

/// Role-filled view of one hour slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub car_label: String,
    pub leader: String,
    pub alt: Option<Seat>,
    pub pushers: [Option<Seat>; PUSHER_SEATS],
    pub support: Option<Seat>,
    pub average_bonus: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    /// Applicants left without a seat by the last assignment.
    #[serde(default)]
    pub unassigned: Vec<Applicant>,
}

impl Shift {
    pub fn empty(layout: &ShiftLayout) -> Self {
        Self {
            car_label: layout.car_label.clone(),
            leader: layout.leader.clone(),
            alt: None,
            pushers: [None, None, None],
            support: None,
            average_bonus: 0.0,
            note: String::new(),
            applicants: Vec::new(),
            unassigned: Vec::new(),
        }
    }

    pub fn alt_filled(&self) -> bool {
        self.alt.is_some()
    }

    pub fn pusher_count(&self) -> usize {
        self.pushers.iter().flatten().count()
    }

    pub fn has_applicant(&self, participant_id: &str) -> bool {
        self.applicants
            .iter()
            .any(|a| a.participant_id == participant_id)
    }

    /// Mean bonus of the occupied pusher seats, 0 when none are occupied.
    pub fn recompute_average(&mut self) {
        let occupied: Vec<f64> = self.pushers.iter().flatten().map(|s| s.bonus).collect();
        self.average_bonus = if occupied.is_empty() {
            0.0
        } else {
            occupied.iter().sum::<f64>() / occupied.len() as f64
        };
    }

    /// Seated participant ids in seat order (alt, pushers, support), deduplicated.
    pub fn seated_participants(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let seats = self
            .alt
            .iter()
            .chain(self.pushers.iter().flatten())
            .chain(self.support.iter());
        for seat in seats {
            if let Some(id) = &seat.participant_id {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }
}
