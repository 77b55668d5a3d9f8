//! Per-day schedule state.
//!
//! The board holds one lock per calendar day. Every mutation of a day
//! (sign-up, cancel, confirm, manual edit) runs its whole
//! read-modify-write under that day's lock, so concurrent submissions for
//! the same day never interleave while different days proceed in parallel.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::window::{ClosingWindow, CloseReason, SlotStatus};
use super::{assign, Applicant, Role, Seat, Shift, ShiftLayout, PUSHER_SEATS, SLOTS_PER_DAY};
use crate::error::{Result, ValidationError};
use crate::roster::{MemberRegistry, Multiplicity};

/// All slots of one day, keyed by hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub slots: BTreeMap<u8, Shift>,
}

/// A participant's request to sign up for a set of hours.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub participant_id: String,
    pub hours: Vec<u8>,
    pub role: Role,
    /// Overrides the registry's multiplicity for this sign-up.
    pub multiplicity: Option<Multiplicity>,
    pub note: String,
}

impl SignupRequest {
    pub fn new(participant_id: impl Into<String>, hours: Vec<u8>, role: Role) -> Self {
        Self {
            participant_id: participant_id.into(),
            hours,
            role,
            multiplicity: None,
            note: String::new(),
        }
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// At least one requested hour was open.
    Accepted {
        /// Hours newly joined.
        registered: Vec<u8>,
        /// Open hours the participant already held.
        already_held: Vec<u8>,
        /// Requested hours that were closed.
        closed: Vec<CloseReason>,
    },
    /// Every requested hour was closed.
    AllClosed { reasons: Vec<CloseReason> },
}

/// Manual seat override by display name; `None` keeps the current seat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotEdit {
    pub alt: Option<String>,
    pub pushers: [Option<String>; PUSHER_SEATS],
}

/// Seated hours per participant across every stored day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourTally {
    pub participant_id: String,
    pub name: String,
    pub pusher_hours: u32,
    pub alt_hours: u32,
    pub support_hours: u32,
    pub total_hours: u32,
}

type DayHandle = Arc<Mutex<DaySchedule>>;

/// Schedule repository for all days.
pub struct ScheduleBoard {
    days: Mutex<BTreeMap<NaiveDate, DayHandle>>,
    layout: ShiftLayout,
    window: ClosingWindow,
    signups_open: AtomicBool,
}

impl ScheduleBoard {
    pub fn new(layout: ShiftLayout, window: ClosingWindow) -> Self {
        Self {
            days: Mutex::new(BTreeMap::new()),
            layout,
            window,
            signups_open: AtomicBool::new(false),
        }
    }

    /// Rebuild a board from persisted days.
    pub fn from_days(
        days: BTreeMap<NaiveDate, DaySchedule>,
        layout: ShiftLayout,
        window: ClosingWindow,
        signups_open: bool,
    ) -> Self {
        let days = days
            .into_iter()
            .map(|(date, day)| (date, Arc::new(Mutex::new(day))))
            .collect();
        Self {
            days: Mutex::new(days),
            layout,
            window,
            signups_open: AtomicBool::new(signups_open),
        }
    }

    /// Copy of every day holding at least one slot, for persistence.
    pub fn export_days(&self) -> Result<BTreeMap<NaiveDate, DaySchedule>> {
        let handles: Vec<(NaiveDate, DayHandle)> = {
            let days = self.days.lock()?;
            days.iter().map(|(d, h)| (*d, Arc::clone(h))).collect()
        };
        let mut out = BTreeMap::new();
        for (date, handle) in handles {
            let day = handle.lock()?;
            if !day.slots.is_empty() {
                out.insert(date, day.clone());
            }
        }
        Ok(out)
    }

    pub fn layout(&self) -> &ShiftLayout {
        &self.layout
    }

    pub fn window(&self) -> &ClosingWindow {
        &self.window
    }

    pub fn signups_open(&self) -> bool {
        self.signups_open.load(Ordering::SeqCst)
    }

    pub fn set_signups_open(&self, open: bool) {
        self.signups_open.store(open, Ordering::SeqCst);
        tracing::info!(open, "sign-ups toggled");
    }

    fn day_entry(&self, date: NaiveDate) -> Result<DayHandle> {
        let mut days = self.days.lock()?;
        Ok(Arc::clone(days.entry(date).or_default()))
    }

    fn existing_day(&self, date: NaiveDate) -> Result<Option<DayHandle>> {
        let days = self.days.lock()?;
        Ok(days.get(&date).map(Arc::clone))
    }

    /// Re-derive a slot's seats from its applicant list, keeping the
    /// slot's label and note.
    fn rederive(&self, shift: &mut Shift) {
        let mut next = assign(&shift.applicants, &self.layout);
        next.car_label = std::mem::take(&mut shift.car_label);
        next.note = std::mem::take(&mut shift.note);
        *shift = next;
    }

    /// Sign a registered participant up for the requested hours.
    ///
    /// Closed hours are skipped and reported; if none of the requested hours
    /// is open the outcome is [`SubmitOutcome::AllClosed`] and nothing changes.
    ///
    /// The closing window looks only at `now`'s clock time and the slot
    /// hour, never at `date`: hour 8 of any day is closed at 07:30. Sign-ups
    /// for a later day are therefore judged as if that day were today.
    pub fn submit(
        &self,
        date: NaiveDate,
        registry: &MemberRegistry,
        request: &SignupRequest,
        now: NaiveDateTime,
    ) -> Result<SubmitOutcome> {
        if !self.signups_open() {
            return Err(ValidationError::SignupClosed.into());
        }
        let member = registry
            .get(&request.participant_id)
            .ok_or_else(|| ValidationError::NotRegistered(request.participant_id.clone()))?;
        let hours = normalize_hours(&request.hours)?;

        let handle = self.day_entry(date)?;
        let mut day = handle.lock()?;

        let mut open = Vec::new();
        let mut closed = Vec::new();
        for hour in hours {
            match self.window.status(hour, day.slots.get(&hour), now) {
                SlotStatus::Open => open.push(hour),
                SlotStatus::Closed(reason) => closed.push(reason),
            }
        }
        if open.is_empty() {
            tracing::info!(participant = %request.participant_id, %date, "all requested hours closed");
            return Ok(SubmitOutcome::AllClosed { reasons: closed });
        }

        let applicant = Applicant::from_member(
            request.participant_id.clone(),
            member,
            request.role,
            request.multiplicity,
            request.note.clone(),
            now,
        );

        let mut registered = Vec::new();
        let mut already_held = Vec::new();
        for hour in open {
            let shift = day
                .slots
                .entry(hour)
                .or_insert_with(|| Shift::empty(&self.layout));
            if shift.has_applicant(&request.participant_id) {
                already_held.push(hour);
                continue;
            }
            shift.applicants.push(applicant.clone());
            self.rederive(shift);
            registered.push(hour);
        }

        tracing::info!(
            participant = %request.participant_id,
            %date,
            registered = ?registered,
            already_held = ?already_held,
            closed = closed.len(),
            "sign-up processed"
        );
        Ok(SubmitOutcome::Accepted {
            registered,
            already_held,
            closed,
        })
    }

    /// Withdraw a participant from the given hours; returns the hours actually left.
    pub fn cancel(&self, date: NaiveDate, participant_id: &str, hours: &[u8]) -> Result<Vec<u8>> {
        let hours = normalize_hours(hours)?;
        let Some(handle) = self.existing_day(date)? else {
            return Ok(Vec::new());
        };
        let mut day = handle.lock()?;

        let mut cancelled = Vec::new();
        for hour in hours {
            let Some(shift) = day.slots.get_mut(&hour) else {
                continue;
            };
            let before = shift.applicants.len();
            shift.applicants.retain(|a| a.participant_id != participant_id);
            if shift.applicants.len() < before {
                self.rederive(shift);
                cancelled.push(hour);
            }
        }
        tracing::info!(participant = %participant_id, %date, cancelled = ?cancelled, "sign-up cancelled");
        Ok(cancelled)
    }

    /// Re-run assignment over every slot of the day; returns the slot count.
    pub fn confirm(&self, date: NaiveDate) -> Result<usize> {
        let Some(handle) = self.existing_day(date)? else {
            return Ok(0);
        };
        let mut day = handle.lock()?;
        for shift in day.slots.values_mut() {
            self.rederive(shift);
        }
        Ok(day.slots.len())
    }

    /// Drop every slot of a day; returns whether any slot was stored.
    ///
    /// The day stays registered and is emptied under its own lock, so a
    /// sign-up already holding the day's handle lands either before the
    /// clear or on the live, emptied day.
    pub fn clear_day(&self, date: NaiveDate) -> Result<bool> {
        let Some(handle) = self.existing_day(date)? else {
            return Ok(false);
        };
        let mut day = handle.lock()?;
        let cleared = !day.slots.is_empty();
        day.slots.clear();
        if cleared {
            tracing::info!(%date, "day cleared");
        }
        Ok(cleared)
    }

    /// Clear every day except `keep`, restarting the hour tally from that
    /// day's slots; returns how many days were cleared.
    pub fn reset_history(&self, keep: NaiveDate) -> Result<usize> {
        let handles: Vec<(NaiveDate, DayHandle)> = {
            let days = self.days.lock()?;
            days.iter()
                .filter(|(d, _)| **d != keep)
                .map(|(d, h)| (*d, Arc::clone(h)))
                .collect()
        };
        let mut cleared = 0;
        for (date, handle) in handles {
            let mut day = handle.lock()?;
            if !day.slots.is_empty() {
                day.slots.clear();
                cleared += 1;
                tracing::debug!(%date, "day cleared by history reset");
            }
        }
        tracing::info!(%keep, cleared, "schedule history reset");
        Ok(cleared)
    }

    /// Overwrite alt/pusher seats by name for each hour.
    ///
    /// Names resolve through the registry (exact, then substring match);
    /// unknown names are seated as unregistered with bonus 0. The next
    /// re-derivation of the slot replaces these seats again.
    pub fn edit(
        &self,
        date: NaiveDate,
        hours: &[u8],
        edit: &SlotEdit,
        registry: &MemberRegistry,
    ) -> Result<Vec<(u8, Shift)>> {
        let hours = normalize_hours(hours)?;
        let handle = self.day_entry(date)?;
        let mut day = handle.lock()?;

        let resolve = |name: &Option<String>| -> Option<Seat> {
            let name = name.as_deref()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(match registry.find_by_name(name) {
                Some((id, member)) => Seat {
                    participant_id: Some(id.to_string()),
                    name: member.name.clone(),
                    label: member.name.clone(),
                    bonus: member.bonus,
                    power: member.power,
                    account: 1,
                },
                None => Seat::unregistered(name),
            })
        };
        let alt = resolve(&edit.alt);
        let pushers: Vec<Option<Seat>> = edit.pushers.iter().map(resolve).collect();

        let mut edited = Vec::new();
        for hour in hours {
            let shift = day
                .slots
                .entry(hour)
                .or_insert_with(|| Shift::empty(&self.layout));
            if let Some(seat) = &alt {
                shift.alt = Some(seat.clone());
            }
            for (slot, seat) in shift.pushers.iter_mut().zip(&pushers) {
                if let Some(seat) = seat {
                    *slot = Some(seat.clone());
                }
            }
            shift.recompute_average();
            edited.push((hour, shift.clone()));
        }
        tracing::info!(%date, hours = edited.len(), "slots edited by hand");
        Ok(edited)
    }

    /// Snapshot of one day; `None` when it has no slots.
    pub fn day(&self, date: NaiveDate) -> Result<Option<DaySchedule>> {
        let Some(handle) = self.existing_day(date)? else {
            return Ok(None);
        };
        let day = handle.lock()?;
        Ok((!day.slots.is_empty()).then(|| day.clone()))
    }

    pub fn shift(&self, date: NaiveDate, hour: u8) -> Result<Option<Shift>> {
        Ok(self
            .day(date)?
            .and_then(|mut day| day.slots.remove(&hour)))
    }

    /// Participants seated in a slot, for pre-slot reminders.
    pub fn upcoming_roster(&self, date: NaiveDate, hour: u8) -> Result<Vec<String>> {
        Ok(self
            .shift(date, hour)?
            .map(|shift| shift.seated_participants())
            .unwrap_or_default())
    }

    /// Seated hours per participant over all days. Registered members with
    /// no seat are included with zero hours. Sorted by total (descending),
    /// then name.
    pub fn hour_tally(&self, registry: &MemberRegistry) -> Result<Vec<HourTally>> {
        let mut tally: BTreeMap<String, HourTally> = BTreeMap::new();

        fn entry<'a>(tally: &'a mut BTreeMap<String, HourTally>, id: &str, name: &str) -> &'a mut HourTally {
            let row = tally.entry(id.to_string()).or_insert_with(|| HourTally {
                participant_id: id.to_string(),
                ..HourTally::default()
            });
            row.name = name.to_string();
            row
        }

        for day in self.export_days()?.values() {
            for shift in day.slots.values() {
                for seat in shift.pushers.iter().flatten() {
                    if let Some(id) = &seat.participant_id {
                        entry(&mut tally, id, &seat.name).pusher_hours += 1;
                    }
                }
                if let Some(seat) = &shift.alt {
                    if let Some(id) = &seat.participant_id {
                        entry(&mut tally, id, &seat.name).alt_hours += 1;
                    }
                }
                if let Some(seat) = &shift.support {
                    if let Some(id) = &seat.participant_id {
                        entry(&mut tally, id, &seat.name).support_hours += 1;
                    }
                }
            }
        }

        for (id, member) in registry.iter() {
            tally.entry(id.to_string()).or_insert_with(|| HourTally {
                participant_id: id.to_string(),
                name: member.name.clone(),
                ..HourTally::default()
            });
        }

        let mut rows: Vec<HourTally> = tally
            .into_values()
            .map(|mut row| {
                row.total_hours = row.pusher_hours + row.alt_hours + row.support_hours;
                row
            })
            .collect();
        rows.sort_by(|a, b| b.total_hours.cmp(&a.total_hours).then_with(|| a.name.cmp(&b.name)));
        Ok(rows)
    }
}

impl Default for ScheduleBoard {
    fn default() -> Self {
        Self::new(ShiftLayout::default(), ClosingWindow::default())
    }
}

/// Reject hours outside the day and drop repeats, keeping first-seen order.
fn normalize_hours(hours: &[u8]) -> Result<Vec<u8>, ValidationError> {
    if hours.is_empty() {
        return Err(ValidationError::invalid("hours", "no hours requested"));
    }
    let mut out = Vec::with_capacity(hours.len());
    for &hour in hours {
        if hour >= SLOTS_PER_DAY {
            return Err(ValidationError::InvalidHour(u32::from(hour)));
        }
        if !out.contains(&hour) {
            out.push(hour);
        }
    }
    Ok(out)
}
