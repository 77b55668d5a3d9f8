use carshift_core::roster::Multiplicity;
use carshift_core::schedule::{parse_hours, Role, SignupRequest, SlotEdit};
use clap::Subcommand;
use serde_json::json;

use super::{parse_date, parse_now, print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Sign a participant up for an hour range (e.g. 08-12)
    Submit {
        id: String,
        /// Hour range, label or single hour
        hours: String,
        /// pusher, alt or support
        #[arg(long, default_value = "pusher")]
        role: Role,
        /// Override the registered multiplicity
        #[arg(long)]
        multiplicity: Option<Multiplicity>,
        #[arg(long, default_value = "")]
        note: String,
        /// Day (YYYY-MM-DD), today by default
        #[arg(long)]
        date: Option<String>,
        /// Evaluate closing windows at this time instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// Withdraw a participant from an hour range
    Cancel {
        id: String,
        hours: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Show a day's slots
    Show {
        #[arg(long)]
        date: Option<String>,
    },
    /// Re-run assignment over every slot of a day
    Confirm {
        #[arg(long)]
        date: Option<String>,
    },
    /// Drop a whole day
    Clear {
        #[arg(long)]
        date: Option<String>,
    },
    /// Overwrite seats by name for an hour range
    Edit {
        hours: String,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        p1: Option<String>,
        #[arg(long)]
        p2: Option<String>,
        #[arg(long)]
        p3: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Participants seated in one slot
    Roster {
        hour: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Whether slots still accept sign-ups
    Status {
        hours: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        at: Option<String>,
    },
    /// Seated hours per participant
    Tally,
    /// Clear every day except one, restarting the hour tally
    ResetHistory {
        /// Day to keep, today by default
        #[arg(long)]
        keep: Option<String>,
        /// Required; the cleared days cannot be restored
        #[arg(long)]
        confirm: bool,
    },
    /// Start accepting sign-ups
    Open,
    /// Stop accepting sign-ups
    Close,
}

pub fn run(action: ScheduleAction) -> CliResult {
    let ws = Workspace::open()?;
    let mut state = ws.load_board()?;
    let board = state.board(ws.config.schedule.layout(), ws.config.schedule.window());

    let mutated = match action {
        ScheduleAction::Submit {
            id,
            hours,
            role,
            multiplicity,
            note,
            date,
            at,
        } => {
            let request = SignupRequest {
                participant_id: id,
                hours: parse_hours(&hours)?,
                role,
                multiplicity,
                note,
            };
            let outcome = board.submit(
                parse_date(date.as_deref())?,
                &state.members,
                &request,
                parse_now(at.as_deref())?,
            )?;
            print_json(&outcome)?;
            true
        }
        ScheduleAction::Cancel { id, hours, date } => {
            let cancelled = board.cancel(parse_date(date.as_deref())?, &id, &parse_hours(&hours)?)?;
            print_json(&json!({ "cancelled": cancelled }))?;
            true
        }
        ScheduleAction::Show { date } => {
            let date = parse_date(date.as_deref())?;
            let day = board.day(date)?.unwrap_or_default();
            print_json(&json!({ "date": date, "slots": day.slots }))?;
            false
        }
        ScheduleAction::Confirm { date } => {
            let slots = board.confirm(parse_date(date.as_deref())?)?;
            print_json(&json!({ "confirmed_slots": slots }))?;
            true
        }
        ScheduleAction::Clear { date } => {
            let cleared = board.clear_day(parse_date(date.as_deref())?)?;
            print_json(&json!({ "cleared": cleared }))?;
            true
        }
        ScheduleAction::Edit {
            hours,
            alt,
            p1,
            p2,
            p3,
            date,
        } => {
            let edit = SlotEdit {
                alt,
                pushers: [p1, p2, p3],
            };
            let edited = board.edit(
                parse_date(date.as_deref())?,
                &parse_hours(&hours)?,
                &edit,
                &state.members,
            )?;
            let slots: Vec<_> = edited
                .into_iter()
                .map(|(hour, shift)| json!({ "hour": hour, "shift": shift }))
                .collect();
            print_json(&slots)?;
            true
        }
        ScheduleAction::Roster { hour, date } => {
            let date = parse_date(date.as_deref())?;
            let mut roster = Vec::new();
            for hour in parse_hours(&hour)? {
                roster.push(json!({
                    "hour": hour,
                    "participants": board.upcoming_roster(date, hour)?,
                }));
            }
            print_json(&roster)?;
            false
        }
        ScheduleAction::Status { hours, date, at } => {
            let date = parse_date(date.as_deref())?;
            let now = parse_now(at.as_deref())?;
            let mut out = Vec::new();
            for hour in parse_hours(&hours)? {
                let shift = board.shift(date, hour)?;
                let status = board.window().status(hour, shift.as_ref(), now);
                out.push(match status {
                    carshift_core::SlotStatus::Open => json!({ "hour": hour, "open": true }),
                    carshift_core::SlotStatus::Closed(reason) => {
                        json!({ "hour": hour, "open": false, "reason": reason.to_string() })
                    }
                });
            }
            print_json(&out)?;
            false
        }
        ScheduleAction::Tally => {
            print_json(&board.hour_tally(&state.members)?)?;
            false
        }
        ScheduleAction::ResetHistory { keep, confirm } => {
            if !confirm {
                return Err("this clears every other day's schedule; pass --confirm".into());
            }
            let keep = parse_date(keep.as_deref())?;
            let cleared = board.reset_history(keep)?;
            print_json(&json!({ "kept": keep, "cleared_days": cleared }))?;
            true
        }
        ScheduleAction::Open => {
            board.set_signups_open(true);
            print_json(&json!({ "schedule_open": true }))?;
            true
        }
        ScheduleAction::Close => {
            board.set_signups_open(false);
            print_json(&json!({ "schedule_open": false }))?;
            true
        }
    };

    if mutated {
        state.absorb(&board)?;
        ws.state.save_board(&state)?;
    }
    Ok(())
}
