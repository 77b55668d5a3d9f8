use carshift_core::roster::{team_bonus, Member, MemberUpdate, Multiplicity};
use chrono::Local;
use clap::Subcommand;
use serde_json::json;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum MemberAction {
    /// Register or re-register a participant
    Register {
        /// Participant id
        id: String,
        /// Display name
        name: String,
        /// Main account bonus (e.g. 2.45)
        bonus: f64,
        /// Team power
        power: u64,
        /// single, double or triple
        #[arg(long, default_value = "single")]
        multiplicity: Multiplicity,
        /// Second account bonus
        #[arg(long, default_value_t = 0.0)]
        bonus2: f64,
        /// Third account bonus
        #[arg(long, default_value_t = 0.0)]
        bonus3: f64,
        /// Bonus when driving as alt
        #[arg(long, default_value_t = 0.0)]
        alt_bonus: f64,
        /// Power when driving as alt
        #[arg(long, default_value_t = 0)]
        alt_power: u64,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Change selected fields of a registration
    Update {
        id: String,
        #[arg(long)]
        bonus: Option<f64>,
        #[arg(long)]
        power: Option<u64>,
        #[arg(long)]
        multiplicity: Option<Multiplicity>,
        #[arg(long)]
        bonus2: Option<f64>,
        #[arg(long)]
        bonus3: Option<f64>,
        #[arg(long)]
        alt_bonus: Option<f64>,
        #[arg(long)]
        alt_power: Option<u64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show one participant
    Show { id: String },
    /// List all participants
    List,
    /// Registry summary with the issued reward count
    Stats,
    /// Allow or refuse new registrations
    Registration {
        /// open or close
        state: String,
    },
    /// Team bonus from skill percentages
    TeamBonus {
        /// Leader skill in percent
        leader: f64,
        /// Member skills in percent
        members: Vec<f64>,
    },
}

pub fn run(action: MemberAction) -> CliResult {
    if let MemberAction::TeamBonus { leader, members } = &action {
        return print_json(&json!({ "team_bonus": team_bonus(*leader, members) }));
    }

    let ws = Workspace::open()?;
    let mut board = ws.load_board()?;

    match action {
        MemberAction::Register {
            id,
            name,
            bonus,
            power,
            multiplicity,
            bonus2,
            bonus3,
            alt_bonus,
            alt_power,
            note,
        } => {
            if !board.settings.registration_open {
                return Err("registration is closed".into());
            }
            let mut member = Member::new(name, bonus, power, Local::now().naive_local())
                .with_multiplicity(multiplicity)
                .with_extra_bonuses(bonus2, bonus3)
                .with_alt(alt_bonus, alt_power);
            member.note = note;
            board.members.register(id.clone(), member)?;
            ws.state.save_board(&board)?;
            print_json(&json!({ "id": id, "member": board.members.get(&id) }))?;
        }
        MemberAction::Update {
            id,
            bonus,
            power,
            multiplicity,
            bonus2,
            bonus3,
            alt_bonus,
            alt_power,
            note,
        } => {
            let update = MemberUpdate {
                bonus,
                power,
                multiplicity,
                bonus_2: bonus2,
                bonus_3: bonus3,
                alt_bonus,
                alt_power,
                note,
            };
            let member = board.members.update(&id, update)?.clone();
            ws.state.save_board(&board)?;
            print_json(&json!({ "id": id, "member": member }))?;
        }
        MemberAction::Show { id } => match board.members.get(&id) {
            Some(member) => print_json(&json!({ "id": id, "member": member }))?,
            None => return Err(format!("participant '{id}' is not registered").into()),
        },
        MemberAction::List => {
            let members: Vec<_> = board
                .members
                .iter()
                .map(|(id, m)| json!({ "id": id, "member": m }))
                .collect();
            print_json(&members)?;
        }
        MemberAction::Stats => print_json(&board.stats())?,
        MemberAction::Registration { state } => {
            board.settings.registration_open = match state.as_str() {
                "open" => true,
                "close" | "closed" => false,
                other => return Err(format!("expected open or close, got '{other}'").into()),
            };
            ws.state.save_board(&board)?;
            print_json(&board.settings)?;
        }
        MemberAction::TeamBonus { .. } => {}
    }
    Ok(())
}
