//! Seat assignment for one hour slot.
//!
//! Assignment is a pure function of the applicant list: the same list with
//! the same timestamps always yields the same shift.

use std::cmp::Reverse;

use super::{Applicant, Role, Seat, Shift, ShiftLayout, PUSHER_SEATS};

/// Bonus quantized to the nearest 1/50 (ties to even).
///
/// Bonuses in the same bucket compare equal, so arrival order decides
/// between them.
pub fn bonus_bucket(bonus: f64) -> i64 {
    (bonus * 50.0).round_ties_even() as i64
}

/// Derive a role-filled shift from a slot's applicant list.
///
/// Candidates are ordered by bonus bucket (descending) and registration time
/// (ascending). The first alt and first support candidates take their seats;
/// pushers then fill the three pusher seats in order, each taking as many
/// seats as accounts declared. Everyone left over ends up in
/// [`Shift::unassigned`].
pub fn assign(applicants: &[Applicant], layout: &ShiftLayout) -> Shift {
    let mut shift = Shift::empty(layout);
    shift.applicants = applicants.to_vec();

    let mut sorted: Vec<&Applicant> = applicants.iter().collect();
    sorted.sort_by_key(|a| (Reverse(bonus_bucket(a.bonus)), a.registered_at));

    let mut unassigned: Vec<&Applicant> = Vec::new();
    let mut pushers: Vec<Seat> = Vec::with_capacity(PUSHER_SEATS);

    for applicant in sorted {
        match applicant.role {
            Role::Alt if shift.alt.is_none() => {
                let bonus = if applicant.alt_bonus > 0.0 {
                    applicant.alt_bonus
                } else {
                    applicant.bonus
                };
                let power = if applicant.alt_power > 0 {
                    applicant.alt_power
                } else {
                    applicant.power
                };
                shift.alt = Some(seat_for(applicant, 0, bonus, power));
            }
            Role::Support if shift.support.is_none() => {
                shift.support = Some(seat_for(applicant, 0, applicant.bonus, applicant.power));
            }
            Role::Pusher if pushers.len() < PUSHER_SEATS => {
                let bonuses = account_bonuses(applicant);
                let take = applicant
                    .multiplicity
                    .accounts()
                    .min(PUSHER_SEATS - pushers.len());
                for account in 0..take {
                    pushers.push(seat_for(applicant, account, bonuses[account], applicant.power));
                }
            }
            _ => unassigned.push(applicant),
        }
    }

    for (slot, seat) in shift.pushers.iter_mut().zip(pushers) {
        *slot = Some(seat);
    }
    shift.unassigned = unassigned.into_iter().cloned().collect();
    shift.recompute_average();

    tracing::debug!(
        applicants = applicants.len(),
        pushers = shift.pusher_count(),
        alt = shift.alt.is_some(),
        support = shift.support.is_some(),
        unassigned = shift.unassigned.len(),
        "slot assigned"
    );
    shift
}

/// Per-account bonuses; an undeclared (zero) extra account uses the main bonus.
fn account_bonuses(applicant: &Applicant) -> [f64; PUSHER_SEATS] {
    let or_main = |b: f64| if b > 0.0 { b } else { applicant.bonus };
    [
        applicant.bonus,
        or_main(applicant.bonus_2),
        or_main(applicant.bonus_3),
    ]
}

fn seat_for(applicant: &Applicant, account: usize, bonus: f64, power: u64) -> Seat {
    let label = if account == 0 {
        applicant.display_name.clone()
    } else {
        format!("{} #{}", applicant.display_name, account + 1)
    };
    Seat {
        participant_id: Some(applicant.participant_id.clone()),
        name: applicant.display_name.clone(),
        label,
        bonus,
        power,
        account: (account + 1) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Multiplicity;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(6, minute, 0)
            .unwrap()
    }

    fn applicant(id: &str, bonus: f64, role: Role, multiplicity: Multiplicity, minute: u32) -> Applicant {
        Applicant {
            participant_id: id.to_string(),
            display_name: id.to_uppercase(),
            bonus,
            bonus_2: 0.0,
            bonus_3: 0.0,
            alt_bonus: 0.0,
            power: 250_000,
            alt_power: 0,
            multiplicity,
            role,
            note: String::new(),
            registered_at: at(minute),
        }
    }

    fn pusher(id: &str, bonus: f64, minute: u32) -> Applicant {
        applicant(id, bonus, Role::Pusher, Multiplicity::Single, minute)
    }

    fn pusher_ids(shift: &Shift) -> Vec<Option<String>> {
        shift
            .pushers
            .iter()
            .map(|s| s.as_ref().map(|s| s.label.clone()))
            .collect()
    }

    #[test]
    fn empty_list_yields_empty_shift() {
        let shift = assign(&[], &ShiftLayout::default());
        assert_eq!(shift.pusher_count(), 0);
        assert_eq!(shift.average_bonus, 0.0);
        assert_eq!(shift.leader, "host");
    }

    #[test]
    fn higher_bonus_wins_and_extra_pushers_are_unassigned() {
        let apps = vec![
            pusher("a", 2.0, 0),
            pusher("b", 3.0, 1),
            pusher("c", 2.5, 2),
            pusher("d", 1.5, 3),
        ];
        let shift = assign(&apps, &ShiftLayout::default());
        assert_eq!(
            pusher_ids(&shift),
            vec![Some("B".into()), Some("C".into()), Some("A".into())]
        );
        assert_eq!(shift.unassigned.len(), 1);
        assert_eq!(shift.unassigned[0].participant_id, "d");
        assert!((shift.average_bonus - 2.5).abs() < 1e-9);
        assert_eq!(shift.applicants, apps);
    }

    #[test]
    fn bonuses_in_same_bucket_fall_back_to_arrival_order() {
        // 2.01 and 2.00 both quantize to bucket 100
        let apps = vec![pusher("late", 2.01, 5), pusher("early", 2.00, 1)];
        let shift = assign(&apps, &ShiftLayout::default());
        assert_eq!(shift.pushers[0].as_ref().unwrap().participant_id.as_deref(), Some("early"));
        assert_eq!(shift.pushers[1].as_ref().unwrap().participant_id.as_deref(), Some("late"));
    }

    #[test]
    fn bucket_uses_ties_to_even() {
        assert_eq!(bonus_bucket(2.0), 100);
        assert_eq!(bonus_bucket(2.01), 100);
        assert_eq!(bonus_bucket(2.5), 125);
        assert_eq!(bonus_bucket(0.05), 2);
    }

    #[test]
    fn triple_fills_all_pusher_seats_with_account_bonuses() {
        let mut triple = applicant("t", 3.0, Role::Pusher, Multiplicity::Triple, 0);
        triple.bonus_2 = 2.8;
        let apps = vec![triple, pusher("s", 2.0, 1)];
        let shift = assign(&apps, &ShiftLayout::default());
        assert_eq!(
            pusher_ids(&shift),
            vec![Some("T".into()), Some("T #2".into()), Some("T #3".into())]
        );
        let bonuses: Vec<f64> = shift.pushers.iter().flatten().map(|s| s.bonus).collect();
        assert_eq!(bonuses, vec![3.0, 2.8, 3.0]);
        assert_eq!(shift.unassigned[0].participant_id, "s");
    }

    #[test]
    fn double_is_truncated_to_remaining_seats() {
        let apps = vec![
            pusher("a", 3.0, 0),
            pusher("b", 2.9, 1),
            applicant("d", 2.5, Role::Pusher, Multiplicity::Double, 2),
        ];
        let shift = assign(&apps, &ShiftLayout::default());
        assert_eq!(shift.pusher_count(), 3);
        assert_eq!(shift.pushers[2].as_ref().unwrap().label, "D");
        assert!(shift.unassigned.is_empty());
    }

    #[test]
    fn alt_and_support_take_their_own_seats() {
        let mut alt = applicant("x", 2.0, Role::Alt, Multiplicity::Single, 0);
        alt.alt_bonus = 3.5;
        let apps = vec![
            alt,
            applicant("y", 2.2, Role::Alt, Multiplicity::Single, 1),
            applicant("s", 1.5, Role::Support, Multiplicity::Single, 2),
            pusher("p", 2.0, 3),
        ];
        let shift = assign(&apps, &ShiftLayout::default());
        // y sorts first by bonus, so y is the alt; x is surplus
        let alt_seat = shift.alt.as_ref().unwrap();
        assert_eq!(alt_seat.participant_id.as_deref(), Some("y"));
        assert_eq!(alt_seat.bonus, 2.2);
        assert_eq!(shift.support.as_ref().unwrap().participant_id.as_deref(), Some("s"));
        assert_eq!(shift.pusher_count(), 1);
        assert_eq!(shift.unassigned.len(), 1);
        assert_eq!(shift.unassigned[0].participant_id, "x");
    }

    #[test]
    fn alt_bonus_overrides_displayed_bonus() {
        let mut alt = applicant("x", 2.0, Role::Alt, Multiplicity::Single, 0);
        alt.alt_bonus = 3.5;
        alt.alt_power = 400_000;
        let shift = assign(&[alt], &ShiftLayout::default());
        let seat = shift.alt.unwrap();
        assert_eq!(seat.bonus, 3.5);
        assert_eq!(seat.power, 400_000);
        assert_eq!(shift.average_bonus, 0.0);
    }
}
