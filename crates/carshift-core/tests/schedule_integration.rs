//! Integration tests for the schedule board.
//!
//! These cover concurrent sign-ups against one day, the assignment
//! properties that must hold for any applicant list, and the full
//! sign-up/cancel/tally workflow.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use carshift_core::roster::{Member, MemberRegistry, Multiplicity};
use carshift_core::schedule::{
    assign, Applicant, Role, ScheduleBoard, ShiftLayout, SignupRequest, SubmitOutcome,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

fn early() -> NaiveDateTime {
    day().and_hms_opt(0, 30, 0).unwrap()
}

fn registry(n: usize) -> MemberRegistry {
    let mut registry = MemberRegistry::new();
    for i in 0..n {
        let bonus = 1.2 + (i as f64) * 0.1;
        registry
            .register(format!("u{i}"), Member::new(format!("M{i}"), bonus.min(3.8), 200_000, early()))
            .unwrap();
    }
    registry
}

#[test]
fn concurrent_signups_for_one_day_are_all_recorded() {
    let registry = Arc::new(registry(12));
    let board = Arc::new(ScheduleBoard::default());
    board.set_signups_open(true);

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let board = Arc::clone(&board);
            thread::spawn(move || {
                let request = SignupRequest::new(format!("u{i}"), vec![18, 19], Role::Pusher);
                board.submit(day(), &registry, &request, early()).unwrap()
            })
        })
        .collect();
    for handle in handles {
        let outcome = handle.join().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Accepted { ref registered, .. } if registered.len() == 2));
    }

    for hour in [18, 19] {
        let shift = board.shift(day(), hour).unwrap().unwrap();
        assert_eq!(shift.applicants.len(), 12);
        assert_eq!(shift.pusher_count(), 3);
        assert_eq!(shift.unassigned.len(), 9);
        // top three bonuses hold the seats regardless of arrival order
        let seated: Vec<&str> = shift
            .pushers
            .iter()
            .flatten()
            .filter_map(|s| s.participant_id.as_deref())
            .collect();
        assert_eq!(seated, vec!["u11", "u10", "u9"]);
    }
}

#[test]
fn signup_cancel_and_tally_workflow() {
    let mut registry = registry(3);
    registry
        .register(
            "triple",
            Member::new("Tri", 3.5, 300_000, early()).with_multiplicity(Multiplicity::Triple),
        )
        .unwrap();
    let board = ScheduleBoard::default();
    board.set_signups_open(true);

    for id in ["u0", "u1", "u2"] {
        board
            .submit(day(), &registry, &SignupRequest::new(id, vec![20], Role::Pusher), early())
            .unwrap();
    }
    board
        .submit(
            day(),
            &registry,
            &SignupRequest::new("triple", vec![20], Role::Pusher),
            early() + Duration::minutes(5),
        )
        .unwrap();

    let shift = board.shift(day(), 20).unwrap().unwrap();
    let labels: Vec<&str> = shift.pushers.iter().flatten().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Tri", "Tri #2", "Tri #3"]);
    assert_eq!(shift.unassigned.len(), 3);

    board.cancel(day(), "triple", &[20]).unwrap();
    let shift = board.shift(day(), 20).unwrap().unwrap();
    assert_eq!(shift.pusher_count(), 3);
    assert!(shift.unassigned.is_empty());

    let tally = board.hour_tally(&registry).unwrap();
    assert_eq!(tally.len(), 4);
    let tri = tally.iter().find(|t| t.participant_id == "triple").unwrap();
    assert_eq!(tri.total_hours, 0);
}

fn applicant_strategy() -> impl Strategy<Value = Applicant> {
    (
        0usize..40,
        118u32..=388,
        prop_oneof![Just(Role::Pusher), Just(Role::Alt), Just(Role::Support)],
        prop_oneof![
            Just(Multiplicity::Single),
            Just(Multiplicity::Double),
            Just(Multiplicity::Triple)
        ],
        0i64..600,
    )
        .prop_map(|(id, bonus, role, multiplicity, minute)| Applicant {
            participant_id: format!("p{id}"),
            display_name: format!("P{id}"),
            bonus: f64::from(bonus) / 100.0,
            bonus_2: 0.0,
            bonus_3: 0.0,
            alt_bonus: 0.0,
            power: 200_000,
            alt_power: 0,
            multiplicity,
            role,
            note: String::new(),
            registered_at: early() + Duration::minutes(minute),
        })
}

proptest! {
    #[test]
    fn assignment_is_deterministic(applicants in prop::collection::vec(applicant_strategy(), 0..12)) {
        let layout = ShiftLayout::default();
        prop_assert_eq!(assign(&applicants, &layout), assign(&applicants, &layout));
    }

    #[test]
    fn seats_never_exceed_capacity(applicants in prop::collection::vec(applicant_strategy(), 0..12)) {
        let shift = assign(&applicants, &ShiftLayout::default());
        prop_assert!(shift.pusher_count() <= 3);

        let seated_accounts = shift.pushers.iter().flatten().count()
            + usize::from(shift.alt.is_some())
            + usize::from(shift.support.is_some());
        prop_assert!(seated_accounts + shift.unassigned.len() >= applicants.len());

        let occupied: Vec<f64> = shift.pushers.iter().flatten().map(|s| s.bonus).collect();
        let expected = if occupied.is_empty() { 0.0 } else { occupied.iter().sum::<f64>() / occupied.len() as f64 };
        prop_assert!((shift.average_bonus - expected).abs() < 1e-9);
    }

    #[test]
    fn leading_triple_fills_every_pusher_seat(mut applicants in prop::collection::vec(applicant_strategy(), 0..8)) {
        applicants.push(Applicant {
            participant_id: "lead".into(),
            display_name: "Lead".into(),
            bonus: 3.88,
            bonus_2: 0.0,
            bonus_3: 0.0,
            alt_bonus: 0.0,
            power: 1,
            alt_power: 0,
            multiplicity: Multiplicity::Triple,
            role: Role::Pusher,
            note: String::new(),
            registered_at: early() - Duration::minutes(1),
        });
        let shift = assign(&applicants, &ShiftLayout::default());
        for seat in shift.pushers.iter() {
            prop_assert_eq!(seat.as_ref().and_then(|s| s.participant_id.as_deref()), Some("lead"));
        }
    }
}
