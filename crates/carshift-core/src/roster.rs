//! Participant registry.
//!
//! Members register once with their bonus multipliers and power, and every
//! sign-up copies the current registry entry into an immutable applicant
//! snapshot. Registration enforces the declared bonus bounds; zero on an
//! optional bonus means "not declared" and is always accepted.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How many accounts a participant drives at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    #[default]
    Single,
    Double,
    Triple,
}

impl Multiplicity {
    /// Number of pusher seats one applicant may occupy.
    pub fn accounts(self) -> usize {
        match self {
            Multiplicity::Single => 1,
            Multiplicity::Double => 2,
            Multiplicity::Triple => 3,
        }
    }
}

impl std::str::FromStr for Multiplicity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(Multiplicity::Single),
            "double" | "2" => Ok(Multiplicity::Double),
            "triple" | "3" => Ok(Multiplicity::Triple),
            other => Err(ValidationError::invalid(
                "multiplicity",
                format!("'{other}' is not one of single, double, triple"),
            )),
        }
    }
}

/// Inclusive bounds a declared bonus must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for BonusBounds {
    fn default() -> Self {
        Self {
            min: 1.18,
            max: 3.88,
        }
    }
}

impl BonusBounds {
    fn check(&self, field: &str, value: f64) -> Result<(), ValidationError> {
        if !(self.min..=self.max).contains(&value) {
            return Err(ValidationError::invalid(
                field,
                format!("{value:.2} is outside {:.2}~{:.2}", self.min, self.max),
            ));
        }
        Ok(())
    }

    /// Optional bonuses may be zero (undeclared).
    fn check_optional(&self, field: &str, value: f64) -> Result<(), ValidationError> {
        if value == 0.0 {
            return Ok(());
        }
        self.check(field, value)
    }
}

/// A registered participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub bonus: f64,
    pub power: u64,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub bonus_2: f64,
    #[serde(default)]
    pub bonus_3: f64,
    #[serde(default)]
    pub alt_bonus: f64,
    #[serde(default)]
    pub alt_power: u64,
    #[serde(default)]
    pub note: String,
    pub registered_at: NaiveDateTime,
}

impl Member {
    pub fn new(name: impl Into<String>, bonus: f64, power: u64, registered_at: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            bonus,
            power,
            multiplicity: Multiplicity::Single,
            bonus_2: 0.0,
            bonus_3: 0.0,
            alt_bonus: 0.0,
            alt_power: 0,
            note: String::new(),
            registered_at,
        }
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_extra_bonuses(mut self, bonus_2: f64, bonus_3: f64) -> Self {
        self.bonus_2 = bonus_2;
        self.bonus_3 = bonus_3;
        self
    }

    pub fn with_alt(mut self, alt_bonus: f64, alt_power: u64) -> Self {
        self.alt_bonus = alt_bonus;
        self.alt_power = alt_power;
        self
    }

    fn validate(&self, bounds: &BonusBounds) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::invalid("name", "must not be empty"));
        }
        bounds.check("bonus", self.bonus)?;
        bounds.check_optional("bonus_2", self.bonus_2)?;
        bounds.check_optional("bonus_3", self.bonus_3)?;
        bounds.check_optional("alt_bonus", self.alt_bonus)?;
        Ok(())
    }
}

/// Partial update of a registry entry; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub bonus: Option<f64>,
    pub power: Option<u64>,
    pub multiplicity: Option<Multiplicity>,
    pub bonus_2: Option<f64>,
    pub bonus_3: Option<f64>,
    pub alt_bonus: Option<f64>,
    pub alt_power: Option<u64>,
    pub note: Option<String>,
}

/// Aggregate view over the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterStats {
    pub members: usize,
    pub average_bonus: f64,
    pub single: usize,
    pub double: usize,
    pub triple: usize,
    /// Rewards issued; filled in by callers that hold the reward ledger.
    #[serde(default)]
    pub rewards: usize,
}

/// Participant registry keyed by participant id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRegistry {
    #[serde(default)]
    members: BTreeMap<String, Member>,
    #[serde(skip)]
    bounds: BonusBounds,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: BonusBounds) -> Self {
        Self {
            members: BTreeMap::new(),
            bounds,
        }
    }

    /// Replace the bounds used for later registrations and updates.
    pub fn set_bounds(&mut self, bounds: BonusBounds) {
        self.bounds = bounds;
    }

    /// Register (or re-register) a participant.
    pub fn register(&mut self, participant_id: impl Into<String>, member: Member) -> Result<(), ValidationError> {
        member.validate(&self.bounds)?;
        let id = participant_id.into();
        tracing::info!(participant = %id, name = %member.name, "member registered");
        self.members.insert(id, member);
        Ok(())
    }

    /// Apply a partial update; the result is validated before it is stored.
    pub fn update(&mut self, participant_id: &str, update: MemberUpdate) -> Result<&Member, ValidationError> {
        let current = self
            .members
            .get(participant_id)
            .ok_or_else(|| ValidationError::NotRegistered(participant_id.to_string()))?;

        let mut next = current.clone();
        if let Some(v) = update.bonus {
            next.bonus = v;
        }
        if let Some(v) = update.power {
            next.power = v;
        }
        if let Some(v) = update.multiplicity {
            next.multiplicity = v;
        }
        if let Some(v) = update.bonus_2 {
            next.bonus_2 = v;
        }
        if let Some(v) = update.bonus_3 {
            next.bonus_3 = v;
        }
        if let Some(v) = update.alt_bonus {
            next.alt_bonus = v;
        }
        if let Some(v) = update.alt_power {
            next.alt_power = v;
        }
        if let Some(v) = update.note {
            next.note = v;
        }
        next.validate(&self.bounds)?;

        self.members.insert(participant_id.to_string(), next);
        self.members
            .get(participant_id)
            .ok_or_else(|| ValidationError::NotRegistered(participant_id.to_string()))
    }

    pub fn get(&self, participant_id: &str) -> Option<&Member> {
        self.members.get(participant_id)
    }

    /// Look up a participant by display name: exact (case-insensitive) match
    /// first, then the first name containing the query.
    pub fn find_by_name(&self, name: &str) -> Option<(&str, &Member)> {
        let needle = name.to_lowercase();
        self.members
            .iter()
            .find(|(_, m)| m.name.to_lowercase() == needle)
            .or_else(|| {
                self.members
                    .iter()
                    .find(|(_, m)| m.name.to_lowercase().contains(&needle))
            })
            .map(|(id, m)| (id.as_str(), m))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(id, m)| (id.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn stats(&self) -> RosterStats {
        let mut stats = RosterStats {
            members: self.members.len(),
            ..RosterStats::default()
        };
        if self.members.is_empty() {
            return stats;
        }
        let total: f64 = self.members.values().map(|m| m.bonus).sum();
        stats.average_bonus = total / self.members.len() as f64;
        for member in self.members.values() {
            match member.multiplicity {
                Multiplicity::Single => stats.single += 1,
                Multiplicity::Double => stats.double += 1,
                Multiplicity::Triple => stats.triple += 1,
            }
        }
        stats
    }
}

/// Team multiplier from percentage skill values:
/// `(leader + 100 + sum(members) / 5) / 100`, rounded to two decimals.
pub fn team_bonus(leader_pct: f64, member_pcts: &[f64]) -> f64 {
    let members: f64 = member_pcts.iter().sum();
    let raw = (leader_pct + 100.0 + members / 5.0) / 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn register_rejects_out_of_bounds_bonus() {
        let mut registry = MemberRegistry::new();
        let err = registry
            .register("u1", Member::new("Aki", 4.2, 300_000, at(1)))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "bonus"));
        assert!(registry.is_empty());
    }

    #[test]
    fn optional_bonus_zero_is_accepted_but_bad_value_is_not() {
        let mut registry = MemberRegistry::new();
        registry
            .register("u1", Member::new("Aki", 2.0, 300_000, at(1)).with_extra_bonuses(0.0, 0.0))
            .unwrap();
        let err = registry
            .register("u2", Member::new("Ren", 2.0, 1, at(1)).with_alt(0.5, 0))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "alt_bonus"));
    }

    #[test]
    fn update_keeps_unset_fields() {
        let mut registry = MemberRegistry::new();
        registry
            .register("u1", Member::new("Aki", 2.0, 300_000, at(1)))
            .unwrap();
        let updated = registry
            .update(
                "u1",
                MemberUpdate {
                    power: Some(310_000),
                    multiplicity: Some(Multiplicity::Double),
                    ..MemberUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.bonus, 2.0);
        assert_eq!(updated.power, 310_000);
        assert_eq!(updated.multiplicity, Multiplicity::Double);
    }

    #[test]
    fn update_of_unknown_member_fails() {
        let mut registry = MemberRegistry::new();
        let err = registry.update("ghost", MemberUpdate::default()).unwrap_err();
        assert_eq!(err, ValidationError::NotRegistered("ghost".into()));
    }

    #[test]
    fn find_by_name_prefers_exact_match() {
        let mut registry = MemberRegistry::new();
        registry.register("u1", Member::new("Akira", 2.0, 1, at(1))).unwrap();
        registry.register("u2", Member::new("aki", 2.1, 1, at(1))).unwrap();
        assert_eq!(registry.find_by_name("AKI").map(|(id, _)| id), Some("u2"));
        assert_eq!(registry.find_by_name("kir").map(|(id, _)| id), Some("u1"));
        assert!(registry.find_by_name("zzz").is_none());
    }

    #[test]
    fn stats_counts_multiplicity() {
        let mut registry = MemberRegistry::new();
        registry.register("u1", Member::new("A", 2.0, 1, at(1))).unwrap();
        registry
            .register("u2", Member::new("B", 3.0, 1, at(1)).with_multiplicity(Multiplicity::Triple))
            .unwrap();
        let stats = registry.stats();
        assert_eq!(stats.members, 2);
        assert!((stats.average_bonus - 2.5).abs() < 1e-9);
        assert_eq!((stats.single, stats.double, stats.triple), (1, 0, 1));
    }

    #[test]
    fn team_bonus_formula() {
        assert_eq!(team_bonus(150.0, &[100.0, 100.0, 100.0, 100.0]), 3.3);
        assert_eq!(team_bonus(0.0, &[]), 1.0);
    }

    #[test]
    fn multiplicity_parses_names_and_counts() {
        assert_eq!("Triple".parse::<Multiplicity>().unwrap(), Multiplicity::Triple);
        assert_eq!("2".parse::<Multiplicity>().unwrap().accounts(), 2);
        assert!("quad".parse::<Multiplicity>().is_err());
    }
}
