//! Rewards issued to participants.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::roster::MemberRegistry;

/// One issued reward (e.g. a prepaid card).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub code: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub note: String,
    pub issued_at: NaiveDateTime,
    #[serde(default)]
    pub issued_by: String,
}

/// Reward count of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCount {
    pub participant_id: String,
    pub name: String,
    pub count: usize,
}

/// Rewards per participant, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardLedger {
    rewards: BTreeMap<String, Vec<Reward>>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reward for a participant; returns how many they now hold.
    pub fn issue(&mut self, participant_id: impl Into<String>, reward: Reward) -> Result<usize, ValidationError> {
        if reward.code.trim().is_empty() {
            return Err(ValidationError::invalid("code", "must not be empty"));
        }
        let id = participant_id.into();
        tracing::info!(participant = %id, issued_by = %reward.issued_by, "reward issued");
        let held = self.rewards.entry(id).or_default();
        held.push(reward);
        Ok(held.len())
    }

    pub fn for_participant(&self, participant_id: &str) -> &[Reward] {
        self.rewards
            .get(participant_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rewards issued across all participants.
    pub fn total(&self) -> usize {
        self.rewards.values().map(Vec::len).sum()
    }

    /// The `n` participants holding the most rewards. Ties keep id order;
    /// names come from the registry, else the first 8 characters of the id.
    pub fn top(&self, n: usize, registry: &MemberRegistry) -> Vec<RewardCount> {
        let mut counts: Vec<RewardCount> = self
            .rewards
            .iter()
            .filter(|(_, held)| !held.is_empty())
            .map(|(id, held)| RewardCount {
                participant_id: id.clone(),
                name: registry
                    .get(id)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| id.chars().take(8).collect()),
                count: held.len(),
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(n);
        counts
    }
}
