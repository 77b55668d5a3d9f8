//! Catch-up plan search over the song catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::activity::{ep_value, level, song_score, LiveMode, SkillInput, SongDb};
use crate::error::ValidationError;
use crate::scoring::stamina_multiplier;

/// Inputs of one plan search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanQuery {
    /// EP still missing to reach the target.
    pub gap: i64,
    pub power: u64,
    /// Event bonus in percent.
    pub bonus_pct: f64,
    pub skill: SkillInput,
    pub alt_skill: SkillInput,
    pub mode: LiveMode,
    /// Remaining life, solo only.
    pub life: u32,
    /// Seconds between plays (lobby, loading).
    pub interval_secs: f64,
    pub tiers: Vec<u8>,
    pub candidates_per_tier: usize,
    pub top_n: usize,
    /// EP per hour the target is gaining; 0 when it is idle or unknown.
    pub border_speed: f64,
}

impl PlanQuery {
    pub fn new(gap: i64, power: u64) -> Self {
        Self {
            gap,
            power,
            bonus_pct: 250.0,
            skill: SkillInput(3.2),
            alt_skill: SkillInput(3.2),
            mode: LiveMode::Multi,
            life: 1000,
            interval_secs: 50.0,
            tiers: vec![5, 7, 10],
            candidates_per_tier: 10,
            top_n: 5,
            border_speed: 0.0,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.gap <= 0 {
            return Err(ValidationError::invalid("gap", "must be positive"));
        }
        if self.power == 0 {
            return Err(ValidationError::invalid("power", "must be positive"));
        }
        if self.tiers.is_empty() {
            return Err(ValidationError::invalid("tiers", "at least one stamina tier is required"));
        }
        if let Some(tier) = self.tiers.iter().find(|t| stamina_multiplier(**t).is_none()) {
            return Err(ValidationError::invalid("tiers", format!("unknown stamina tier {tier}")));
        }
        if self.interval_secs < 0.0 || !self.border_speed.is_finite() || self.border_speed < 0.0 {
            return Err(ValidationError::invalid("interval", "interval and border speed must be non-negative"));
        }
        Ok(())
    }
}

/// One song/difficulty played repeatedly at one stamina tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub song_id: u32,
    pub title: String,
    pub difficulty: String,
    pub level: f64,
    pub duration_secs: f64,
    pub event_rate: f64,
    pub stamina_tier: u8,
    pub multiplier: u64,
    pub score: i64,
    pub ep: i64,
    pub ep_per_hour: i64,
    /// Plays to close the gap against a static target.
    pub plays: u64,
    pub time_min: f64,
    pub stamina: u64,
    /// Same three figures once the target's own progress is accounted for.
    pub adjusted_plays: u64,
    pub adjusted_time_min: f64,
    pub adjusted_stamina: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPlans {
    pub stamina_tier: u8,
    pub multiplier: u64,
    /// Highest EP per hour first.
    pub by_efficiency: Vec<Plan>,
    /// Fewest adjusted plays first.
    pub fastest: Vec<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    Plans {
        gap: i64,
        border_speed: f64,
        tiers: Vec<TierPlans>,
    },
    NoFeasiblePlan {
        reason: String,
    },
}

/// Plays needed while the target keeps gaining `border_speed` EP per hour.
///
/// `None` when a play nets no EP on the target, i.e. the gap never closes.
pub fn catch_up_plays(gap: i64, ep: i64, cycle_secs: f64, border_speed: f64) -> Option<u64> {
    let net = if border_speed > 0.0 {
        ep as f64 - border_speed * (cycle_secs / 3600.0)
    } else {
        ep as f64
    };
    if net <= 0.0 {
        return None;
    }
    Some((gap as f64 / net).ceil() as u64)
}

/// EP per hour of play, rounded half to even.
fn hourly_rate(ep: i64, cycle_secs: f64) -> i64 {
    (ep as f64 * 3600.0 / cycle_secs).round_ties_even() as i64
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

/// Rank every song/difficulty per stamina tier by how quickly it closes the gap.
///
/// Candidates that cannot outpace the target are dropped. Each tier keeps
/// its best `candidates_per_tier` (fewest adjusted plays, then EP per hour)
/// and reports them twice: by EP per hour and by adjusted plays, each cut
/// to `top_n`.
pub fn find_plans(db: &SongDb, query: &PlanQuery) -> Result<PlanOutcome, ValidationError> {
    query.validate()?;
    if db.is_empty() {
        return Ok(PlanOutcome::NoFeasiblePlan {
            reason: "song catalog is empty".to_string(),
        });
    }

    let skill = query.skill.effective();
    let alt_skill = query.alt_skill.effective();
    let mut per_tier: Vec<Vec<Plan>> = vec![Vec::new(); query.tiers.len()];
    let mut positive = 0usize;

    for song in db.iter() {
        if song.duration_secs <= 0.0 {
            continue;
        }
        let cycle = song.duration_secs + query.interval_secs;
        for (difficulty, coefficients) in song.playable_diffs() {
            let Some(score) = song_score(coefficients, query.mode, query.power, skill, alt_skill) else {
                continue;
            };
            for (slot, &tier) in query.tiers.iter().enumerate() {
                let multiplier = stamina_multiplier(tier).unwrap_or(1);
                let ep = ep_value(
                    query.mode,
                    score,
                    song.event_rate,
                    query.bonus_pct,
                    multiplier,
                    query.power,
                    query.life,
                );
                if ep <= 0 {
                    continue;
                }
                positive += 1;
                let Some(adjusted_plays) = catch_up_plays(query.gap, ep, cycle, query.border_speed) else {
                    continue;
                };
                let plays = (query.gap as f64 / ep as f64).ceil() as u64;
                per_tier[slot].push(Plan {
                    song_id: song.id,
                    title: song.title.clone(),
                    difficulty: difficulty.to_string(),
                    level: level(coefficients),
                    duration_secs: song.duration_secs,
                    event_rate: song.event_rate,
                    stamina_tier: tier,
                    multiplier,
                    score,
                    ep,
                    ep_per_hour: hourly_rate(ep, cycle),
                    plays,
                    time_min: round1(plays as f64 * cycle / 60.0),
                    stamina: plays * u64::from(tier),
                    adjusted_plays,
                    adjusted_time_min: round1(adjusted_plays as f64 * cycle / 60.0),
                    adjusted_stamina: adjusted_plays * u64::from(tier),
                });
            }
        }
    }

    let mut tiers = Vec::new();
    for (tier, mut plans) in query.tiers.iter().copied().zip(per_tier) {
        plans.sort_by(|a, b| {
            a.adjusted_plays
                .cmp(&b.adjusted_plays)
                .then_with(|| b.ep_per_hour.cmp(&a.ep_per_hour))
        });
        let mut seen = HashSet::new();
        plans.retain(|p| seen.insert((p.song_id, p.difficulty.clone())));
        plans.truncate(query.candidates_per_tier);
        if plans.is_empty() {
            continue;
        }

        let fastest: Vec<Plan> = plans.iter().take(query.top_n).cloned().collect();
        let mut by_efficiency = plans;
        by_efficiency.sort_by(|a, b| b.ep_per_hour.cmp(&a.ep_per_hour));
        by_efficiency.truncate(query.top_n);

        tiers.push(TierPlans {
            stamina_tier: tier,
            multiplier: stamina_multiplier(tier).unwrap_or(1),
            by_efficiency,
            fastest,
        });
    }

    if tiers.is_empty() {
        let reason = if positive == 0 {
            "no song yields positive EP".to_string()
        } else {
            format!(
                "no song outpaces the target's {:.0} EP/h",
                query.border_speed
            )
        };
        tracing::info!(gap = query.gap, %reason, "no feasible plan");
        return Ok(PlanOutcome::NoFeasiblePlan { reason });
    }

    tracing::debug!(gap = query.gap, tiers = tiers.len(), "plans found");
    Ok(PlanOutcome::Plans {
        gap: query.gap,
        border_speed: query.border_speed,
        tiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::activity::Song;
    use indexmap::IndexMap;

    #[test]
    fn hourly_rate_rounds_half_to_even() {
        // 2.5 and 7.5 EP per hour
        assert_eq!(hourly_rate(1, 1440.0), 2);
        assert_eq!(hourly_rate(3, 1440.0), 8);
        assert_eq!(hourly_rate(1000, 150.0), 24_000);
    }

    fn song(id: u32, duration: f64, base: f64) -> Song {
        let mut diffs = IndexMap::new();
        diffs.insert(
            "master".to_string(),
            vec![30.0, 0.0, base, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
        diffs.insert(
            "expert".to_string(),
            vec![25.0, 0.0, base * 0.8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
        Song {
            id,
            title: format!("song {id}"),
            duration_secs: duration,
            event_rate: 100.0,
            diffs,
        }
    }

    fn db() -> SongDb {
        SongDb::new(vec![song(1, 120.0, 1.0), song(2, 90.0, 1.0), song(3, 200.0, 1.5)])
    }

    #[test]
    fn catch_up_is_impossible_when_target_outpaces_plays() {
        // 1000 EP per 120 s cycle nets 1000 - 40000 * 120 / 3600 < 0
        assert_eq!(catch_up_plays(5000, 1000, 120.0, 40_000.0), None);
        assert_eq!(catch_up_plays(5000, 1000, 120.0, 0.0), Some(5));
        // net 1000 - 15000 / 30 = 500 per play
        assert_eq!(catch_up_plays(5000, 1000, 120.0, 15_000.0), Some(10));
    }

    #[test]
    fn plans_are_grouped_per_tier_and_ranked() {
        let query = PlanQuery::new(100_000, 250_000);
        let PlanOutcome::Plans { tiers, .. } = find_plans(&db(), &query).unwrap() else {
            panic!("expected plans");
        };
        assert_eq!(tiers.iter().map(|t| t.stamina_tier).collect::<Vec<_>>(), vec![5, 7, 10]);
        for tier in &tiers {
            assert!(tier.fastest.len() <= 5);
            assert!(tier.fastest.windows(2).all(|w| w[0].adjusted_plays <= w[1].adjusted_plays));
            assert!(tier.by_efficiency.windows(2).all(|w| w[0].ep_per_hour >= w[1].ep_per_hour));
        }
        // higher tier, more EP per play
        assert!(tiers[2].fastest[0].ep > tiers[0].fastest[0].ep);
    }

    #[test]
    fn no_candidate_survives_a_fast_border() {
        let mut query = PlanQuery::new(100_000, 250_000);
        query.border_speed = 1e12;
        let outcome = find_plans(&db(), &query).unwrap();
        assert!(matches!(outcome, PlanOutcome::NoFeasiblePlan { .. }));
    }

    #[test]
    fn empty_catalog_has_no_plan() {
        let outcome = find_plans(&SongDb::default(), &PlanQuery::new(100, 1)).unwrap();
        assert!(matches!(outcome, PlanOutcome::NoFeasiblePlan { .. }));
    }

    #[test]
    fn invalid_queries_are_rejected() {
        assert!(find_plans(&db(), &PlanQuery::new(0, 250_000)).is_err());
        assert!(find_plans(&db(), &PlanQuery::new(100, 0)).is_err());
        let mut query = PlanQuery::new(100, 250_000);
        query.tiers = vec![11];
        assert!(find_plans(&db(), &query).is_err());
        query.tiers.clear();
        assert!(find_plans(&db(), &query).is_err());
    }

    #[test]
    fn candidates_are_capped_per_tier() {
        let mut query = PlanQuery::new(50_000, 250_000);
        query.tiers = vec![5];
        query.candidates_per_tier = 2;
        query.top_n = 5;
        let PlanOutcome::Plans { tiers, .. } = find_plans(&db(), &query).unwrap() else {
            panic!("expected plans");
        };
        assert_eq!(tiers[0].fastest.len(), 2);
        assert_eq!(tiers[0].by_efficiency.len(), 2);
    }
}
