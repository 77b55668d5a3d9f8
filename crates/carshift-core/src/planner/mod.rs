//! EP catch-up planning.
//!
//! [`activity`] holds the song catalog and the per-play score and EP
//! formulas; [`search`] turns an EP gap into ranked play plans per stamina
//! tier, optionally against a target that keeps gaining EP.

pub mod activity;
pub mod search;

pub use activity::{ep_value, song_score, LiveMode, SkillInput, Song, SongDb};
pub use search::{catch_up_plays, find_plans, Plan, PlanOutcome, PlanQuery, TierPlans};
