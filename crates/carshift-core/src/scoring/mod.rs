//! Score decomposition.
//!
//! A [`ScoreCatalog`] lists every per-play score a single play can yield
//! (one value per score range, bonus column and stamina tier). [`solve`]
//! splits a target total into at most two distinct values from the catalog.

pub mod catalog;
pub mod solver;

pub use catalog::{CatalogEntry, CatalogLimits, ScoreCatalog, ScoreTable, ScoreTableRow};
pub use solver::{solve, Decomposition, Term};

/// Score multiplier per stamina tier, indexed by stamina spent (0..=10).
pub const STAMINA_MULTIPLIERS: [u64; 11] = [1, 5, 10, 15, 20, 25, 27, 29, 31, 33, 35];

/// Multiplier for a stamina tier, `None` for tiers above 10.
pub fn stamina_multiplier(tier: u8) -> Option<u64> {
    STAMINA_MULTIPLIERS.get(usize::from(tier)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_table() {
        assert_eq!(stamina_multiplier(0), Some(1));
        assert_eq!(stamina_multiplier(5), Some(25));
        assert_eq!(stamina_multiplier(10), Some(35));
        assert_eq!(stamina_multiplier(11), None);
    }
}
