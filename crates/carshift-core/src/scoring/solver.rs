//! Greedy decomposition of a target total into catalog values.

use serde::{Deserialize, Serialize};

use super::catalog::ScoreCatalog;
use crate::error::ValidationError;

/// One distinct value played `repeats` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub value: u64,
    pub repeats: u64,
    pub total: u64,
    pub range: String,
    pub bonus: f64,
    pub stamina: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decomposition {
    Found { terms: Vec<Term> },
    NotFound,
}

impl Decomposition {
    pub fn terms(&self) -> &[Term] {
        match self {
            Decomposition::Found { terms } => terms,
            Decomposition::NotFound => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Decomposition::Found { .. })
    }
}

fn term(catalog: &ScoreCatalog, value: u64, repeats: u64) -> Term {
    let (range, bonus, stamina) = catalog
        .get(value)
        .map(|e| (e.range.clone(), e.bonus, e.stamina))
        .unwrap_or_default();
    Term {
        value,
        repeats,
        total: value * repeats,
        range,
        bonus,
        stamina,
    }
}

/// Split `target` into `s × p` or `s1 × p1 + s2`, with `s`, `s1`, `s2` drawn
/// from the catalog and repeat counts capped at `max_repeats`.
///
/// A single value that divides the target is preferred. Otherwise the largest
/// `s1` is tried first, with `p1` counting down, and the first remainder that
/// is itself a catalog value wins.
pub fn solve(
    catalog: &ScoreCatalog,
    target: i64,
    max_repeats: u64,
) -> Result<Decomposition, ValidationError> {
    if target <= 0 {
        return Err(ValidationError::invalid("target", "must be positive"));
    }
    let target = target as u64;

    for s in catalog.descending() {
        if s <= target && target % s == 0 && target / s <= max_repeats {
            tracing::debug!(target, value = s, "single-value decomposition");
            return Ok(Decomposition::Found {
                terms: vec![term(catalog, s, target / s)],
            });
        }
    }

    for s1 in catalog.descending() {
        if s1 > target {
            continue;
        }
        for p1 in (1..=(target / s1).min(max_repeats)).rev() {
            let rest = target - s1 * p1;
            if rest == 0 {
                return Ok(Decomposition::Found {
                    terms: vec![term(catalog, s1, p1)],
                });
            }
            if catalog.contains(rest) {
                tracing::debug!(target, s1, p1, rest, "two-value decomposition");
                return Ok(Decomposition::Found {
                    terms: vec![term(catalog, s1, p1), term(catalog, rest, 1)],
                });
            }
        }
    }

    Ok(Decomposition::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(terms: &[Term]) -> Vec<(u64, u64)> {
        terms.iter().map(|t| (t.value, t.repeats)).collect()
    }

    #[test]
    fn prefers_largest_single_divisor() {
        let catalog = ScoreCatalog::from_values([100, 150, 250]);
        let result = solve(&catalog, 500, 50).unwrap();
        assert_eq!(values(result.terms()), vec![(250, 2)]);
        assert_eq!(result.terms()[0].total, 500);
    }

    #[test]
    fn falls_back_to_two_values() {
        let catalog = ScoreCatalog::from_values([90, 140]);
        let result = solve(&catalog, 320, 50).unwrap();
        assert_eq!(values(result.terms()), vec![(90, 2), (140, 1)]);
    }

    #[test]
    fn respects_repeat_cap() {
        let catalog = ScoreCatalog::from_values([10]);
        assert_eq!(solve(&catalog, 600, 50).unwrap(), Decomposition::NotFound);
        assert!(solve(&catalog, 500, 50).unwrap().is_found());
    }

    #[test]
    fn unreachable_target_is_not_found() {
        let catalog = ScoreCatalog::from_values([100, 300]);
        assert_eq!(solve(&catalog, 150, 50).unwrap(), Decomposition::NotFound);
        assert_eq!(solve(&ScoreCatalog::default(), 100, 50).unwrap(), Decomposition::NotFound);
    }

    #[test]
    fn non_positive_target_is_rejected() {
        let catalog = ScoreCatalog::from_values([100]);
        assert!(solve(&catalog, 0, 50).is_err());
        assert!(solve(&catalog, -5, 50).is_err());
    }
}
