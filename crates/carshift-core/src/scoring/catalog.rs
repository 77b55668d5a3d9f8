//! Catalog of achievable per-play scores.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::STAMINA_MULTIPLIERS;
use crate::error::Result;

/// One row of the score table: a score range and a base value per bonus column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTableRow {
    pub min: u64,
    pub max: u64,
    /// Base values aligned with [`ScoreTable::bonuses`]; `None` marks an empty cell.
    pub bases: Vec<Option<u64>>,
}

/// Raw score table as exported from the source spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    /// Bonus of each column, as a multiplier (e.g. 2.5).
    pub bonuses: Vec<f64>,
    pub rows: Vec<ScoreTableRow>,
}

impl ScoreTable {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Which parts of a score table make it into the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogLimits {
    /// Bonus columns above this are skipped.
    pub bonus_cap: f64,
    /// Rows whose range ends above this are skipped.
    pub range_ceiling: u64,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            bonus_cap: 2.50,
            range_ceiling: 1_019_999,
        }
    }
}

/// Where a catalog value first came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub value: u64,
    /// `"min~max"` of the originating row.
    pub range: String,
    pub bonus: f64,
    pub stamina: u8,
}

/// Distinct achievable per-play values, searchable in descending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCatalog {
    entries: BTreeMap<u64, CatalogEntry>,
}

impl ScoreCatalog {
    /// Expand a score table: every base value times every stamina multiplier.
    ///
    /// When two cells produce the same value, the first one seen (row order,
    /// then column, then stamina tier) is kept.
    pub fn from_table(table: &ScoreTable, limits: &CatalogLimits) -> Self {
        let mut catalog = Self::default();
        for row in &table.rows {
            if row.max > limits.range_ceiling {
                continue;
            }
            let range = format!("{}~{}", row.min, row.max);
            for (bonus, base) in table.bonuses.iter().zip(&row.bases) {
                if *bonus > limits.bonus_cap {
                    continue;
                }
                let Some(base) = base else { continue };
                for (stamina, mult) in STAMINA_MULTIPLIERS.iter().enumerate() {
                    let Some(value) = base.checked_mul(*mult) else {
                        tracing::debug!(base, mult, "score cell overflows, skipped");
                        continue;
                    };
                    catalog.insert_first(CatalogEntry {
                        value,
                        range: range.clone(),
                        bonus: *bonus,
                        stamina: stamina as u8,
                    });
                }
            }
        }
        tracing::debug!(values = catalog.len(), "score catalog built");
        catalog
    }

    /// Catalog of bare values without provenance.
    pub fn from_values(values: impl IntoIterator<Item = u64>) -> Self {
        let mut catalog = Self::default();
        for value in values {
            catalog.insert_first(CatalogEntry {
                value,
                range: String::new(),
                bonus: 0.0,
                stamina: 0,
            });
        }
        catalog
    }

    pub fn load(path: &Path, limits: &CatalogLimits) -> Result<Self> {
        let table = ScoreTable::load(path)?;
        Ok(Self::from_table(&table, limits))
    }

    fn insert_first(&mut self, entry: CatalogEntry) {
        if entry.value == 0 {
            return;
        }
        self.entries.entry(entry.value).or_insert(entry);
    }

    pub fn contains(&self, value: u64) -> bool {
        self.entries.contains_key(&value)
    }

    pub fn get(&self, value: u64) -> Option<&CatalogEntry> {
        self.entries.get(&value)
    }

    /// Values from largest to smallest.
    pub fn descending(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().rev().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
