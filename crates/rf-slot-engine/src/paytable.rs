//! Paytable and payline definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Cell;
use crate::symbols::{SymbolCatalog, SymbolId};

/// Symbol → payout multipliers indexed by match count.
///
/// `pays[k]` is the bet multiplier for `k` matching symbols, so a 5-reel game
/// carries six entries per symbol and entries 0 and 1 are zero for anything
/// evaluated on a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Paytable {
    pays: BTreeMap<SymbolId, Vec<f64>>,
}

impl Paytable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the pay sequence for a symbol
    pub fn with_pays(mut self, symbol: SymbolId, pays: &[f64]) -> Self {
        self.set(symbol, pays);
        self
    }

    pub fn set(&mut self, symbol: SymbolId, pays: &[f64]) {
        self.pays.insert(symbol, pays.to_vec());
    }

    /// Full pay sequence for a symbol
    pub fn pays(&self, symbol: SymbolId) -> Option<&[f64]> {
        self.pays.get(&symbol).map(Vec::as_slice)
    }

    /// Pay multiplier for `count` matches (0 when absent)
    pub fn payout(&self, symbol: SymbolId, count: usize) -> f64 {
        self.pays
            .get(&symbol)
            .and_then(|p| p.get(count))
            .copied()
            .unwrap_or(0.0)
    }

    /// Pay multiplier with the count clamped to the last entry.
    ///
    /// Scatter counts can exceed the reel count (several per reel), in which
    /// case the top entry pays.
    pub fn payout_clamped(&self, symbol: SymbolId, count: usize) -> f64 {
        match self.pays.get(&symbol) {
            Some(p) if !p.is_empty() => p[count.min(p.len() - 1)],
            _ => 0.0,
        }
    }

    /// Smallest match count with a non-zero payout
    pub fn min_paying_count(&self, symbol: SymbolId) -> Option<usize> {
        self.pays
            .get(&symbol)
            .and_then(|p| p.iter().position(|&v| v > 0.0))
    }

    /// Payout never decreases as the match count grows
    pub fn is_monotonic(&self, symbol: SymbolId) -> bool {
        self.pays
            .get(&symbol)
            .is_some_and(|p| p.windows(2).all(|w| w[1] >= w[0]))
    }

    /// Check every catalog symbol has a well-formed entry for `reel_count` reels
    pub fn validate(&self, catalog: &SymbolCatalog, reel_count: usize) -> Result<(), ConfigError> {
        for &symbol in self.pays.keys() {
            if !catalog.contains(symbol) {
                return Err(ConfigError::UnknownSymbol {
                    symbol,
                    context: "paytable".into(),
                });
            }
        }

        for def in catalog.iter() {
            let pays = self
                .pays(def.id)
                .ok_or(ConfigError::MissingPaytableEntry { symbol: def.id })?;

            if pays.len() != reel_count + 1 {
                return Err(ConfigError::PaytableLength {
                    symbol: def.id,
                    expected: reel_count + 1,
                    actual: pays.len(),
                });
            }
            if pays.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(ConfigError::InvalidPaytable {
                    symbol: def.id,
                    reason: "payouts must be finite and non-negative".into(),
                });
            }
            if !def.is_scatter() && pays.iter().take(2).any(|&v| v > 0.0) {
                return Err(ConfigError::InvalidPaytable {
                    symbol: def.id,
                    reason: "a single symbol cannot pay on a line".into(),
                });
            }
            if !self.is_monotonic(def.id) {
                return Err(ConfigError::InvalidPaytable {
                    symbol: def.id,
                    reason: "payout decreases with match count".into(),
                });
            }
        }
        Ok(())
    }
}

/// A payline definition.
///
/// Rows are numbered from 1 (top row) per reel, matching how game data
/// describes lines; `[2, 2, 2, 2, 2]` is the middle row of a 5×3 grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payline {
    rows: Vec<u8>,
}

impl Payline {
    pub fn new(rows: Vec<u8>) -> Self {
        Self { rows }
    }

    /// Create a straight line (same row across all reels)
    pub fn straight(row: u8, reel_count: usize) -> Self {
        Self {
            rows: vec![row; reel_count],
        }
    }

    /// 1-based row numbers, one per reel
    pub fn rows(&self) -> &[u8] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zero-based grid cells covered by this line, reel 1 first
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| (reel, (row as usize).saturating_sub(1)))
    }

    pub fn validate(&self, line: usize, reel_count: usize, rows: usize) -> Result<(), ConfigError> {
        if self.rows.len() != reel_count {
            return Err(ConfigError::MalformedPayline {
                line,
                reason: format!("{} positions for {} reels", self.rows.len(), reel_count),
            });
        }
        if let Some(&row) = self.rows.iter().find(|&&r| r == 0 || r as usize > rows) {
            return Err(ConfigError::MalformedPayline {
                line,
                reason: format!("row {} outside 1..={}", row, rows),
            });
        }
        Ok(())
    }
}

/// Standard payline patterns for a 5×3 grid
pub fn standard_20_paylines() -> Vec<Payline> {
    [
        // Straight lines
        [2, 2, 2, 2, 2],
        [1, 1, 1, 1, 1],
        [3, 3, 3, 3, 3],
        // V shapes
        [1, 2, 3, 2, 1],
        [3, 2, 1, 2, 3],
        // Zigzag
        [1, 1, 2, 3, 3],
        [3, 3, 2, 1, 1],
        [2, 1, 1, 1, 2],
        [2, 3, 3, 3, 2],
        // W shapes
        [1, 2, 1, 2, 1],
        [3, 2, 3, 2, 3],
        // Diagonal
        [1, 2, 2, 2, 1],
        [3, 2, 2, 2, 3],
        // Steps
        [2, 2, 1, 2, 2],
        [2, 2, 3, 2, 2],
        // Complex
        [1, 3, 1, 3, 1],
        [3, 1, 3, 1, 3],
        [2, 1, 2, 1, 2],
        [2, 3, 2, 3, 2],
        [1, 1, 3, 1, 1],
    ]
    .into_iter()
    .map(|rows| Payline::new(rows.to_vec()))
    .collect()
}
