//! Reel strip store

use serde::{Deserialize, Serialize};

use crate::config::EventKind;
use crate::error::ConfigError;
use crate::symbols::{SymbolCatalog, SymbolId};

/// A circular reel strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelStrip {
    symbols: Vec<SymbolId>,
}

impl ReelStrip {
    pub fn new(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> Option<SymbolId> {
        if self.symbols.is_empty() {
            return None;
        }
        Some(self.symbols[position % self.symbols.len()])
    }

    /// `rows` consecutive symbols starting at `offset`, wrapping at the end
    pub fn window(&self, offset: usize, rows: usize) -> Vec<SymbolId> {
        (0..rows)
            .filter_map(|row| self.symbol_at(offset + row))
            .collect()
    }

    /// Strip indices holding `symbol`
    pub fn positions_of(&self, symbol: SymbolId) -> Vec<usize> {
        self.symbols
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == symbol)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// Get total strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Check the strip can fill a window of `window` rows
    pub fn validate(&self, reel: usize, window: usize) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyStrip { reel });
        }
        if self.symbols.len() < window {
            return Err(ConfigError::UndersizedStrip {
                reel,
                len: self.symbols.len(),
                window,
            });
        }
        Ok(())
    }
}

/// One strip per reel, plus an optional set used during free spins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelSet {
    pub base: Vec<ReelStrip>,
    #[serde(default)]
    pub bonus: Option<Vec<ReelStrip>>,
}

impl ReelSet {
    pub fn new(base: Vec<ReelStrip>) -> Self {
        Self { base, bonus: None }
    }

    /// Builder: add a free-spin strip set
    pub fn with_bonus(mut self, bonus: Vec<ReelStrip>) -> Self {
        self.bonus = Some(bonus);
        self
    }

    /// Strips used for the given event; free spins fall back to the base set
    pub fn strips(&self, event: EventKind) -> &[ReelStrip] {
        match (event, &self.bonus) {
            (EventKind::FreeSpin, Some(bonus)) => bonus,
            _ => &self.base,
        }
    }

    /// Replace a malformed base strip with a known-good one so the game can
    /// keep serving
    pub fn with_fallback(mut self, reel: usize, strip: ReelStrip) -> Self {
        if let Some(slot) = self.base.get_mut(reel) {
            log::warn!("Substituting fallback strip on reel {}", reel);
            *slot = strip;
        }
        self
    }

    pub fn validate(
        &self,
        catalog: &SymbolCatalog,
        reel_count: usize,
        window: usize,
    ) -> Result<(), ConfigError> {
        let sets = std::iter::once(("base reels", &self.base))
            .chain(self.bonus.iter().map(|b| ("bonus reels", b)));

        for (context, strips) in sets {
            if strips.len() != reel_count {
                return Err(ConfigError::ReelCountMismatch {
                    expected: reel_count,
                    actual: strips.len(),
                });
            }
            for (reel, strip) in strips.iter().enumerate() {
                strip.validate(reel, window)?;
                if let Some(&symbol) = strip.symbols().iter().find(|&&s| !catalog.contains(s)) {
                    return Err(ConfigError::UnknownSymbol {
                        symbol,
                        context: format!("{} (reel {})", context, reel),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Generate balanced reel strips for a catalog: low payers dominate, wilds
/// skip the first reel, one scatter roughly every 25 stops.
pub fn generate_balanced_strips(
    catalog: &SymbolCatalog,
    reel_count: usize,
    strip_length: usize,
) -> Vec<ReelStrip> {
    let regular_ids = catalog.regular_ids();
    let wild_id = catalog.wild_ids().first().copied();
    let scatter_id = catalog.scatter_id();

    (0..reel_count)
        .map(|reel_idx| {
            let symbols = (0..strip_length)
                .map(|i| match (wild_id, scatter_id) {
                    (Some(wild), _) if i % 20 == 10 && reel_idx > 0 => wild,
                    (_, Some(scatter)) if i % 25 == 0 => scatter,
                    _ => {
                        // Weight toward the back of the catalog (low payers)
                        let n = regular_ids.len().max(1);
                        let pick = (i * 7 + reel_idx * 3) % (n * 2);
                        let idx = if pick >= n { n - 1 - (pick - n) / 2 } else { pick };
                        regular_ids.get(idx).copied().unwrap_or_default()
                    }
                })
                .collect();
            ReelStrip::new(symbols)
        })
        .collect()
}
