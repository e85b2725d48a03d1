//! Symbol catalog

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Opaque symbol identifier as it appears on reel strips
pub type SymbolId = u32;

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    #[default]
    Regular,
    /// Wild - substitutes for any paying symbol on a line
    Wild,
    /// Scatter - counted anywhere on the grid, never on a line
    Scatter,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Unique symbol ID
    pub id: SymbolId,
    /// Symbol name (e.g., "HP1", "WILD", "SCATTER")
    #[serde(default)]
    pub name: String,
    /// Symbol type
    #[serde(default)]
    pub kind: SymbolKind,
}

impl SymbolDef {
    /// Create a regular symbol
    pub fn regular(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Regular,
        }
    }

    /// Create a wild symbol
    pub fn wild(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Wild,
        }
    }

    /// Create a scatter symbol
    pub fn scatter(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Scatter,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    pub fn is_scatter(&self) -> bool {
        self.kind == SymbolKind::Scatter
    }
}

/// Ordered symbol catalog.
///
/// Catalog order matters: the line evaluator walks candidates in this order
/// and the first candidate wins ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolCatalog {
    symbols: Vec<SymbolDef>,
}

impl SymbolCatalog {
    pub fn new(symbols: Vec<SymbolDef>) -> Self {
        Self { symbols }
    }

    /// Standard catalog for a classic 5-reel slot.
    ///
    /// IDs 0-3 are high paying (HP1 highest), 4-9 low paying,
    /// 10 is the wild and 11 the scatter.
    pub fn standard() -> Self {
        let mut symbols: Vec<SymbolDef> = (0..4)
            .map(|i| SymbolDef::regular(i, format!("HP{}", i + 1)))
            .collect();
        symbols.extend((4..10).map(|i| SymbolDef::regular(i, format!("LP{}", i - 3))));
        symbols.push(SymbolDef::wild(10, "WILD"));
        symbols.push(SymbolDef::scatter(11, "SCATTER"));
        Self { symbols }
    }

    /// Get symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolDef> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_wild(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(SymbolDef::is_wild)
    }

    pub fn is_scatter(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(SymbolDef::is_scatter)
    }

    /// All wild symbol IDs (a game may define several)
    pub fn wild_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.is_wild())
            .map(|s| s.id)
            .collect()
    }

    /// First scatter symbol ID
    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.symbols.iter().find(|s| s.is_scatter()).map(|s| s.id)
    }

    /// Symbols evaluated on paylines, in catalog order (everything but scatters)
    pub fn line_candidates(&self) -> impl Iterator<Item = &SymbolDef> {
        self.symbols.iter().filter(|s| !s.is_scatter())
    }

    /// Get all regular symbol IDs
    pub fn regular_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .map(|s| s.id)
            .collect()
    }

    /// Reject empty catalogs and duplicate IDs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::InvalidRule("symbol catalog is empty".into()));
        }
        for (i, symbol) in self.symbols.iter().enumerate() {
            if self.symbols[..i].iter().any(|s| s.id == symbol.id) {
                return Err(ConfigError::DuplicateSymbol { symbol: symbol.id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = SymbolCatalog::standard();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.wild_ids(), vec![10]);
        assert_eq!(catalog.scatter_id(), Some(11));
        assert_eq!(catalog.regular_ids().len(), 10);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_line_candidates_skip_scatter_keep_order() {
        let catalog = SymbolCatalog::standard();
        let ids: Vec<SymbolId> = catalog.line_candidates().map(|s| s.id).collect();
        assert_eq!(ids, (0..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let catalog = SymbolCatalog::new(vec![
            SymbolDef::regular(1, "A"),
            SymbolDef::regular(1, "B"),
        ]);
        assert_eq!(
            catalog.validate(),
            Err(ConfigError::DuplicateSymbol { symbol: 1 })
        );
    }
}
