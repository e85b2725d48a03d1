//! Game document parser
//!
//! Parses game documents in JSON or YAML into a validated
//! [`GameDefinition`]. A document lists symbols with their pays inline;
//! reel strips and paylines are optional and fall back to generated
//! balanced strips and the standard line set.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let parser = GameParser::new();
//! let game = parser.parse_yaml(yaml_string)?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::GameRules;
use crate::error::ConfigError;
use crate::game::GameDefinition;
use crate::paytable::{Payline, Paytable, standard_20_paylines};
use crate::reels::{ReelSet, generate_balanced_strips};
use crate::symbols::{SymbolCatalog, SymbolDef, SymbolId, SymbolKind};

/// Game document parser
#[derive(Debug, Clone, Default)]
pub struct GameParser {
    /// Validation limits
    pub limits: ParseLimits,
}

/// Parsing limits for untrusted documents
#[derive(Debug, Clone)]
pub struct ParseLimits {
    pub max_name_length: usize,
    pub max_symbols: usize,
    pub max_paylines: usize,
    pub max_reels: usize,
    pub max_rows: usize,
    pub max_strip_length: usize,
    pub max_pay_value: f64,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_name_length: 256,
            max_symbols: 50,
            max_paylines: 100,
            max_reels: 10,
            max_rows: 10,
            max_strip_length: 1_000,
            max_pay_value: 100_000.0,
        }
    }
}

impl GameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create parser with custom limits
    pub fn with_limits(limits: ParseLimits) -> Self {
        Self { limits }
    }

    /// Parse a JSON document
    pub fn parse_json(&self, json: &str) -> Result<GameDefinition, ParseError> {
        let doc: GameDocument =
            serde_json::from_str(json).map_err(|e| ParseError::Json(e.to_string()))?;
        self.build(doc)
    }

    /// Parse a YAML document
    pub fn parse_yaml(&self, yaml: &str) -> Result<GameDefinition, ParseError> {
        let doc: GameDocument =
            serde_yml::from_str(yaml).map_err(|e| ParseError::Yaml(e.to_string()))?;
        self.build(doc)
    }

    /// Load a document from disk, picking the format from the extension
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<GameDefinition, ParseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => self.parse_json(&text),
            Some("yaml" | "yml") => self.parse_yaml(&text),
            other => Err(ParseError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Check a document against the parse limits
    pub fn validate(&self, doc: &GameDocument) -> Result<(), ParseError> {
        let limits = &self.limits;
        let too_many = |what: &str, n: usize, max: usize| {
            Err(ParseError::Validation(format!("Too many {}: {} > {}", what, n, max)))
        };

        if doc.name.len() > limits.max_name_length {
            return Err(ParseError::Validation(format!(
                "Game name too long: {} > {}",
                doc.name.len(),
                limits.max_name_length
            )));
        }
        if doc.symbols.len() > limits.max_symbols {
            return too_many("symbols", doc.symbols.len(), limits.max_symbols);
        }
        if doc.grid.reels > limits.max_reels {
            return too_many("reels", doc.grid.reels, limits.max_reels);
        }
        if doc.grid.rows > limits.max_rows {
            return too_many("rows", doc.grid.rows, limits.max_rows);
        }
        if doc.paylines.len() > limits.max_paylines {
            return too_many("paylines", doc.paylines.len(), limits.max_paylines);
        }
        if doc.strip_length > limits.max_strip_length {
            return Err(ParseError::Validation(format!(
                "Strip length too long: {} > {}",
                doc.strip_length, limits.max_strip_length
            )));
        }

        if let Some(set) = &doc.reels {
            if set.base.len() != doc.grid.reels {
                return Err(ConfigError::ReelCountMismatch {
                    expected: doc.grid.reels,
                    actual: set.base.len(),
                }
                .into());
            }
        }

        let strips = doc
            .reels
            .iter()
            .flat_map(|set| set.base.iter().chain(set.bonus.iter().flatten()));
        for strip in strips {
            if strip.len() > limits.max_strip_length {
                return Err(ParseError::Validation(format!(
                    "Strip length too long: {} > {}",
                    strip.len(),
                    limits.max_strip_length
                )));
            }
        }

        for symbol in &doc.symbols {
            if let Some(pay) = symbol.pays.iter().find(|&&p| p > limits.max_pay_value) {
                return Err(ParseError::Validation(format!(
                    "Symbol {} pays {} > {}",
                    symbol.id, pay, limits.max_pay_value
                )));
            }
        }
        Ok(())
    }

    fn build(&self, doc: GameDocument) -> Result<GameDefinition, ParseError> {
        self.validate(&doc)?;
        let game = doc.into_game();
        game.validate()?;
        Ok(game)
    }
}

/// Game document structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDocument {
    pub name: String,
    pub grid: DocumentGrid,
    pub symbols: Vec<DocumentSymbol>,
    /// Explicit strips; generated when absent
    #[serde(default)]
    pub reels: Option<ReelSet>,
    /// Length of generated strips
    #[serde(default = "default_strip_length")]
    pub strip_length: usize,
    /// Explicit paylines (1-based rows); a standard set when absent
    #[serde(default)]
    pub paylines: Vec<Payline>,
    #[serde(default)]
    pub rules: GameRules,
}

fn default_strip_length() -> usize {
    64
}

/// Grid dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentGrid {
    pub reels: usize,
    pub rows: usize,
}

/// A symbol with its pays inline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSymbol {
    pub id: SymbolId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: SymbolKind,
    /// Pay multipliers by match count, index 0 first
    pub pays: Vec<f64>,
}

impl GameDocument {
    fn into_game(self) -> GameDefinition {
        let mut paytable = Paytable::new();
        let catalog = SymbolCatalog::new(
            self.symbols
                .iter()
                .map(|s| {
                    paytable.set(s.id, &s.pays);
                    SymbolDef {
                        id: s.id,
                        name: s.name.clone(),
                        kind: s.kind,
                    }
                })
                .collect(),
        );

        let reels = self.reels.unwrap_or_else(|| {
            ReelSet::new(generate_balanced_strips(
                &catalog,
                self.grid.reels,
                self.strip_length,
            ))
        });

        let paylines = if !self.paylines.is_empty() {
            self.paylines
        } else if self.grid.reels == 5 && self.grid.rows == 3 {
            standard_20_paylines()
        } else {
            (1..=self.grid.rows)
                .map(|row| Payline::straight(row as u8, self.grid.reels))
                .collect()
        };

        let mut rules = self.rules;
        rules.window_rows = self.grid.rows;

        GameDefinition {
            name: self.name,
            catalog,
            paytable,
            reels,
            paylines,
            rules,
        }
    }
}

/// Game document parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported document format: '{0}'")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
