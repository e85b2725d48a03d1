//! Error types for the spin engine
//!
//! Configuration problems (bad game data) and request problems (bad wager)
//! are kept apart so callers can decide whether to substitute defaults or
//! refuse the spin. Iteration exhaustion is not an error and never shows up
//! here; see [`crate::SpinResult::converged`].

use thiserror::Error;

use crate::symbols::SymbolId;

/// Malformed game data. Fatal to the call that hit it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Reel {reel}: strip is empty")]
    EmptyStrip { reel: usize },

    #[error("Reel {reel}: strip has {len} symbols, window needs {window}")]
    UndersizedStrip { reel: usize, len: usize, window: usize },

    #[error("Expected {expected} reel strips, found {actual}")]
    ReelCountMismatch { expected: usize, actual: usize },

    #[error("Symbol {symbol}: no paytable entry")]
    MissingPaytableEntry { symbol: SymbolId },

    #[error("Symbol {symbol}: paytable has {actual} entries, expected {expected}")]
    PaytableLength {
        symbol: SymbolId,
        expected: usize,
        actual: usize,
    },

    #[error("Symbol {symbol}: invalid paytable ({reason})")]
    InvalidPaytable { symbol: SymbolId, reason: String },

    #[error("Payline {line}: {reason}")]
    MalformedPayline { line: usize, reason: String },

    #[error("Unknown symbol {symbol} in {context}")]
    UnknownSymbol { symbol: SymbolId, context: String },

    #[error("Symbol {symbol} defined more than once")]
    DuplicateSymbol { symbol: SymbolId },

    #[error("Game uses scatter rules but defines no scatter symbol")]
    MissingScatter,

    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}

/// Rejected before any sampling takes place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Bet per line must be positive, got {0}")]
    NonPositiveBet(f64),

    #[error("Requested {requested} lines, game defines {available}")]
    LineCountMismatch { requested: usize, available: usize },

    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("Invalid house config: {0}")]
    InvalidHouseConfig(String),
}

/// Any error `SpinEngine::evaluate_spin` can return
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),
}

impl SpinError {
    /// True when the game data, not the wager, is at fault
    pub fn is_config(&self) -> bool {
        matches!(self, SpinError::Config(_))
    }
}

/// Result type alias
pub type EngineResult<T> = Result<T, SpinError>;
