//! Spin result model

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Grid};
use crate::outcome::{OutcomeClass, RejectionTally};
use crate::symbols::SymbolId;

/// A win result on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline index (0-based, into the active lines)
    pub line_index: usize,
    /// Winning symbol ID
    pub symbol: SymbolId,
    /// Number of matching symbols from reel 1
    pub run_length: usize,
    /// Win amount in credits
    pub amount: f64,
    /// Combined wild and event/stage multiplier applied to the pay
    pub multiplier: f64,
    /// Positions of winning symbols (reel, row)
    pub cells: Vec<Cell>,
    /// Wild positions included in the run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wild_cells: Vec<Cell>,
}

/// Scatter win result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterWin {
    pub symbol: SymbolId,
    /// Scatters anywhere on the grid
    pub count: usize,
    pub amount: f64,
    pub cells: Vec<Cell>,
}

/// Feature awarded by a bonus trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusKind {
    FreeSpins { spins: u32, multiplier: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusTrigger {
    pub kind: BonusKind,
    /// Scatters that caused the trigger
    pub scatter_count: usize,
    /// Immediate credit award attached to the trigger (the scatter pay is
    /// reported separately)
    pub amount: f64,
}

/// One entry in a spin's win list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WinEvent {
    LineWin(LineWin),
    ScatterWin(ScatterWin),
    BonusTrigger(BonusTrigger),
}

impl WinEvent {
    pub fn amount(&self) -> f64 {
        match self {
            WinEvent::LineWin(w) => w.amount,
            WinEvent::ScatterWin(w) => w.amount,
            WinEvent::BonusTrigger(b) => b.amount,
        }
    }

    /// Scale the credited amount, e.g. when a win is capped
    pub fn scale_amount(&mut self, factor: f64) {
        match self {
            WinEvent::LineWin(w) => w.amount *= factor,
            WinEvent::ScatterWin(w) => w.amount *= factor,
            WinEvent::BonusTrigger(b) => b.amount *= factor,
        }
    }
}

/// A single cascade stage, kept so the presentation layer can replay it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeStage {
    /// Stage number, 0 for the initial drop
    pub index: u32,
    /// Grid the stage was evaluated on
    pub grid: Grid,
    /// Event times stage multiplier carried by line wins. Scatter pays
    /// carry the stage part only.
    pub multiplier: f64,
    pub win: f64,
    pub events: Vec<WinEvent>,
}

/// Everything the engine hands back for an accepted spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Outcome class the control loop targeted
    pub outcome: OutcomeClass,
    /// Total win in credits, summed over all stages
    pub total_win: f64,
    /// Total stake in credits
    pub total_bet: f64,
    /// Accepted grid (the initial drop for cascading games)
    pub grid: Grid,
    /// All win events in stage order, bonus trigger last
    pub events: Vec<WinEvent>,
    /// Highest scatter count seen on any stage
    pub scatter_count: usize,
    pub triggers_bonus: bool,
    /// Per-stage breakdown; empty for non-cascading games
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<CascadeStage>,
    /// Sample/evaluate cycles spent
    pub iterations: u32,
    /// False when the result was accepted by exhaustion
    pub converged: bool,
    /// True when the win was clamped to the max-win ceiling; event and
    /// stage amounts are scaled down with it
    pub capped: bool,
    pub rejections: RejectionTally,
}

impl SpinResult {
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    /// Win-to-bet ratio
    pub fn win_ratio(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_win / self.total_bet
        } else {
            0.0
        }
    }

    pub fn line_wins(&self) -> impl Iterator<Item = &LineWin> {
        self.events.iter().filter_map(|e| match e {
            WinEvent::LineWin(w) => Some(w),
            _ => None,
        })
    }

    pub fn bonus_trigger(&self) -> Option<&BonusTrigger> {
        self.events.iter().find_map(|e| match e {
            WinEvent::BonusTrigger(b) => Some(b),
            _ => None,
        })
    }
}
