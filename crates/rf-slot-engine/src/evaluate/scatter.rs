//! Scatter / bonus evaluation

use crate::grid::{Cell, Grid};
use crate::paytable::Paytable;
use crate::result::ScatterWin;
use crate::symbols::SymbolId;

/// Inputs to a scatter evaluation
#[derive(Debug, Clone, Copy)]
pub struct ScatterRules<'a> {
    pub paytable: &'a Paytable,
    pub scatter: SymbolId,
    /// Stake the scatter pay multiplies (all-bet or bet-per-line)
    pub bet: f64,
    /// Cascade stage multiplier; 1.0 outside cascades
    pub multiplier: f64,
    /// Scatters needed to trigger the bonus
    pub trigger_count: usize,
    pub bonus_enabled: bool,
}

/// Scatter count, pay and trigger state for one grid
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterEvaluation {
    pub symbol: SymbolId,
    pub count: usize,
    pub cells: Vec<Cell>,
    pub win: f64,
    /// Count reached the trigger threshold
    pub meets_threshold: bool,
    /// Threshold reached and the house allows bonuses
    pub triggers_bonus: bool,
}

impl ScatterEvaluation {
    /// Win event, when the scatter paid anything
    pub fn to_win(&self) -> Option<ScatterWin> {
        (self.win > 0.0).then(|| ScatterWin {
            symbol: self.symbol,
            count: self.count,
            amount: self.win,
            cells: self.cells.clone(),
        })
    }
}

/// Count scatters anywhere on the grid. Never touches the grid.
pub fn evaluate_scatter(grid: &Grid, rules: &ScatterRules<'_>) -> ScatterEvaluation {
    let cells = grid.cells_of(rules.scatter);
    let count = cells.len();
    let meets_threshold = count >= rules.trigger_count;

    ScatterEvaluation {
        symbol: rules.scatter,
        count,
        win: rules.paytable.payout_clamped(rules.scatter, count) * rules.bet * rules.multiplier,
        cells,
        meets_threshold,
        triggers_bonus: meets_threshold && rules.bonus_enabled,
    }
}
