//! Payline evaluation
//!
//! Each line keeps only its best-paying candidate. Candidates are walked in
//! catalog order and a later candidate must pay strictly more to replace an
//! earlier one, so ties go to the symbol listed first.

use crate::config::WildPayout;
use crate::grid::{Cell, Grid};
use crate::paytable::{Paytable, Payline};
use crate::result::LineWin;
use crate::symbols::{SymbolCatalog, SymbolDef, SymbolId};

/// Inputs to a line evaluation pass
#[derive(Debug, Clone, Copy)]
pub struct LineRules<'a> {
    pub catalog: &'a SymbolCatalog,
    pub paytable: &'a Paytable,
    /// Active paylines only
    pub paylines: &'a [Payline],
    pub wild_payout: WildPayout,
    pub bet_per_line: f64,
    /// Applied when a run mixes wilds with its symbol
    pub wild_multiplier: f64,
    /// Event and cascade stage multiplier, applied to every line win
    pub multiplier: f64,
}

/// Line wins for one grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineEvaluation {
    pub total_win: f64,
    pub wins: Vec<LineWin>,
}

/// Evaluate every active payline on a grid
pub fn evaluate_lines(grid: &Grid, rules: &LineRules<'_>) -> LineEvaluation {
    let wins: Vec<LineWin> = rules
        .paylines
        .iter()
        .enumerate()
        .filter_map(|(line_index, payline)| best_on_line(grid, line_index, payline, rules))
        .collect();

    LineEvaluation {
        total_win: wins.iter().map(|w| w.amount).sum(),
        wins,
    }
}

fn best_on_line(
    grid: &Grid,
    line_index: usize,
    payline: &Payline,
    rules: &LineRules<'_>,
) -> Option<LineWin> {
    let symbols = grid.line_symbols(payline);
    let mut best: Option<LineWin> = None;

    for candidate in rules.catalog.line_candidates() {
        let Some(win) = candidate_win(&symbols, candidate, line_index, rules) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| win.amount > b.amount) {
            best = Some(win);
        }
    }
    best
}

/// Run for one candidate symbol starting at reel 1
fn candidate_win(
    symbols: &[(Cell, SymbolId)],
    candidate: &SymbolDef,
    line_index: usize,
    rules: &LineRules<'_>,
) -> Option<LineWin> {
    let catalog = rules.catalog;

    let run: Vec<(Cell, SymbolId)> = if candidate.is_wild() {
        symbols
            .iter()
            .take_while(|&&(_, s)| s == candidate.id)
            .copied()
            .collect()
    } else {
        symbols
            .iter()
            .take_while(|&&(_, s)| s == candidate.id || catalog.is_wild(s))
            .copied()
            .collect()
    };

    let wild_cells: Vec<Cell> = run
        .iter()
        .filter(|&&(_, s)| catalog.is_wild(s))
        .map(|&(cell, _)| cell)
        .collect();

    let multiplier = if candidate.is_wild() {
        // Wild-only run on the wild's own entry
        if rules.wild_payout == WildPayout::Excluded {
            return None;
        }
        rules.multiplier
    } else if wild_cells.len() == run.len() {
        // Wild-only runs belong to the wild candidate
        return None;
    } else if wild_cells.is_empty() {
        rules.multiplier
    } else {
        rules.multiplier * rules.wild_multiplier
    };

    let pay = rules.paytable.payout(candidate.id, run.len());
    if pay <= 0.0 {
        return None;
    }

    Some(LineWin {
        line_index,
        symbol: candidate.id,
        run_length: run.len(),
        amount: pay * rules.bet_per_line * multiplier,
        multiplier,
        cells: run.iter().map(|&(cell, _)| cell).collect(),
        wild_cells: if candidate.is_wild() { Vec::new() } else { wild_cells },
    })
}
