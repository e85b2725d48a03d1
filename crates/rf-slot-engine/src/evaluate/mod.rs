//! Grid evaluation
//!
//! [`lines`] and [`scatter`] are pure functions of a grid and their rules.
//! [`StageEvaluator`] binds them to one game and one wager so the outcome
//! loop and the cascade controller can re-run the same evaluation on every
//! fresh grid.

pub mod lines;
pub mod scatter;

pub use lines::{LineEvaluation, LineRules, evaluate_lines};
pub use scatter::{ScatterEvaluation, ScatterRules, evaluate_scatter};

use crate::config::{EventKind, HouseConfig, ScatterBetBasis, SpinRequest};
use crate::game::GameDefinition;
use crate::grid::Grid;
use crate::result::WinEvent;

/// Line + scatter evaluation bound to one game and wager
#[derive(Debug, Clone)]
pub struct StageEvaluator<'a> {
    game: &'a GameDefinition,
    bet_per_line: f64,
    lines: usize,
    wild_multiplier: f64,
    event_multiplier: f64,
    bonus_enabled: bool,
}

impl<'a> StageEvaluator<'a> {
    /// `request` must already be validated against the game
    pub fn new(game: &'a GameDefinition, request: &SpinRequest, house: &HouseConfig) -> Self {
        let event_multiplier = match request.event {
            EventKind::Normal => 1.0,
            EventKind::FreeSpin => house.free_spin_multiplier,
        };
        Self {
            game,
            bet_per_line: request.bet_per_line,
            lines: request.lines.min(game.paylines.len()),
            wild_multiplier: house.wild_multiplier,
            event_multiplier,
            bonus_enabled: house.bonus_enabled,
        }
    }

    /// Multiplier every line win carries for this event
    pub fn event_multiplier(&self) -> f64 {
        self.event_multiplier
    }

    /// Total stake across active lines
    pub fn total_bet(&self) -> f64 {
        self.bet_per_line * self.lines as f64
    }

    /// Evaluate a grid with a cascade stage multiplier on line and scatter wins.
    /// The event multiplier reaches line wins only.
    pub fn evaluate(&self, grid: &Grid, stage_multiplier: f64) -> StageEvaluation {
        let game = self.game;
        let line_rules = LineRules {
            catalog: &game.catalog,
            paytable: &game.paytable,
            paylines: &game.paylines[..self.lines],
            wild_payout: game.rules.wild_payout,
            bet_per_line: self.bet_per_line,
            wild_multiplier: self.wild_multiplier,
            multiplier: self.event_multiplier * stage_multiplier,
        };
        let lines = evaluate_lines(grid, &line_rules);

        let scatter = game.scatter_id().map(|symbol| {
            let bet = match game.rules.scatter_bet_basis {
                ScatterBetBasis::AllBet => self.total_bet(),
                ScatterBetBasis::BetPerLine => self.bet_per_line,
            };
            evaluate_scatter(
                grid,
                &ScatterRules {
                    paytable: &game.paytable,
                    scatter: symbol,
                    bet,
                    multiplier: stage_multiplier,
                    trigger_count: game.rules.scatter_trigger_count,
                    bonus_enabled: self.bonus_enabled,
                },
            )
        });

        StageEvaluation {
            total_win: lines.total_win + scatter.as_ref().map_or(0.0, |s| s.win),
            lines,
            scatter,
        }
    }
}

/// Result of evaluating one grid
#[derive(Debug, Clone, PartialEq)]
pub struct StageEvaluation {
    /// Line wins plus scatter pay
    pub total_win: f64,
    pub lines: LineEvaluation,
    /// `None` when the game has no scatter symbol
    pub scatter: Option<ScatterEvaluation>,
}

impl StageEvaluation {
    pub fn triggers_bonus(&self) -> bool {
        self.scatter.as_ref().is_some_and(|s| s.triggers_bonus)
    }

    pub fn scatter_count(&self) -> usize {
        self.scatter.as_ref().map_or(0, |s| s.count)
    }

    /// Remove the scatter pay from this stage, keeping count and trigger
    pub fn forgo_scatter_pay(&mut self) {
        if let Some(scatter) = &mut self.scatter {
            self.total_win -= scatter.win;
            scatter.win = 0.0;
        }
    }

    /// Line wins in line order, then the scatter win
    pub fn events(&self) -> Vec<WinEvent> {
        let mut events: Vec<WinEvent> = self
            .lines
            .wins
            .iter()
            .cloned()
            .map(WinEvent::LineWin)
            .collect();
        if let Some(win) = self.scatter.as_ref().and_then(ScatterEvaluation::to_win) {
            events.push(WinEvent::ScatterWin(win));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_middle_row_and_scatters() -> Grid {
        Grid::from_columns(vec![
            vec![11, 0, 4],
            vec![5, 0, 6],
            vec![11, 0, 7],
            vec![8, 5, 9],
            vec![11, 6, 4],
        ])
    }

    #[test]
    fn test_stage_sums_lines_and_scatter() {
        let game = GameDefinition::classic_5x3();
        let house = HouseConfig::default();
        let request = SpinRequest::new(1.0, 20);
        let evaluator = StageEvaluator::new(&game, &request, &house);

        let eval = evaluator.evaluate(&grid_with_middle_row_and_scatters(), 1.0);
        let scatter = eval.scatter.as_ref().unwrap();
        assert_eq!(scatter.count, 3);
        assert_eq!(scatter.win, 2.0 * 20.0);
        assert!(eval.triggers_bonus());
        assert_eq!(eval.total_win, eval.lines.total_win + 40.0);
        assert!(eval.lines.wins.iter().any(|w| w.symbol == 0 && w.run_length == 3));

        let events = eval.events();
        assert!(matches!(events.last(), Some(WinEvent::ScatterWin(_))));
    }

    #[test]
    fn test_scatter_bet_basis() {
        let mut game = GameDefinition::classic_5x3();
        game.rules.scatter_bet_basis = ScatterBetBasis::BetPerLine;
        let house = HouseConfig::default();
        let request = SpinRequest::new(0.5, 20);
        let evaluator = StageEvaluator::new(&game, &request, &house);
        let eval = evaluator.evaluate(&grid_with_middle_row_and_scatters(), 1.0);
        assert_eq!(eval.scatter.unwrap().win, 2.0 * 0.5);
    }

    #[test]
    fn test_free_spin_multiplier_hits_lines_only() {
        let game = GameDefinition::classic_5x3();
        let house = HouseConfig {
            free_spin_multiplier: 3.0,
            ..Default::default()
        };
        let grid = grid_with_middle_row_and_scatters();
        let base = StageEvaluator::new(&game, &SpinRequest::new(1.0, 20), &house).evaluate(&grid, 1.0);
        let free = StageEvaluator::new(&game, &SpinRequest::new(1.0, 20).free_spin(), &house)
            .evaluate(&grid, 1.0);

        assert_eq!(free.lines.total_win, base.lines.total_win * 3.0);
        assert_eq!(free.scatter, base.scatter);
    }

    #[test]
    fn test_stage_multiplier_reaches_scatter_pay() {
        let game = GameDefinition::classic_5x3();
        let house = HouseConfig {
            free_spin_multiplier: 3.0,
            ..Default::default()
        };
        let evaluator = StageEvaluator::new(&game, &SpinRequest::new(1.0, 20).free_spin(), &house);
        let grid = grid_with_middle_row_and_scatters();

        let first = evaluator.evaluate(&grid, 1.0);
        let fifth = evaluator.evaluate(&grid, 5.0);
        assert_eq!(first.scatter.as_ref().unwrap().win, 40.0);
        assert_eq!(fifth.scatter.as_ref().unwrap().win, 200.0);
        assert_eq!(fifth.lines.total_win, first.lines.total_win * 5.0);
    }

    #[test]
    fn test_forgo_scatter_pay() {
        let game = GameDefinition::classic_5x3();
        let house = HouseConfig::default();
        let evaluator = StageEvaluator::new(&game, &SpinRequest::new(1.0, 20), &house);
        let mut eval = evaluator.evaluate(&grid_with_middle_row_and_scatters(), 1.0);
        eval.forgo_scatter_pay();
        assert_eq!(eval.total_win, eval.lines.total_win);
        assert!(eval.triggers_bonus());
        assert!(eval.events().iter().all(|e| matches!(e, WinEvent::LineWin(_))));
    }

    #[test]
    fn test_only_active_lines_evaluated() {
        let game = GameDefinition::classic_5x3();
        let house = HouseConfig::default();
        // Win sits on the middle row, which is line 0
        let grid = grid_with_middle_row_and_scatters();
        let one_line = StageEvaluator::new(&game, &SpinRequest::new(1.0, 1), &house).evaluate(&grid, 1.0);
        assert!(one_line.lines.wins.iter().all(|w| w.line_index == 0));
        assert_eq!(one_line.scatter.unwrap().win, 2.0 * 1.0);
    }
}
