//! Cascade (tumble) controller
//!
//! After a winning stage the won cells drop out, each reel's survivors fall
//! toward the bottom in their original order, and fresh symbols drawn from
//! the same strip fill in from the top. Evaluation repeats until a stage
//! pays nothing or the stage cap is hit.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EventKind;
use crate::error::ConfigError;
use crate::evaluate::{StageEvaluation, StageEvaluator};
use crate::grid::{Cell, Grid};
use crate::result::CascadeStage;
use crate::sampler::ReelSampler;
use crate::symbols::SymbolId;

/// Cascade configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Maximum number of evaluated stages, the initial drop included
    pub max_stages: u32,
    /// Stage multipliers in the base game; the last entry repeats
    pub base_multipliers: Vec<f64>,
    /// Stage multipliers during free spins; the last entry repeats
    pub free_spin_multipliers: Vec<f64>,
    /// Paid scatters drop out with the line wins. When off, scatters stay
    /// put and only pay on the first stage.
    pub remove_scatters: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_stages: 10,
            base_multipliers: vec![1.0],
            free_spin_multipliers: vec![1.0, 2.0, 3.0, 5.0, 10.0, 15.0],
            remove_scatters: true,
        }
    }
}

impl CascadeConfig {
    /// Stage multiplier for the given event (0 = initial drop)
    pub fn multiplier_for(&self, event: EventKind, stage: u32) -> f64 {
        let progression = match event {
            EventKind::Normal => &self.base_multipliers,
            EventKind::FreeSpin => &self.free_spin_multipliers,
        };
        progression
            .get(stage as usize)
            .or(progression.last())
            .copied()
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_stages == 0 {
            return Err(ConfigError::InvalidRule("cascade needs at least one stage".into()));
        }
        if self
            .base_multipliers
            .iter()
            .chain(&self.free_spin_multipliers)
            .any(|m| !m.is_finite() || *m <= 0.0)
        {
            return Err(ConfigError::InvalidRule("cascade multipliers must be positive".into()));
        }
        Ok(())
    }
}

/// All stages of one cascading spin
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    /// Every evaluated stage, the final non-winning one included
    pub stages: Vec<CascadeStage>,
    pub total_win: f64,
    /// Any stage triggered the bonus
    pub triggers_bonus: bool,
    /// Highest scatter count on any stage
    pub scatter_count: usize,
}

/// Run the cascade from an initial grid
pub fn run_cascade<R: Rng + ?Sized>(
    rng: &mut R,
    evaluator: &StageEvaluator<'_>,
    sampler: &ReelSampler<'_>,
    config: &CascadeConfig,
    event: EventKind,
    initial: Grid,
) -> CascadeOutcome {
    let mut outcome = CascadeOutcome {
        stages: Vec::new(),
        total_win: 0.0,
        triggers_bonus: false,
        scatter_count: 0,
    };
    let mut grid = initial;

    for index in 0..config.max_stages {
        let stage_multiplier = config.multiplier_for(event, index);
        let mut evaluation = evaluator.evaluate(&grid, stage_multiplier);
        if index > 0 && !config.remove_scatters {
            evaluation.forgo_scatter_pay();
        }

        outcome.total_win += evaluation.total_win;
        outcome.triggers_bonus |= evaluation.triggers_bonus();
        outcome.scatter_count = outcome.scatter_count.max(evaluation.scatter_count());

        let removed = if evaluation.total_win > 0.0 {
            winning_cells(&evaluation, config.remove_scatters)
        } else {
            BTreeSet::new()
        };

        // A win that removes nothing (scatters left in place) would replay
        // the same grid, so it ends the cascade too
        let next = (!removed.is_empty())
            .then(|| collapse(&grid, &removed, |reel| sampler.draw_symbol(rng, reel)));

        outcome.stages.push(CascadeStage {
            index,
            multiplier: evaluator.event_multiplier() * stage_multiplier,
            win: evaluation.total_win,
            events: evaluation.events(),
            grid,
        });

        match next {
            Some(refilled) => grid = refilled,
            None => break,
        }
    }

    outcome
}

/// Cells that contributed to a stage's win
fn winning_cells(evaluation: &StageEvaluation, include_scatters: bool) -> BTreeSet<Cell> {
    let mut cells: BTreeSet<Cell> = evaluation
        .lines
        .wins
        .iter()
        .flat_map(|w| w.cells.iter().copied())
        .collect();

    if include_scatters {
        if let Some(scatter) = evaluation.scatter.as_ref().filter(|s| s.win > 0.0) {
            cells.extend(scatter.cells.iter().copied());
        }
    }
    cells
}

/// Drop `removed` cells, compact survivors toward the bottom row and refill
/// the top with `refill(reel)`. Reel stop offsets are carried over unchanged.
pub fn collapse<F>(grid: &Grid, removed: &BTreeSet<Cell>, mut refill: F) -> Grid
where
    F: FnMut(usize) -> Option<SymbolId>,
{
    let reels = grid
        .reels
        .iter()
        .enumerate()
        .map(|(reel, column)| {
            let survivors: Vec<SymbolId> = column
                .iter()
                .enumerate()
                .filter(|&(row, _)| !removed.contains(&(reel, row)))
                .map(|(_, &s)| s)
                .collect();

            // Strips are validated non-empty, so refill only fails on a
            // reel the sampler does not know
            let mut new_column: Vec<SymbolId> = (survivors.len()..column.len())
                .filter_map(|_| refill(reel))
                .collect();
            new_column.extend(survivors);
            new_column
        })
        .collect();

    Grid::new(reels, grid.reel_positions.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HouseConfig, SpinRequest};
    use crate::game::GameDefinition;
    use crate::reels::ReelStrip;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_multiplier_progression_clamps() {
        let config = CascadeConfig::default();
        assert_eq!(config.multiplier_for(EventKind::FreeSpin, 0), 1.0);
        assert_eq!(config.multiplier_for(EventKind::FreeSpin, 3), 5.0);
        assert_eq!(config.multiplier_for(EventKind::FreeSpin, 40), 15.0);
        assert_eq!(config.multiplier_for(EventKind::Normal, 7), 1.0);

        let empty = CascadeConfig {
            base_multipliers: vec![],
            ..Default::default()
        };
        assert_eq!(empty.multiplier_for(EventKind::Normal, 0), 1.0);
    }

    #[test]
    fn test_collapse_keeps_order_and_refills_top() {
        let grid = Grid::new(vec![vec![1, 2, 3], vec![4, 5, 6]], vec![7, 9]);
        let removed: BTreeSet<Cell> = [(0, 1), (1, 0), (1, 2)].into_iter().collect();
        let mut next = 100;
        let collapsed = collapse(&grid, &removed, |_| {
            next += 1;
            Some(next)
        });
        assert_eq!(collapsed.reels, vec![vec![101, 1, 3], vec![102, 103, 5]]);
        assert_eq!(collapsed.reel_positions, vec![7, 9]);
    }

    /// Every stage wins: strips carry only symbol 0, which pays on every line
    fn always_winning_game() -> GameDefinition {
        let mut game = GameDefinition::cascading_5x3();
        game.reels = crate::reels::ReelSet::new(vec![ReelStrip::new(vec![0; 8]); 5]);
        game
    }

    #[test]
    fn test_cascade_stops_at_stage_cap() {
        let game = always_winning_game();
        let config = CascadeConfig {
            max_stages: 4,
            ..Default::default()
        };
        let house = HouseConfig::default();
        let request = SpinRequest::new(1.0, 20);
        let evaluator = StageEvaluator::new(&game, &request, &house);
        let sampler = ReelSampler::new(&game.reels.base, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let initial = sampler.sample(&mut rng, crate::sampler::SampleMode::Uniform);
        let outcome = run_cascade(&mut rng, &evaluator, &sampler, &config, EventKind::Normal, initial);

        assert_eq!(outcome.stages.len(), 4);
        assert!(outcome.stages.iter().all(|s| s.win > 0.0));
        let sum: f64 = outcome.stages.iter().map(|s| s.win).sum();
        assert_eq!(outcome.total_win, sum);
    }

    #[test]
    fn test_free_spin_stage_multipliers_escalate() {
        let game = always_winning_game();
        let config = CascadeConfig::default();
        let house = HouseConfig::default();
        let request = SpinRequest::new(1.0, 1).free_spin();
        let evaluator = StageEvaluator::new(&game, &request, &house);
        let sampler = ReelSampler::new(&game.reels.base, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let initial = sampler.sample(&mut rng, crate::sampler::SampleMode::Uniform);
        let outcome =
            run_cascade(&mut rng, &evaluator, &sampler, &config, EventKind::FreeSpin, initial);

        let multipliers: Vec<f64> = outcome.stages.iter().map(|s| s.multiplier).collect();
        assert_eq!(multipliers, vec![1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 15.0, 15.0, 15.0, 15.0]);
        // One line of five 0s pays 1000 × stage multiplier
        assert_eq!(outcome.stages[3].win, 5000.0);
    }

    #[test]
    fn test_losing_stage_terminates_and_is_recorded() {
        let game = GameDefinition::cascading_5x3();
        let config = CascadeConfig::default();
        let house = HouseConfig::default();
        let request = SpinRequest::new(1.0, 20);
        let evaluator = StageEvaluator::new(&game, &request, &house);
        let sampler = ReelSampler::new(&game.reels.base, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let dead = Grid::from_columns(vec![
            vec![1, 2, 3],
            vec![4, 5, 6],
            vec![7, 8, 9],
            vec![1, 2, 3],
            vec![4, 5, 6],
        ]);
        let outcome = run_cascade(&mut rng, &evaluator, &sampler, &config, EventKind::Normal, dead);
        assert_eq!(outcome.stages.len(), 1);
        assert_eq!(outcome.total_win, 0.0);
        assert!(outcome.stages[0].events.is_empty());
    }

    #[test]
    fn test_scatter_only_win_ends_cascade_when_scatters_stay() {
        let game = GameDefinition::cascading_5x3();
        let config = CascadeConfig {
            remove_scatters: false,
            ..Default::default()
        };
        let house = HouseConfig::default();
        let request = SpinRequest::new(1.0, 20);
        let evaluator = StageEvaluator::new(&game, &request, &house);
        let sampler = ReelSampler::new(&game.reels.base, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        // Three scatters pay, no payline does
        let grid = Grid::from_columns(vec![
            vec![11, 2, 3],
            vec![4, 5, 6],
            vec![7, 11, 9],
            vec![1, 2, 3],
            vec![4, 5, 11],
        ]);
        let outcome = run_cascade(&mut rng, &evaluator, &sampler, &config, EventKind::Normal, grid);

        assert_eq!(outcome.stages.len(), 1);
        assert!(outcome.total_win > 0.0);
        assert!(
            outcome.stages[0]
                .events
                .iter()
                .all(|e| matches!(e, crate::result::WinEvent::ScatterWin(_)))
        );
    }

    #[test]
    fn test_zero_stage_cap_rejected() {
        let config = CascadeConfig {
            max_stages: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(CascadeConfig::default().validate().is_ok());
    }
}
