//! Spin engine
//!
//! Stateless per call: the only shared state is the immutable game
//! definition, so one engine can serve any number of threads as long as each
//! brings its own random source.

use std::sync::Arc;

use rand::Rng;

use crate::cascade::run_cascade;
use crate::config::{EventKind, HouseConfig, SpinRequest};
use crate::error::{ConfigError, EngineResult};
use crate::evaluate::StageEvaluator;
use crate::game::GameDefinition;
use crate::grid::Grid;
use crate::outcome::{
    AcceptanceRules, Candidate, ClassChoice, OutcomeClass, choose_class, run_acceptance_loop,
};
use crate::result::{BonusKind, BonusTrigger, CascadeStage, SpinResult, WinEvent};
use crate::sampler::{ReelSampler, SampleMode};

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluates spins for one validated game
#[derive(Debug, Clone)]
pub struct SpinEngine {
    game: Arc<GameDefinition>,
}

/// One sampled (and, for cascading games, fully tumbled) spin
#[derive(Debug, Clone)]
struct SpinDraft {
    grid: Grid,
    events: Vec<WinEvent>,
    stages: Vec<CascadeStage>,
    total_win: f64,
    scatter_count: usize,
    triggers_bonus: bool,
}

impl SpinDraft {
    /// Scale every reported amount so events and stages still add up to
    /// `total_win`
    fn scale_to(&mut self, total_win: f64) {
        let factor = if self.total_win > 0.0 {
            total_win / self.total_win
        } else {
            0.0
        };
        for event in &mut self.events {
            event.scale_amount(factor);
        }
        for stage in &mut self.stages {
            stage.win *= factor;
            for event in &mut stage.events {
                event.scale_amount(factor);
            }
        }
        self.total_win = total_win;
    }
}

impl SpinEngine {
    /// Validate the game once; every later spin relies on it
    pub fn new(game: GameDefinition) -> Result<Self, ConfigError> {
        Self::from_shared(Arc::new(game))
    }

    pub fn from_shared(game: Arc<GameDefinition>) -> Result<Self, ConfigError> {
        game.validate()?;
        Ok(Self { game })
    }

    pub fn game(&self) -> &GameDefinition {
        &self.game
    }

    /// Shared handle to the game definition
    pub fn shared_game(&self) -> Arc<GameDefinition> {
        Arc::clone(&self.game)
    }

    /// Evaluate a spin using the calling thread's random source
    pub fn evaluate_spin_thread_rng(
        &self,
        request: &SpinRequest,
        house: &HouseConfig,
    ) -> EngineResult<SpinResult> {
        let mut rng = rand::rng();
        self.evaluate_spin(request, house, &mut rng)
    }

    /// Evaluate one spin.
    ///
    /// The request and house snapshot are validated before any randomness is
    /// consumed. Exhaustion is not an error: the result carries
    /// `converged == false` instead.
    pub fn evaluate_spin<R: Rng + ?Sized>(
        &self,
        request: &SpinRequest,
        house: &HouseConfig,
        rng: &mut R,
    ) -> EngineResult<SpinResult> {
        let game = &*self.game;
        request.validate(game.paylines.len())?;
        house.validate()?;

        let sampler = ReelSampler::new(game.reels.strips(request.event), game.rows())?;
        let evaluator = StageEvaluator::new(game, request, house);

        let choice = self.choose(rng, house);
        let mode = self.sample_mode(choice.class);
        let acceptance = AcceptanceRules::new(choice.class, house);

        let settled = run_acceptance_loop(rng, &acceptance, &game.rules.limits, |rng| {
            let grid = sampler.sample(rng, mode);
            let draft = self.play(rng, &evaluator, &sampler, request.event, grid);
            let candidate = Candidate {
                total_win: draft.total_win,
                triggers_bonus: draft.triggers_bonus,
            };
            (draft, candidate)
        });

        let mut draft = settled.payload;
        if settled.capped {
            draft.scale_to(settled.candidate.total_win);
        }
        let mut events = draft.events;
        if draft.triggers_bonus {
            events.push(WinEvent::BonusTrigger(BonusTrigger {
                kind: BonusKind::FreeSpins {
                    spins: game.rules.free_spins_for(draft.scatter_count),
                    multiplier: house.free_spin_multiplier,
                },
                scatter_count: draft.scatter_count,
                amount: 0.0,
            }));
        }

        log::debug!(
            "Spin settled as {:?}: win {} in {} iterations{}",
            choice.class,
            settled.candidate.total_win,
            settled.iterations,
            if settled.converged { "" } else { " (exhausted)" }
        );

        Ok(SpinResult {
            outcome: choice.class,
            total_win: draft.total_win,
            total_bet: evaluator.total_bet(),
            grid: draft.grid,
            events,
            scatter_count: draft.scatter_count,
            triggers_bonus: draft.triggers_bonus,
            stages: draft.stages,
            iterations: settled.iterations,
            converged: settled.converged,
            capped: settled.capped,
            rejections: settled.rejections,
        })
    }

    /// Class draw, downgrading Bonus when the game has no scatter to land
    fn choose<R: Rng + ?Sized>(&self, rng: &mut R, house: &HouseConfig) -> ClassChoice {
        let mut choice = choose_class(rng, &self.game.rules.weights, house);
        if choice.class == OutcomeClass::Bonus && self.game.scatter_id().is_none() {
            choice.class = OutcomeClass::None;
        }
        choice
    }

    fn sample_mode(&self, class: OutcomeClass) -> SampleMode {
        match (class, self.game.scatter_id()) {
            (OutcomeClass::Bonus, Some(scatter)) if self.game.rules.scatter_bias => {
                SampleMode::ScatterBiased {
                    scatter,
                    min_scatters: self.game.rules.scatter_trigger_count,
                }
            }
            _ => SampleMode::Uniform,
        }
    }

    /// Evaluate a sampled grid, tumbling it first for cascading games
    fn play<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        evaluator: &StageEvaluator<'_>,
        sampler: &ReelSampler<'_>,
        event: EventKind,
        grid: Grid,
    ) -> SpinDraft {
        match &self.game.rules.cascade {
            Some(config) => {
                let cascade = run_cascade(rng, evaluator, sampler, config, event, grid.clone());
                SpinDraft {
                    grid,
                    events: cascade
                        .stages
                        .iter()
                        .flat_map(|s| s.events.iter().cloned())
                        .collect(),
                    stages: cascade.stages,
                    total_win: cascade.total_win,
                    scatter_count: cascade.scatter_count,
                    triggers_bonus: cascade.triggers_bonus,
                }
            }
            None => {
                let evaluation = evaluator.evaluate(&grid, 1.0);
                SpinDraft {
                    events: evaluation.events(),
                    stages: Vec::new(),
                    total_win: evaluation.total_win,
                    scatter_count: evaluation.scatter_count(),
                    triggers_bonus: evaluation.triggers_bonus(),
                    grid,
                }
            }
        }
    }
}
