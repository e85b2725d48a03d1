//! Batch RTP simulation
//!
//! Spins run in chunks. Within a chunk every spin sees the same house
//! snapshot and runs in parallel on its own ChaCha stream; between chunks the
//! running statistics and bank are updated the way the persistence layer
//! would, so the RTP feedback loop is exercised.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{HouseConfig, SpinRequest};
use crate::engine::SpinEngine;
use crate::error::EngineResult;
use crate::outcome::OutcomeClass;
use crate::result::SpinResult;

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of spins
    pub spins: u64,
    /// Base seed; spin `i` uses stream `i` of this seed
    pub seed: u64,
    /// Spins sharing one house snapshot
    pub chunk_size: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spins: 100_000,
            seed: 0,
            chunk_size: 1_000,
        }
    }
}

/// Per-class spin counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub none: u64,
    pub win: u64,
    pub bonus: u64,
}

/// Aggregate statistics for a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub spins: u64,
    /// Credits wagered
    pub total_bet: f64,
    /// Credits won
    pub total_win: f64,
    /// Realized return, in percent
    pub rtp_percent: f64,
    /// Fraction of spins with any win
    pub hit_rate: f64,
    pub classes: ClassCounts,
    pub bonus_triggers: u64,
    /// Spins accepted by exhaustion
    pub exhausted: u64,
    /// Spins clamped to the max-win ceiling
    pub capped: u64,
    pub max_win: f64,
    pub mean_iterations: f64,
    /// House state after the last chunk
    pub final_house: HouseConfig,
    #[serde(skip)]
    winning_spins: u64,
    #[serde(skip)]
    iterations: u64,
}

impl SimulationReport {
    fn record(&mut self, result: &SpinResult) {
        self.spins += 1;
        self.total_bet += result.total_bet;
        self.total_win += result.total_win;
        self.max_win = self.max_win.max(result.total_win);
        self.iterations += u64::from(result.iterations);

        match result.outcome {
            OutcomeClass::None => self.classes.none += 1,
            OutcomeClass::Win => self.classes.win += 1,
            OutcomeClass::Bonus => self.classes.bonus += 1,
        }
        if result.is_win() {
            self.winning_spins += 1;
        }
        if result.triggers_bonus {
            self.bonus_triggers += 1;
        }
        if !result.converged {
            self.exhausted += 1;
        }
        if result.capped {
            self.capped += 1;
        }
    }

    fn finish(&mut self, house: HouseConfig) {
        if self.total_bet > 0.0 {
            self.rtp_percent = self.total_win / self.total_bet * 100.0;
        }
        if self.spins > 0 {
            self.hit_rate = self.winning_spins as f64 / self.spins as f64;
            self.mean_iterations = self.iterations as f64 / self.spins as f64;
        }
        self.final_house = house;
    }
}

/// Apply one settled spin to the house the way the persistence layer would
pub fn settle(house: &mut HouseConfig, result: &SpinResult) {
    let wagered = result.total_bet * house.denomination;
    let paid = result.total_win * house.denomination;
    house.stat_in += wagered;
    house.stat_out += paid;
    house.bank += wagered - paid;
}

/// Run `config.spins` independent spins
pub fn simulate(
    engine: &SpinEngine,
    request: &SpinRequest,
    house: &HouseConfig,
    config: &SimulationConfig,
) -> EngineResult<SimulationReport> {
    request.validate(engine.game().paylines.len())?;
    house.validate()?;

    let mut house = house.clone();
    let mut report = SimulationReport::default();
    let chunk_size = config.chunk_size.max(1);
    let mut start = 0;

    while start < config.spins {
        let end = (start + chunk_size).min(config.spins);
        let snapshot = house.clone();

        let results = (start..end)
            .into_par_iter()
            .map(|index| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
                rng.set_stream(index);
                engine.evaluate_spin(request, &snapshot, &mut rng)
            })
            .collect::<EngineResult<Vec<SpinResult>>>()?;

        for result in &results {
            report.record(result);
            settle(&mut house, result);
        }
        start = end;
    }

    report.finish(house);

    log::info!(
        "Simulated {} spins on '{}': RTP {:.2}%, hit rate {:.3}, {} exhausted, max win {}",
        report.spins,
        engine.game().name,
        report.rtp_percent,
        report.hit_rate,
        report.exhausted,
        report.max_win
    );

    Ok(report)
}
