//! Spin request, house configuration and per-game rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cascade::CascadeConfig;
use crate::error::{ConfigError, RequestError};

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind of spin being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Paid base-game spin
    #[default]
    Normal,
    /// Spin awarded by a bonus trigger
    #[serde(alias = "freespin")]
    FreeSpin,
}

impl FromStr for EventKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "bet" => Ok(EventKind::Normal),
            "freespin" | "free_spin" | "free-spin" => Ok(EventKind::FreeSpin),
            other => Err(RequestError::UnknownEventKind(other.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Normal => f.write_str("normal"),
            EventKind::FreeSpin => f.write_str("freespin"),
        }
    }
}

/// A single wager
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    /// Credits staked on each active line
    pub bet_per_line: f64,
    /// Active lines, taken from the front of the game's payline list
    pub lines: usize,
    #[serde(default)]
    pub event: EventKind,
}

impl SpinRequest {
    pub fn new(bet_per_line: f64, lines: usize) -> Self {
        Self {
            bet_per_line,
            lines,
            event: EventKind::Normal,
        }
    }

    /// Builder: mark as a free spin
    pub fn free_spin(mut self) -> Self {
        self.event = EventKind::FreeSpin;
        self
    }

    /// Total stake across all active lines
    pub fn total_bet(&self) -> f64 {
        self.bet_per_line * self.lines as f64
    }

    pub fn validate(&self, available_lines: usize) -> Result<(), RequestError> {
        if !self.bet_per_line.is_finite() || self.bet_per_line <= 0.0 {
            return Err(RequestError::NonPositiveBet(self.bet_per_line));
        }
        if self.lines == 0 || self.lines > available_lines {
            return Err(RequestError::LineCountMismatch {
                requested: self.lines,
                available: available_lines,
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOUSE
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-shop configuration and running statistics snapshot.
///
/// Read-only to the engine; updating `stat_in`/`stat_out`/`bank` after a spin
/// is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseConfig {
    /// Target return-to-player, in percent (e.g. 92.0)
    pub target_percent: f64,
    /// Cumulative amount wagered (currency)
    pub stat_in: f64,
    /// Cumulative amount paid out (currency)
    pub stat_out: f64,
    /// Funds available to pay wins (currency)
    pub bank: f64,
    /// Largest single-spin payout allowed (currency)
    pub max_win: f64,
    pub bonus_enabled: bool,
    /// Applied to line wins whose run includes a wild
    pub wild_multiplier: f64,
    /// Applied to every line win during free spins
    pub free_spin_multiplier: f64,
    /// Currency value of one credit
    pub denomination: f64,
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            target_percent: 92.0,
            stat_in: 0.0,
            stat_out: 0.0,
            bank: 10_000.0,
            max_win: 50_000.0,
            bonus_enabled: true,
            wild_multiplier: 1.0,
            free_spin_multiplier: 1.0,
            denomination: 1.0,
        }
    }
}

impl HouseConfig {
    /// Realized RTP in percent, if anything has been wagered yet
    pub fn observed_percent(&self) -> Option<f64> {
        (self.stat_in > 0.0).then(|| self.stat_out / self.stat_in * 100.0)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let fail = |msg: &str| Err(RequestError::InvalidHouseConfig(msg.to_string()));

        let values = [
            self.target_percent,
            self.stat_in,
            self.stat_out,
            self.bank,
            self.max_win,
            self.wild_multiplier,
            self.free_spin_multiplier,
            self.denomination,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return fail("values must be finite");
        }
        if self.target_percent <= 0.0 {
            return fail("target percent must be positive");
        }
        if self.denomination <= 0.0 {
            return fail("denomination must be positive");
        }
        if self.max_win < 0.0 || self.stat_in < 0.0 || self.stat_out < 0.0 {
            return fail("max win and statistics cannot be negative");
        }
        if self.wild_multiplier <= 0.0 || self.free_spin_multiplier <= 0.0 {
            return fail("multipliers must be positive");
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GAME RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// Base odds for the outcome class draw, expressed as "1 in N"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeWeights {
    pub win_one_in: u32,
    pub bonus_one_in: u32,
    /// Upper bound on how far the RTP feedback can stretch the odds
    pub max_widening: f64,
}

impl Default for OutcomeWeights {
    fn default() -> Self {
        Self {
            win_one_in: 10,
            bonus_one_in: 20,
            max_widening: 4.0,
        }
    }
}

/// Bounds on the sample/evaluate loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationLimits {
    /// Loop bound
    pub max_iterations: u32,
    /// Unconditional give-up point, reached first with the defaults
    pub emergency_exit: u32,
}

impl Default for IterationLimits {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            emergency_exit: 1500,
        }
    }
}

impl IterationLimits {
    /// Number of cycles the loop actually allows
    pub fn budget(&self) -> u32 {
        self.max_iterations.min(self.emergency_exit)
    }
}

/// Which stake scatter pays multiply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterBetBasis {
    /// Bet per line × active lines
    #[default]
    AllBet,
    /// Bet per line only
    BetPerLine,
}

/// What a run made only of wilds pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildPayout {
    /// Wild-only runs pay the wild's own paytable entry
    #[default]
    Dedicated,
    /// Wild-only runs pay nothing
    Excluded,
}

/// Behavioural switches that differ between games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Visible rows per reel
    pub window_rows: usize,
    /// Scatters needed for a bonus trigger
    pub scatter_trigger_count: usize,
    pub scatter_bet_basis: ScatterBetBasis,
    pub wild_payout: WildPayout,
    /// Sample scatter-biased grids when constructing a bonus outcome
    pub scatter_bias: bool,
    /// Free spins awarded, indexed by scatter count (clamped to the last entry)
    pub free_spins_by_count: Vec<u32>,
    pub weights: OutcomeWeights,
    pub limits: IterationLimits,
    /// Present for cascading games
    pub cascade: Option<CascadeConfig>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            window_rows: 3,
            scatter_trigger_count: 3,
            scatter_bet_basis: ScatterBetBasis::AllBet,
            wild_payout: WildPayout::Dedicated,
            scatter_bias: true,
            free_spins_by_count: vec![0, 0, 0, 10, 15, 20],
            weights: OutcomeWeights::default(),
            limits: IterationLimits::default(),
            cascade: None,
        }
    }
}

impl GameRules {
    /// Free spins awarded for `scatter_count` scatters
    pub fn free_spins_for(&self, scatter_count: usize) -> u32 {
        self.free_spins_by_count
            .get(scatter_count.min(self.free_spins_by_count.len().saturating_sub(1)))
            .copied()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_rows == 0 {
            return Err(ConfigError::InvalidRule("window must show at least one row".into()));
        }
        if self.scatter_trigger_count == 0 {
            return Err(ConfigError::InvalidRule("scatter trigger count must be positive".into()));
        }
        if self.weights.win_one_in == 0 || self.weights.bonus_one_in == 0 {
            return Err(ConfigError::InvalidRule("outcome odds must be at least 1 in 1".into()));
        }
        if self.weights.max_widening.is_nan() || self.weights.max_widening < 1.0 {
            return Err(ConfigError::InvalidRule("max widening must be at least 1".into()));
        }
        if self.limits.budget() == 0 {
            return Err(ConfigError::InvalidRule("iteration budget must be positive".into()));
        }
        if let Some(cascade) = &self.cascade {
            cascade.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_parse() {
        assert_eq!("normal".parse::<EventKind>(), Ok(EventKind::Normal));
        assert_eq!("freespin".parse::<EventKind>(), Ok(EventKind::FreeSpin));
        assert_eq!("FreeSpin".parse::<EventKind>(), Ok(EventKind::FreeSpin));
        assert_eq!(
            "respin".parse::<EventKind>(),
            Err(RequestError::UnknownEventKind("respin".into()))
        );
    }

    #[test]
    fn test_request_validation() {
        assert!(SpinRequest::new(1.0, 20).validate(20).is_ok());
        assert_eq!(
            SpinRequest::new(0.0, 20).validate(20),
            Err(RequestError::NonPositiveBet(0.0))
        );
        assert!(SpinRequest::new(-1.0, 20).validate(20).is_err());
        assert!(SpinRequest::new(f64::NAN, 20).validate(20).is_err());
        assert_eq!(
            SpinRequest::new(1.0, 25).validate(20),
            Err(RequestError::LineCountMismatch { requested: 25, available: 20 })
        );
        assert!(SpinRequest::new(1.0, 0).validate(20).is_err());
    }

    #[test]
    fn test_total_bet() {
        assert_eq!(SpinRequest::new(0.5, 20).total_bet(), 10.0);
    }

    #[test]
    fn test_house_observed_percent() {
        let mut house = HouseConfig::default();
        assert_eq!(house.observed_percent(), None);
        house.stat_in = 200.0;
        house.stat_out = 190.0;
        assert_eq!(house.observed_percent(), Some(95.0));
    }

    #[test]
    fn test_house_validation() {
        assert!(HouseConfig::default().validate().is_ok());
        let bad = HouseConfig {
            denomination: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_iteration_budget() {
        assert_eq!(IterationLimits::default().budget(), 1500);
        let loose = IterationLimits {
            max_iterations: 100,
            emergency_exit: 1500,
        };
        assert_eq!(loose.budget(), 100);
    }

    #[test]
    fn test_free_spins_lookup_clamps() {
        let rules = GameRules::default();
        assert_eq!(rules.free_spins_for(2), 0);
        assert_eq!(rules.free_spins_for(3), 10);
        assert_eq!(rules.free_spins_for(9), 20);
    }

    #[test]
    fn test_house_config_partial_json() {
        let house: HouseConfig = serde_json::from_str(r#"{ "max_win": 100.0 }"#).unwrap();
        assert_eq!(house.max_win, 100.0);
        assert_eq!(house.target_percent, 92.0);
    }
}
