//! Outcome classifier
//!
//! ```text
//! ChooseClass ──► Sampling ──► Evaluating ──► Accepted
//!                    ▲              │
//!                    └── rejected ──┤
//!                                   └──► Exhausted (budget spent)
//! ```
//!
//! The class draw steers long-run RTP: when the house has paid out more than
//! its target, the "1 in N" odds for Win and Bonus are stretched by the
//! overshoot ratio (capped by `max_widening`). The loop then rejection-samples
//! grids until one fits the class. When the budget runs out the last sample
//! is returned as-is, except that a result never exceeds the max-win ceiling.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{HouseConfig, IterationLimits, OutcomeWeights};

/// Class of outcome a spin is steered toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeClass {
    None,
    Win,
    Bonus,
}

/// Result of the class draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassChoice {
    pub class: OutcomeClass,
    /// Effective "1 in N" odds after widening
    pub win_one_in: u32,
    pub bonus_one_in: u32,
    /// Feedback factor applied to the base odds (1.0 = no adjustment)
    pub widening: f64,
}

/// Stretch factor from the house's observed RTP
pub fn widening_factor(weights: &OutcomeWeights, house: &HouseConfig) -> f64 {
    match house.observed_percent() {
        Some(observed) if observed > house.target_percent => {
            (observed / house.target_percent).min(weights.max_widening)
        }
        _ => 1.0,
    }
}

fn widen(one_in: u32, factor: f64) -> u32 {
    let widened = (f64::from(one_in.max(1)) * factor).ceil();
    if widened >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        widened as u32
    }
}

/// Draw the outcome class.
///
/// Bonus is drawn first; a Bonus draw with bonuses disabled falls back to
/// None. An empty bank forces None since no paying class can be met.
pub fn choose_class<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &OutcomeWeights,
    house: &HouseConfig,
) -> ClassChoice {
    let widening = widening_factor(weights, house);
    let win_one_in = widen(weights.win_one_in, widening);
    let bonus_one_in = widen(weights.bonus_one_in, widening);

    let class = if house.bank <= 0.0 {
        OutcomeClass::None
    } else if rng.random_range(0..bonus_one_in) == 0 {
        if house.bonus_enabled {
            OutcomeClass::Bonus
        } else {
            OutcomeClass::None
        }
    } else if rng.random_range(0..win_one_in) == 0 {
        OutcomeClass::Win
    } else {
        OutcomeClass::None
    };

    log::debug!(
        "Outcome class {:?} (win 1/{}, bonus 1/{}, widening {:.3})",
        class,
        win_one_in,
        bonus_one_in,
        widening
    );

    ClassChoice {
        class,
        win_one_in,
        bonus_one_in,
        widening,
    }
}

/// What the acceptance rules need to know about a sampled spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Total win in credits
    pub total_win: f64,
    pub triggers_bonus: bool,
}

/// Why a candidate was sent back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Win in currency above the house ceiling
    OverMaxWin,
    /// Bonus trigger on a spin that was not meant to be a bonus
    BonusLeak,
    /// Did not satisfy the chosen class
    OutsideTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

/// Per-reason rejection counters for one spin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionTally {
    pub over_max_win: u32,
    pub bonus_leak: u32,
    pub outside_target: u32,
}

impl RejectionTally {
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::OverMaxWin => self.over_max_win += 1,
            RejectReason::BonusLeak => self.bonus_leak += 1,
            RejectReason::OutsideTarget => self.outside_target += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.over_max_win + self.bonus_leak + self.outside_target
    }
}

/// Acceptance region for one class against a house snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceRules {
    pub class: OutcomeClass,
    pub denomination: f64,
    /// Max-win ceiling in currency
    pub max_win: f64,
    /// Funds available for this payout, in currency
    pub bank: f64,
}

impl AcceptanceRules {
    pub fn new(class: OutcomeClass, house: &HouseConfig) -> Self {
        Self {
            class,
            denomination: house.denomination,
            max_win: house.max_win,
            bank: house.bank,
        }
    }

    /// Ceiling expressed in credits
    pub fn ceiling_credits(&self) -> f64 {
        self.max_win / self.denomination
    }

    pub fn within_ceiling(&self, candidate: &Candidate) -> bool {
        candidate.total_win * self.denomination <= self.max_win
    }

    fn within_bank(&self, candidate: &Candidate) -> bool {
        candidate.total_win * self.denomination <= self.bank
    }

    /// Apply the reject rules in precedence order, then the class target
    pub fn judge(&self, candidate: &Candidate) -> Verdict {
        if !self.within_ceiling(candidate) {
            return Verdict::Reject(RejectReason::OverMaxWin);
        }
        if candidate.triggers_bonus && self.class != OutcomeClass::Bonus {
            return Verdict::Reject(RejectReason::BonusLeak);
        }

        let accepted = match self.class {
            OutcomeClass::None => candidate.total_win == 0.0,
            OutcomeClass::Win => candidate.total_win > 0.0 && self.within_bank(candidate),
            OutcomeClass::Bonus => candidate.triggers_bonus && self.within_bank(candidate),
        };

        if accepted {
            Verdict::Accept
        } else {
            Verdict::Reject(RejectReason::OutsideTarget)
        }
    }
}

/// What the loop settled on
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome<T> {
    pub payload: T,
    /// Candidate as returned; `total_win` is clamped when `capped`
    pub candidate: Candidate,
    pub iterations: u32,
    /// Accepted by the rules, not by exhaustion
    pub converged: bool,
    /// Win clamped to the ceiling because no sample fit under it
    pub capped: bool,
    pub rejections: RejectionTally,
}

/// Rejection-sample `attempt` until the rules accept or the budget runs out.
///
/// On exhaustion the last sample is returned if it is under the ceiling,
/// otherwise the most recent sample that was. If no sample ever fit, the
/// last one comes back with its win clamped to the ceiling.
pub fn run_acceptance_loop<R, T, F>(
    rng: &mut R,
    rules: &AcceptanceRules,
    limits: &IterationLimits,
    mut attempt: F,
) -> LoopOutcome<T>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> (T, Candidate),
{
    let budget = limits.budget().max(1);
    let mut rejections = RejectionTally::default();
    let mut fallback: Option<(T, Candidate)> = None;
    let mut iterations = 0;

    loop {
        iterations += 1;
        let (payload, candidate) = attempt(rng);

        match rules.judge(&candidate) {
            Verdict::Accept => {
                return LoopOutcome {
                    payload,
                    candidate,
                    iterations,
                    converged: true,
                    capped: false,
                    rejections,
                };
            }
            Verdict::Reject(reason) => rejections.record(reason),
        }

        let under_ceiling = rules.within_ceiling(&candidate);
        if iterations < budget {
            if under_ceiling {
                fallback = Some((payload, candidate));
            }
            continue;
        }

        log::warn!(
            "Outcome loop exhausted after {} iterations targeting {:?} ({} over max win, {} bonus leaks, {} off target)",
            iterations,
            rules.class,
            rejections.over_max_win,
            rejections.bonus_leak,
            rejections.outside_target
        );

        let (payload, mut candidate, capped) = match (under_ceiling, fallback) {
            (true, _) => (payload, candidate, false),
            (false, Some((payload, candidate))) => (payload, candidate, false),
            (false, None) => (payload, candidate, true),
        };
        if capped {
            log::warn!(
                "No sample under the {} ceiling; clamping win {} to {}",
                rules.max_win,
                candidate.total_win,
                rules.ceiling_credits()
            );
            candidate.total_win = rules.ceiling_credits();
        }

        return LoopOutcome {
            payload,
            candidate,
            iterations,
            converged: false,
            capped,
            rejections,
        };
    }
}
