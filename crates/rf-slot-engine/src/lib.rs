//! # rf-slot-engine — Slot Spin Engine
//!
//! Computes the outcome of a single slot spin: samples reel stops, evaluates
//! payline and scatter wins, and re-rolls candidate spins until one fits an
//! outcome class chosen against the house's running return-to-player.
//!
//! ## Features
//!
//! - **Reel Sampler**: uniform stops or scatter-biased stops for bonus outcomes
//! - **Line Evaluator**: left-to-right runs with wild substitution
//! - **Scatter Evaluator**: whole-grid scatter pays and bonus triggers
//! - **Outcome Classifier**: RTP feedback, max-win ceiling, bounded re-rolls
//! - **Cascades**: tumbling reels with escalating stage multipliers
//! - **Simulation**: parallel batch RTP runs on reproducible seeds
//!
//! ## Architecture
//!
//! ```text
//! SpinEngine::evaluate_spin
//!     │
//!     ├── choose_class (HouseConfig stat_in / stat_out)
//!     │
//!     └── run_acceptance_loop ◄─────────────┐
//!           │                               │ rejected
//!           ├── ReelSampler::sample          │
//!           ├── run_cascade (optional)       │
//!           │     └── StageEvaluator ── evaluate_lines + evaluate_scatter
//!           └── AcceptanceRules::judge ──────┘
//!                 │
//!                 v
//!           SpinResult → Vec<WinEvent>
//! ```
//!
//! Game data (catalog, paytable, strips, paylines) is immutable and shared;
//! each call brings its own random source and house snapshot.

pub mod cascade;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod game;
pub mod grid;
pub mod outcome;
pub mod parser;
pub mod paytable;
pub mod reels;
pub mod result;
pub mod sampler;
pub mod simulation;
pub mod symbols;

pub use cascade::{CascadeConfig, CascadeOutcome, run_cascade};
pub use config::*;
pub use engine::SpinEngine;
pub use error::*;
pub use evaluate::{
    LineEvaluation, LineRules, ScatterEvaluation, ScatterRules, StageEvaluation, StageEvaluator,
    evaluate_lines, evaluate_scatter,
};
pub use game::GameDefinition;
pub use grid::{Cell, Grid};
pub use outcome::{
    AcceptanceRules, Candidate, OutcomeClass, RejectReason, RejectionTally, choose_class,
    run_acceptance_loop,
};
pub use parser::{GameParser, ParseError, ParseLimits};
pub use paytable::*;
pub use reels::*;
pub use result::*;
pub use sampler::{ReelSampler, SampleMode};
pub use simulation::{SimulationConfig, SimulationReport, simulate};
pub use symbols::*;
