//! End-to-end scenarios for the spin engine

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rf_slot_engine::{
    AcceptanceRules, Candidate, GameDefinition, Grid, HouseConfig, IterationLimits, LineRules,
    OutcomeClass, Paytable, Payline, ScatterRules, SpinEngine, SpinRequest, StageEvaluator,
    SymbolCatalog, WildPayout, evaluate_lines, evaluate_scatter, run_acceptance_loop,
    standard_20_paylines,
};

const WILD: u32 = 10;
const SCATTER: u32 = 11;

fn line_rules<'a>(
    catalog: &'a SymbolCatalog,
    paytable: &'a Paytable,
    paylines: &'a [Payline],
) -> LineRules<'a> {
    LineRules {
        catalog,
        paytable,
        paylines,
        wild_payout: WildPayout::Dedicated,
        bet_per_line: 1.0,
        wild_multiplier: 1.0,
        multiplier: 1.0,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYTABLE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn paytable_is_monotonic_and_zero_below_minimum() {
    let game = GameDefinition::classic_5x3();
    for symbol in game.catalog.iter() {
        let pays = game.paytable.pays(symbol.id).unwrap();
        for k in 0..pays.len() - 1 {
            assert!(pays[k + 1] >= pays[k], "symbol {} at {}", symbol.id, k);
        }
        let min = game.paytable.min_paying_count(symbol.id).unwrap();
        assert!(pays[..min].iter().all(|&p| p == 0.0));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINE EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn no_win_on_all_mismatched_grid() {
    let game = GameDefinition::classic_5x3();
    let grid = Grid::from_columns(vec![
        vec![1, 2, 3],
        vec![4, 5, 6],
        vec![7, 8, 9],
        vec![1, 2, 3],
        vec![4, 5, 6],
    ]);
    let evaluator = StageEvaluator::new(&game, &SpinRequest::new(1.0, 20), &HouseConfig::default());
    let eval = evaluator.evaluate(&grid, 1.0);
    assert_eq!(eval.total_win, 0.0);
    assert!(eval.events().is_empty());
}

#[test]
fn three_of_a_kind_on_middle_row() {
    let catalog = SymbolCatalog::standard();
    let paytable = GameDefinition::classic_5x3()
        .paytable
        .with_pays(0, &[0.0, 0.0, 5.0, 50.0, 100.0, 1000.0]);
    let paylines = vec![Payline::new(vec![2, 2, 2, 2, 2])];
    let grid = Grid::from_columns(vec![
        vec![4, 0, 5],
        vec![6, 0, 7],
        vec![8, 0, 9],
        vec![4, 3, 5],
        vec![6, 1, 7],
    ]);

    let eval = evaluate_lines(&grid, &line_rules(&catalog, &paytable, &paylines));
    assert_eq!(eval.wins.len(), 1);
    assert_relative_eq!(eval.wins[0].amount, 50.0);
    assert_eq!(eval.wins[0].cells, vec![(0, 1), (1, 1), (2, 1)]);
}

#[test]
fn wild_substitutes_and_multiplies() {
    let catalog = SymbolCatalog::standard();
    let paytable = GameDefinition::classic_5x3().paytable;
    let paylines = vec![Payline::new(vec![2, 2, 2, 2, 2])];
    let grid = Grid::from_columns(vec![
        vec![4, WILD, 5],
        vec![6, 2, 7],
        vec![8, 2, 4],
        vec![4, 9, 5],
        vec![6, 9, 7],
    ]);
    let mut rules = line_rules(&catalog, &paytable, &paylines);
    rules.bet_per_line = 0.25;
    rules.wild_multiplier = 2.0;

    let eval = evaluate_lines(&grid, &rules);
    let win = &eval.wins[0];
    assert_eq!(win.symbol, 2);
    assert_eq!(win.run_length, 3);
    assert_relative_eq!(win.amount, paytable.payout(2, 3) * 0.25 * 2.0);
}

#[test]
fn line_evaluation_is_deterministic() {
    let game = GameDefinition::classic_5x3();
    let paylines = standard_20_paylines();
    let rules = line_rules(&game.catalog, &game.paytable, &paylines);
    let engine = SpinEngine::new(game.clone()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    for _ in 0..50 {
        let result = engine
            .evaluate_spin(&SpinRequest::new(1.0, 20), &HouseConfig::default(), &mut rng)
            .unwrap();
        let first = evaluate_lines(&result.grid, &rules);
        let second = evaluate_lines(&result.grid, &rules);
        assert_eq!(first, second);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCATTER
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn three_scatters_trigger_bonus() {
    let game = GameDefinition::classic_5x3();
    let grid = Grid::from_columns(vec![
        vec![SCATTER, 4, 5],
        vec![6, 7, 8],
        vec![9, SCATTER, 4],
        vec![5, 6, 7],
        vec![8, 9, SCATTER],
    ]);
    let request = SpinRequest::new(0.5, 20);
    let eval = evaluate_scatter(
        &grid,
        &ScatterRules {
            paytable: &game.paytable,
            scatter: SCATTER,
            bet: request.total_bet(),
            multiplier: 1.0,
            trigger_count: 3,
            bonus_enabled: true,
        },
    );
    assert!(eval.triggers_bonus);
    assert_eq!(eval.count, 3);
    assert_relative_eq!(eval.win, game.paytable.payout(SCATTER, 3) * 10.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOME LOOP
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn max_win_rejection_loop_never_accepts_over_ceiling() {
    let house = HouseConfig {
        max_win: 100.0,
        ..Default::default()
    };
    let rules = AcceptanceRules::new(OutcomeClass::Win, &house);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    // Mostly 500-credit candidates with the occasional small win
    let mut n = 0u32;
    let outcome = run_acceptance_loop(&mut rng, &rules, &IterationLimits::default(), |_| {
        n += 1;
        let win = if n % 97 == 0 { 20.0 } else { 500.0 };
        (n, Candidate { total_win: win, triggers_bonus: false })
    });
    assert!(outcome.converged);
    assert_eq!(outcome.payload, 97);
    assert_eq!(outcome.rejections.over_max_win, 96);

    // Never a small win: exhaustion, still under the ceiling
    let outcome = run_acceptance_loop(&mut rng, &rules, &IterationLimits::default(), |_| {
        ((), Candidate { total_win: 500.0, triggers_bonus: false })
    });
    assert!(!outcome.converged);
    assert_eq!(outcome.iterations, 1500);
    assert!(outcome.candidate.total_win * house.denomination <= house.max_win);
}

#[test]
fn engine_results_never_exceed_ceiling() {
    let engine = SpinEngine::new(GameDefinition::cascading_5x3()).unwrap();
    let house = HouseConfig {
        max_win: 100.0,
        bonus_enabled: true,
        ..Default::default()
    };
    let request = SpinRequest::new(1.0, 20);
    let mut rng = ChaCha8Rng::seed_from_u64(1234);

    for _ in 0..200 {
        let result = engine.evaluate_spin(&request, &house, &mut rng).unwrap();
        assert!(result.total_win * house.denomination <= house.max_win);
        assert!(result.iterations <= 1500);
        assert!(result.stages.len() <= 10);
    }
}

#[test]
fn rtp_feedback_reduces_paying_classes() {
    let engine = SpinEngine::new(GameDefinition::classic_5x3()).unwrap();
    let request = SpinRequest::new(1.0, 20);
    let cold = HouseConfig::default();
    let hot = HouseConfig {
        target_percent: 90.0,
        stat_in: 10_000.0,
        stat_out: 30_000.0,
        ..Default::default()
    };

    let count_paying = |house: &HouseConfig, seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..2_000)
            .filter(|_| {
                engine
                    .evaluate_spin(&request, house, &mut rng)
                    .map(|r| r.outcome != OutcomeClass::None)
                    .unwrap_or(false)
            })
            .count()
    };

    let cold_paying = count_paying(&cold, 8);
    let hot_paying = count_paying(&hot, 8);
    // 300% paid against a 90% target stretches the odds by more than 3×
    assert!(hot_paying * 2 < cold_paying, "hot {} cold {}", hot_paying, cold_paying);
}

#[test]
fn free_spins_use_bonus_strips_and_multiplier() {
    let mut game = GameDefinition::classic_5x3();
    game.reels.bonus = Some(vec![rf_slot_engine::ReelStrip::new(vec![0; 6]); 5]);
    game.rules.weights.win_one_in = 1;
    game.rules.weights.bonus_one_in = u32::MAX;
    let engine = SpinEngine::new(game).unwrap();
    let house = HouseConfig {
        free_spin_multiplier: 3.0,
        max_win: 1_000_000.0,
        bank: 1_000_000.0,
        ..Default::default()
    };
    let request = SpinRequest::new(1.0, 1).free_spin();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let result = engine.evaluate_spin(&request, &house, &mut rng).unwrap();
    // Bonus strips are all symbol 0: line 1 pays five of a kind, tripled
    assert!(result.grid.reels.iter().flatten().all(|&s| s == 0));
    assert_eq!(result.outcome, OutcomeClass::Win);
    assert!(result.converged);
    assert_relative_eq!(result.total_win, 1000.0 * 3.0);

    let evaluator = StageEvaluator::new(engine.game(), &request, &house);
    let eval = evaluator.evaluate(&result.grid, 1.0);
    assert_relative_eq!(eval.total_win, 3000.0);
    assert_eq!(eval.lines.wins[0].run_length, 5);
}
