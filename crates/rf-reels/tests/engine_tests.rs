//! Engine integration tests
//!
//! - Win evaluator properties over every possible line
//! - Cascade multiplier sequence through the full spin procedure
//! - Bonus lifecycle (entry, countdown, exit, accumulated total)
//! - Free-spin multiplier policies across consecutive free spins
//! - Scatter check on the final line only
//! - Balance invariant over long seeded sessions
//! - Internal errors roll the spin back

use rf_reels::{
    BonusMultiplierPolicy, BonusTransition, CascadeConfig, GameConfig, Line, ReelEngine,
    ScriptedEntropy, SeededEntropy, SpinError, SpinRequest, SpinState, Symbol, WinEntry,
    evaluate, evaluate_single, scatter_count,
};

fn all_lines() -> impl Iterator<Item = Line> {
    Symbol::ALL.into_iter().flat_map(|a| {
        Symbol::ALL
            .into_iter()
            .flat_map(move |b| Symbol::ALL.into_iter().map(move |c| Line::new([a, b, c])))
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATOR PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_all_wild_line_single_full_entry() {
    let game = GameConfig::cascade().build().unwrap();
    let wins = evaluate(&Line::new([Symbol::Bell; 3]), game.paytable());
    assert_eq!(wins, vec![WinEntry::full_line(Symbol::Bell)]);
}

#[test]
fn test_evaluator_properties_hold_for_every_line() {
    let game = GameConfig::cascade().build().unwrap();
    let paytable = game.paytable();
    let wild = paytable.wild();

    let mut lines = 0;
    for line in all_lines() {
        lines += 1;
        let wins = evaluate(&line, paytable);

        let candidate = Symbol::ALL
            .iter()
            .any(|&s| s != wild && line.iter().all(|x| x == s || x == wild));
        let all_wild = line.iter().all(|x| x == wild);
        assert_eq!(!wins.is_empty(), candidate || all_wild, "line {line}");

        for win in &wins {
            assert!(!win.positions.is_empty());
            assert!(win.positions.windows(2).all(|w| w[0] < w[1]));
            for &p in &win.positions {
                assert!(line[p] == win.symbol || line[p] == wild, "line {line}");
            }
        }
        assert!(wins.len() <= 1, "line {line} produced {wins:?}");
    }
    assert_eq!(lines, 729);
}

#[test]
fn test_wild_substitutes_for_cherry() {
    let game = GameConfig::cascade().build().unwrap();
    let line = Line::new([Symbol::Bell, Symbol::Cherry, Symbol::Cherry]);
    assert_eq!(
        evaluate(&line, game.paytable()),
        vec![WinEntry {
            symbol: Symbol::Cherry,
            positions: vec![0, 1, 2]
        }]
    );
}

#[test]
fn test_scatter_count_independent_of_paytable() {
    let line = Line::new([Symbol::Seven; 3]);
    for config in [GameConfig::cascade(), GameConfig::scatter_boost()] {
        let game = config.build().unwrap();
        assert_eq!(scatter_count(&line, game.paytable()), 3);
    }
}

#[test]
fn test_classic_single_winner_matches_original_rules() {
    let game = GameConfig::classic().build().unwrap();
    let table = game.paytable();
    use Symbol::*;

    assert_eq!(evaluate_single(&Line::new([Bell, Bell, Bell]), table), Some(Bell));
    assert_eq!(evaluate_single(&Line::new([Bell, Bell, Bar]), table), Some(Bar));
    assert_eq!(evaluate_single(&Line::new([Melon, Bell, Melon]), table), Some(Melon));
    assert_eq!(evaluate_single(&Line::new([Seven, Seven, Seven]), table), Some(Seven));
    assert_eq!(evaluate_single(&Line::new([Seven, Bell, Plum]), table), None);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPIN PROCEDURE
// ═══════════════════════════════════════════════════════════════════════════════

fn ladder_config() -> GameConfig {
    use Symbol::*;
    let strip = vec![Cherry, Plum, Lemon, Bell];
    GameConfig {
        name: "ladder".into(),
        wild: Bell,
        scatter: None,
        scatter_pays: true,
        reference_unit: 10.0,
        paytable: [(Cherry, 5.0), (Plum, 6.0), (Lemon, 3.0), (Bell, 30.0)]
            .into_iter()
            .collect(),
        reels: vec![strip.clone(), strip.clone(), strip],
        bet: Default::default(),
        cascade: CascadeConfig::default(),
        bonus: None,
        starting_balance: 1000.0,
    }
}

#[test]
fn test_rigged_cascade_multiplier_sequence() {
    let engine = ReelEngine::new(ladder_config().build().unwrap());
    let mut state = engine.new_state();
    // Three winning lines, then cherry - plum - lemon
    let mut entropy = ScriptedEntropy::new([0, 0, 0, 1, 1, 1, 2, 2, 2, 0, 1, 2]);

    let outcome = engine
        .spin(&mut state, SpinRequest::new(10.0), &mut entropy)
        .unwrap();

    let multipliers: Vec<u32> = outcome.cascade_steps.iter().map(|s| s.multiplier).collect();
    assert_eq!(multipliers, vec![1, 2, 3]);
    assert_eq!(outcome.peak_multiplier(), 3);
    assert!((outcome.total_payout - 26.0).abs() < 1e-9);
    assert!((state.balance() - 1016.0).abs() < 1e-9);

    let seqs: Vec<u32> = outcome.events.iter().map(|e| e.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(outcome.events.first().unwrap().stage.type_name(), "spin_start");
    assert_eq!(outcome.events.last().unwrap().stage.type_name(), "spin_end");
}

#[test]
fn test_depth_exceeded_rolls_back() {
    let mut config = ladder_config();
    config.reels = vec![vec![Symbol::Cherry]; 3];
    config.cascade.max_depth = 16;
    let engine = ReelEngine::new(config.build().unwrap());
    let mut state = engine.new_state();
    let before = state.clone();

    let result = engine.spin(&mut state, SpinRequest::new(10.0), &mut SeededEntropy::new(5));

    let err = result.unwrap_err();
    assert_eq!(err, SpinError::CascadeDepthExceeded { max_depth: 16 });
    assert!(err.is_internal());
    assert_eq!(state, before);
}

#[test]
fn test_balance_invariant_over_seeded_session() {
    for config in [GameConfig::cascade(), GameConfig::scatter_boost()] {
        let engine = ReelEngine::new(config.build().unwrap());
        let mut state = SpinState::with_balance(engine.game(), 1_000_000.0);
        let mut entropy = SeededEntropy::new(2024);

        for _ in 0..5_000 {
            let before = state.clone();
            let request = state.request();
            let outcome = engine.spin(&mut state, request, &mut entropy).unwrap();

            let deducted = if before.in_bonus() {
                0.0
            } else {
                request.bet_amount
            };
            assert_eq!(outcome.wagered, deducted);
            let expected = before.balance() - deducted + outcome.total_payout;
            assert!(
                (state.balance() - expected).abs() < 1e-6,
                "balance {} expected {}",
                state.balance(),
                expected
            );
            assert!(state.multiplier() >= 1);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BONUS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_bonus_lifecycle_total_matches_free_spin_payouts() {
    let engine = ReelEngine::new(GameConfig::scatter_boost().build().unwrap());
    let mut state = engine.new_state();

    // seven - seven - seven; scatters do not pay in this preset
    let trigger = engine
        .spin(&mut state, SpinRequest::new(10.0), &mut ScriptedEntropy::new([6, 4, 6]))
        .unwrap();
    assert_eq!(trigger.total_payout, 0.0);
    assert_eq!(
        trigger.bonus_transition,
        Some(BonusTransition::Entered {
            free_spins: 10,
            multiplier: 3
        })
    );
    assert!(state.in_bonus());
    assert_eq!(state.bonus_spins_remaining(), 10);
    assert_eq!(state.multiplier(), 3);

    let balance_at_entry = state.balance();
    let mut entropy = SeededEntropy::new(77);
    let mut free_total = 0.0;
    let mut last = None;

    for spin in 0..10 {
        let request = state.request();
        assert!(request.in_bonus);
        let outcome = engine.spin(&mut state, request, &mut entropy).unwrap();
        assert_eq!(outcome.wagered, 0.0);
        assert!(!outcome.entered_bonus());
        if let Some(step) = outcome.cascade_steps.first() {
            assert_eq!(step.multiplier, 3);
        }
        free_total += outcome.total_payout;
        last = outcome.bonus_transition;
        if spin < 9 {
            assert!(state.in_bonus());
        }
    }

    assert!(!state.in_bonus());
    assert_eq!(state.multiplier(), 1);
    assert!((state.last_bonus_total() - free_total).abs() < 1e-9);
    assert_eq!(last, Some(BonusTransition::Exited { total: state.last_bonus_total() }));
    assert!((state.balance() - (balance_at_entry + free_total)).abs() < 1e-9);
}

#[test]
fn test_reset_policy_starts_free_spins_at_one() {
    let mut config = GameConfig::scatter_boost();
    if let Some(bonus) = config.bonus.as_mut() {
        bonus.multiplier_policy = BonusMultiplierPolicy::Reset;
    }
    let engine = ReelEngine::new(config.build().unwrap());
    let mut state = engine.new_state();

    engine
        .spin(&mut state, SpinRequest::new(10.0), &mut ScriptedEntropy::new([6, 4, 6]))
        .unwrap();
    assert!(state.in_bonus());
    assert_eq!(state.multiplier(), 1);
}

#[test]
fn test_reset_policy_restarts_each_free_spin() {
    let mut config = GameConfig::scatter_boost();
    if let Some(bonus) = config.bonus.as_mut() {
        bonus.multiplier_policy = BonusMultiplierPolicy::Reset;
    }
    let engine = ReelEngine::new(config.build().unwrap());
    let mut state = engine.new_state();
    engine
        .spin(&mut state, SpinRequest::new(10.0), &mut ScriptedEntropy::new([6, 4, 6]))
        .unwrap();

    // cherry ×3, plum ×3, then cherry - plum - orange
    let request = state.request();
    let first = engine
        .spin(&mut state, request, &mut ScriptedEntropy::new([0, 0, 0, 1, 1, 1, 0, 1, 2]))
        .unwrap();
    let multipliers: Vec<u32> = first.cascade_steps.iter().map(|s| s.multiplier).collect();
    assert_eq!(multipliers, vec![1, 2]);
    assert_eq!(state.multiplier(), 2);

    // melon ×3, then cherry - plum - orange
    let request = state.request();
    let second = engine
        .spin(&mut state, request, &mut ScriptedEntropy::new([3, 3, 3, 0, 1, 2]))
        .unwrap();
    assert_eq!(second.cascade_steps.len(), 1);
    assert_eq!(second.cascade_steps[0].multiplier, 1);
    // 12 × (10 / 10) × 1
    assert!((second.total_payout - 12.0).abs() < 1e-9);
}

#[test]
fn test_retain_policy_carries_between_free_spins() {
    let mut config = GameConfig::scatter_boost();
    if let Some(bonus) = config.bonus.as_mut() {
        bonus.multiplier_policy = BonusMultiplierPolicy::Retain;
    }
    let engine = ReelEngine::new(config.build().unwrap());
    let mut state = engine.new_state();
    engine
        .spin(&mut state, SpinRequest::new(10.0), &mut ScriptedEntropy::new([6, 4, 6]))
        .unwrap();

    let request = state.request();
    engine
        .spin(&mut state, request, &mut ScriptedEntropy::new([0, 0, 0, 1, 1, 1, 0, 1, 2]))
        .unwrap();

    let request = state.request();
    let second = engine
        .spin(&mut state, request, &mut ScriptedEntropy::new([3, 3, 3, 0, 1, 2]))
        .unwrap();
    assert_eq!(second.cascade_steps[0].multiplier, 2);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCATTER CHECK
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scatters_redrawn_away_do_not_trigger() {
    let engine = ReelEngine::new(GameConfig::cascade().build().unwrap());
    let mut state = engine.new_state();
    // seven ×3 pays as a line, then redraws to cherry - plum - orange
    let mut entropy = ScriptedEntropy::new([6, 4, 6, 0, 1, 2]);

    let outcome = engine
        .spin(&mut state, SpinRequest::new(10.0), &mut entropy)
        .unwrap();

    assert_eq!(outcome.initial_line, Line::new([Symbol::Seven; 3]));
    assert_eq!(outcome.cascade_steps.len(), 1);
    assert_eq!(outcome.scatter_count, 0);
    assert!(!outcome.scatter_triggered);
    assert_eq!(outcome.bonus_transition, None);
    assert!(!state.in_bonus());
}

#[test]
fn test_scatters_landing_on_redraw_trigger() {
    let engine = ReelEngine::new(GameConfig::scatter_boost().build().unwrap());
    let mut state = engine.new_state();
    // cherry ×3 wins, then redraws to seven ×3 which does not pay here
    let mut entropy = ScriptedEntropy::new([0, 0, 0, 6, 4, 6]);

    let outcome = engine
        .spin(&mut state, SpinRequest::new(10.0), &mut entropy)
        .unwrap();

    assert_eq!(scatter_count(&outcome.initial_line, engine.game().paytable()), 0);
    assert_eq!(outcome.final_line, Line::new([Symbol::Seven; 3]));
    assert_eq!(outcome.scatter_count, 3);
    assert!(outcome.entered_bonus());
    assert!(state.in_bonus());
}

#[test]
fn test_bonus_events_in_order() {
    let engine = ReelEngine::new(GameConfig::scatter_boost().build().unwrap());
    let mut state = engine.new_state();

    let trigger = engine
        .spin(&mut state, SpinRequest::new(10.0), &mut ScriptedEntropy::new([6, 4, 6]))
        .unwrap();
    let types: Vec<&str> = trigger.events.iter().map(|e| e.stage.type_name()).collect();
    assert_eq!(
        types,
        vec!["spin_start", "reels_settled", "bonus_entered", "spin_end"]
    );

    // cherry - plum - orange: no win, no scatter
    let request = state.request();
    let free = engine
        .spin(&mut state, request, &mut ScriptedEntropy::new([0, 1, 2]))
        .unwrap();
    let types: Vec<&str> = free.events.iter().map(|e| e.stage.type_name()).collect();
    assert_eq!(
        types,
        vec!["spin_start", "bonus_spin_remaining", "reels_settled", "spin_end"]
    );
}
