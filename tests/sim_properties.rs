//! Property tests for the simulation core

use proptest::prelude::*;

use catch_the_stuff::GameConfig;
use catch_the_stuff::sim::{GameEvent, GamePhase, ItemKind, Simulation};
use catch_the_stuff::telemetry::RecordingTelemetry;

fn playing(seed: u64) -> Simulation {
    let mut sim = Simulation::with_config(
        GameConfig::default(),
        seed,
        Box::new(RecordingTelemetry::new()),
    );
    sim.start();
    sim.advance(GameConfig::default().countdown_ms);
    assert_eq!(sim.phase(), GamePhase::Playing);
    sim
}

fn phase_rank(phase: GamePhase) -> u8 {
    match phase {
        GamePhase::Idle => 0,
        GamePhase::Countdown => 1,
        GamePhase::Playing => 2,
        GamePhase::GameOver => 3,
    }
}

fn good_kind() -> impl Strategy<Value = ItemKind> {
    prop::sample::select(ItemKind::ALL.to_vec())
        .prop_filter("plain good item", |k| k.is_good() && !k.is_redirect())
}

proptest! {
    #[test]
    fn clocks_only_run_down(seed in any::<u64>(), dts in prop::collection::vec(-100.0f32..400.0, 1..200)) {
        let config = GameConfig::default();
        let mut sim = Simulation::new(seed);
        sim.start();

        let mut countdown = sim.snapshot().countdown_ms;
        let mut time_left = sim.snapshot().time_left_ms;
        let mut rank = phase_rank(sim.phase());

        for dt in dts {
            sim.advance(dt);
            let state = sim.snapshot();
            prop_assert!(state.countdown_ms <= countdown);
            prop_assert!(state.time_left_ms <= time_left);
            prop_assert!(state.countdown_ms >= 0.0 && state.countdown_ms <= config.countdown_ms);
            prop_assert!(state.time_left_ms >= 0.0 && state.time_left_ms <= config.session_duration_ms);
            prop_assert!(phase_rank(state.phase) >= rank);
            // Time only flows once the countdown is done
            if state.phase == GamePhase::Countdown {
                prop_assert_eq!(state.time_left_ms, config.session_duration_ms);
            }
            countdown = state.countdown_ms;
            time_left = state.time_left_ms;
            rank = phase_rank(state.phase);
        }

        let transitions = sim
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PhaseChanged { to: GamePhase::Playing | GamePhase::GameOver, .. }))
            .count();
        prop_assert!(transitions <= 2);
    }

    #[test]
    fn collect_counts_each_item_once(
        kinds in prop::collection::vec(good_kind(), 1..20),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..60),
    ) {
        let mut sim = playing(7);
        let ids: Vec<u32> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| sim.inject(*kind, 0.5, 0.1 + i as f32 * 0.01))
            .collect();

        let mut caught = std::collections::HashSet::new();
        let mut best = 0;
        for pick in picks {
            let id = ids[pick.index(ids.len())];
            sim.collect(id);
            caught.insert(id);

            let state = sim.snapshot();
            prop_assert_eq!(state.score as usize, caught.len());
            prop_assert_eq!(state.combo as usize, caught.len());
            prop_assert!(state.max_combo >= best);
            prop_assert!(state.max_combo >= state.combo);
            best = state.max_combo;
        }
    }

    #[test]
    fn bomb_ends_session_and_keeps_best_combo(goods in 0usize..10) {
        let mut sim = playing(11);
        for i in 0..goods {
            let id = sim.inject(ItemKind::Pizza, 0.5, i as f32 * 0.05);
            sim.collect(id);
        }
        let bomb = sim.inject(ItemKind::Bomb, 0.5, 0.5);
        sim.collect(bomb);

        let state = sim.snapshot();
        prop_assert_eq!(state.phase, GamePhase::GameOver);
        prop_assert!(state.game_over_by_bomb);
        prop_assert_eq!(state.combo, 0);
        prop_assert_eq!(state.max_combo as usize, goods);
        prop_assert_eq!(state.score as usize, goods);
    }

    #[test]
    fn same_seed_same_session(seed in any::<u64>(), dts in prop::collection::vec(0.0f32..100.0, 1..150)) {
        let mut a = playing(seed);
        let mut b = playing(seed);
        for dt in dts {
            a.advance(dt);
            b.advance(dt);
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn no_computer_before_unlock(seed in any::<u64>(), dts in prop::collection::vec(1.0f32..50.0, 1..300)) {
        let config = GameConfig::default();
        let mut sim = playing(seed);
        for dt in dts {
            sim.advance(dt);
            let state = sim.snapshot();
            if state.elapsed_ms(&config) < config.computer_unlock_ms {
                prop_assert!(state.entities.iter().all(|e| e.kind != ItemKind::Computer));
            }
        }
    }

    #[test]
    fn entities_stay_on_screen(seed in any::<u64>(), dts in prop::collection::vec(1.0f32..250.0, 1..200)) {
        let mut sim = playing(seed);
        for dt in dts {
            sim.advance(dt);
            prop_assert!(sim.snapshot().entities.iter().all(|e| !e.is_off_screen()));
        }
    }

    #[test]
    fn basket_stays_in_bounds(moves in prop::collection::vec((-2.0f32..3.0, -1.0f32..1.0), 1..100)) {
        let mut sim = playing(3);
        for (x, nudge) in moves {
            sim.set_basket_x(x);
            prop_assert!((0.0..=1.0).contains(&sim.snapshot().player.x));
            sim.nudge_basket(nudge);
            prop_assert!((0.0..=1.0).contains(&sim.snapshot().player.x));
        }
    }

    #[test]
    fn reset_clears_session(seed in any::<u64>(), dts in prop::collection::vec(0.0f32..300.0, 0..100), contrast in any::<bool>()) {
        let mut sim = playing(seed);
        if contrast {
            sim.toggle_contrast();
        }
        for dt in dts {
            sim.advance(dt);
        }
        sim.reset();

        let config = GameConfig::default();
        let state = sim.snapshot();
        prop_assert_eq!(state.phase, GamePhase::Idle);
        prop_assert_eq!(state.score, 0);
        prop_assert_eq!(state.combo, 0);
        prop_assert!(state.entities.is_empty());
        prop_assert_eq!(state.time_left_ms, config.session_duration_ms);
        prop_assert_eq!(state.preferences.high_contrast, contrast);
    }
}
