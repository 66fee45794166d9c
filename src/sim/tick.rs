//! Variable-timestep simulation tick
//!
//! Advances timers, spawns and moves entities. Side effects that outlive the
//! tick (events, telemetry, deferred actions) are handled by the caller based
//! on the returned [`TickOutcome`].

use rand::Rng;

use super::spawn::maybe_spawn;
use super::state::{GamePhase, GameState};
use crate::config::GameConfig;

/// What a tick changed at the phase level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing beyond timers and entities
    Continue,
    /// Countdown reached zero; now `Playing`
    CountdownFinished,
    /// Session timer reached zero; now `GameOver`
    TimeUp,
}

/// Advance the game state by `dt` milliseconds
pub fn advance<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    config: &GameConfig,
    dt: f32,
) -> TickOutcome {
    // Negative or NaN deltas would run the clocks backwards
    let dt = if dt > 0.0 { dt } else { 0.0 };

    match state.phase {
        GamePhase::Idle | GamePhase::GameOver => TickOutcome::Continue,
        GamePhase::Countdown => {
            state.countdown_ms = (state.countdown_ms - dt).max(0.0);
            if state.countdown_ms <= 0.0 {
                state.phase = GamePhase::Playing;
                TickOutcome::CountdownFinished
            } else {
                TickOutcome::Continue
            }
        }
        GamePhase::Playing => {
            state.time_left_ms = (state.time_left_ms - dt).max(0.0);
            if state.time_left_ms <= 0.0 {
                state.phase = GamePhase::GameOver;
                state.game_over_by_bomb = false;
                return TickOutcome::TimeUp;
            }

            maybe_spawn(state, rng, config);

            let reduce_motion = state.preferences.reduce_animations;
            for entity in state.entities.iter_mut().filter(|e| !e.collected) {
                entity.step(dt, config.fall_rate, reduce_motion);
            }

            state
                .entities
                .retain(|e| !e.collected && !e.is_off_screen());

            TickOutcome::Continue
        }
    }
}
