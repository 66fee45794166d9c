//! Spawn policy
//!
//! At most one entity per tick. All randomness comes from the caller's RNG so
//! a seeded `Pcg32` reproduces the same rain.

use rand::Rng;

use super::state::{Entity, GameState, ItemKind};
use crate::config::GameConfig;
use crate::consts::*;

/// Pick the kind of a fresh spawn given elapsed play time
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R, elapsed_ms: f32, config: &GameConfig) -> ItemKind {
    if rng.random::<f32>() >= config.good_item_ratio {
        return ItemKind::Bomb;
    }
    if elapsed_ms >= config.computer_unlock_ms && rng.random::<f32>() < config.computer_chance {
        return ItemKind::Computer;
    }
    let idx = rng.random_range(0..ItemKind::COMMON_GOODS.len());
    ItemKind::COMMON_GOODS[idx]
}

/// Build a new entity at the top of the screen
pub fn spawn_entity<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    elapsed_ms: f32,
    config: &GameConfig,
) -> Entity {
    let base_x = SPAWN_X_MIN + rng.random::<f32>() * (SPAWN_X_MAX - SPAWN_X_MIN);
    let kind = roll_kind(rng, elapsed_ms, config);
    let oscillation_phase = rng.random::<f32>() * std::f32::consts::TAU;
    let oscillation_speed = OSCILLATION_SPEED_MIN + rng.random::<f32>() * OSCILLATION_SPEED_SPAN;
    let oscillation_amplitude =
        OSCILLATION_AMPLITUDE_MIN + rng.random::<f32>() * OSCILLATION_AMPLITUDE_SPAN;
    let rotation_speed = (rng.random::<f32>() - 0.5) * ROTATION_SPEED_SPAN;

    Entity {
        id,
        kind,
        x: base_x,
        y: SPAWN_Y,
        base_x,
        oscillation_phase,
        oscillation_speed,
        oscillation_amplitude,
        rotation: 0.0,
        rotation_speed,
        size: config.entity_size,
        collected: false,
    }
}

/// Roll the per-tick spawn chance; push and return the new entity's id on success
pub fn maybe_spawn<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    config: &GameConfig,
) -> Option<u32> {
    if rng.random::<f32>() >= config.spawn_probability {
        return None;
    }
    let elapsed = state.elapsed_ms(config);
    let id = state.next_entity_id();
    let entity = spawn_entity(rng, id, elapsed, config);
    log::trace!("spawn {} {:?} at x={:.3}", id, entity.kind, entity.base_x);
    state.entities.push(entity);
    Some(id)
}
