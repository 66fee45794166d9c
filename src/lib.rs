//! Catch the Stuff - a falling-items catch game
//!
//! Core modules:
//! - `sim`: Simulation core (phases, spawning, kinematics, scoring, deferred actions)
//! - `layout`: Device-class geometry and the basket collision rule
//! - `driver`: Per-frame advance / hit-test / collect loop and input mapping
//! - `renderer`: Scene composition and the WebGPU sprite pipeline
//! - `assets`: Image/sound catalog with load status and fallbacks
//! - `config` / `settings`: Tuning values and runtime preferences

pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod driver;
pub mod layout;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod telemetry;
pub mod ui;

pub use config::{ConfigError, GameConfig};
pub use settings::{Preferences, Setting};

/// Game configuration constants
pub mod consts {
    /// Session length once the countdown ends (ms)
    pub const SESSION_DURATION_MS: f32 = 18_000.0;
    /// Countdown before play starts (ms)
    pub const COUNTDOWN_MS: f32 = 3_000.0;

    /// Chance of spawning one entity per tick while playing
    pub const SPAWN_PROBABILITY: f32 = 0.05;
    /// Share of spawns that are good items (the rest are bombs)
    pub const GOOD_ITEM_RATIO: f32 = 0.8;
    /// Computers can only appear after this much play time (ms)
    pub const COMPUTER_UNLOCK_MS: f32 = 4_000.0;
    /// Chance a good spawn becomes a computer once unlocked
    pub const COMPUTER_CHANCE: f32 = 0.1;

    /// Spawn lane bounds for `base_x`
    pub const SPAWN_X_MIN: f32 = 0.1;
    pub const SPAWN_X_MAX: f32 = 0.9;
    /// Entities start just above the top edge
    pub const SPAWN_Y: f32 = -0.1;
    /// Entities below this are gone
    pub const DESPAWN_Y: f32 = 1.2;

    /// Normalized item diameter
    pub const ENTITY_SIZE: f32 = 0.06;
    /// Fall speed (normalized units per ms)
    pub const FALL_RATE: f32 = 0.0001;

    /// Horizontal drift bands
    pub const OSCILLATION_SPEED_MIN: f32 = 0.002;
    pub const OSCILLATION_SPEED_SPAN: f32 = 0.003;
    pub const OSCILLATION_AMPLITUDE_MIN: f32 = 0.02;
    pub const OSCILLATION_AMPLITUDE_SPAN: f32 = 0.03;
    /// Spin speed spread, centered on zero (rad/ms)
    pub const ROTATION_SPEED_SPAN: f32 = 0.01;

    /// `move_player` clamp range
    pub const PLAYER_MIN_X: f32 = 0.1;
    pub const PLAYER_MAX_X: f32 = 0.9;
    /// Basket defaults (normalized)
    pub const PLAYER_START_X: f32 = 0.5;
    pub const PLAYER_Y: f32 = 0.85;
    pub const PLAYER_WIDTH: f32 = 0.15;
    pub const PLAYER_HEIGHT: f32 = 0.08;
    /// Keyboard step per key press
    pub const BASKET_KEY_STEP: f32 = 0.05;

    /// Delay between a bomb hit and the results screen (ms)
    pub const BOMB_RESULTS_DELAY_MS: f32 = 200.0;
    /// Automatic redirect after the results screen appears (ms)
    pub const AUTO_REDIRECT_MS: f32 = 6_000.0;

    /// Longest frame delta the driver feeds into the simulation (ms)
    pub const MAX_FRAME_DT_MS: f32 = 250.0;

    /// Landing page for the redirect kind and the results screen
    pub const REDIRECT_URL: &str =
        "https://promptconsulting.fr/?utm_source=qr-card&utm_campaign=bcv2025";
}

/// Clamp to the unit interval
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
