//! Game state and core simulation types
//!
//! Everything the frame driver and the HUD read lives here. The state is
//! serializable so hosts can dump a snapshot as JSON.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::consts::*;
use crate::settings::Preferences;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Home screen, waiting for start
    #[default]
    Idle,
    /// 3-2-1 before play; basket can already move
    Countdown,
    /// Active gameplay
    Playing,
    /// Session ended (time or bomb)
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Countdown => "countdown",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "gameover",
        }
    }

    /// Phases that need the frame loop running
    pub fn is_animated(&self) -> bool {
        matches!(self, GamePhase::Countdown | GamePhase::Playing)
    }
}

/// What is falling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Client,
    Coffee,
    Pizza,
    Lemon,
    Pear,
    Pineapple,
    Plum,
    Champagne,
    /// Catching one sends the player to the landing page
    Computer,
    Flower,
    Bomb,
}

impl ItemKind {
    pub const ALL: [ItemKind; 11] = [
        ItemKind::Client,
        ItemKind::Coffee,
        ItemKind::Pizza,
        ItemKind::Lemon,
        ItemKind::Pear,
        ItemKind::Pineapple,
        ItemKind::Plum,
        ItemKind::Champagne,
        ItemKind::Computer,
        ItemKind::Flower,
        ItemKind::Bomb,
    ];

    /// Good kinds the spawner picks uniformly (everything but computer)
    pub const COMMON_GOODS: [ItemKind; 9] = [
        ItemKind::Client,
        ItemKind::Coffee,
        ItemKind::Pizza,
        ItemKind::Lemon,
        ItemKind::Pear,
        ItemKind::Pineapple,
        ItemKind::Plum,
        ItemKind::Champagne,
        ItemKind::Flower,
    ];

    pub fn is_good(&self) -> bool {
        !matches!(self, ItemKind::Bomb)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, ItemKind::Computer)
    }

    /// Asset base name (`/<name>.svg`)
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Client => "client",
            ItemKind::Coffee => "coffee",
            ItemKind::Pizza => "pizza",
            ItemKind::Lemon => "lemon",
            ItemKind::Pear => "pear",
            ItemKind::Pineapple => "pineapple",
            ItemKind::Plum => "plum",
            ItemKind::Champagne => "champagne",
            ItemKind::Computer => "computer",
            ItemKind::Flower => "flower",
            ItemKind::Bomb => "bomb",
        }
    }
}

/// A falling item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: ItemKind,
    /// Normalized position, y grows downward
    pub x: f32,
    pub y: f32,
    /// Center of the horizontal drift
    pub base_x: f32,
    pub oscillation_phase: f32,
    /// rad/ms
    pub oscillation_speed: f32,
    pub oscillation_amplitude: f32,
    /// Radians
    pub rotation: f32,
    /// rad/ms
    pub rotation_speed: f32,
    /// Normalized diameter
    pub size: f32,
    /// Inert once set: not drawn, not collidable
    pub collected: bool,
}

impl Entity {
    /// Entity that falls straight down without spinning
    pub fn still(id: u32, kind: ItemKind, x: f32, y: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            base_x: x,
            oscillation_phase: 0.0,
            oscillation_speed: 0.0,
            oscillation_amplitude: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: ENTITY_SIZE,
            collected: false,
        }
    }

    /// Kinematics for one tick
    ///
    /// With reduced motion the item falls straight at `base_x` and keeps its
    /// last phase and rotation.
    pub fn step(&mut self, dt: f32, fall_rate: f32, reduce_motion: bool) {
        self.y += fall_rate * dt;
        if reduce_motion {
            self.x = self.base_x;
        } else {
            self.oscillation_phase += self.oscillation_speed * dt;
            self.x = self.base_x + self.oscillation_phase.sin() * self.oscillation_amplitude;
            self.rotation += self.rotation_speed * dt;
        }
    }

    pub fn is_off_screen(&self) -> bool {
        self.y > DESPAWN_Y
    }
}

/// The basket, in normalized units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: PLAYER_START_X,
            y: PLAYER_Y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    /// Consecutive good catches
    pub combo: u32,
    pub max_combo: u32,
    /// Play time remaining (ms), never negative
    pub time_left_ms: f32,
    /// Countdown remaining (ms), never negative
    pub countdown_ms: f32,
    /// Last session ended on a bomb
    pub game_over_by_bomb: bool,
    /// Results overlay is up
    pub results_visible: bool,
    /// Live entities, in spawn order
    pub entities: Vec<Entity>,
    pub player: Player,
    pub preferences: Preferences,
    /// Next entity ID
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            combo: 0,
            max_combo: 0,
            time_left_ms: config.session_duration_ms,
            countdown_ms: config.countdown_ms,
            game_over_by_bomb: false,
            results_visible: false,
            entities: Vec::new(),
            player: Player::default(),
            preferences: Preferences::default(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear counters, entities and the basket; preferences survive
    pub fn clear_session(&mut self, config: &GameConfig) {
        self.score = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.time_left_ms = config.session_duration_ms;
        self.countdown_ms = config.countdown_ms;
        self.game_over_by_bomb = false;
        self.results_visible = false;
        self.entities.clear();
        self.player = Player::default();
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Entities still in play
    pub fn live_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.collected)
    }

    /// Play time used so far (ms)
    pub fn elapsed_ms(&self, config: &GameConfig) -> f32 {
        (config.session_duration_ms - self.time_left_ms).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::default();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.time_left_ms, SESSION_DURATION_MS);
        assert_eq!(state.countdown_ms, COUNTDOWN_MS);
        assert_eq!(state.player.x, 0.5);
        assert_eq!(state.player.y, 0.85);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_entity_ids_are_monotonic() {
        let mut state = GameState::default();
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_step_oscillates_and_spins() {
        let mut e = Entity::still(1, ItemKind::Pizza, 0.5, 0.0);
        e.oscillation_speed = 0.004;
        e.oscillation_amplitude = 0.03;
        e.rotation_speed = 0.002;
        e.step(100.0, FALL_RATE, false);

        assert!((e.y - 0.01).abs() < 1e-6);
        assert!((e.oscillation_phase - 0.4).abs() < 1e-6);
        assert!((e.x - (0.5 + 0.4f32.sin() * 0.03)).abs() < 1e-6);
        assert!((e.rotation - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_step_reduced_motion_freezes_drift() {
        let mut e = Entity::still(1, ItemKind::Bomb, 0.4, 0.2);
        e.oscillation_phase = 1.0;
        e.oscillation_speed = 0.004;
        e.oscillation_amplitude = 0.03;
        e.rotation = 0.7;
        e.rotation_speed = 0.002;
        e.x = 0.42;

        e.step(50.0, FALL_RATE, true);
        assert_eq!(e.x, 0.4);
        assert_eq!(e.oscillation_phase, 1.0);
        assert_eq!(e.rotation, 0.7);
        assert!((e.y - 0.205).abs() < 1e-6);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ItemKind::Computer.is_good());
        assert!(ItemKind::Computer.is_redirect());
        assert!(!ItemKind::Bomb.is_good());
        assert!(!ItemKind::COMMON_GOODS.contains(&ItemKind::Computer));
        assert_eq!(ItemKind::Pineapple.name(), "pineapple");
    }

    #[test]
    fn test_clear_session_keeps_preferences() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config);
        state.preferences.high_contrast = true;
        state.score = 7;
        state.player.x = 0.1;
        let id = state.next_entity_id();
        state.entities.push(Entity::still(id, ItemKind::Lemon, 0.5, 0.5));

        state.clear_session(&config);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.x, PLAYER_START_X);
        assert!(state.entities.is_empty());
        assert!(state.preferences.high_contrast);
    }
}
