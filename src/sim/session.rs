//! Simulation object: owns the state and applies commands
//!
//! Every command is total. Calls in the wrong phase or with unknown ids are
//! silent no-ops, logged at trace level.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::state::{Entity, GamePhase, GameState, ItemKind};
use super::tick::{self, TickOutcome};
use super::timers::{DeferredAction, DeferredQueue, Scheduled, Ticket};
use crate::config::GameConfig;
use crate::consts::*;
use crate::settings::Setting;
use crate::telemetry::{LogTelemetry, SessionSummary, Telemetry};

/// Why the page is leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationReason {
    ComputerCaught,
    UserAction,
    AutoRedirect,
}

/// Something the driver should react to (sound, animation, overlay, navigation)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A good item landed in the basket
    Caught { id: u32, kind: ItemKind },
    /// A bomb landed in the basket
    BombHit { id: u32 },
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Results overlay should be shown
    ResultsShown,
    Navigate {
        url: String,
        reason: NavigationReason,
    },
}

/// The game: state, RNG, tuning and collaborators
pub struct Simulation {
    state: GameState,
    config: GameConfig,
    seed: u64,
    rng: Pcg32,
    telemetry: Box<dyn Telemetry>,
    timers: DeferredQueue,
    events: Vec<GameEvent>,
    /// First navigation request wins
    navigated: bool,
}

impl Simulation {
    /// Default tuning, log telemetry
    pub fn new(seed: u64) -> Self {
        Self::with_config(GameConfig::default(), seed, Box::new(LogTelemetry))
    }

    pub fn with_config(config: GameConfig, seed: u64, telemetry: Box<dyn Telemetry>) -> Self {
        Self {
            state: GameState::new(&config),
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            telemetry,
            timers: DeferredQueue::new(),
            events: Vec::new(),
            navigated: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Read-only view of the whole state
    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.state)
    }

    /// Events produced since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deferred actions the host has not armed yet
    pub fn take_scheduled(&mut self) -> Vec<Scheduled> {
        self.timers.take_scheduled()
    }

    pub fn has_navigated(&self) -> bool {
        self.navigated
    }

    // === Commands ===

    /// `Idle -> Countdown`
    pub fn start(&mut self) {
        if self.state.phase != GamePhase::Idle {
            log::trace!("start ignored in {:?}", self.state.phase);
            return;
        }
        self.state.clear_session(&self.config);
        self.timers.bump_epoch();
        self.set_phase(GamePhase::Countdown);
        self.telemetry.session_started();
    }

    /// Back to `Idle` from anywhere; cancels deferred actions
    pub fn reset(&mut self) {
        self.state.clear_session(&self.config);
        self.timers.bump_epoch();
        if self.state.phase != GamePhase::Idle {
            self.set_phase(GamePhase::Idle);
        }
    }

    /// Advance timers and entities by `dt_ms`
    pub fn advance(&mut self, dt_ms: f32) {
        let before = self.state.phase;
        match tick::advance(&mut self.state, &mut self.rng, &self.config, dt_ms) {
            TickOutcome::Continue => {}
            TickOutcome::CountdownFinished => {
                self.events.push(GameEvent::PhaseChanged {
                    from: before,
                    to: GamePhase::Playing,
                });
                log::info!("countdown finished, playing");
            }
            TickOutcome::TimeUp => {
                self.events.push(GameEvent::PhaseChanged {
                    from: before,
                    to: GamePhase::GameOver,
                });
                self.on_game_over(false);
            }
        }
    }

    /// Apply a catch
    pub fn collect(&mut self, id: u32) {
        if self.state.phase != GamePhase::Playing {
            log::trace!("collect({id}) ignored in {:?}", self.state.phase);
            return;
        }
        let Some(entity) = self.state.entity_mut(id) else {
            log::trace!("collect({id}): unknown id");
            return;
        };
        if entity.collected {
            return;
        }
        entity.collected = true;
        let kind = entity.kind;

        match kind {
            ItemKind::Bomb => {
                self.state.combo = 0;
                self.events.push(GameEvent::BombHit { id });
                self.game_over(true);
            }
            ItemKind::Computer => {
                self.events.push(GameEvent::Caught { id, kind });
                self.request_navigation(NavigationReason::ComputerCaught);
            }
            _ => {
                self.state.score += 1;
                self.state.combo += 1;
                self.state.max_combo = self.state.max_combo.max(self.state.combo);
                self.events.push(GameEvent::Caught { id, kind });
            }
        }
    }

    /// Force the session to end
    pub fn game_over(&mut self, by_bomb: bool) {
        match self.state.phase {
            GamePhase::Idle | GamePhase::GameOver => {
                log::trace!("game_over ignored in {:?}", self.state.phase);
            }
            GamePhase::Countdown | GamePhase::Playing => {
                self.state.game_over_by_bomb = by_bomb;
                self.set_phase(GamePhase::GameOver);
                self.on_game_over(by_bomb);
            }
        }
    }

    /// Core-side basket move, `Playing` only, clamped to the spawn lane
    pub fn move_player(&mut self, x: f32) {
        if self.state.phase != GamePhase::Playing || !x.is_finite() {
            return;
        }
        self.state.player.x = x.clamp(PLAYER_MIN_X, PLAYER_MAX_X);
    }

    /// Input-driven basket position (pointer fraction)
    pub fn set_basket_x(&mut self, x: f32) {
        if !self.state.phase.is_animated() || !x.is_finite() {
            return;
        }
        self.state.player.x = crate::clamp01(x);
    }

    /// Keyboard step; the sign of `direction` picks the side
    pub fn nudge_basket(&mut self, direction: f32) {
        if direction == 0.0 || direction.is_nan() {
            return;
        }
        let x = self.state.player.x + direction.signum() * BASKET_KEY_STEP;
        self.set_basket_x(x);
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.toggle(Setting::Sound)
    }

    pub fn toggle_animations(&mut self) -> bool {
        self.toggle(Setting::Animations)
    }

    pub fn toggle_contrast(&mut self) -> bool {
        self.toggle(Setting::Contrast)
    }

    /// Set a preference, toggling only if it differs
    pub fn set_preference(&mut self, setting: Setting, value: bool) {
        if self.state.preferences.get(setting) != value {
            self.toggle(setting);
        }
    }

    /// Add a straight-falling entity; returns its id
    pub fn inject(&mut self, kind: ItemKind, x: f32, y: f32) -> u32 {
        let id = self.state.next_entity_id();
        let mut entity = Entity::still(id, kind, x, y);
        entity.size = self.config.entity_size;
        self.state.entities.push(entity);
        id
    }

    /// Hand back an expired timer; returns the action if it still applies
    pub fn fire(&mut self, ticket: Ticket) -> Option<DeferredAction> {
        if !self.timers.is_current(&ticket) {
            log::debug!("stale {:?} ticket dropped", ticket.action);
            return None;
        }
        if self.state.phase != GamePhase::GameOver {
            return None;
        }
        match ticket.action {
            DeferredAction::ShowResults => {
                if self.state.results_visible {
                    return None;
                }
                self.state.results_visible = true;
                self.events.push(GameEvent::ResultsShown);
            }
            DeferredAction::AutoRedirect => {
                self.request_navigation(NavigationReason::AutoRedirect);
            }
        }
        Some(ticket.action)
    }

    /// Emit a `Navigate` event unless one was already emitted
    pub fn request_navigation(&mut self, reason: NavigationReason) -> bool {
        if self.navigated {
            log::debug!("navigation ({reason:?}) ignored, already leaving");
            return false;
        }
        self.navigated = true;
        log::info!("navigating ({reason:?}) to {}", self.config.redirect_url);
        self.events.push(GameEvent::Navigate {
            url: self.config.redirect_url.clone(),
            reason,
        });
        true
    }

    // === Internals ===

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.state.phase;
        self.state.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        log::debug!("phase {:?} -> {:?}", from, to);
    }

    fn on_game_over(&mut self, by_bomb: bool) {
        let summary = SessionSummary {
            score: self.state.score,
            duration_ms: self.state.elapsed_ms(&self.config),
            max_combo: self.state.max_combo,
        };
        self.telemetry.session_ended(summary);

        let delay = if by_bomb {
            self.config.bomb_results_delay_ms
        } else {
            0.0
        };
        self.timers.schedule(DeferredAction::ShowResults, delay);
        self.timers
            .schedule(DeferredAction::AutoRedirect, self.config.auto_redirect_ms);
    }

    fn toggle(&mut self, setting: Setting) -> bool {
        let value = self.state.preferences.toggle(setting);
        self.telemetry.setting_changed(setting, value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{RecordingTelemetry, TelemetryRecord};

    fn quiet() -> Simulation {
        let config = GameConfig {
            spawn_probability: 0.0,
            ..GameConfig::default()
        };
        Simulation::with_config(config, 1, Box::new(LogTelemetry))
    }

    fn playing() -> Simulation {
        let mut sim = quiet();
        sim.start();
        sim.advance(COUNTDOWN_MS);
        assert_eq!(sim.phase(), GamePhase::Playing);
        sim.drain_events();
        sim
    }

    #[test]
    fn test_full_session_by_time() {
        let mut sim = Simulation::new(3);
        sim.start();
        assert_eq!(sim.phase(), GamePhase::Countdown);
        sim.advance(3_000.0);
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(sim.snapshot().time_left_ms, 18_000.0);

        sim.advance(18_000.0);
        assert_eq!(sim.phase(), GamePhase::GameOver);
        assert!(!sim.snapshot().game_over_by_bomb);
    }

    #[test]
    fn test_seed_is_reported() {
        let sim = Simulation::new(42);
        assert_eq!(sim.seed(), 42);
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut sim = playing();
        sim.start();
        assert_eq!(sim.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_collect_good() {
        let mut sim = playing();
        let id = sim.inject(ItemKind::Coffee, 0.5, 0.5);
        sim.collect(id);

        let state = sim.snapshot();
        assert_eq!(state.score, 1);
        assert_eq!(state.combo, 1);
        assert_eq!(state.max_combo, 1);
        assert!(state.entity(id).is_some_and(|e| e.collected));
        assert_eq!(
            sim.drain_events(),
            vec![GameEvent::Caught {
                id,
                kind: ItemKind::Coffee
            }]
        );
    }

    #[test]
    fn test_collect_is_idempotent() {
        let mut sim = playing();
        let id = sim.inject(ItemKind::Plum, 0.5, 0.5);
        sim.collect(id);
        sim.collect(id);
        assert_eq!(sim.snapshot().score, 1);
        assert_eq!(sim.snapshot().combo, 1);
    }

    #[test]
    fn test_collect_unknown_or_out_of_phase() {
        let mut sim = quiet();
        let id = sim.inject(ItemKind::Pizza, 0.5, 0.5);
        sim.collect(id);
        assert_eq!(sim.snapshot().score, 0);

        let mut sim = playing();
        sim.collect(12_345);
        assert_eq!(sim.snapshot().score, 0);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_collect_bomb_ends_session() {
        let mut sim = playing();
        let good = sim.inject(ItemKind::Lemon, 0.3, 0.5);
        sim.collect(good);
        let bomb = sim.inject(ItemKind::Bomb, 0.5, 0.5);
        sim.collect(bomb);

        let state = sim.snapshot();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.game_over_by_bomb);
        assert!(state.entity(bomb).is_some_and(|e| e.collected));
        assert_eq!(state.combo, 0);
        assert_eq!(state.max_combo, 1);
        assert_eq!(state.score, 1);

        let scheduled = sim.take_scheduled();
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].ticket.action, DeferredAction::ShowResults);
        assert_eq!(scheduled[0].delay_ms, BOMB_RESULTS_DELAY_MS);
        // Redirect counts from the bomb, not from the results overlay
        assert_eq!(scheduled[1].ticket.action, DeferredAction::AutoRedirect);
        assert_eq!(scheduled[1].delay_ms, AUTO_REDIRECT_MS);
    }

    #[test]
    fn test_computer_redirects_without_scoring() {
        let mut sim = playing();
        let id = sim.inject(ItemKind::Computer, 0.5, 0.5);
        sim.collect(id);

        let state = sim.snapshot();
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = sim.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Navigate {
                reason: NavigationReason::ComputerCaught,
                ..
            }
        )));
    }

    #[test]
    fn test_navigation_fires_once() {
        let mut sim = playing();
        assert!(sim.request_navigation(NavigationReason::UserAction));
        assert!(!sim.request_navigation(NavigationReason::AutoRedirect));
        let navigations = sim
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Navigate { .. }))
            .count();
        assert_eq!(navigations, 1);
    }

    #[test]
    fn test_deferred_results_then_redirect() {
        let mut sim = playing();
        sim.advance(SESSION_DURATION_MS);
        let scheduled = sim.take_scheduled();
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].ticket.action, DeferredAction::ShowResults);
        assert_eq!(scheduled[0].delay_ms, 0.0);
        assert_eq!(scheduled[1].ticket.action, DeferredAction::AutoRedirect);
        assert_eq!(scheduled[1].delay_ms, AUTO_REDIRECT_MS);

        assert_eq!(sim.fire(scheduled[0].ticket), Some(DeferredAction::ShowResults));
        assert!(sim.snapshot().results_visible);
        assert!(sim.take_scheduled().is_empty());

        assert_eq!(sim.fire(scheduled[1].ticket), Some(DeferredAction::AutoRedirect));
        assert!(sim.has_navigated());
    }

    #[test]
    fn test_redirect_does_not_wait_for_results() {
        let mut sim = playing();
        let bomb = sim.inject(ItemKind::Bomb, 0.5, 0.5);
        sim.collect(bomb);
        let redirect = sim
            .take_scheduled()
            .into_iter()
            .find(|s| s.ticket.action == DeferredAction::AutoRedirect)
            .expect("redirect armed on game over");

        // Results ticket never fired
        assert!(!sim.snapshot().results_visible);
        assert_eq!(sim.fire(redirect.ticket), Some(DeferredAction::AutoRedirect));
        assert!(sim.has_navigated());
    }

    #[test]
    fn test_stale_ticket_after_reset() {
        let mut sim = playing();
        let bomb = sim.inject(ItemKind::Bomb, 0.5, 0.5);
        sim.collect(bomb);
        let scheduled = sim.take_scheduled();

        sim.reset();
        sim.start();
        sim.advance(COUNTDOWN_MS);
        sim.advance(SESSION_DURATION_MS);

        // The old ticket belongs to the previous session
        assert_eq!(sim.fire(scheduled[0].ticket), None);
        assert_eq!(sim.fire(scheduled[1].ticket), None);
        assert!(!sim.snapshot().results_visible);
        assert!(!sim.has_navigated());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sim = playing();
        let id = sim.inject(ItemKind::Pear, 0.5, 0.5);
        sim.collect(id);
        sim.set_basket_x(0.2);

        sim.reset();
        let state = sim.snapshot();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert!(state.entities.is_empty());
        assert_eq!(state.player.x, PLAYER_START_X);

        let once = state.clone();
        sim.reset();
        assert_eq!(*sim.snapshot(), once);
    }

    #[test]
    fn test_game_over_idempotent_and_ignored_in_idle() {
        let mut sim = quiet();
        sim.game_over(true);
        assert_eq!(sim.phase(), GamePhase::Idle);

        let mut sim = playing();
        sim.game_over(false);
        sim.game_over(true);
        assert!(!sim.snapshot().game_over_by_bomb);
        assert_eq!(sim.take_scheduled().len(), 2);
    }

    #[test]
    fn test_basket_commands() {
        let mut sim = quiet();
        sim.set_basket_x(0.2);
        assert_eq!(sim.snapshot().player.x, PLAYER_START_X);

        sim.start();
        sim.set_basket_x(1.4);
        assert_eq!(sim.snapshot().player.x, 1.0);
        sim.nudge_basket(-1.0);
        assert!((sim.snapshot().player.x - 0.95).abs() < 1e-6);

        // move_player only acts while playing
        sim.move_player(0.0);
        assert!((sim.snapshot().player.x - 0.95).abs() < 1e-6);
        sim.advance(COUNTDOWN_MS);
        sim.move_player(0.0);
        assert_eq!(sim.snapshot().player.x, PLAYER_MIN_X);
        sim.move_player(2.0);
        assert_eq!(sim.snapshot().player.x, PLAYER_MAX_X);
    }

    #[test]
    fn test_reduced_motion_freezes_entities() {
        let mut sim = playing();
        sim.toggle_animations();
        let id = sim.inject(ItemKind::Flower, 0.4, 0.1);
        if let Some(e) = sim.state.entity_mut(id) {
            e.oscillation_speed = 0.004;
            e.oscillation_amplitude = 0.03;
            e.rotation_speed = 0.003;
        }
        sim.advance(1_000.0);

        let e = sim.snapshot().entity(id).cloned();
        let e = e.expect("entity still on screen");
        assert_eq!(e.x, e.base_x);
        assert_eq!(e.rotation, 0.0);
    }

    #[test]
    fn test_telemetry_receives_toggles_and_sessions() {
        let recorder = RecordingTelemetry::new();
        let config = GameConfig {
            spawn_probability: 0.0,
            ..GameConfig::default()
        };
        let mut sim = Simulation::with_config(config, 9, Box::new(recorder.clone()));

        assert!(!sim.toggle_sound());
        sim.set_preference(Setting::Contrast, true);
        sim.set_preference(Setting::Contrast, true);
        sim.start();
        sim.advance(COUNTDOWN_MS);
        let id = sim.inject(ItemKind::Champagne, 0.5, 0.5);
        sim.collect(id);
        sim.advance(SESSION_DURATION_MS);

        assert_eq!(
            recorder.records(),
            vec![
                TelemetryRecord::SettingChanged {
                    setting: Setting::Sound,
                    value: false
                },
                TelemetryRecord::SettingChanged {
                    setting: Setting::Contrast,
                    value: true
                },
                TelemetryRecord::SessionStarted,
                TelemetryRecord::SessionEnded(SessionSummary {
                    score: 1,
                    duration_ms: SESSION_DURATION_MS,
                    max_combo: 1,
                }),
            ]
        );
    }

    #[test]
    fn test_phase_events() {
        let mut sim = quiet();
        sim.start();
        sim.advance(COUNTDOWN_MS);
        sim.advance(SESSION_DURATION_MS);
        sim.reset();
        let phases: Vec<_> = sim
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                GamePhase::Countdown,
                GamePhase::Playing,
                GamePhase::GameOver,
                GamePhase::Idle
            ]
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let sim = playing();
        let json = sim.snapshot_json().unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}
