//! Per-frame loop: advance, hit-test, collect
//!
//! The driver owns everything that depends on wall-clock frame time and
//! screen pixels. The host calls [`FrameDriver::frame`] once per display
//! refresh and reacts to the returned [`FrameOutcome`].

use serde::Serialize;

use crate::consts::MAX_FRAME_DT_MS;
use crate::layout::{BasketPose, BasketRect, Viewport};
use crate::sim::{GameEvent, GamePhase, Scheduled, Simulation};

/// Sound the host should play this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    Catch,
    Bomb,
}

/// Which basket animation is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BasketMood {
    Rest,
    Catch,
    Bomb,
}

const CATCH_POSE: BasketPose = BasketPose {
    scale: 1.4,
    rotation: 0.1,
    bounce: 0.3,
};
const CATCH_MS: f64 = 300.0;

const BOMB_SQUASH_POSE: BasketPose = BasketPose {
    scale: 0.9,
    rotation: -0.2,
    bounce: 0.1,
};
const BOMB_SQUASH_MS: f64 = 150.0;
const BOMB_REBOUND_POSE: BasketPose = BasketPose {
    scale: 1.1,
    rotation: 0.1,
    bounce: 0.2,
};
const BOMB_REBOUND_MS: f64 = 100.0;

/// Catch/bomb basket animation keyed on frame time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketAnimator {
    mood: BasketMood,
    started_at: f64,
}

impl Default for BasketAnimator {
    fn default() -> Self {
        Self {
            mood: BasketMood::Rest,
            started_at: 0.0,
        }
    }
}

impl BasketAnimator {
    pub fn trigger(&mut self, mood: BasketMood, now_ms: f64) {
        self.mood = mood;
        self.started_at = now_ms;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Mood at `now_ms`; falls back to rest once the animation is over
    pub fn mood(&self, now_ms: f64) -> BasketMood {
        let t = now_ms - self.started_at;
        match self.mood {
            BasketMood::Catch if t < CATCH_MS => BasketMood::Catch,
            BasketMood::Bomb if t < BOMB_SQUASH_MS + BOMB_REBOUND_MS => BasketMood::Bomb,
            _ => BasketMood::Rest,
        }
    }

    pub fn pose(&self, now_ms: f64) -> BasketPose {
        let t = now_ms - self.started_at;
        match self.mood(now_ms) {
            BasketMood::Rest => BasketPose::REST,
            BasketMood::Catch => CATCH_POSE,
            BasketMood::Bomb if t < BOMB_SQUASH_MS => BOMB_SQUASH_POSE,
            BasketMood::Bomb => BOMB_REBOUND_POSE,
        }
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameOutcome {
    /// Delta fed to the simulation (ms)
    pub dt_ms: f32,
    /// Entity ids handed to `collect`
    pub collected: Vec<u32>,
    pub events: Vec<GameEvent>,
    pub sounds: Vec<SoundCue>,
    /// Deferred actions to arm
    pub scheduled: Vec<Scheduled>,
}

impl FrameOutcome {
    pub fn phase_changed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, GameEvent::PhaseChanged { .. }))
    }
}

/// Frame clock, viewport and basket animation
#[derive(Debug, Clone)]
pub struct FrameDriver {
    pub viewport: Viewport,
    pub animator: BasketAnimator,
    last_frame: Option<f64>,
}

impl FrameDriver {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            animator: BasketAnimator::default(),
            last_frame: None,
        }
    }

    /// Forget the last timestamp so a restarted loop does not see a huge delta
    pub fn restart_clock(&mut self) {
        self.last_frame = None;
    }

    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.viewport.resize(width, height)
    }

    /// Basket as currently drawn
    pub fn basket(&self, sim: &Simulation, now_ms: f64) -> BasketRect {
        let pose = if sim.snapshot().preferences.reduce_animations {
            BasketPose::REST
        } else {
            self.animator.pose(now_ms)
        };
        self.viewport.basket_rect(sim.snapshot().player.x, pose)
    }

    /// Whether the host should request another frame
    pub fn keep_running(&self, sim: &Simulation) -> bool {
        sim.phase().is_animated()
    }

    /// One display refresh: advance, hit-test, collect, then react
    pub fn frame(&mut self, sim: &mut Simulation, now_ms: f64) -> FrameOutcome {
        let dt = match self.last_frame {
            Some(last) => ((now_ms - last) as f32).clamp(0.0, MAX_FRAME_DT_MS),
            None => 0.0,
        };
        self.last_frame = Some(now_ms);

        sim.advance(dt);

        let mut collected = Vec::new();
        if sim.phase() == GamePhase::Playing {
            let basket = self.basket(sim, now_ms);
            let hits: Vec<u32> = sim
                .snapshot()
                .live_entities()
                .filter(|e| self.viewport.hit_test(e, &basket).hit)
                .map(|e| e.id)
                .collect();
            for id in hits {
                // A bomb ends the session; later hits in the same frame don't count
                if sim.phase() != GamePhase::Playing {
                    break;
                }
                sim.collect(id);
                collected.push(id);
            }
        }

        let mut outcome = self.react(sim, now_ms);
        outcome.dt_ms = dt;
        outcome.collected = collected;
        outcome
    }

    /// Drain events and timers produced by commands, outside or inside a frame
    pub fn react(&mut self, sim: &mut Simulation, now_ms: f64) -> FrameOutcome {
        let prefs = sim.snapshot().preferences;
        let events = sim.drain_events();
        let mut sounds = Vec::new();

        for event in &events {
            let (mood, cue) = match event {
                GameEvent::Caught { .. } => (BasketMood::Catch, SoundCue::Catch),
                GameEvent::BombHit { .. } => (BasketMood::Bomb, SoundCue::Bomb),
                GameEvent::PhaseChanged {
                    to: GamePhase::Idle | GamePhase::Countdown,
                    ..
                } => {
                    self.animator.clear();
                    continue;
                }
                _ => continue,
            };
            if !prefs.reduce_animations {
                self.animator.trigger(mood, now_ms);
            }
            if prefs.sound_enabled {
                sounds.push(cue);
            }
        }

        FrameOutcome {
            events,
            sounds,
            scheduled: sim.take_scheduled(),
            ..Default::default()
        }
    }

    /// Pointer position as a fraction of the canvas width
    pub fn pointer(&self, sim: &mut Simulation, client_x: f32, left: f32, width: f32) {
        if let Some(x) = pointer_fraction(client_x, left, width) {
            sim.set_basket_x(x);
        }
    }

    /// Returns true if the key moved the basket
    pub fn key(&self, sim: &mut Simulation, key: &str) -> bool {
        let Some(direction) = key_direction(key) else {
            return false;
        };
        if !sim.phase().is_animated() {
            return false;
        }
        sim.nudge_basket(direction);
        true
    }
}

/// Host timer handles still waiting to fire
#[derive(Debug, Clone, Default)]
pub struct PendingTimers {
    handles: Vec<i32>,
}

impl PendingTimers {
    pub fn armed(&mut self, handle: i32) {
        self.handles.push(handle);
    }

    /// Forget a timer that has run
    pub fn fired(&mut self, handle: i32) {
        self.handles.retain(|&h| h != handle);
    }

    /// Handles to cancel; leaves the set empty
    pub fn drain(&mut self) -> Vec<i32> {
        std::mem::take(&mut self.handles)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Map a key name to a basket direction
pub fn key_direction(key: &str) -> Option<f32> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(-1.0),
        "ArrowRight" | "d" | "D" => Some(1.0),
        _ => None,
    }
}

/// Clamped fraction of the canvas width, `None` for a degenerate canvas
pub fn pointer_fraction(client_x: f32, left: f32, width: f32) -> Option<f32> {
    if !(width > 0.0) {
        return None;
    }
    Some(crate::clamp01((client_x - left) / width))
}
