//! HUD and overlay text
//!
//! Pure view model built from a snapshot; the host copies it into DOM
//! elements and the scene builder reads the timer tone from it.

use serde::Serialize;

use crate::sim::{GamePhase, GameState};

/// Timer color band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerTone {
    /// More than 10 s left
    Normal,
    /// 10 s or less
    Warning,
    /// 5 s or less, pulses
    Critical,
}

impl TimerTone {
    pub fn for_seconds(seconds: u32) -> Self {
        if seconds <= 5 {
            TimerTone::Critical
        } else if seconds <= 10 {
            TimerTone::Warning
        } else {
            TimerTone::Normal
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TimerTone::Normal => "tone-normal",
            TimerTone::Warning => "tone-warning",
            TimerTone::Critical => "tone-critical",
        }
    }
}

/// Which overlay sits on top of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    Home,
    Countdown,
    /// Canvas only
    None,
    Results,
}

/// Everything the DOM layer shows, derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudModel {
    pub overlay: Overlay,
    pub score_text: String,
    /// Whole seconds left, rounded up
    pub seconds_left: u32,
    pub timer_text: String,
    pub timer_tone: TimerTone,
    /// 3, 2, 1
    pub countdown_number: u32,
    pub results_title: &'static str,
    pub results_subtitle: Option<&'static str>,
    /// Only set when a combo happened
    pub best_combo_text: Option<String>,
    pub high_contrast: bool,
}

/// `ceil(ms / 1000)`, never negative
pub fn whole_seconds(ms: f32) -> u32 {
    (ms.max(0.0) / 1000.0).ceil() as u32
}

impl HudModel {
    pub fn from_state(state: &GameState) -> Self {
        let seconds_left = whole_seconds(state.time_left_ms);
        let overlay = match state.phase {
            GamePhase::Idle => Overlay::Home,
            GamePhase::Countdown => Overlay::Countdown,
            GamePhase::Playing => Overlay::None,
            // Canvas stays visible until the results delay runs out
            GamePhase::GameOver if state.results_visible => Overlay::Results,
            GamePhase::GameOver => Overlay::None,
        };

        let (results_title, results_subtitle) = if state.game_over_by_bomb {
            ("GAME OVER", Some("💥 Bombe touchée !"))
        } else {
            ("Jeu terminé !", None)
        };

        Self {
            overlay,
            score_text: state.score.to_string(),
            seconds_left,
            timer_text: format!("{seconds_left}s"),
            timer_tone: TimerTone::for_seconds(seconds_left),
            countdown_number: whole_seconds(state.countdown_ms),
            results_title,
            results_subtitle,
            best_combo_text: (state.max_combo > 0)
                .then(|| format!("Meilleur combo : {}", state.max_combo)),
            high_contrast: state.preferences.high_contrast,
        }
    }
}
