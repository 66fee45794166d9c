//! Player preferences
//!
//! Session-only: preferences live in memory and reset with the page.

use serde::{Deserialize, Serialize};

/// Which preference a toggle touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Setting {
    Sound,
    Animations,
    Contrast,
}

impl Setting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Sound => "sound",
            Setting::Animations => "animations",
            Setting::Contrast => "contrast",
        }
    }
}

/// Runtime toggles read by the core and the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Play catch/bomb sounds
    pub sound_enabled: bool,
    /// Freeze drift and spin, skip basket animation and bomb orbit
    pub reduce_animations: bool,
    /// Black background
    pub high_contrast: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            reduce_animations: false,
            high_contrast: false,
        }
    }
}

impl Preferences {
    /// Flip one preference and return its new value
    pub fn toggle(&mut self, setting: Setting) -> bool {
        let slot = match setting {
            Setting::Sound => &mut self.sound_enabled,
            Setting::Animations => &mut self.reduce_animations,
            Setting::Contrast => &mut self.high_contrast,
        };
        *slot = !*slot;
        *slot
    }

    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::Sound => self.sound_enabled,
            Setting::Animations => self.reduce_animations,
            Setting::Contrast => self.high_contrast,
        }
    }
}
