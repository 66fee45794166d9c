//! Audio using the Web Audio API and an `<audio>` clip
//!
//! The catch sound is a recorded clip; the bomb sound is synthesized. Any
//! playback failure is logged and otherwise ignored.

use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::assets::{AssetId, AssetRegistry, CATCH_VOLUME};
use crate::driver::SoundCue;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    catch_clip: Option<HtmlAudioElement>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - bomb sound disabled");
        }
        Self {
            ctx,
            catch_clip: None,
        }
    }

    /// Start fetching the catch clip; the caller wires load/error listeners
    pub fn load_catch_clip(&mut self) -> Option<HtmlAudioElement> {
        let path = AssetId::CatchSound.path()?;
        let clip = match HtmlAudioElement::new_with_src(&path) {
            Ok(clip) => clip,
            Err(e) => {
                log::warn!("Cannot create catch clip: {:?}", e);
                return None;
            }
        };
        clip.set_preload("auto");
        clip.set_volume(CATCH_VOLUME);
        self.catch_clip = Some(clip.clone());
        Some(clip)
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn play(&self, cue: SoundCue, assets: &AssetRegistry) {
        match cue {
            SoundCue::Catch => {
                if assets.is_ready(AssetId::CatchSound) {
                    self.play_catch();
                }
            }
            SoundCue::Bomb => self.play_bomb(),
        }
    }

    fn play_catch(&self) {
        let Some(clip) = &self.catch_clip else { return };
        clip.set_current_time(0.0);
        match clip.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("Catch sound failed: {:?}", e);
                }
            }),
            Err(e) => log::warn!("Catch sound failed: {:?}", e),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Bomb - short descending thud, 200 -> 100 Hz
    fn play_bomb(&self) {
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sine) else {
            log::warn!("Bomb sound unavailable");
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(100.0, t + 0.2)
            .ok();
        gain.gain().set_value_at_time(0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }
}
