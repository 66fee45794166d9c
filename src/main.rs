//! Catch the Stuff entry point
//!
//! On the web: wires DOM input, timers, assets and the WebGPU renderer around
//! the simulation. Natively: runs a scripted headless session and prints a
//! JSON summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlElement, HtmlImageElement, KeyboardEvent, PointerEvent,
    };

    use catch_the_stuff::Setting;
    use catch_the_stuff::assets::{AssetId, AssetRegistry};
    use catch_the_stuff::audio::AudioManager;
    use catch_the_stuff::driver::{FrameDriver, FrameOutcome, PendingTimers};
    use catch_the_stuff::layout::{Rect, Viewport};
    use catch_the_stuff::renderer::{RenderState, SceneInput, build_scene};
    use catch_the_stuff::sim::{GameEvent, GamePhase, NavigationReason, Scheduled, Simulation};
    use catch_the_stuff::ui::{HudModel, Overlay};

    /// Game instance holding all state
    struct Game {
        sim: Simulation,
        driver: FrameDriver,
        render_state: Option<RenderState>,
        assets: AssetRegistry,
        audio: AudioManager,
        /// Pending `setTimeout` handles, cleared on reset
        timers: PendingTimers,
        loop_running: bool,
    }

    impl Game {
        fn new(seed: u64, width: f32, height: f32) -> Self {
            Self {
                sim: Simulation::new(seed),
                driver: FrameDriver::new(Viewport::new(width, height)),
                render_state: None,
                assets: AssetRegistry::new(),
                audio: AudioManager::new(),
                timers: PendingTimers::default(),
                loop_running: false,
            }
        }

        fn frame(&mut self, now: f64) -> FrameOutcome {
            self.driver.frame(&mut self.sim, now)
        }

        fn react(&mut self, now: f64) -> FrameOutcome {
            self.driver.react(&mut self.sim, now)
        }

        /// Render the current frame
        fn render(&mut self, now: f64) {
            let Some(ref mut render_state) = self.render_state else {
                return;
            };
            let basket = self.driver.basket(&self.sim, now);
            let scene = build_scene(&SceneInput {
                state: self.sim.snapshot(),
                viewport: &self.driver.viewport,
                basket,
                mood: self.driver.animator.mood(now),
                assets: &self.assets,
                now_ms: now,
            });

            match render_state.render(&scene) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }

            let Some(document) = document() else { return };
            place_label(&document, scene.basket_label.as_ref());
            place_panel(&document, "hud-score", scene.score_panel);
            place_panel(&document, "hud-timer", scene.timer_panel);
        }

        /// Update HUD and overlays in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let hud = HudModel::from_state(self.sim.snapshot());

            set_hidden(&document, "home", hud.overlay != Overlay::Home);
            set_hidden(&document, "countdown", hud.overlay != Overlay::Countdown);
            set_hidden(&document, "results", hud.overlay != Overlay::Results);
            let in_play = matches!(
                self.sim.phase(),
                GamePhase::Playing | GamePhase::GameOver
            ) && hud.overlay != Overlay::Results;
            set_hidden(&document, "hud", !in_play);

            set_text(&document, "hud-score-value", &hud.score_text);
            set_text(&document, "hud-timer-value", &hud.timer_text);
            if let Some(el) = document.get_element_by_id("hud-timer-value") {
                let _ = el.set_attribute("class", &format!("hud-value {}", hud.timer_tone.css_class()));
            }
            set_text(&document, "countdown-number", &hud.countdown_number.to_string());

            if hud.overlay == Overlay::Results {
                set_text(&document, "results-title", hud.results_title);
                set_text(&document, "results-subtitle", hud.results_subtitle.unwrap_or(""));
                set_hidden(&document, "results-subtitle", hud.results_subtitle.is_none());
                set_text(&document, "results-score", &hud.score_text);
                set_text(
                    &document,
                    "results-combo",
                    hud.best_combo_text.as_deref().unwrap_or(""),
                );
                set_hidden(&document, "results-combo", hud.best_combo_text.is_none());
            }

            if let Some(body) = document.body() {
                let class = if hud.high_contrast { "high-contrast" } else { "" };
                let _ = body.set_attribute("class", class);
            }

            let prefs = self.sim.snapshot().preferences;
            set_pressed(&document, "toggle-sound", prefs.sound_enabled);
            set_pressed(&document, "toggle-animations", prefs.reduce_animations);
            set_pressed(&document, "toggle-contrast", prefs.high_contrast);
        }

        fn clear_timers(&mut self) {
            let Some(window) = web_sys::window() else { return };
            for handle in self.timers.drain() {
                window.clear_timeout_with_handle(handle);
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_pressed(document: &Document, id: &str, pressed: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
        }
    }

    fn style_of(document: &Document, id: &str) -> Option<web_sys::CssStyleDeclaration> {
        let el: HtmlElement = document.get_element_by_id(id)?.dyn_into().ok()?;
        Some(el.style())
    }

    /// Fallback "PANIER" text over the basket
    fn place_label(document: &Document, label: Option<&catch_the_stuff::renderer::Label>) {
        set_hidden(document, "basket-label", label.is_none());
        let (Some(label), Some(style)) = (label, style_of(document, "basket-label")) else {
            return;
        };
        let _ = style.set_property("left", &format!("{}px", label.center.x));
        let _ = style.set_property("top", &format!("{}px", label.center.y));
        let _ = style.set_property("font-size", &format!("{}px", label.font_px));
        let _ = style.set_property(
            "transform",
            &format!("translate(-50%, -50%) rotate({}rad)", label.rotation),
        );
    }

    fn place_panel(document: &Document, id: &str, rect: Option<Rect>) {
        let (Some(rect), Some(style)) = (rect, style_of(document, id)) else {
            return;
        };
        let _ = style.set_property("left", &format!("{}px", rect.min.x));
        let _ = style.set_property("top", &format!("{}px", rect.min.y));
        let _ = style.set_property("width", &format!("{}px", rect.size.x));
        let _ = style.set_property("height", &format!("{}px", rect.size.y));
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        log::info!("Catch the Stuff starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let (client_w, client_h, width, height) = size_canvas(&window, &canvas);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, client_w, client_h)));
        log::info!(
            "Game initialized with seed: {} ({})",
            game.borrow().sim.seed(),
            game.borrow().driver.viewport.class.as_str()
        );

        if let Ok(Some(query)) = window.match_media("(prefers-reduced-motion: reduce)") {
            if query.matches() {
                game.borrow_mut()
                    .sim
                    .set_preference(Setting::Animations, true);
            }
        }

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Renderer unavailable: {e}"),
                        }
                    }
                    Err(e) => log::error!("No GPU adapter: {e}"),
                }
            }
            Err(e) => log::error!("Failed to create surface: {e}"),
        }

        load_images(game.clone());
        load_catch_clip(game.clone());

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_resize(canvas, game.clone());

        {
            let mut g = game.borrow_mut();
            g.update_hud();
            g.render(now());
        }

        log::info!("Catch the Stuff running!");
        Ok(())
    }

    /// Match the backing store to CSS size times DPR; returns CSS and device sizes
    fn size_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (f32, f32, u32, u32) {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (client_w as f32, client_h as f32, width, height)
    }

    fn load_images(game: Rc<RefCell<Game>>) {
        for id in AssetId::all().filter(AssetId::is_image) {
            let Some(path) = id.path() else { continue };
            let image = match HtmlImageElement::new() {
                Ok(image) => image,
                Err(e) => {
                    game.borrow_mut()
                        .assets
                        .mark_failed(id, format!("{:?}", e));
                    continue;
                }
            };

            {
                let game = game.clone();
                let img = image.clone();
                let closure = Closure::once(move |_event: web_sys::Event| {
                    let mut g = game.borrow_mut();
                    let g = &mut *g;
                    match g.render_state.as_mut() {
                        Some(render_state) => {
                            render_state.upload_image(id, &img);
                            if render_state.has_texture(id) {
                                g.assets.mark_ready(id);
                            } else {
                                g.assets.mark_failed(id, "upload failed");
                            }
                        }
                        None => g.assets.mark_failed(id, "no renderer"),
                    }
                });
                let _ = image.add_event_listener_with_callback("load", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let game = game.clone();
                let closure = Closure::once(move |_event: web_sys::Event| {
                    game.borrow_mut().assets.mark_failed(id, "image failed to load");
                });
                let _ = image.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            image.set_src(&path);
        }
    }

    fn load_catch_clip(game: Rc<RefCell<Game>>) {
        let clip = game.borrow_mut().audio.load_catch_clip();
        let Some(clip) = clip else {
            game.borrow_mut()
                .assets
                .mark_failed(AssetId::CatchSound, "clip unavailable");
            return;
        };
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().assets.mark_ready(AssetId::CatchSound);
            });
            let _ = clip.add_event_listener_with_callback("canplaythrough", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut()
                    .assets
                    .mark_failed(AssetId::CatchSound, "clip failed to load");
            });
            let _ = clip.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Apply everything a frame or command produced
    fn handle_outcome(game: &Rc<RefCell<Game>>, outcome: FrameOutcome) {
        {
            let g = game.borrow();
            for cue in &outcome.sounds {
                g.audio.play(*cue, &g.assets);
            }
        }

        for scheduled in &outcome.scheduled {
            arm_timer(game, *scheduled);
        }

        for event in &outcome.events {
            if let GameEvent::Navigate { url, reason } = event {
                log::info!("Leaving for {} ({:?})", url, reason);
                if let Some(window) = web_sys::window() {
                    if let Err(e) = window.location().set_href(url) {
                        log::error!("Navigation failed: {:?}", e);
                    }
                }
            }
        }

        let start_loop = {
            let mut g = game.borrow_mut();
            g.update_hud();
            if !g.loop_running {
                g.render(now());
            }
            !g.loop_running && g.driver.keep_running(&g.sim)
        };
        if start_loop {
            {
                let mut g = game.borrow_mut();
                g.loop_running = true;
                g.driver.restart_clock();
            }
            request_animation_frame(game.clone());
        }
    }

    fn arm_timer(game: &Rc<RefCell<Game>>, scheduled: Scheduled) {
        let Some(window) = web_sys::window() else { return };
        let fired = game.clone();
        let handle = Rc::new(Cell::new(0));
        let own_handle = handle.clone();
        let closure = Closure::once(move || {
            let outcome = {
                let mut g = fired.borrow_mut();
                g.timers.fired(own_handle.get());
                g.sim.fire(scheduled.ticket);
                g.react(now())
            };
            handle_outcome(&fired, outcome);
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            scheduled.delay_ms.round() as i32,
        ) {
            Ok(id) => {
                handle.set(id);
                game.borrow_mut().timers.armed(id);
            }
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
        closure.forget();
    }

    /// Run `command` against the game, then apply its outcome
    fn command(game: &Rc<RefCell<Game>>, apply: impl FnOnce(&mut Game)) {
        let outcome = {
            let mut g = game.borrow_mut();
            apply(&mut *g);
            g.react(now())
        };
        handle_outcome(game, outcome);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Basket follows the pointer
        for name in ["pointermove", "pointerdown"] {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let rect = target.get_bounding_client_rect();
                let mut g = game.borrow_mut();
                let g = &mut *g;
                g.driver.pointer(
                    &mut g.sim,
                    event.client_x() as f32,
                    rect.left() as f32,
                    rect.width() as f32,
                );
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Arrow keys / A-D nudge the basket
        {
            let Some(window) = web_sys::window() else { return };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                if g.driver.key(&mut g.sim, &event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, game: &Rc<RefCell<Game>>, action: fn(&mut Game)) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing #{id}");
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            command(&game, action);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click("start-btn", &game, |g| {
            g.audio.resume();
            g.sim.start();
        });
        on_click("toggle-sound", &game, |g| {
            g.sim.toggle_sound();
        });
        on_click("toggle-animations", &game, |g| {
            g.sim.toggle_animations();
        });
        on_click("toggle-contrast", &game, |g| {
            g.sim.toggle_contrast();
        });
        on_click("visit-btn", &game, |g| {
            g.sim.request_navigation(NavigationReason::UserAction);
        });
        on_click("replay-btn", &game, |g| {
            g.clear_timers();
            g.sim.reset();
        });
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let (client_w, client_h, width, height) = size_canvas(&window, &canvas);
            let mut g = game.borrow_mut();
            if g.driver.resize(client_w, client_h) {
                log::info!("Device class now {}", g.driver.viewport.class.as_str());
            }
            if let Some(render_state) = g.render_state.as_mut() {
                render_state.resize(width, height);
            }
            if !g.loop_running {
                g.render(now());
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let outcome = {
            let mut g = game.borrow_mut();
            let outcome = g.frame(time);
            g.render(time);
            g.loop_running = g.driver.keep_running(&g.sim);
            outcome
        };
        let keep_running = game.borrow().loop_running;

        handle_outcome(&game, outcome);

        if keep_running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use serde::Serialize;

    use catch_the_stuff::GameConfig;
    use catch_the_stuff::driver::FrameDriver;
    use catch_the_stuff::layout::Viewport;
    use catch_the_stuff::sim::{GameEvent, GamePhase, Scheduled, Simulation};
    use catch_the_stuff::telemetry::{RecordingTelemetry, TelemetryRecord};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Play one scripted session without a browser
    #[derive(Parser, Debug)]
    #[command(version, about)]
    pub struct Args {
        /// RNG seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Frames to simulate at 60 Hz
        #[arg(long, default_value_t = 1800)]
        frames: u32,
        /// JSON file overriding tuning values
        #[arg(long)]
        config: Option<PathBuf>,
        /// Viewport width in CSS pixels
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        /// Viewport height in CSS pixels
        #[arg(long, default_value_t = 720.0)]
        height: f32,
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        frames: u32,
        phase: GamePhase,
        score: u32,
        max_combo: u32,
        game_over_by_bomb: bool,
        navigated: bool,
        telemetry: Vec<TelemetryRecord>,
    }

    /// Aim the basket under the lowest good item
    fn steer(sim: &mut Simulation, viewport: &Viewport) {
        let target = sim
            .snapshot()
            .live_entities()
            .filter(|e| e.kind.is_good() && !e.kind.is_redirect())
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .map(|e| e.x);
        let Some(item_x) = target else { return };

        let basket_w = viewport.basket_size().x;
        let travel = viewport.width - basket_w;
        if travel > 0.0 {
            sim.set_basket_x((item_x * viewport.width - basket_w / 2.0) / travel);
        }
    }

    pub fn run(args: Args) -> Result<()> {
        let config = match &args.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                GameConfig::from_json(&json)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => GameConfig::default(),
        };

        let seed = args.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        });
        log::info!("Headless session, seed {seed}");

        let telemetry = RecordingTelemetry::new();
        let mut sim = Simulation::with_config(config, seed, Box::new(telemetry.clone()));
        let mut driver = FrameDriver::new(Viewport::new(args.width, args.height));
        let mut timers: Vec<(f64, Scheduled)> = Vec::new();

        sim.start();
        let mut frames = 0;
        'session: for frame in 0..args.frames {
            let now = frame as f64 * FRAME_MS;
            frames = frame + 1;

            let (due, pending): (Vec<_>, Vec<_>) =
                timers.drain(..).partition(|(at, _)| *at <= now);
            timers = pending;
            for (_, scheduled) in due {
                sim.fire(scheduled.ticket);
            }

            steer(&mut sim, &driver.viewport);
            let outcome = driver.frame(&mut sim, now);

            for scheduled in outcome.scheduled {
                timers.push((now + scheduled.delay_ms as f64, scheduled));
            }
            for event in &outcome.events {
                match event {
                    GameEvent::Navigate { url, reason } => {
                        log::info!("Would navigate to {url} ({reason:?})");
                        break 'session;
                    }
                    GameEvent::PhaseChanged { from, to } => {
                        log::debug!("frame {frame}: {from:?} -> {to:?}");
                    }
                    _ => {}
                }
            }
        }

        let state = sim.snapshot();
        let summary = Summary {
            seed: sim.seed(),
            frames,
            phase: state.phase,
            score: state.score,
            max_combo: state.max_combo,
            game_over_by_bomb: state.game_over_by_bomb,
            navigated: sim.has_navigated(),
            telemetry: telemetry.records(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    headless::run(headless::Args::parse())
}
