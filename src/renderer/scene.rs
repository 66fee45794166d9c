//! Frame composition
//!
//! Turns a snapshot into draw batches without touching the GPU, so layout and
//! fallback rules can be tested natively. Text (HUD values, the fallback
//! basket label) is left to the DOM; the scene only says where it goes.

use glam::Vec2;

use super::shapes;
use super::vertex::{SpriteVertex, colors};
use crate::assets::{AssetId, AssetRegistry};
use crate::driver::BasketMood;
use crate::layout::{BasketRect, Rect, Viewport};
use crate::sim::{Entity, GamePhase, GameState, ItemKind};
use crate::ui::{TimerTone, whole_seconds};

/// Orbit dots around a bomb
pub const BOMB_PARTICLES: usize = 8;
const CIRCLE_SEGMENTS: u32 = 32;
const OUTLINE_WIDTH: f32 = 3.0;

/// Vertices sharing one texture (`None` = flat color)
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub texture: Option<AssetId>,
    pub vertices: Vec<SpriteVertex>,
}

/// Text the host lays over the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: &'static str,
    pub center: Vec2,
    pub font_px: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Logical canvas size the vertices are expressed in
    pub size: Vec2,
    pub clear: [f32; 4],
    pub batches: Vec<DrawBatch>,
    /// Only when the basket image is missing
    pub basket_label: Option<Label>,
    /// HUD panel rects for positioning DOM text
    pub score_panel: Option<Rect>,
    pub timer_panel: Option<Rect>,
}

impl Scene {
    fn new(size: Vec2, clear: [f32; 4]) -> Self {
        Self {
            size,
            clear,
            batches: Vec::new(),
            basket_label: None,
            score_panel: None,
            timer_panel: None,
        }
    }

    /// Append vertices, merging with the previous batch when the texture matches
    fn push(&mut self, texture: Option<AssetId>, vertices: Vec<SpriteVertex>) {
        match self.batches.last_mut() {
            Some(last) if last.texture == texture => last.vertices.extend(vertices),
            _ => self.batches.push(DrawBatch { texture, vertices }),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }
}

/// Everything a frame needs
pub struct SceneInput<'a> {
    pub state: &'a GameState,
    pub viewport: &'a Viewport,
    pub basket: BasketRect,
    pub mood: BasketMood,
    pub assets: &'a AssetRegistry,
    /// Wall clock for blink and pulse (ms)
    pub now_ms: f64,
}

/// `|sin(t / 200)| * 0.5 + 0.5`
pub fn bomb_blink(now_ms: f64) -> f32 {
    ((now_ms / 200.0).sin().abs() * 0.5 + 0.5) as f32
}

fn timer_color(tone: TimerTone) -> [f32; 4] {
    match tone {
        TimerTone::Normal => colors::BRAND_ORANGE,
        TimerTone::Warning => colors::TIMER_WARNING,
        TimerTone::Critical => colors::TIMER_CRITICAL,
    }
}

fn with_alpha(mut c: [f32; 4], alpha: f32) -> [f32; 4] {
    c[3] = alpha;
    c
}

pub fn build_scene(input: &SceneInput<'_>) -> Scene {
    let state = input.state;
    let high_contrast = state.preferences.high_contrast;
    let clear = if high_contrast {
        colors::HIGH_CONTRAST_BACKGROUND
    } else {
        colors::BACKGROUND_TOP
    };
    let mut scene = Scene::new(input.viewport.size(), clear);

    if !high_contrast {
        background(&mut scene, input.viewport);
    }

    match state.phase {
        GamePhase::Idle => {}
        GamePhase::Countdown => basket(&mut scene, input, true),
        GamePhase::Playing | GamePhase::GameOver => {
            for entity in state.live_entities() {
                item(&mut scene, input, entity);
            }
            basket(&mut scene, input, false);
            hud(&mut scene, input);
        }
    }

    scene
}

fn background(scene: &mut Scene, viewport: &Viewport) {
    let half = viewport.height / 2.0;
    scene.push(
        None,
        shapes::vertical_gradient_rect(
            &Rect::new(0.0, 0.0, viewport.width, half),
            0.0,
            colors::BACKGROUND_TOP,
            colors::BACKGROUND_MID,
        ),
    );
    scene.push(
        None,
        shapes::vertical_gradient_rect(
            &Rect::new(0.0, half, viewport.width, viewport.height - half),
            0.0,
            colors::BACKGROUND_MID,
            colors::BACKGROUND_BOTTOM,
        ),
    );
}

fn item(scene: &mut Scene, input: &SceneInput<'_>, entity: &Entity) {
    let center = input.viewport.entity_center(entity);
    let size = input.viewport.entity_diameter(entity);
    let asset = AssetId::Item(entity.kind);
    let has_image = input.assets.is_ready(asset);

    if has_image {
        scene.push(
            Some(asset),
            shapes::sprite(center, Vec2::splat(size), entity.rotation, colors::WHITE),
        );
    } else {
        let color = if entity.kind.is_good() {
            colors::GOOD_FALLBACK
        } else {
            colors::BOMB_FALLBACK
        };
        scene.push(None, shapes::circle(center, size / 2.0, color, CIRCLE_SEGMENTS));
    }

    if entity.kind == ItemKind::Bomb {
        let blink = bomb_blink(input.now_ms);
        let [r, g, b] = colors::BOMB_GLOW;

        if !input.state.preferences.reduce_animations {
            let time = (input.now_ms / 200.0) as f32;
            for i in 0..BOMB_PARTICLES {
                let angle = (i as f32 / BOMB_PARTICLES as f32) * std::f32::consts::TAU + time * 0.5;
                let radius = size * 0.8 + (time * 2.0 + i as f32).sin() * size * 0.2;
                let offset = Vec2::from_angle(angle + entity.rotation) * radius;
                scene.push(
                    None,
                    shapes::circle(center + offset, size * 0.05, [r, g, b, blink * 0.6], 8),
                );
            }
        }

        // Red flash over the sprite
        if has_image {
            scene.push(
                None,
                shapes::rect(
                    &Rect::new(center.x - size / 2.0, center.y - size / 2.0, size, size),
                    entity.rotation,
                    [r, g, b, blink * 0.25],
                ),
            );
        }
    }
}

fn basket(scene: &mut Scene, input: &SceneInput<'_>, countdown: bool) {
    let basket = &input.basket;
    let rect = basket.rect;
    let center = rect.center();

    match input.mood {
        BasketMood::Catch => scene.push(
            None,
            shapes::radial_gradient(
                center,
                rect.size.x / 2.0,
                [1.0, 1.0, 1.0, 0.3],
                [1.0, 1.0, 1.0, 0.0],
                CIRCLE_SEGMENTS,
            ),
        ),
        BasketMood::Bomb => {
            let glow = Rect::new(
                rect.min.x - 5.0,
                rect.min.y - 5.0,
                rect.size.x + 10.0,
                rect.size.y + 10.0,
            );
            scene.push(None, shapes::rect(&glow, basket.rotation, [1.0, 0.0, 0.0, 0.5]));
        }
        BasketMood::Rest => {}
    }

    if input.assets.is_ready(AssetId::Basket) {
        scene.push(
            Some(AssetId::Basket),
            shapes::sprite(center, rect.size, basket.rotation, colors::WHITE),
        );
        return;
    }

    let fill = if countdown {
        colors::BASKET_COUNTDOWN
    } else if input.mood == BasketMood::Bomb {
        colors::BASKET_HURT
    } else {
        colors::BASKET
    };
    scene.push(None, shapes::rect(&rect, basket.rotation, fill));
    scene.push(
        None,
        shapes::rect_outline(&rect, basket.rotation, OUTLINE_WIDTH, colors::WHITE),
    );
    scene.basket_label = Some(Label {
        text: "PANIER",
        center,
        font_px: input.viewport.profile().label_font,
        rotation: basket.rotation,
    });
}

fn panel(scene: &mut Scene, rect: &Rect, top: [f32; 4], bottom: [f32; 4], accent: [f32; 4]) {
    scene.push(None, shapes::vertical_gradient_rect(rect, 0.0, top, bottom));
    scene.push(None, shapes::rect_outline(rect, 0.0, OUTLINE_WIDTH, accent));
    let line = Rect::new(
        rect.min.x + 15.0,
        rect.min.y + rect.size.y - 8.0,
        rect.size.x - 30.0,
        3.0,
    );
    scene.push(None, shapes::rect(&line, 0.0, accent));
}

fn hud(scene: &mut Scene, input: &SceneInput<'_>) {
    let score = input.viewport.score_panel();
    panel(
        scene,
        &score,
        colors::PANEL_LIGHT,
        colors::PANEL_DARK,
        colors::BRAND_ORANGE,
    );

    let timer = input.viewport.timer_panel();
    let tone = TimerTone::for_seconds(whole_seconds(input.state.time_left_ms));
    let accent = timer_color(tone);
    panel(
        scene,
        &timer,
        colors::PANEL_LIGHT,
        with_alpha(accent, 0.3),
        accent,
    );

    if tone == TimerTone::Critical {
        let pulse = ((input.now_ms * 0.01).sin() * 0.3 + 0.7) as f32;
        scene.push(None, shapes::rect(&timer, 0.0, [1.0, 0.0, 0.0, pulse * 0.2]));
    }

    scene.score_panel = Some(score);
    scene.timer_panel = Some(timer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BasketPose;

    struct Fixture {
        state: GameState,
        viewport: Viewport,
        assets: AssetRegistry,
    }

    impl Fixture {
        fn new(phase: GamePhase) -> Self {
            let mut state = GameState::default();
            state.phase = phase;
            Self {
                state,
                viewport: Viewport::new(1280.0, 720.0),
                assets: AssetRegistry::new(),
            }
        }

        fn build(&self, mood: BasketMood) -> Scene {
            let basket = self
                .viewport
                .basket_rect(self.state.player.x, BasketPose::REST);
            build_scene(&SceneInput {
                state: &self.state,
                viewport: &self.viewport,
                basket,
                mood,
                assets: &self.assets,
                now_ms: 1_000.0,
            })
        }
    }

    fn colors_in(scene: &Scene) -> Vec<[f32; 4]> {
        scene
            .batches
            .iter()
            .flat_map(|b| b.vertices.iter().map(|v| v.color))
            .collect()
    }

    #[test]
    fn test_blink_range() {
        for t in [0.0, 100.0, 314.0, 1_000.0, 12_345.0] {
            let b = bomb_blink(t);
            assert!((0.5..=1.0).contains(&b));
        }
        assert_eq!(bomb_blink(0.0), 0.5);
    }

    #[test]
    fn test_fallbacks_when_assets_pending() {
        let mut f = Fixture::new(GamePhase::Playing);
        let id = f.state.next_entity_id();
        f.state.entities.push(Entity::still(id, ItemKind::Coffee, 0.3, 0.3));
        let scene = f.build(BasketMood::Rest);

        assert!(scene.batches.iter().all(|b| b.texture.is_none()));
        let colors = colors_in(&scene);
        assert!(colors.contains(&colors::GOOD_FALLBACK));
        assert!(colors.contains(&colors::BASKET));
        assert_eq!(scene.basket_label.as_ref().map(|l| l.text), Some("PANIER"));
        assert!(scene.score_panel.is_some());
    }

    #[test]
    fn test_sprites_when_assets_ready() {
        let mut f = Fixture::new(GamePhase::Playing);
        f.assets.mark_ready(AssetId::Item(ItemKind::Pizza));
        f.assets.mark_ready(AssetId::Basket);
        let id = f.state.next_entity_id();
        f.state.entities.push(Entity::still(id, ItemKind::Pizza, 0.3, 0.3));
        let scene = f.build(BasketMood::Rest);

        let textures: Vec<_> = scene.batches.iter().filter_map(|b| b.texture).collect();
        assert_eq!(
            textures,
            vec![AssetId::Item(ItemKind::Pizza), AssetId::Basket]
        );
        assert!(scene.basket_label.is_none());
    }

    #[test]
    fn test_collected_entities_not_drawn() {
        let mut f = Fixture::new(GamePhase::Playing);
        let id = f.state.next_entity_id();
        let mut e = Entity::still(id, ItemKind::Bomb, 0.3, 0.3);
        e.collected = true;
        f.state.entities.push(e);
        let scene = f.build(BasketMood::Rest);
        assert!(!colors_in(&scene).contains(&colors::BOMB_FALLBACK));
    }

    #[test]
    fn test_bomb_orbit_follows_reduce_animations() {
        let mut f = Fixture::new(GamePhase::Playing);
        let id = f.state.next_entity_id();
        f.state.entities.push(Entity::still(id, ItemKind::Bomb, 0.3, 0.3));
        let with_orbit = f.build(BasketMood::Rest).vertex_count();

        f.state.preferences.reduce_animations = true;
        let without_orbit = f.build(BasketMood::Rest).vertex_count();
        assert_eq!(with_orbit - without_orbit, BOMB_PARTICLES * 8 * 3);
    }

    #[test]
    fn test_countdown_draws_only_basket() {
        let mut f = Fixture::new(GamePhase::Countdown);
        let id = f.state.next_entity_id();
        f.state.entities.push(Entity::still(id, ItemKind::Lemon, 0.3, 0.3));
        let scene = f.build(BasketMood::Rest);

        let colors = colors_in(&scene);
        assert!(colors.contains(&colors::BASKET_COUNTDOWN));
        assert!(!colors.contains(&colors::GOOD_FALLBACK));
        assert!(scene.score_panel.is_none());
    }

    #[test]
    fn test_high_contrast_background() {
        let mut f = Fixture::new(GamePhase::Idle);
        f.state.preferences.high_contrast = true;
        let scene = f.build(BasketMood::Rest);
        assert_eq!(scene.clear, colors::HIGH_CONTRAST_BACKGROUND);
        assert_eq!(scene.vertex_count(), 0);
    }

    #[test]
    fn test_bomb_mood_tints_fallback_basket() {
        let f = Fixture::new(GamePhase::Playing);
        let colors = colors_in(&f.build(BasketMood::Bomb));
        assert!(colors.contains(&colors::BASKET_HURT));
    }

    #[test]
    fn test_timer_tone_colors() {
        let mut f = Fixture::new(GamePhase::Playing);
        f.state.time_left_ms = 4_200.0;
        let colors = colors_in(&f.build(BasketMood::Rest));
        assert!(colors.contains(&colors::TIMER_CRITICAL));

        f.state.time_left_ms = 9_000.0;
        let colors = colors_in(&f.build(BasketMood::Rest));
        assert!(colors.contains(&colors::TIMER_WARNING));
    }
}
