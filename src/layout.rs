//! Screen geometry per device class
//!
//! All pixel geometry (basket rect, item size, HUD panels) comes from one
//! [`DeviceProfile`] looked up from the viewport width.

use glam::Vec2;
use serde::Serialize;

use crate::sim::{CollisionResult, Entity, item_basket_collision};

/// Coarse screen size bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// Widths up to and including this are mobile
pub const MOBILE_MAX_WIDTH: f32 = 768.0;
/// Widths up to and including this are tablet
pub const TABLET_MAX_WIDTH: f32 = 1024.0;

impl DeviceClass {
    pub fn classify(width: f32) -> Self {
        if width <= MOBILE_MAX_WIDTH {
            DeviceClass::Mobile
        } else if width <= TABLET_MAX_WIDTH {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn profile(&self) -> &'static DeviceProfile {
        match self {
            DeviceClass::Mobile => &MOBILE,
            DeviceClass::Tablet => &TABLET,
            DeviceClass::Desktop => &DESKTOP,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        }
    }
}

/// Sizes for one device class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviceProfile {
    /// Basket width as a share of viewport width
    pub basket_width: f32,
    /// Basket height as a share of viewport height
    pub basket_height: f32,
    /// Basket top edge as a share of viewport height
    pub basket_anchor: f32,
    /// Item size multiplier
    pub item_scale: f32,
    pub hud_padding: f32,
    pub hud_font: f32,
    pub hud_small_font: f32,
    pub icon_size: f32,
    /// Fallback basket label
    pub label_font: f32,
    pub score_panel: Vec2,
    pub timer_panel: Vec2,
    /// Timer panel left edge, measured from the right padding
    pub timer_offset: f32,
}

const MOBILE: DeviceProfile = DeviceProfile {
    basket_width: 0.18,
    basket_height: 0.10,
    basket_anchor: 0.85,
    item_scale: 1.3,
    hud_padding: 20.0,
    hud_font: 32.0,
    hud_small_font: 20.0,
    icon_size: 24.0,
    label_font: 20.0,
    score_panel: Vec2::new(200.0, 90.0),
    timer_panel: Vec2::new(120.0, 90.0),
    timer_offset: 140.0,
};

const TABLET: DeviceProfile = DeviceProfile {
    basket_width: 0.12,
    basket_height: 0.12,
    basket_anchor: 0.88,
    item_scale: 1.1,
    hud_padding: 16.0,
    hud_font: 28.0,
    hud_small_font: 18.0,
    icon_size: 22.0,
    label_font: 18.0,
    score_panel: Vec2::new(180.0, 80.0),
    timer_panel: Vec2::new(110.0, 80.0),
    timer_offset: 120.0,
};

const DESKTOP: DeviceProfile = DeviceProfile {
    basket_width: 0.10,
    basket_height: 0.10,
    basket_anchor: 0.90,
    item_scale: 1.0,
    hud_padding: 12.0,
    hud_font: 24.0,
    hud_small_font: 16.0,
    icon_size: 20.0,
    label_font: 16.0,
    score_panel: Vec2::new(160.0, 70.0),
    timer_panel: Vec2::new(100.0, 70.0),
    timer_offset: 100.0,
};

/// Basket transform on top of its resting rect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasketPose {
    pub scale: f32,
    /// Radians
    pub rotation: f32,
    /// Lift as a share of basket height
    pub bounce: f32,
}

impl BasketPose {
    pub const REST: BasketPose = BasketPose {
        scale: 1.0,
        rotation: 0.0,
        bounce: 0.0,
    };
}

impl Default for BasketPose {
    fn default() -> Self {
        Self::REST
    }
}

/// Axis-aligned rect in pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }
}

/// On-screen basket: rect plus rotation about its center
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasketRect {
    pub rect: Rect,
    pub rotation: f32,
}

/// Canvas size and the profile it maps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub class: DeviceClass,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        Self {
            width,
            height,
            class: DeviceClass::classify(width),
        }
    }

    /// Re-classify after a resize; returns true if the class changed
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let before = self.class;
        *self = Self::new(width, height);
        if before != self.class {
            log::debug!("device class {:?} -> {:?}", before, self.class);
        }
        before != self.class
    }

    pub fn profile(&self) -> &'static DeviceProfile {
        self.class.profile()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Resting basket size in pixels
    pub fn basket_size(&self) -> Vec2 {
        let p = self.profile();
        Vec2::new(self.width * p.basket_width, self.height * p.basket_height)
    }

    /// Basket rect for a normalized x, with the pose applied
    ///
    /// Scaling keeps the center fixed; bounce lifts by `bounce * h` of the
    /// resting height.
    pub fn basket_rect(&self, basket_x: f32, pose: BasketPose) -> BasketRect {
        let base = self.basket_size();
        let left = basket_x * (self.width - base.x);
        let top = self.height * self.profile().basket_anchor;

        let size = base * pose.scale;
        let x = left - (size.x - base.x) / 2.0;
        let y = top - (size.y - base.y) / 2.0 - pose.bounce * base.y;
        BasketRect {
            rect: Rect::new(x, y, size.x, size.y),
            rotation: pose.rotation,
        }
    }

    /// Entity center in pixels
    pub fn entity_center(&self, entity: &Entity) -> Vec2 {
        Vec2::new(entity.x * self.width, entity.y * self.height)
    }

    /// Entity diameter in pixels
    pub fn entity_diameter(&self, entity: &Entity) -> f32 {
        entity.size * self.width * self.profile().item_scale
    }

    /// Hit test an entity against the basket as drawn
    pub fn hit_test(&self, entity: &Entity, basket: &BasketRect) -> CollisionResult {
        item_basket_collision(
            self.entity_center(entity),
            self.entity_diameter(entity),
            basket.rect.center(),
            basket.rect.size,
        )
    }

    pub fn score_panel(&self) -> Rect {
        let p = self.profile();
        Rect::new(p.hud_padding, p.hud_padding, p.score_panel.x, p.score_panel.y)
    }

    pub fn timer_panel(&self) -> Rect {
        let p = self.profile();
        Rect::new(
            self.width - p.hud_padding - p.timer_offset,
            p.hud_padding,
            p.timer_panel.x,
            p.timer_panel.y,
        )
    }
}
