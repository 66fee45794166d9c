//! Item vs basket hit test
//!
//! The basket is approximated by a circle whose diameter is the shorter side
//! of its rectangle. An item hits when the two circles overlap.

use glam::Vec2;

/// Result of a hit test, kept for debugging overlays and logs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub hit: bool,
    /// Center distance
    pub distance: f32,
    /// Distance below which the two overlap
    pub threshold: f32,
}

/// Circle (item) vs basket, all in the same units (pixels in practice)
pub fn item_basket_collision(
    item_center: Vec2,
    item_diameter: f32,
    basket_center: Vec2,
    basket_size: Vec2,
) -> CollisionResult {
    let distance = item_center.distance(basket_center);
    let threshold = (item_diameter + basket_size.x.min(basket_size.y)) / 2.0;
    CollisionResult {
        hit: distance < threshold,
        distance,
        threshold,
    }
}
