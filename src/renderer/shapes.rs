//! Shape generation for 2D primitives
//!
//! Everything is emitted as triangle lists in pixel space.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::SpriteVertex;
use crate::layout::Rect;

/// Rotate `p` about `origin` by `angle` radians (y down, so positive is clockwise)
fn rotate_about(p: Vec2, origin: Vec2, angle: f32) -> Vec2 {
    if angle == 0.0 {
        return p;
    }
    origin + Vec2::from_angle(angle).rotate(p - origin)
}

/// Textured quad centered on `center`, rotated about it
pub fn sprite(center: Vec2, size: Vec2, rotation: f32, tint: [f32; 4]) -> Vec<SpriteVertex> {
    let half = size * 0.5;
    let corners = [
        (Vec2::new(-half.x, -half.y), [0.0, 0.0]),
        (Vec2::new(half.x, -half.y), [1.0, 0.0]),
        (Vec2::new(half.x, half.y), [1.0, 1.0]),
        (Vec2::new(-half.x, half.y), [0.0, 1.0]),
    ];
    let v = corners.map(|(offset, uv)| {
        let p = rotate_about(center + offset, center, rotation);
        SpriteVertex::new(p.x, p.y, uv[0], uv[1], tint)
    });
    vec![v[0], v[1], v[2], v[0], v[2], v[3]]
}

/// Solid rectangle, optionally rotated about its center
pub fn rect(rect: &Rect, rotation: f32, color: [f32; 4]) -> Vec<SpriteVertex> {
    vertical_gradient_rect(rect, rotation, color, color)
}

/// Rectangle with a top-to-bottom color blend
pub fn vertical_gradient_rect(
    rect: &Rect,
    rotation: f32,
    top: [f32; 4],
    bottom: [f32; 4],
) -> Vec<SpriteVertex> {
    let center = rect.center();
    let min = rect.min;
    let max = rect.max();
    let corners = [
        (Vec2::new(min.x, min.y), top),
        (Vec2::new(max.x, min.y), top),
        (Vec2::new(max.x, max.y), bottom),
        (Vec2::new(min.x, max.y), bottom),
    ];
    let v = corners.map(|(p, color)| {
        let p = rotate_about(p, center, rotation);
        SpriteVertex::flat(p.x, p.y, color)
    });
    vec![v[0], v[1], v[2], v[0], v[2], v[3]]
}

/// Border drawn inside-out around `rect`, centered on its edges
pub fn rect_outline(
    rect: &Rect,
    rotation: f32,
    thickness: f32,
    color: [f32; 4],
) -> Vec<SpriteVertex> {
    let t = thickness;
    let min = rect.min - Vec2::splat(t / 2.0);
    let size = rect.size + Vec2::splat(t);
    let edges = [
        Rect::new(min.x, min.y, size.x, t),
        Rect::new(min.x, min.y + size.y - t, size.x, t),
        Rect::new(min.x, min.y + t, t, size.y - 2.0 * t),
        Rect::new(min.x + size.x - t, min.y + t, t, size.y - 2.0 * t),
    ];

    let center = rect.center();
    let mut vertices = Vec::with_capacity(24);
    for edge in &edges {
        for v in self::rect(edge, 0.0, color) {
            let p = rotate_about(Vec2::from(v.position), center, rotation);
            vertices.push(SpriteVertex::flat(p.x, p.y, color));
        }
    }
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<SpriteVertex> {
    radial_gradient(center, radius, color, color, segments)
}

/// Disc fading from `inner` at the center to `outer` at the rim
pub fn radial_gradient(
    center: Vec2,
    radius: f32,
    inner: [f32; 4],
    outer: [f32; 4],
    segments: u32,
) -> Vec<SpriteVertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(SpriteVertex::flat(center.x, center.y, inner));
        vertices.push(SpriteVertex::flat(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            outer,
        ));
        vertices.push(SpriteVertex::flat(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            outer,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_corners_and_uv() {
        let v = sprite(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0), 0.0, [1.0; 4]);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].position, [8.0, 9.0]);
        assert_eq!(v[0].uv, [0.0, 0.0]);
        assert_eq!(v[2].position, [12.0, 11.0]);
        assert_eq!(v[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_rotation_keeps_center() {
        let v = sprite(Vec2::new(5.0, 5.0), Vec2::new(2.0, 2.0), PI / 2.0, [1.0; 4]);
        let centroid = v[..3]
            .iter()
            .chain(&v[5..6])
            .fold(Vec2::ZERO, |acc, v| acc + Vec2::from(v.position))
            / 4.0;
        assert!((centroid - Vec2::new(5.0, 5.0)).length() < 1e-4);
        // Top-left corner rotated a quarter turn clockwise lands top-right
        assert!((Vec2::from(v[0].position) - Vec2::new(6.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn test_circle_triangle_count() {
        let v = circle(Vec2::ZERO, 3.0, [1.0; 4], 16);
        assert_eq!(v.len(), 48);
        assert!(v.iter().all(|v| Vec2::from(v.position).length() <= 3.0 + 1e-4));
    }

    #[test]
    fn test_outline_has_four_edges() {
        let v = rect_outline(&Rect::new(0.0, 0.0, 100.0, 50.0), 0.0, 3.0, [1.0; 4]);
        assert_eq!(v.len(), 24);
        let min_x = v.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        assert_eq!(min_x, -1.5);
    }
}
