//! Vertex types for 2D sprite rendering

use bytemuck::{Pod, Zeroable};

/// Textured, tinted 2D vertex
///
/// Positions are in canvas pixels (top-left origin) until the pipeline maps
/// them to clip space. Flat shapes sample the 1x1 white texture, so their UV
/// is irrelevant.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color,
        }
    }

    /// Untextured vertex
    pub const fn flat(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self::new(x, y, 0.5, 0.5, color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Parse `#RRGGBB` at compile time
pub const fn hex(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
        alpha,
    ]
}

/// Colors for game elements
pub mod colors {
    use super::hex;

    pub const BACKGROUND_TOP: [f32; 4] = hex(0x1A1A2E, 1.0);
    pub const BACKGROUND_MID: [f32; 4] = hex(0x16213E, 1.0);
    pub const BACKGROUND_BOTTOM: [f32; 4] = hex(0x0F3460, 1.0);
    pub const HIGH_CONTRAST_BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub const GOOD_FALLBACK: [f32; 4] = hex(0x4CAF50, 1.0);
    pub const BOMB_FALLBACK: [f32; 4] = hex(0xF44336, 1.0);
    pub const BOMB_GLOW: [f32; 3] = [1.0, 0.0, 0.0];

    pub const BASKET: [f32; 4] = hex(0xFF8C00, 1.0);
    pub const BASKET_HURT: [f32; 4] = hex(0xFF6B6B, 1.0);
    pub const BASKET_COUNTDOWN: [f32; 4] = hex(0xFF6B35, 1.0);
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub const BRAND_ORANGE: [f32; 4] = hex(0xFF6B35, 1.0);
    pub const TIMER_WARNING: [f32; 4] = hex(0xFFA500, 1.0);
    pub const TIMER_CRITICAL: [f32; 4] = hex(0xFF4444, 1.0);
    pub const PANEL_LIGHT: [f32; 4] = hex(0x2D2D2D, 0.9);
    pub const PANEL_DARK: [f32; 4] = hex(0x1A1A1A, 0.8);
}
