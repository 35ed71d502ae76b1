use bytemuck::{Pod, Zeroable};

use crate::components::sprite::Sprite;
use crate::core::geometry::Rect;

/// Per-instance render data handed to an external renderer.
/// 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Bottom-left corner in world space.
    pub x: f32,
    pub y: f32,
    /// World-space size of the drawn box.
    pub width: f32,
    pub height: f32,
    /// Atlas column.
    pub sprite_col: f32,
    /// Atlas row.
    pub atlas_row: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// UV cell span (1.0 = single cell, 2.0 = 2x2 block).
    pub cell_span: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(rect: &Rect, sprite: &Sprite, alpha: f32) -> Self {
        Self {
            x: rect.pos.x,
            y: rect.pos.y,
            width: rect.size.x,
            height: rect.size.y,
            sprite_col: sprite.col,
            atlas_row: sprite.row,
            alpha,
            cell_span: sprite.cell_span,
        }
    }
}

/// Render buffer containing all sprite instances of one frame.
pub struct RenderBuffer {
    /// Alpha-blended instances first, then additive instances after `atlas_split`.
    pub instances: Vec<RenderInstance>,
    /// Index where the blend mode split occurs.
    pub atlas_split: u32,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(512),
            atlas_split: 0,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.atlas_split = 0;
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn set_atlas_split(&mut self, split: u32) {
        self.atlas_split = split;
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Flat float view of the instance data, `FLOATS` per instance.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
