//! Draw boundary between the simulation and a renderer.
//!
//! The simulation never touches pixels. During the render pass every active
//! renderable component receives an opaque `DrawSurface` and describes what it
//! wants drawn; the surface decides how (GPU batch, software raster, test log).

use crate::components::sprite::Sprite;
use crate::core::geometry::Rect;

pub trait DrawSurface {
    /// Draw `sprite` stretched over `rect` (world space, Y-up).
    fn draw_sprite(&mut self, rect: &Rect, sprite: &Sprite, alpha: f32);
}

/// Surface that only records draw calls. Used by tooling and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub calls: Vec<(Rect, Sprite, f32)>,
}

impl DrawSurface for RecordingSurface {
    fn draw_sprite(&mut self, rect: &Rect, sprite: &Sprite, alpha: f32) {
        self.calls.push((*rect, *sprite, alpha));
    }
}
