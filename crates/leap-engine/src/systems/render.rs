use crate::components::sprite::{BlendMode, Sprite};
use crate::core::geometry::Rect;
use crate::core::level::Level;
use crate::renderer::instance::{RenderBuffer, RenderInstance};
use crate::renderer::traits::DrawSurface;

/// Collects draw calls, split by blend mode.
#[derive(Default)]
struct BlendBatches {
    alpha: Vec<RenderInstance>,
    additive: Vec<RenderInstance>,
}

impl DrawSurface for BlendBatches {
    fn draw_sprite(&mut self, rect: &Rect, sprite: &Sprite, alpha: f32) {
        let instance = RenderInstance::new(rect, sprite, alpha);
        match sprite.blend {
            BlendMode::Alpha => self.alpha.push(instance),
            BlendMode::Additive => self.additive.push(instance),
        }
    }
}

/// Build the render buffer from the level's active renderable components.
/// Alpha-blended instances come first, additive ones after `atlas_split`.
pub fn build_render_buffer(level: &Level, buffer: &mut RenderBuffer) {
    buffer.clear();

    let mut batches = BlendBatches::default();
    level.render(&mut batches);

    let split = batches.alpha.len() as u32;
    for inst in batches.alpha {
        buffer.push(inst);
    }
    buffer.set_atlas_split(split);
    for inst in batches.additive {
        buffer.push(inst);
    }
}
