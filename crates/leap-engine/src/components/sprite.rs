use serde::{Deserialize, Serialize};

use crate::assets::registry::ResourceRegistry;
use crate::components::component::Renderable;
use crate::core::geometry::Rect;
use crate::renderer::traits::DrawSurface;

/// Identifies which texture atlas a sprite belongs to.
/// Index into the AssetManifest's atlas list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AtlasId(pub u32);

/// Blend mode for sprite rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending (src-alpha, one-minus-src-alpha).
    #[default]
    Alpha,
    /// Additive blending for glow effects (src-alpha, one).
    Additive,
}

/// A resolved atlas cell, as handed out by the resource registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub atlas: AtlasId,
    /// Column in the atlas grid.
    pub col: f32,
    /// Row in the atlas grid.
    pub row: f32,
    /// Number of cells this sprite spans (1.0 = single cell, 2.0 = 2x2 block).
    pub cell_span: f32,
    pub blend: BlendMode,
    /// Set when the requested path was unknown and this is the fallback cell.
    pub placeholder: bool,
}

impl Sprite {
    /// Drawn in place of any texture the registry cannot find.
    pub const PLACEHOLDER: Sprite = Sprite {
        atlas: AtlasId(0),
        col: 0.0,
        row: 0.0,
        cell_span: 1.0,
        blend: BlendMode::Alpha,
        placeholder: true,
    };
}

/// Draws one of a list of textures into the entity's box.
///
/// Paths are resolved through the level's resource registry when the owning
/// state activates and released when it deactivates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureComponent {
    pub textures: Vec<String>,
    /// Index of the texture currently drawn.
    pub current: usize,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    #[serde(skip)]
    resolved: Vec<Sprite>,
}

impl Default for TextureComponent {
    fn default() -> Self {
        Self {
            textures: Vec::new(),
            current: 0,
            alpha: 1.0,
            resolved: Vec::new(),
        }
    }
}

impl TextureComponent {
    pub fn new(textures: Vec<String>) -> Self {
        Self {
            textures,
            ..Self::default()
        }
    }

    pub fn single(path: impl Into<String>) -> Self {
        Self::new(vec![path.into()])
    }

    /// Switch the drawn texture. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.textures.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// The sprite currently drawn, if the owning state is active.
    pub fn current_sprite(&self) -> Option<&Sprite> {
        self.resolved.get(self.current)
    }

    pub(crate) fn resolve(&mut self, resources: &ResourceRegistry) {
        self.resolved = self.textures.iter().map(|p| resources.sprite(p)).collect();
    }

    pub(crate) fn release(&mut self) {
        self.resolved.clear();
    }
}

impl Renderable for TextureComponent {
    fn render(&self, rect: &Rect, surface: &mut dyn DrawSurface) {
        if let Some(sprite) = self.current_sprite() {
            surface.draw_sprite(rect, sprite, self.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_ignores_out_of_range() {
        let mut tex = TextureComponent::new(vec!["a.png".into(), "b.png".into()]);
        assert!(tex.select(1));
        assert!(!tex.select(5));
        assert_eq!(tex.current, 1);
    }

    #[test]
    fn unknown_paths_resolve_to_placeholder() {
        let mut tex = TextureComponent::single("missing.png");
        tex.resolve(&ResourceRegistry::new());
        assert_eq!(tex.current_sprite(), Some(&Sprite::PLACEHOLDER));
        tex.release();
        assert!(tex.current_sprite().is_none());
    }
}
