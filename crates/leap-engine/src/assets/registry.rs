use std::collections::HashMap;

use crate::api::types::SoundEvent;
use crate::assets::manifest::AssetManifest;
use crate::components::sprite::{AtlasId, Sprite};

/// Lookup-by-path capability handed to components on activation.
/// Unknown paths never fail: textures fall back to `Sprite::PLACEHOLDER`,
/// sounds to `SoundEvent::SILENT`.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    sprites: HashMap<String, Sprite>,
    sounds: HashMap<String, SoundEvent>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a parsed AssetManifest.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let mut sprites = HashMap::with_capacity(manifest.sprites.len());
        for (path, desc) in &manifest.sprites {
            sprites.insert(
                path.clone(),
                Sprite {
                    atlas: AtlasId(desc.atlas),
                    col: desc.col as f32,
                    row: desc.row as f32,
                    cell_span: desc.span as f32,
                    blend: desc.blend,
                    placeholder: false,
                },
            );
        }
        let sounds = manifest
            .sounds
            .iter()
            .filter_map(|(path, desc)| desc.event_id.map(|id| (path.clone(), SoundEvent(id))))
            .collect();
        Self { sprites, sounds }
    }

    pub fn insert_sprite(&mut self, path: impl Into<String>, sprite: Sprite) {
        self.sprites.insert(path.into(), sprite);
    }

    pub fn insert_sound(&mut self, path: impl Into<String>, event: SoundEvent) {
        self.sounds.insert(path.into(), event);
    }

    pub fn sprite(&self, path: &str) -> Sprite {
        match self.sprites.get(path) {
            Some(sprite) => *sprite,
            None => {
                log::debug!("texture '{}' not in registry, using placeholder", path);
                Sprite::PLACEHOLDER
            }
        }
    }

    pub fn sound(&self, path: &str) -> SoundEvent {
        match self.sounds.get(path) {
            Some(event) => *event,
            None => {
                log::debug!("sound '{}' not in registry", path);
                SoundEvent::SILENT
            }
        }
    }
}
