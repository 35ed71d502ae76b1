use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::error::LevelError;
use crate::components::sprite::BlendMode;

/// Asset manifest of a level: texture atlases, the sprite cell behind each
/// texture path, and the sound trigger behind each sound path.
/// Loaded from JSON next to the level document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub atlases: Vec<AtlasDescriptor>,
    /// Texture path (as referenced by texture components) → atlas cell.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDescriptor>,
    /// Sound path (as referenced by sound components) → trigger.
    #[serde(default)]
    pub sounds: HashMap<String, SoundDescriptor>,
}

/// A texture atlas laid out as a grid of equal cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    /// Image file of the atlas, relative to the manifest.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Index into `atlases`.
    pub atlas: u32,
    pub col: u32,
    pub row: u32,
    #[serde(default = "default_span")]
    pub span: u32,
    #[serde(default)]
    pub blend: BlendMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDescriptor {
    /// Audio file played by the host.
    pub path: String,
    /// Trigger id emitted by the simulation. Sounds without one stay silent.
    #[serde(default)]
    pub event_id: Option<u32>,
}

fn default_span() -> u32 {
    1
}

impl AssetManifest {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sprite entries pointing past the atlas list.
    pub fn dangling_sprites(&self) -> Vec<&str> {
        let mut dangling: Vec<&str> = self
            .sprites
            .iter()
            .filter(|(_, s)| s.atlas as usize >= self.atlases.len())
            .map(|(path, _)| path.as_str())
            .collect();
        dangling.sort_unstable();
        dangling
    }
}
