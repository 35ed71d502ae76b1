use serde::{Deserialize, Serialize};

use crate::api::types::SoundEvent;
use crate::assets::registry::ResourceRegistry;

/// Sounds an entity can trigger. Playback happens outside the simulation:
/// the component only turns an index into a `SoundEvent` for the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundComponent {
    pub sounds: Vec<String>,
    #[serde(skip)]
    resolved: Vec<SoundEvent>,
}

impl SoundComponent {
    pub fn new(sounds: Vec<String>) -> Self {
        Self {
            sounds,
            resolved: Vec::new(),
        }
    }

    /// Sound trigger for `index`, if the state is active and the index exists.
    pub fn event(&self, index: usize) -> Option<SoundEvent> {
        self.resolved.get(index).copied()
    }

    pub(crate) fn resolve(&mut self, resources: &ResourceRegistry) {
        self.resolved = self.sounds.iter().map(|p| resources.sound(p)).collect();
    }

    pub(crate) fn release(&mut self) {
        self.resolved.clear();
    }
}
