//! Load/save document shape for entities and levels.
//!
//! Components and actions travel as tagged variants (`"kind"` discriminator
//! plus fields); any field left out takes its default. Runtime-only state
//! (queued intents, jump progress, resolved resources, timer progress) is
//! never written.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::api::config::LevelConfig;
use crate::api::error::LevelError;
use crate::api::types::EntityId;
use crate::components::component::Component;
use crate::components::entity::Entity;
use crate::components::state::State;
use crate::core::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub start_action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub id: EntityId,
    #[serde(default)]
    pub tag: String,
    pub rect: Rect,
    pub states: Vec<StateDocument>,
    #[serde(default)]
    pub current_state_index: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDocument {
    #[serde(default)]
    pub config: LevelConfig,
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
}

impl StateDocument {
    fn from_state(state: &State) -> Self {
        Self {
            name: state.name().to_string(),
            components: state
                .components()
                .iter()
                .map(|c| {
                    let mut persisted = c.clone();
                    persisted.on_deactivate();
                    persisted
                })
                .collect(),
            start_action: state.start_action.clone(),
        }
    }
}

impl EntityDocument {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            tag: entity.tag.clone(),
            rect: entity.rect(),
            states: entity.states().iter().map(StateDocument::from_state).collect(),
            current_state_index: entity.current_state_index(),
        }
    }

    /// Rebuild the entity. Fails on a repeated component kind within a state.
    pub fn into_entity(self) -> Result<Entity, LevelError> {
        let states = self
            .states
            .into_iter()
            .map(|s| State::from_parts(s.name, s.components, s.start_action))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Entity::new(self.id)
            .with_tag(self.tag)
            .with_rect(self.rect)
            .with_states(states)
            .with_current_state(self.current_state_index))
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl LevelDocument {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let doc: LevelDocument = serde_json::from_str(json)?;
        doc.config.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::registry::ResourceRegistry;
    use crate::components::component::ComponentKind;
    use crate::components::physics::{PhysicsComponent, PhysicsIntent};
    use crate::core::level::Level;

    const PLAYER: &str = r#"{
        "id": 1,
        "tag": "player",
        "rect": { "pos": [0.0, 100.0], "size": [16.0, 16.0] },
        "states": [
            {
                "name": "walk",
                "components": [
                    { "kind": "Physics", "is_static": false, "move_speed": 4.0, "gravity_enabled": true,
                      "collision_reactions": [
                          { "side": "All", "target": "coin", "action": { "kind": "Score", "points": 5 } }
                      ] },
                    { "kind": "Input", "bindings": [
                        { "key": 37, "action": { "kind": "Physics", "intent": "GoLeft" } }
                    ] }
                ]
            },
            { "name": "dead", "start_action": { "kind": "Remove" } }
        ]
    }"#;

    #[test]
    fn parses_tagged_components_with_defaults() {
        let doc = EntityDocument::from_json(PLAYER).unwrap();
        assert_eq!(doc.current_state_index, 0);
        let entity = doc.into_entity().unwrap();
        assert_eq!(entity.tag, "player");
        let physics = entity.physics().unwrap();
        assert_eq!(physics.move_speed, 4.0);
        assert!(!physics.is_platform);
        assert_eq!(physics.collision_reactions.len(), 1);
        assert_eq!(entity.states()[1].start_action, Action::Remove);
    }

    #[test]
    fn duplicate_kind_in_document_is_rejected() {
        let json = r#"{ "id": 2, "rect": { "pos": [0.0, 0.0], "size": [8.0, 8.0] },
            "states": [ { "name": "a", "components": [ { "kind": "Timer" }, { "kind": "Timer" } ] } ] }"#;
        let err = EntityDocument::from_json(json).unwrap().into_entity().unwrap_err();
        assert!(matches!(err, LevelError::DuplicateComponent { kind: ComponentKind::Timer }));
    }

    #[test]
    fn unknown_kind_is_a_document_error() {
        let json = r#"{ "id": 2, "rect": { "pos": [0.0, 0.0], "size": [8.0, 8.0] },
            "states": [ { "name": "a", "components": [ { "kind": "Laser" } ] } ] }"#;
        assert!(matches!(EntityDocument::from_json(json), Err(LevelError::Document(_))));
    }

    #[test]
    fn saved_level_omits_runtime_state() {
        let doc = LevelDocument {
            config: LevelConfig::default(),
            entities: vec![EntityDocument::from_json(PLAYER).unwrap()],
        };
        let mut level = Level::from_document(doc, ResourceRegistry::new()).unwrap();
        level.push_intent(EntityId(1), PhysicsIntent::GoRight);

        let saved = level.to_document();
        let json = saved.to_json().unwrap();
        assert!(!json.contains("intents"));

        let reloaded = LevelDocument::from_json(&json).unwrap();
        let entity = reloaded.entities[0].clone().into_entity().unwrap();
        assert_eq!(entity.physics().unwrap().pending_intents().count(), 0);
        assert_eq!(entity.rect(), level.entity(EntityId(1)).unwrap().rect());
        assert_eq!(saved.entities[0].states[0].components[0].kind(), ComponentKind::Physics);
        let original = saved.entities[0].states[0].components[0].clone();
        assert!(matches!(original, Component::Physics(PhysicsComponent { move_speed, .. }) if move_speed == 4.0));
    }
}
