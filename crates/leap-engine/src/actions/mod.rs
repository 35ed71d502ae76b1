//! Action vocabulary.
//!
//! Actions are commands invoked against an entity of a level. They are what
//! collision reactions, movement hooks, timers, key bindings and state start
//! actions fire. A missing target (entity, component, texture index) turns an
//! action into a logged no-op.

use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;
use crate::components::component::ComponentKind;
use crate::components::physics::PhysicsIntent;
use crate::core::level::Level;

/// Nesting depth past which invocation is cut off.
pub const MAX_ACTION_DEPTH: u32 = 32;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Action {
    #[default]
    Empty,
    /// Queue a movement intent on the entity's physics component.
    Physics {
        #[serde(default)]
        intent: PhysicsIntent,
    },
    /// Add to the level score.
    Score {
        #[serde(default)]
        points: i32,
    },
    /// Switch the entity to another state.
    State {
        #[serde(default)]
        index: usize,
    },
    /// Run `action` on another entity instead.
    Entity {
        #[serde(default)]
        target: Option<EntityId>,
        #[serde(default)]
        action: Box<Action>,
    },
    /// Select the drawn texture of the entity's texture component.
    Texture {
        #[serde(default)]
        index: usize,
    },
    /// Emit a sound of the entity's sound component.
    Sound {
        #[serde(default)]
        index: usize,
    },
    /// Despawn the entity at the end of the tick.
    Remove,
    /// Run every action in order.
    Multiple {
        #[serde(default)]
        actions: Vec<Action>,
    },
}

/// Discriminator of an action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Empty,
    Physics,
    Score,
    State,
    Entity,
    Texture,
    Sound,
    Remove,
    Multiple,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        ActionKind::Empty,
        ActionKind::Physics,
        ActionKind::Score,
        ActionKind::State,
        ActionKind::Entity,
        ActionKind::Texture,
        ActionKind::Sound,
        ActionKind::Remove,
        ActionKind::Multiple,
    ];

    /// Component the action needs in the state of the entity it runs on.
    pub fn required_component(self) -> Option<ComponentKind> {
        match self {
            ActionKind::Physics => Some(ComponentKind::Physics),
            ActionKind::Texture => Some(ComponentKind::Texture),
            ActionKind::Sound => Some(ComponentKind::Sound),
            _ => None,
        }
    }
}

impl Action {
    /// Default instance of a kind, as tooling creates them.
    pub fn from_kind(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Empty => Action::Empty,
            ActionKind::Physics => Action::Physics { intent: PhysicsIntent::default() },
            ActionKind::Score => Action::Score { points: 0 },
            ActionKind::State => Action::State { index: 0 },
            ActionKind::Entity => Action::Entity {
                target: None,
                action: Box::default(),
            },
            ActionKind::Texture => Action::Texture { index: 0 },
            ActionKind::Sound => Action::Sound { index: 0 },
            ActionKind::Remove => Action::Remove,
            ActionKind::Multiple => Action::Multiple { actions: Vec::new() },
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Empty => ActionKind::Empty,
            Action::Physics { .. } => ActionKind::Physics,
            Action::Score { .. } => ActionKind::Score,
            Action::State { .. } => ActionKind::State,
            Action::Entity { .. } => ActionKind::Entity,
            Action::Texture { .. } => ActionKind::Texture,
            Action::Sound { .. } => ActionKind::Sound,
            Action::Remove => ActionKind::Remove,
            Action::Multiple { .. } => ActionKind::Multiple,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Action::Empty => true,
            Action::Multiple { actions } => actions.iter().all(Action::is_empty),
            _ => false,
        }
    }

    /// Component kinds this action needs on its own entity, with the kind of
    /// the (possibly nested) action needing it. Actions forwarded to another
    /// entity are checked against that entity at run time only.
    pub fn requirements(&self) -> Vec<(ActionKind, ComponentKind)> {
        let mut out = Vec::new();
        self.collect_requirements(&mut out);
        out
    }

    fn collect_requirements(&self, out: &mut Vec<(ActionKind, ComponentKind)>) {
        match self {
            Action::Multiple { actions } => {
                for action in actions {
                    action.collect_requirements(out);
                }
            }
            other => {
                if let Some(required) = other.kind().required_component() {
                    out.push((other.kind(), required));
                }
            }
        }
    }

    /// Run the action on `entity`.
    pub fn invoke(&self, entity: EntityId, level: &mut Level) {
        if self.is_empty() {
            return;
        }
        if !level.enter_action() {
            log::warn!(
                "action nesting deeper than {} on entity {}, cut off at {:?}",
                MAX_ACTION_DEPTH,
                entity,
                self.kind()
            );
            return;
        }
        self.apply(entity, level);
        level.leave_action();
    }

    fn apply(&self, entity: EntityId, level: &mut Level) {
        match self {
            Action::Empty => {}
            Action::Physics { intent } => {
                if !level.push_intent(entity, *intent) {
                    log::warn!("physics action: entity {} has no active physics", entity);
                }
            }
            Action::Score { points } => level.add_score(*points),
            Action::State { index } => {
                if let Err(err) = level.set_state(entity, *index) {
                    log::warn!("state action ignored: {}", err);
                }
            }
            Action::Entity { target, action } => match target {
                Some(target) if level.entity(*target).is_some() => action.invoke(*target, level),
                Some(target) => log::warn!("entity action: target {} does not exist", target),
                None => log::warn!("entity action on {} has no target", entity),
            },
            Action::Texture { index } => {
                let selected = level
                    .entity_mut(entity)
                    .and_then(|e| e.active_state_mut())
                    .and_then(|s| s.texture_mut())
                    .map(|t| t.select(*index));
                match selected {
                    Some(true) => {}
                    Some(false) => log::warn!("texture action: entity {} has no texture {}", entity, index),
                    None => log::warn!("texture action: entity {} has no active texture", entity),
                }
            }
            Action::Sound { index } => {
                if !level.play_sound(entity, *index) {
                    log::warn!("sound action: entity {} has no sound {}", entity, index);
                }
            }
            Action::Remove => level.queue_despawn(entity),
            Action::Multiple { actions } => {
                for action in actions {
                    action.invoke(entity, level);
                }
            }
        }
    }
}
