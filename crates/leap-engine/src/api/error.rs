use crate::api::types::EntityId;
use crate::components::component::ComponentKind;

/// Configuration errors surfaced to the caller or to tooling.
///
/// Absence conditions (a missing target entity or component when an action
/// runs) are not errors: they are logged and ignored.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("entity {entity} has no state {index} (it has {len} states)")]
    InvalidStateIndex {
        entity: EntityId,
        index: usize,
        len: usize,
    },

    #[error("state already holds a {kind:?} component")]
    DuplicateComponent { kind: ComponentKind },

    #[error("{kind} requires a {required:?} component in the same state")]
    MissingRequiredComponent {
        kind: String,
        required: ComponentKind,
    },

    #[error("entity {0} already exists in the level")]
    DuplicateEntity(EntityId),

    #[error("entity {0} does not exist in the level")]
    UnknownEntity(EntityId),

    #[error("entity {0} has no states")]
    EmptyStates(EntityId),

    #[error("entity {entity} is too small ({min_extent}) for movement epsilon {epsilon}")]
    EntityTooSmall {
        entity: EntityId,
        min_extent: f32,
        epsilon: f32,
    },

    #[error("invalid level configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),
}
