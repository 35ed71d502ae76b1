pub mod actions;
pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use actions::{Action, ActionKind};
pub use api::config::LevelConfig;
pub use api::error::LevelError;
pub use api::types::{Contact, EntityId, Side, SoundEvent};
pub use components::component::{Component, ComponentKind};
pub use components::entity::Entity;
pub use components::input::{InputBinding, InputComponent};
pub use components::physics::{
    CollisionReaction, JumpState, MoveHook, MovementType, PhysicsComponent, PhysicsIntent,
};
pub use components::sound::SoundComponent;
pub use components::sprite::{AtlasId, BlendMode, Sprite, TextureComponent};
pub use components::state::State;
pub use components::timer::TimerComponent;
pub use core::geometry::Rect;
pub use core::grid::SpatialGrid;
pub use core::level::Level;
pub use core::runner::LevelRunner;
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use systems::physics::MoveOutcome;
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use renderer::traits::{DrawSurface, RecordingSurface};
pub use input::queue::{InputEvent, InputQueue, KeyboardState};
pub use assets::manifest::AssetManifest;
pub use assets::registry::ResourceRegistry;
pub use bridge::document::{EntityDocument, LevelDocument, StateDocument};
