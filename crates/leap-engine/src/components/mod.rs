pub mod component;
pub mod entity;
pub mod input;
pub mod physics;
pub mod sound;
pub mod sprite;
pub mod state;
pub mod timer;

pub use component::{Component, ComponentKind};
pub use entity::Entity;
pub use state::State;
