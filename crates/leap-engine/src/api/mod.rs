pub mod config;
pub mod error;
pub mod types;

pub use config::LevelConfig;
pub use error::LevelError;
pub use types::{Contact, EntityId, Side, SoundEvent};
