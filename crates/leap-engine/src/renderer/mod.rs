pub mod instance;
pub mod traits;

pub use instance::{RenderBuffer, RenderInstance};
pub use traits::{DrawSurface, RecordingSurface};
