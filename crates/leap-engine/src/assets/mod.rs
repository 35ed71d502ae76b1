pub mod manifest;
pub mod registry;

pub use manifest::AssetManifest;
pub use registry::ResourceRegistry;
