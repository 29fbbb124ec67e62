pub mod env;
mod loader;

pub use env::{AppConfig, ArtifactConfig, DirectoryConfig, PreprocessConfig};
pub use loader::load_config;
