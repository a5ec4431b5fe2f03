pub mod env;
mod loader;

pub use env::{AppConfig, ConfigError, DirectoryConfig, ListConfig, LoggingConfig};
pub use loader::load_config;
