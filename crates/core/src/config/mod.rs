//! Configuration loading and management.
//!
//! Configuration lives in a `.reel-kit/` directory: `config.toml` for global
//! settings and provider tables, `templates/*.md` for motion-prompt
//! templates.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
