pub mod config;

pub use config::{EngineConfig, CONFIG_ENV_VAR};
