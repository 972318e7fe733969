// Keyseq Config
// TOML configuration for the engine and the evdev host

#[cfg(feature = "pure-rust")]
pub mod parser;

#[cfg(feature = "pure-rust")]
pub use parser::{Config, ConfigError, ConfigToml, TriggerToml, DEFAULT_POLL_TIMEOUT_MS};
