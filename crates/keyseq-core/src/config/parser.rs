// Keyseq Config Parser - TOML with Serde
// Loads the trigger table and host settings from a TOML file

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::buffer::DEFAULT_CAPACITY;
use crate::engine::{EngineConfig, EngineError, SequenceEngine};
use crate::input::{DeviceFilter, KeyEventFilter};
use crate::key::key_from_name;
use crate::symbol::{single_symbol, symbols_of};
use crate::translator::KeyCodeSet;
use crate::trigger::{default_triggers, TriggerError, TriggerTable};
use crate::KeyCode;

/// Default `poll(2)` timeout of the host loop (milliseconds)
pub const DEFAULT_POLL_TIMEOUT_MS: i32 = 100;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key name for {field}: {name:?}")]
    InvalidKey { field: &'static str, name: String },

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Trigger #{index} output must be exactly one character, got {output:?}")]
    InvalidOutput { index: usize, output: String },

    #[error("Invalid trigger table: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Invalid engine settings: {0}")]
    Engine(#[from] EngineError),
}

/// Root TOML table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub engine: Option<EngineToml>,

    #[serde(default)]
    pub events: Option<EventsToml>,

    #[serde(default)]
    pub general: Option<GeneralToml>,

    #[serde(default)]
    pub devices: Option<DevicesToml>,

    #[serde(default)]
    pub delays: Option<DelayToml>,

    /// `[[trigger]]` entries in declaration order
    #[serde(default, rename = "trigger")]
    pub triggers: Option<Vec<TriggerToml>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineToml {
    /// Rolling buffer capacity
    pub capacity: Option<usize>,
    /// "evdev" or "mac"
    pub keycodes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsToml {
    /// "key-down" or "key-down-and-repeat"
    pub filter: Option<String>,
    /// Timeout passed to the poll loop
    pub poll_timeout_ms: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralToml {
    /// Key that stops keyseq immediately
    pub emergency_eject_key: Option<String>,
    /// Key that clears the buffer (still typed normally)
    pub reset_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevicesToml {
    /// Explicit device names/paths to use
    #[serde(default)]
    pub only: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelayToml {
    pub key_pre_delay_ms: Option<u64>,
    pub key_post_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerToml {
    pub sequence: String,
    pub output: String,
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub capacity: usize,
    pub code_set: KeyCodeSet,
    pub event_filter: KeyEventFilter,
    pub triggers: TriggerTable,
    pub emergency_eject_key: Option<KeyCode>,
    pub reset_key: Option<KeyCode>,
    pub device_filter: DeviceFilter,
    pub key_pre_delay_ms: u64,
    pub key_post_delay_ms: u64,
    pub poll_timeout_ms: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            code_set: KeyCodeSet::default(),
            event_filter: KeyEventFilter::default(),
            triggers: default_triggers(),
            emergency_eject_key: None,
            reset_key: None,
            device_filter: DeviceFilter::autodetect(),
            key_pre_delay_ms: 0,
            key_post_delay_ms: 0,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/keyseq/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyseq").join("config.toml"))
    }

    /// Load the default config file, or built-in defaults if it is absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_toml_path(path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Engine construction parameters
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            capacity: self.capacity,
            code_set: self.code_set,
            triggers: self.triggers.clone(),
        }
    }

    /// Build the sequence engine described by this config
    pub fn build_engine(&self) -> Result<SequenceEngine, ConfigError> {
        Ok(SequenceEngine::new(self.engine_config())?)
    }
}

impl ConfigToml {
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(engine) = &self.engine {
            if let Some(capacity) = engine.capacity {
                config.capacity = capacity;
            }
            if let Some(keycodes) = &engine.keycodes {
                config.code_set = keycodes.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "engine.keycodes",
                    value: keycodes.clone(),
                })?;
            }
        }

        if let Some(events) = &self.events {
            if let Some(filter) = &events.filter {
                config.event_filter = filter.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "events.filter",
                    value: filter.clone(),
                })?;
            }
            if let Some(timeout) = events.poll_timeout_ms {
                if timeout < 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "events.poll_timeout_ms",
                        value: timeout.to_string(),
                    });
                }
                config.poll_timeout_ms = timeout;
            }
        }

        if let Some(general) = &self.general {
            config.emergency_eject_key =
                parse_optional_key("general.emergency_eject_key", &general.emergency_eject_key)?;
            config.reset_key = parse_optional_key("general.reset_key", &general.reset_key)?;
        }

        if let Some(devices) = &self.devices {
            config.device_filter = DeviceFilter::new(devices.only.clone());
        }

        if let Some(delays) = &self.delays {
            config.key_pre_delay_ms = delays.key_pre_delay_ms.unwrap_or(0);
            config.key_post_delay_ms = delays.key_post_delay_ms.unwrap_or(0);
        }

        if let Some(entries) = &self.triggers {
            let mut table = TriggerTable::new();
            for (index, entry) in entries.iter().enumerate() {
                let output =
                    single_symbol(&entry.output).ok_or_else(|| ConfigError::InvalidOutput {
                        index,
                        output: entry.output.clone(),
                    })?;
                table.push(symbols_of(&entry.sequence), output)?;
            }
            log::debug!("loaded {} trigger(s) from config", table.len());
            config.triggers = table;
        }

        // Reject tables the engine would refuse before anything is grabbed.
        SequenceEngine::new(config.engine_config())?;

        Ok(config)
    }
}

fn parse_optional_key(
    field: &'static str,
    name: &Option<String>,
) -> Result<Option<KeyCode>, ConfigError> {
    name.as_deref()
        .map(|n| {
            key_from_name(n).ok_or_else(|| ConfigError::InvalidKey {
                field,
                name: n.to_string(),
            })
        })
        .transpose()
}
