use std::path::PathBuf;
use thiserror::Error;

use crate::flags::FlagKind;

#[derive(Debug, Error)]
pub enum FlagbindError {
    #[error("Invalid flag binding in '{set}': {reason}")]
    InvalidFlagBinding { set: String, reason: String },

    #[error("Config file not found: {path}")]
    ConfigFileMissing { path: PathBuf },

    #[error("Failed to load config file {path}: {source}")]
    ConfigFileLoadError { path: PathBuf, source: LoadError },

    #[error("Failed to decode settings: {0}")]
    Unmarshal(#[from] toml::de::Error),
}

impl FlagbindError {
    /// True when the error only says the config file does not exist.
    pub fn is_missing_config(&self) -> bool {
        matches!(self, FlagbindError::ConfigFileMissing { .. })
    }
}

/// Why a config file (or inline config text) could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported config format '{0}' (expected toml, yaml, yml or json)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top-level value must be a mapping")]
    NotATable,
}

/// Errors raised by a [`FlagSet`](crate::FlagSet) when defining or assigning flags.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlagError {
    #[error("flag redefined: {0}")]
    Redefined(String),

    #[error("unknown flag: {0}")]
    Unknown(String),

    #[error("invalid value '{value}' for flag '{name}': expected {kind}")]
    InvalidValue {
        name: String,
        value: String,
        kind: FlagKind,
    },
}
