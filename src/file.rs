//! Config file loading.
//!
//! The format is chosen by extension (`.toml`, `.yaml`/`.yml`, `.json`) unless
//! one is given explicitly, and is decided **before** the file is read: an
//! unsupported extension is a load error even when the file does not exist.
//!
//! Every format is parsed into a `toml::Table` with lower-cased keys. YAML and
//! JSON go through `serde_json::Value` first; nulls are dropped since TOML has
//! no null. The top-level value must be a mapping, except that an empty YAML
//! document reads as an empty table.

use std::path::Path;

use toml::{Table, Value};

use crate::error::{FlagbindError, LoadError};
use crate::merge::lowercase_keys;
use crate::types::ConfigFormat;

/// Read and parse a config file.
///
/// A missing file is reported as [`FlagbindError::ConfigFileMissing`]; every
/// other failure as [`FlagbindError::ConfigFileLoadError`]. The caller decides
/// whether a missing file is tolerable.
pub fn load_config_file(
    path: &Path,
    format: Option<ConfigFormat>,
) -> Result<Table, FlagbindError> {
    let load_error = |source: LoadError| FlagbindError::ConfigFileLoadError {
        path: path.to_path_buf(),
        source,
    };

    let format = match format {
        Some(format) => format,
        None => ConfigFormat::from_path(path).map_err(load_error)?,
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FlagbindError::ConfigFileMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(load_error(LoadError::Io(e))),
    };

    parse_config(&content, format).map_err(load_error)
}

/// Parse config text of the given format into a table with lower-cased keys.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Table, LoadError> {
    let table = match format {
        ConfigFormat::Toml => toml::from_str::<Table>(content)?,
        ConfigFormat::Yaml if content.trim().is_empty() => Table::new(),
        ConfigFormat::Yaml => {
            let value: serde_json::Value = serde_yaml::from_str(content)?;
            json_to_table(value)?
        }
        ConfigFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(content)?;
            json_to_table(value)?
        }
    };
    Ok(lowercase_keys(table))
}

fn json_to_table(value: serde_json::Value) -> Result<Table, LoadError> {
    match value {
        serde_json::Value::Null => Ok(Table::new()),
        serde_json::Value::Object(map) => Ok(object_to_table(map)),
        _ => Err(LoadError::NotATable),
    }
}

fn object_to_table(map: serde_json::Map<String, serde_json::Value>) -> Table {
    map.into_iter()
        .filter_map(|(key, value)| json_to_toml(value).map(|v| (key, v)))
        .collect()
}

fn json_to_toml(value: serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Boolean(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Integer(i)),
            None => n.as_f64().map(Value::Float),
        },
        serde_json::Value::String(s) => Some(Value::String(s)),
        serde_json::Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(json_to_toml).collect(),
        )),
        serde_json::Value::Object(map) => Some(Value::Table(object_to_table(map))),
    }
}
