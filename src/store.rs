//! The layered value store.
//!
//! A [`Store`] answers one question: which value wins for a key. Layers, from
//! highest to lowest precedence:
//!
//! ```text
//! Override      .set()
//!    ↓
//! Flag          bound flags that were explicitly supplied
//!    ↓
//! Env           .bind_env() bindings, then automatic lookup
//!    ↓
//! Config        the config file (dotted keys reach into nested tables)
//!    ↓
//! Default       .set_default()
//!    ↓
//! FlagDefault   compiled-in defaults of bound flags
//! ```
//!
//! Keys are case-insensitive. [`is_set`](Store::is_set) ignores the
//! `FlagDefault` layer: a flag's own default never makes its key "set", which
//! is what lets the resolver leave untouched flags alone.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::env::{EnvBinding, Environment};
use crate::error::{FlagbindError, LoadError};
use crate::file;
use crate::flags::{FlagKind, Flags};
use crate::merge::{leaf_keys, merge_into, table_get, table_set};
use crate::types::{ConfigFormat, KeyReplacer, Layer, value_text};

#[derive(Debug, Clone)]
pub struct Store {
    overrides: Table,
    flags: HashMap<String, Value>,
    flag_defaults: HashMap<String, Value>,
    flag_kinds: HashMap<String, FlagKind>,
    env: EnvBinding,
    environment: Environment,
    config: Table,
    config_file: Option<PathBuf>,
    defaults: Table,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// An empty store reading a snapshot of the process environment taken now.
    pub fn new() -> Self {
        Self::with_environment(Environment::from_process())
    }

    /// An empty store reading the given environment snapshot.
    pub fn with_environment(environment: Environment) -> Self {
        Self {
            overrides: Table::new(),
            flags: HashMap::new(),
            flag_defaults: HashMap::new(),
            flag_kinds: HashMap::new(),
            env: EnvBinding::default(),
            environment,
            config: Table::new(),
            config_file: None,
            defaults: Table::new(),
        }
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Set a default value. Dotted keys create nested tables.
    pub fn set_default<V: Into<Value>>(&mut self, key: &str, value: V) {
        table_set(&mut self.defaults, &key.to_lowercase(), value.into());
    }

    /// Set an override, which beats every other layer.
    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) {
        table_set(&mut self.overrides, &key.to_lowercase(), value.into());
    }

    /// Register a flag set as a source of values.
    ///
    /// Each flag's default becomes its key's lowest-precedence value; a flag
    /// that was explicitly supplied also provides its value at the `Flag`
    /// layer. Rebinding a key replaces what an earlier set bound for it.
    ///
    /// Fails without touching the store if a flag has an empty name or two
    /// flags in the set share a key.
    pub fn bind_flags(&mut self, flags: &dyn Flags) -> Result<(), FlagbindError> {
        let set = flags.set_name();
        let states = flags.flags();

        let mut seen = HashSet::new();
        for state in &states {
            if state.name.trim().is_empty() {
                return Err(FlagbindError::InvalidFlagBinding {
                    set: set.to_string(),
                    reason: "flag with an empty name".into(),
                });
            }
            if !seen.insert(state.name.to_lowercase()) {
                return Err(FlagbindError::InvalidFlagBinding {
                    set: set.to_string(),
                    reason: format!("flag '{}' defined more than once", state.name),
                });
            }
        }

        for state in states {
            let key = state.name.to_lowercase();
            let typed = |text: &str| {
                state
                    .kind
                    .parse(text)
                    .unwrap_or_else(|| Value::String(text.to_string()))
            };
            self.flag_defaults.insert(key.clone(), typed(&state.default));
            if state.changed {
                self.flags.insert(key.clone(), typed(&state.value));
            } else {
                self.flags.remove(&key);
            }
            self.flag_kinds.insert(key, state.kind);
        }

        tracing::debug!(set, count = seen.len(), "bound flag set");
        Ok(())
    }

    /// Prefix for automatically derived environment variable names. An empty
    /// prefix is ignored.
    pub fn set_env_prefix(&mut self, prefix: &str) {
        if !prefix.is_empty() {
            self.env.prefix = Some(prefix.to_string());
        }
    }

    pub fn set_env_key_replacer(&mut self, replacer: KeyReplacer) {
        self.env.replacer = Some(replacer);
    }

    /// Check the environment for every key lookup.
    pub fn automatic_env(&mut self) {
        self.env.automatic = true;
    }

    /// Whether a variable that is set but empty counts as a value (default: no).
    pub fn allow_empty_env(&mut self, allow: bool) {
        self.env.allow_empty = allow;
    }

    /// Bind `key` to specific environment variables, tried in order. With no
    /// names, the name derived from the current prefix is used.
    pub fn bind_env(&mut self, key: &str, names: &[&str]) {
        let key = key.to_lowercase();
        let names = if names.is_empty() {
            vec![self.env.merge_with_prefix(&key)]
        } else {
            names.iter().map(|n| n.to_string()).collect()
        };
        self.env.explicit.insert(key, names);
    }

    /// The variable automatic lookup consults for `key`.
    pub fn env_var_name(&self, key: &str) -> String {
        self.env.var_name(&key.to_lowercase())
    }

    /// Load a config file, replacing the current config layer.
    pub fn read_config_file(
        &mut self,
        path: &Path,
        format: Option<ConfigFormat>,
    ) -> Result<(), FlagbindError> {
        let table = file::load_config_file(path, format)?;
        tracing::debug!(path = %path.display(), keys = table.len(), "read config file");
        self.config = table;
        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Parse config text, replacing the current config layer.
    pub fn read_config(&mut self, content: &str, format: ConfigFormat) -> Result<(), LoadError> {
        self.config = file::parse_config(content, format)?;
        Ok(())
    }

    /// Parse config text and deep-merge it over the current config layer.
    pub fn merge_config(&mut self, content: &str, format: ConfigFormat) -> Result<(), LoadError> {
        let table = file::parse_config(content, format)?;
        merge_into(&mut self.config, table);
        Ok(())
    }

    /// The file last loaded with [`read_config_file`](Self::read_config_file).
    pub fn config_file_used(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Whether any layer other than flag defaults has a value for `key`.
    pub fn is_set(&self, key: &str) -> bool {
        self.find(key, false).is_some()
    }

    /// The winning value for `key` across all layers.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.find(key, true).map(|(_, value)| value)
    }

    /// Which layer supplies the winning value for `key`.
    pub fn source(&self, key: &str) -> Option<Layer> {
        self.find(key, true).map(|(layer, _)| layer)
    }

    /// The winning value rendered as text; empty when there is none.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(|v| value_text(&v)).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Boolean(b) => Some(b),
            other => match FlagKind::Bool.parse(&value_text(&other))? {
                Value::Boolean(b) => Some(b),
                _ => None,
            },
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Integer(i) => Some(i),
            Value::Float(f) => Some(f as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Float(f) => Some(f),
            Value::Integer(i) => Some(i as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Every key any layer knows about, sorted. Environment variables only
    /// contribute keys bound with [`bind_env`](Self::bind_env).
    pub fn keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        keys.extend(leaf_keys(&self.overrides));
        keys.extend(self.flags.keys().cloned());
        keys.extend(self.flag_defaults.keys().cloned());
        keys.extend(self.env.explicit.keys().cloned());
        keys.extend(leaf_keys(&self.config));
        keys.extend(leaf_keys(&self.defaults));
        keys.into_iter().collect()
    }

    /// The winning value of every key, as a nested table.
    pub fn all_settings(&self) -> Table {
        let mut table = Table::new();
        for key in self.keys() {
            if let Some(value) = self.get(&key) {
                table_set(&mut table, &key, value);
            }
        }
        table
    }

    /// Deserialize [`all_settings`](Self::all_settings) into `T`.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T, FlagbindError> {
        Ok(Value::Table(self.all_settings()).try_into()?)
    }

    fn find(&self, key: &str, include_flag_default: bool) -> Option<(Layer, Value)> {
        let key = key.to_lowercase();

        if let Some(value) = table_get(&self.overrides, &key) {
            return Some((Layer::Override, value.clone()));
        }
        if let Some(value) = self.flags.get(&key) {
            return Some((Layer::Flag, value.clone()));
        }
        if let Some(text) = self.env.lookup(&self.environment, &key) {
            let value = self
                .flag_kinds
                .get(&key)
                .and_then(|kind| kind.parse(text))
                .unwrap_or_else(|| Value::String(text.to_string()));
            return Some((Layer::Env, value));
        }
        if let Some(value) = table_get(&self.config, &key) {
            return Some((Layer::Config, value.clone()));
        }
        if let Some(value) = table_get(&self.defaults, &key) {
            return Some((Layer::Default, value.clone()));
        }
        if include_flag_default && let Some(value) = self.flag_defaults.get(&key) {
            return Some((Layer::FlagDefault, value.clone()));
        }
        None
    }
}
