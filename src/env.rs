//! Environment variable lookup for the [`Store`](crate::Store).
//!
//! Lookups never touch the process environment directly. They go through an
//! [`Environment`] snapshot, so tests can pass synthetic data instead of
//! `std::env::vars()`.
//!
//! A key maps to a variable name by prepending the prefix (joined with `_`),
//! uppercasing, then applying the [`KeyReplacer`] to the whole name:
//!
//! | Prefix | Replacer | Key | Variable |
//! |--------|----------|-----|----------|
//! | none | none | `port` | `PORT` |
//! | `myapp` | none | `port` | `MYAPP_PORT` |
//! | `myapp` | `-` → `_` | `log-level` | `MYAPP_LOG_LEVEL` |

use std::collections::HashMap;

use crate::types::KeyReplacer;

/// A snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// An environment with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the current process environment. Variables whose name or value
    /// is not valid unicode are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How keys are looked up in the environment.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnvBinding {
    pub prefix: Option<String>,
    pub replacer: Option<KeyReplacer>,
    pub automatic: bool,
    pub allow_empty: bool,
    /// Explicit bindings: lower-cased key to the variable names tried in order.
    pub explicit: HashMap<String, Vec<String>>,
}

impl EnvBinding {
    /// Derive the variable name for `key` from the prefix, without the replacer.
    pub fn merge_with_prefix(&self, key: &str) -> String {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}_{key}").to_uppercase(),
            _ => key.to_uppercase(),
        }
    }

    /// The full variable name for `key`: prefix, uppercase, then replacer.
    pub fn var_name(&self, key: &str) -> String {
        let merged = self.merge_with_prefix(key);
        match &self.replacer {
            Some(replacer) => replacer.replace(&merged),
            None => merged,
        }
    }

    /// Look up `key` (already lower-cased). Explicit bindings are tried before
    /// automatic lookup. Empty values count as unset unless `allow_empty`.
    pub fn lookup<'a>(&self, env: &'a Environment, key: &str) -> Option<&'a str> {
        if let Some(names) = self.explicit.get(key) {
            for name in names {
                if let Some(value) = self.accept(env, name) {
                    return Some(value);
                }
            }
        }
        if self.automatic {
            return self.accept(env, &self.merge_with_prefix(key));
        }
        None
    }

    /// The replacer applies to every name, explicit or derived.
    fn accept<'a>(&self, env: &'a Environment, name: &str) -> Option<&'a str> {
        let name = match &self.replacer {
            Some(replacer) => replacer.replace(name),
            None => name.to_string(),
        };
        env.get(&name)
            .filter(|value| self.allow_empty || !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automatic() -> EnvBinding {
        EnvBinding {
            automatic: true,
            ..EnvBinding::default()
        }
    }

    #[test]
    fn var_name_uppercases_key() {
        assert_eq!(automatic().var_name("example1"), "EXAMPLE1");
    }

    #[test]
    fn var_name_with_prefix() {
        let binding = EnvBinding {
            prefix: Some("myapp".into()),
            ..automatic()
        };
        assert_eq!(binding.var_name("port"), "MYAPP_PORT");
    }

    #[test]
    fn var_name_with_prefix_and_replacer() {
        let binding = EnvBinding {
            prefix: Some("myapp".into()),
            replacer: Some(KeyReplacer::new([("-", "_"), (".", "_")])),
            ..automatic()
        };
        assert_eq!(binding.var_name("log-level"), "MYAPP_LOG_LEVEL");
        assert_eq!(binding.var_name("database.url"), "MYAPP_DATABASE_URL");
    }

    #[test]
    fn empty_prefix_is_ignored() {
        let binding = EnvBinding {
            prefix: Some(String::new()),
            ..automatic()
        };
        assert_eq!(binding.var_name("port"), "PORT");
    }

    #[test]
    fn automatic_lookup_finds_value() {
        let env = Environment::empty().with("PORT", "8080");
        assert_eq!(automatic().lookup(&env, "port"), Some("8080"));
    }

    #[test]
    fn lookup_disabled_without_automatic() {
        let env = Environment::empty().with("PORT", "8080");
        assert_eq!(EnvBinding::default().lookup(&env, "port"), None);
    }

    #[test]
    fn empty_value_is_unset_by_default() {
        let env = Environment::empty().with("PORT", "");
        assert_eq!(automatic().lookup(&env, "port"), None);
    }

    #[test]
    fn empty_value_allowed_when_enabled() {
        let env = Environment::empty().with("PORT", "");
        let binding = EnvBinding {
            allow_empty: true,
            ..automatic()
        };
        assert_eq!(binding.lookup(&env, "port"), Some(""));
    }

    #[test]
    fn explicit_binding_without_automatic() {
        let env = Environment::empty().with("LEGACY_PORT", "9000");
        let mut binding = EnvBinding::default();
        binding
            .explicit
            .insert("port".into(), vec!["APP_PORT".into(), "LEGACY_PORT".into()]);
        assert_eq!(binding.lookup(&env, "port"), Some("9000"));
    }

    #[test]
    fn explicit_binding_wins_over_automatic() {
        let env = Environment::empty()
            .with("PORT", "1")
            .with("SERVICE_PORT", "2");
        let mut binding = automatic();
        binding
            .explicit
            .insert("port".into(), vec!["SERVICE_PORT".into()]);
        assert_eq!(binding.lookup(&env, "port"), Some("2"));
    }

    #[test]
    fn environment_from_iter() {
        let env: Environment = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("B"), Some("2"));
        assert!(!env.is_empty());
    }
}
