use std::path::PathBuf;

use crate::env::Environment;
use crate::resolve::Resolver;
use crate::store::Store;
use crate::types::{ConfigFormat, KeyReplacer};

/// Builder for a [`Resolver`].
///
/// Each method sets one or more fields and options apply in call order, so the
/// last call touching a field wins. Combinations are not validated: calling
/// both [`config_file`](Self::config_file) and
/// [`optional_config_file`](Self::optional_config_file) keeps the path and the
/// missing-file policy of whichever came last.
#[derive(Default)]
pub struct ResolverBuilder {
    resolver: Resolver,
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }
}

impl ResolverBuilder {
    /// Use a caller-provided store instead of a fresh one, e.g. to share
    /// configuration between resolvers or to pre-seed defaults.
    pub fn store(mut self, store: Store) -> Self {
        self.resolver.store = Some(store);
        self
    }

    /// Look up every flag name in the environment.
    pub fn env(mut self) -> Self {
        self.resolver.bind_env = true;
        self
    }

    /// Like [`env`](Self::env), with variable names prefixed by `prefix`
    /// (`PREFIX_KEY`).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.resolver.bind_env = true;
        self.resolver.env_prefix = Some(prefix.to_string());
        self
    }

    /// Like [`env`](Self::env), rewriting variable names with `replacer`.
    pub fn env_key_replacer(mut self, replacer: KeyReplacer) -> Self {
        self.resolver.bind_env = true;
        self.resolver.env_key_replacer = Some(replacer);
        self
    }

    /// Read a config file. Any failure, including a missing file, is an error.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolver.config_file = Some(path.into());
        self.resolver.allow_missing_config = false;
        self
    }

    /// Read a config file if it exists. Other failures are still errors.
    pub fn optional_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolver.config_file = Some(path.into());
        self.resolver.allow_missing_config = true;
        self
    }

    /// Parse the config file as `format` regardless of its extension.
    pub fn config_format(mut self, format: ConfigFormat) -> Self {
        self.resolver.config_format = Some(format);
        self
    }

    /// Read environment variables from `environment` instead of the snapshot
    /// the store took of the process environment. Applies to explicit
    /// `Store::bind_env` bindings too, with or without [`env`](Self::env).
    pub fn environment(mut self, environment: Environment) -> Self {
        self.resolver.environment = Some(environment);
        self
    }

    pub fn build(self) -> Resolver {
        self.resolver
    }
}
