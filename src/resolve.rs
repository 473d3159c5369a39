//! Resolution: bind flags, environment and config file into the store, then
//! write the winning values back into the flags.
//!
//! Steps, strictly in order:
//!
//! 1. Bind every flag set (defaults lowest, explicit values highest)
//! 2. Enable environment lookup, if configured
//! 3. Read the config file, if configured
//! 4. Copy each flag's winning value back into the flag when the store has a
//!    value for it and that value's text is non-empty
//!
//! Precedence lives entirely in the [`Store`]; step 4 only asks which value
//! wins. A failure in any step ends the call before write-back, so flags are
//! either fully resolved or left exactly as parsed.

use std::path::PathBuf;

use crate::env::Environment;
use crate::error::FlagbindError;
use crate::flags::Flags;
use crate::store::Store;
use crate::types::{ConfigFormat, KeyReplacer};

/// Coordinates one resolution pass over one or more flag sets.
///
/// ```ignore
/// let mut flags = FlagSet::from_clap(&cmd, &matches);
/// Resolver::builder()
///     .env_prefix("MYAPP")
///     .env_key_replacer(KeyReplacer::new([("-", "_")]))
///     .optional_config_file("myapp.yml")
///     .build()
///     .init(&mut flags)?;
/// ```
#[derive(Default)]
pub struct Resolver {
    pub(crate) store: Option<Store>,
    pub(crate) bind_env: bool,
    pub(crate) env_prefix: Option<String>,
    pub(crate) env_key_replacer: Option<KeyReplacer>,
    pub(crate) config_file: Option<PathBuf>,
    pub(crate) allow_missing_config: bool,
    pub(crate) config_format: Option<ConfigFormat>,
    pub(crate) environment: Option<Environment>,
}

impl Resolver {
    /// A resolver with no options: flags are bound, nothing else is consulted.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying store, created on first use.
    pub fn store(&mut self) -> &mut Store {
        self.store.get_or_insert_with(Store::new)
    }

    /// Take the store out, e.g. to query it later or hand it to another resolver.
    pub fn into_store(self) -> Store {
        self.store.unwrap_or_default()
    }

    /// Resolve a single flag set. See [`init_all`](Self::init_all).
    pub fn init(&mut self, flags: &mut dyn Flags) -> Result<(), FlagbindError> {
        self.init_all(&mut [flags])
    }

    /// Resolve every flag set against flags, environment, config file and
    /// defaults, writing the winners back into the flags.
    pub fn init_all(&mut self, flag_sets: &mut [&mut dyn Flags]) -> Result<(), FlagbindError> {
        let store = self.store.get_or_insert_with(Store::new);

        // 1: flags as a source
        for set in flag_sets.iter() {
            store.bind_flags(&**set)?;
        }

        // 2: environment
        if let Some(environment) = &self.environment {
            store.set_environment(environment.clone());
        }
        if self.bind_env {
            if let Some(prefix) = self.env_prefix.as_deref() {
                store.set_env_prefix(prefix);
            }
            if let Some(replacer) = &self.env_key_replacer {
                store.set_env_key_replacer(replacer.clone());
            }
            store.automatic_env();
            tracing::debug!(prefix = ?self.env_prefix, "environment lookup enabled");
        }

        // 3: config file
        if let Some(path) = self
            .config_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
        {
            match store.read_config_file(path, self.config_format) {
                Ok(()) => {}
                Err(e) if e.is_missing_config() && self.allow_missing_config => {
                    tracing::debug!(path = %path.display(), "optional config file not found");
                }
                Err(e) => return Err(e),
            }
        }

        // 4: write back
        for set in flag_sets.iter_mut() {
            for state in set.flags() {
                if !store.is_set(&state.name) {
                    continue;
                }
                let value = store.get_string(&state.name);
                if value.is_empty() {
                    continue;
                }
                match set.set_value(&state.name, &value) {
                    Ok(()) => tracing::trace!(
                        set = set.set_name(),
                        flag = %state.name,
                        source = ?store.source(&state.name),
                        "resolved flag"
                    ),
                    Err(e) => tracing::warn!(
                        set = set.set_name(),
                        flag = %state.name,
                        error = %e,
                        "flag rejected resolved value"
                    ),
                }
            }
        }

        Ok(())
    }
}
