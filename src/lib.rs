//! Resolve command-line flags from defaults, a config file and environment
//! variables, then read every setting from the flags.
//!
//! Flagbind binds a parsed flag set into a small layered store, adds the
//! environment and a config file as further layers, and writes the winning
//! value for each flag back into the flag set. Code after that point reads
//! flags only, and never needs to know where a value came from.
//!
//! ```ignore
//! let mut flags = FlagSet::from_clap(&cmd, &matches)?;
//! Resolver::builder()
//!     .env_prefix("MYAPP")
//!     .optional_config_file("myapp.yml")
//!     .build()
//!     .init(&mut flags)?;
//! let port = flags.get_i64("port");
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Flag default      compiled into the flag definition
//!        ↑ overridden by
//! Config file       .config_file() / .optional_config_file()
//!        ↑ overridden by
//! Environment       .env() / .env_prefix() / .env_key_replacer()
//!        ↑ overridden by
//! Command line      flags the user actually passed
//! ```
//!
//! The order is fixed; no combination of options changes it. Precedence is
//! owned entirely by the [`Store`]: the resolver asks which value wins for a
//! flag name and copies it into the flag. A winning value whose text is empty
//! is never copied, so an empty environment variable or config entry cannot
//! blank out a flag.
//!
//! # Config files
//!
//! The format follows the extension: `.toml`, `.yaml`/`.yml` or `.json`
//! (override with [`config_format()`](ResolverBuilder::config_format)). Every
//! top-level key is a candidate value for the flag of the same name; nested
//! tables are reachable with dotted names such as `database.url`. There is no
//! schema.
//!
//! Use [`config_file()`](ResolverBuilder::config_file) when the file must exist
//! and [`optional_config_file()`](ResolverBuilder::optional_config_file) when a
//! missing file just means "no file layer". A file that exists but cannot be
//! read or parsed is an error either way.
//!
//! # Environment variables
//!
//! With the environment enabled, every flag name is looked up. Names are
//! uppercased and optionally prefixed, then rewritten by a [`KeyReplacer`]:
//!
//! | Options | Flag | Variable |
//! |---------|------|----------|
//! | `.env()` | `port` | `PORT` |
//! | `.env_prefix("myapp")` | `port` | `MYAPP_PORT` |
//! | `.env_prefix("myapp")` + replacer `-` → `_` | `log-level` | `MYAPP_LOG_LEVEL` |
//!
//! Lookups read an [`Environment`] snapshot rather than the live process
//! environment; pass one with [`environment()`](ResolverBuilder::environment)
//! to make resolution deterministic.
//!
//! # Any flag parser
//!
//! The resolver works against the [`Flags`] trait: enumerate flags with their
//! defaults, and set a value from text. [`FlagSet`] implements it, and with the
//! `clap` feature (on by default) `FlagSet::from_clap` builds one from clap
//! matches. To go without clap:
//!
//! ```toml
//! flagbind = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! [`Resolver::init`] returns a [`FlagbindError`]: an invalid flag set, a
//! required config file that is missing, or a config file that failed to load.
//! Any error ends the call before flags are written, so flags are either fully
//! resolved or exactly as parsed. Progress is reported through `tracing`
//! events; the library never installs a subscriber.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod env;
mod file;
mod flags;
pub(crate) mod merge;
mod resolve;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::ResolverBuilder;
#[cfg(feature = "clap")]
pub use cli::ConfigFileArgs;
pub use env::Environment;
pub use error::{FlagError, FlagbindError, LoadError};
pub use flags::{Flag, FlagKind, FlagSet, FlagState, Flags};
pub use resolve::Resolver;
pub use store::Store;
pub use types::{ConfigFormat, KeyReplacer, Layer};
