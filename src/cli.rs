//! Clap adapter for flagbind.
//!
//! The resolver only knows the [`Flags`](crate::Flags) capability. This module,
//! compiled with the `clap` Cargo feature (on by default), turns a clap
//! [`Command`] and its parsed [`ArgMatches`] into a [`FlagSet`] the resolver
//! can bind and write back into:
//!
//! ```ignore
//! let cmd = Cli::command();
//! let matches = cmd.clone().get_matches();
//! let mut flags = FlagSet::from_clap(&cmd, &matches)?;
//! Resolver::builder().env().build().init(&mut flags)?;
//! let host = flags.get("host");
//! ```
//!
//! It also offers [`ConfigFileArgs`], a clap derive struct that gives an app
//! `--config <FILE>` and `--config-optional` without boilerplate.

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Args, Command};

use crate::builder::ResolverBuilder;
use crate::error::FlagError;
use crate::flags::{Flag, FlagKind, FlagSet};

impl FlagSet {
    /// Build a flag set from a clap command and the matches parsed for it.
    ///
    /// Every named (non-positional) argument becomes a flag named after its
    /// long name, or its id when it has none. Help and version arguments are
    /// skipped. The flag kind follows the argument's action: `SetTrue` and
    /// `SetFalse` are booleans, `Count` is an integer, `Append` a list, and
    /// everything else a string. A flag counts as changed only when its value
    /// came from the command line; a value clap read from the argument's
    /// environment variable is carried over without marking the flag changed.
    ///
    /// `matches` must belong to `cmd` (for a subcommand, pass the subcommand
    /// and its own matches).
    pub fn from_clap(cmd: &Command, matches: &ArgMatches) -> Result<FlagSet, FlagError> {
        let mut flags = FlagSet::new(cmd.get_name());

        for arg in cmd.get_arguments() {
            if arg.is_positional() {
                continue;
            }
            let kind = match arg.get_action() {
                ArgAction::Help
                | ArgAction::HelpShort
                | ArgAction::HelpLong
                | ArgAction::Version => continue,
                ArgAction::SetTrue | ArgAction::SetFalse => FlagKind::Bool,
                ArgAction::Count => FlagKind::Int,
                ArgAction::Append => FlagKind::List,
                _ => FlagKind::String,
            };

            let id = arg.get_id().as_str();
            let name = arg.get_long().unwrap_or(id);
            let usage = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            let default = default_text(arg, kind);

            flags.add(Flag::new(name, kind, &default, &usage))?;

            let Some(value) = current_text(matches, id, kind) else {
                continue;
            };
            match matches.value_source(id) {
                Some(ValueSource::CommandLine) => flags.set(name, &value)?,
                Some(ValueSource::EnvVariable) => flags.preset(name, &value)?,
                _ => {}
            }
        }

        Ok(flags)
    }
}

fn join_os(values: impl Iterator<Item = impl AsRef<OsStr>>) -> String {
    values
        .map(|v| v.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// The argument's default as flag text. clap only fills in the implicit
/// defaults of flag-like actions when the command is built, so those are
/// supplied here.
fn default_text(arg: &Arg, kind: FlagKind) -> String {
    let text = join_os(arg.get_default_values().iter());
    if !text.is_empty() {
        return text;
    }
    match (arg.get_action(), kind) {
        (ArgAction::SetFalse, _) => "true".into(),
        (_, FlagKind::Bool) => "false".into(),
        (_, FlagKind::Int) => "0".into(),
        _ => text,
    }
}

fn current_text(matches: &ArgMatches, id: &str, kind: FlagKind) -> Option<String> {
    match kind {
        FlagKind::Bool => matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .map(bool::to_string),
        FlagKind::Int => matches
            .try_get_one::<u8>(id)
            .ok()
            .flatten()
            .map(u8::to_string),
        _ => matches.try_get_raw(id).ok().flatten().map(join_os),
    }
}

/// Clap-derived args selecting the config file.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     config: ConfigFileArgs,
/// }
///
/// let resolver = cli.config.apply(Resolver::builder().env()).build();
/// ```
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigFileArgs {
    /// Read settings from this config file (toml, yaml or json).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not fail when the config file does not exist.
    #[arg(long, requires = "config")]
    pub config_optional: bool,
}

impl ConfigFileArgs {
    /// Forward the selected file to the builder. Without `--config` the
    /// builder is returned unchanged.
    pub fn apply(&self, builder: ResolverBuilder) -> ResolverBuilder {
        match (&self.config, self.config_optional) {
            (Some(path), true) => builder.optional_config_file(path),
            (Some(path), false) => builder.config_file(path),
            (None, _) => builder,
        }
    }
}
