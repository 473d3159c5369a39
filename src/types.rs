use std::fmt;
use std::path::Path;

use crate::error::LoadError;

/// A source of values in the [`Store`](crate::Store), in ascending precedence.
///
/// `FlagDefault` is the compiled-in default of a bound flag. It is consulted by
/// [`Store::get`](crate::Store::get) but never makes a key count as set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    FlagDefault,
    Default,
    Config,
    Env,
    Flag,
    Override,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::FlagDefault => "flag default",
            Layer::Default => "default",
            Layer::Config => "config file",
            Layer::Env => "environment",
            Layer::Flag => "command line",
            Layer::Override => "override",
        };
        f.write_str(name)
    }
}

/// Render a value as flag text.
///
/// Arrays join their items with `,`; tables have no text form and render empty.
pub fn value_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(d) => d.to_string(),
        toml::Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        toml::Value::Table(_) => String::new(),
    }
}

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Match a file extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext).ok_or(LoadError::UnsupportedFormat(ext))
    }
}

/// Rewrites a settings key into an environment variable name, e.g. `-` to `_`.
///
/// Pairs are tried in the order given at each position of the input; the first
/// pair whose pattern matches is applied and scanning resumes after the match.
/// Replacements are never rescanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyReplacer {
    pairs: Vec<(String, String)>,
}

impl KeyReplacer {
    pub fn new<I, F, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, T)>,
        F: Into<String>,
        T: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .filter(|(from, _)| !from.is_empty())
            .collect();
        Self { pairs }
    }

    pub fn replace(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        'scan: while let Some(ch) = rest.chars().next() {
            for (from, to) in &self.pairs {
                if let Some(after) = rest.strip_prefix(from.as_str()) {
                    out.push_str(to);
                    rest = after;
                    continue 'scan;
                }
            }
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        out
    }
}
