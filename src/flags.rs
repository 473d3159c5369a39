//! The flag capability the resolver works against.
//!
//! The resolver needs only two things from a command-line layer: enumerate the
//! defined flags with their defaults, and assign a flag's value from text. The
//! [`Flags`] trait captures exactly that, so any argument parser can take part.
//! [`FlagSet`] is the in-memory implementation; with the `clap` feature it can
//! be built from parsed clap matches (see `FlagSet::from_clap`).

use std::fmt;

use toml::Value;

use crate::error::FlagError;
use crate::types::value_text;

/// The value type a flag holds. Text assigned to a flag must parse as its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagKind {
    #[default]
    String,
    Bool,
    Int,
    Float,
    /// Comma-separated strings.
    List,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagKind::String => "string",
            FlagKind::Bool => "boolean",
            FlagKind::Int => "integer",
            FlagKind::Float => "float",
            FlagKind::List => "list",
        };
        f.write_str(name)
    }
}

impl FlagKind {
    /// Parse flag text into a typed value, or `None` if the text does not fit.
    pub fn parse(self, text: &str) -> Option<Value> {
        match self {
            FlagKind::String => Some(Value::String(text.to_string())),
            FlagKind::Bool => parse_bool(text).map(Value::Boolean),
            FlagKind::Int => text.trim().parse::<i64>().ok().map(Value::Integer),
            FlagKind::Float => text.trim().parse::<f64>().ok().map(Value::Float),
            FlagKind::List if text.is_empty() => Some(Value::Array(vec![])),
            FlagKind::List => Some(Value::Array(
                text.split(',')
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// A point-in-time view of one flag, as handed to the store for binding.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagState {
    pub name: String,
    pub kind: FlagKind,
    pub default: String,
    pub value: String,
    /// Whether the value was explicitly supplied (on the command line or via
    /// [`Flags::set_value`]).
    pub changed: bool,
}

/// A set of flags the resolver can bind and write back into.
pub trait Flags {
    /// Name of the set, used in diagnostics.
    fn set_name(&self) -> &str;

    /// Every defined flag, in definition order.
    fn flags(&self) -> Vec<FlagState>;

    /// Assign a flag's value from text and mark it changed.
    fn set_value(&mut self, name: &str, value: &str) -> Result<(), FlagError>;
}

/// A named, typed setting with a compiled-in default.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    name: String,
    usage: String,
    kind: FlagKind,
    default: String,
    value: String,
    changed: bool,
}

impl Flag {
    /// A flag of any kind with a textual default. The default is checked
    /// against the kind when the flag is added to a [`FlagSet`].
    pub fn new(name: &str, kind: FlagKind, default: &str, usage: &str) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            kind,
            default: default.to_string(),
            value: default.to_string(),
            changed: false,
        }
    }

    pub fn string(name: &str, default: &str, usage: &str) -> Self {
        Self::new(name, FlagKind::String, default, usage)
    }

    pub fn bool(name: &str, default: bool, usage: &str) -> Self {
        Self::new(name, FlagKind::Bool, &default.to_string(), usage)
    }

    pub fn int(name: &str, default: i64, usage: &str) -> Self {
        Self::new(name, FlagKind::Int, &default.to_string(), usage)
    }

    pub fn float(name: &str, default: f64, usage: &str) -> Self {
        Self::new(name, FlagKind::Float, &default.to_string(), usage)
    }

    pub fn list(name: &str, default: &[&str], usage: &str) -> Self {
        Self::new(name, FlagKind::List, &default.join(","), usage)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Parse and store `text` in canonical form, marking the flag changed.
    fn assign(&mut self, text: &str) -> Result<(), FlagError> {
        self.preset(text)?;
        self.changed = true;
        Ok(())
    }

    /// Like [`assign`](Self::assign), but `changed` is left alone.
    fn preset(&mut self, text: &str) -> Result<(), FlagError> {
        let parsed = self.kind.parse(text).ok_or_else(|| FlagError::InvalidValue {
            name: self.name.clone(),
            value: text.to_string(),
            kind: self.kind,
        })?;
        self.value = value_text(&parsed);
        Ok(())
    }

    fn state(&self) -> FlagState {
        FlagState {
            name: self.name.clone(),
            kind: self.kind,
            default: self.default.clone(),
            value: self.value.clone(),
            changed: self.changed,
        }
    }
}

/// An ordered, in-memory set of flags.
///
/// ```ignore
/// let mut flags = FlagSet::new("serve");
/// flags.add(Flag::string("host", "127.0.0.1", "Address to bind"))?;
/// flags.add(Flag::int("port", 8080, "Port to listen on"))?;
/// flags.set("port", "9000")?; // as if `--port 9000` was passed
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagSet {
    name: String,
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Define a flag. Names must be unique within the set and the default must
    /// parse as the flag's kind.
    pub fn add(&mut self, mut flag: Flag) -> Result<(), FlagError> {
        if self.lookup(&flag.name).is_some() {
            return Err(FlagError::Redefined(flag.name));
        }
        let parsed = flag
            .kind
            .parse(&flag.default)
            .ok_or_else(|| FlagError::InvalidValue {
                name: flag.name.clone(),
                value: flag.default.clone(),
                kind: flag.kind,
            })?;
        flag.default = value_text(&parsed);
        flag.value = flag.default.clone();
        self.flags.push(flag);
        Ok(())
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, flag: Flag) -> Result<Self, FlagError> {
        self.add(flag)?;
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Assign a value from text, exactly as if it had been given on the
    /// command line.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        self.flags
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FlagError::Unknown(name.to_string()))?
            .assign(value)
    }

    /// Replace the current value without marking the flag changed, for values
    /// a parser took from somewhere other than the command line.
    pub(crate) fn preset(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        self.flags
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FlagError::Unknown(name.to_string()))?
            .preset(value)
    }

    /// Current value as text.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(Flag::value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(parse_bool)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_list(&self, name: &str) -> Option<Vec<String>> {
        let flag = self.lookup(name)?;
        match flag.kind.parse(&flag.value)? {
            Value::Array(items) => Some(items.iter().map(value_text).collect()),
            other => Some(vec![value_text(&other)]),
        }
    }

    pub fn changed(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(Flag::changed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl Flags for FlagSet {
    fn set_name(&self) -> &str {
        &self.name
    }

    fn flags(&self) -> Vec<FlagState> {
        self.flags.iter().map(Flag::state).collect()
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        self.set(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlagSet {
        FlagSet::new("sample")
            .with(Flag::string("host", "localhost", "Host"))
            .unwrap()
            .with(Flag::int("port", 8080, "Port"))
            .unwrap()
            .with(Flag::bool("debug", false, "Debug"))
            .unwrap()
            .with(Flag::list("tags", &["a", "b"], "Tags"))
            .unwrap()
    }

    #[test]
    fn defaults_are_current_values() {
        let flags = sample();
        assert_eq!(flags.get("host"), Some("localhost"));
        assert_eq!(flags.get_i64("port"), Some(8080));
        assert_eq!(flags.get_bool("debug"), Some(false));
        assert_eq!(flags.get_list("tags"), Some(vec!["a".into(), "b".into()]));
        assert!(!flags.changed("host"));
    }

    #[test]
    fn set_marks_changed() {
        let mut flags = sample();
        flags.set("host", "0.0.0.0").unwrap();
        assert_eq!(flags.get("host"), Some("0.0.0.0"));
        assert!(flags.changed("host"));
        assert_eq!(flags.lookup("host").unwrap().default_value(), "localhost");
    }

    #[test]
    fn set_canonicalizes_bool() {
        let mut flags = sample();
        flags.set("debug", "T").unwrap();
        assert_eq!(flags.get("debug"), Some("true"));
    }

    #[test]
    fn set_rejects_invalid_int() {
        let mut flags = sample();
        let err = flags.set("port", "eighty").unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { kind: FlagKind::Int, .. }));
        assert_eq!(flags.get("port"), Some("8080"));
        assert!(!flags.changed("port"));
    }

    #[test]
    fn preset_keeps_changed_false() {
        let mut flags = sample();
        flags.preset("port", "9090").unwrap();
        assert_eq!(flags.get_i64("port"), Some(9090));
        assert!(!flags.changed("port"));
        assert_eq!(flags.lookup("port").unwrap().default_value(), "8080");
        assert!(flags.preset("port", "nine").is_err());
        assert_eq!(flags.get_i64("port"), Some(9090));
    }

    #[test]
    fn set_unknown_flag() {
        let mut flags = sample();
        assert_eq!(
            flags.set("nope", "x"),
            Err(FlagError::Unknown("nope".into()))
        );
    }

    #[test]
    fn redefinition_rejected() {
        let mut flags = sample();
        let err = flags.add(Flag::string("host", "", "again")).unwrap_err();
        assert_eq!(err, FlagError::Redefined("host".into()));
        assert_eq!(flags.len(), 4);
    }

    #[test]
    fn invalid_default_rejected() {
        let mut flags = FlagSet::new("bad");
        let err = flags
            .add(Flag::new("port", FlagKind::Int, "", "Port"))
            .unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { .. }));
        assert!(flags.is_empty());
    }

    #[test]
    fn list_replaces_on_set() {
        let mut flags = sample();
        flags.set("tags", "x,y,z").unwrap();
        assert_eq!(
            flags.get_list("tags"),
            Some(vec!["x".into(), "y".into(), "z".into()])
        );
    }

    #[test]
    fn states_follow_definition_order() {
        let mut flags = sample();
        flags.set("port", "9000").unwrap();
        let states = Flags::flags(&flags);
        let names: Vec<&str> = states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["host", "port", "debug", "tags"]);
        assert_eq!(states[1].value, "9000");
        assert_eq!(states[1].default, "8080");
        assert!(states[1].changed);
        assert_eq!(states[1].kind, FlagKind::Int);
    }

    #[test]
    fn kind_parse_values() {
        assert_eq!(FlagKind::Float.parse("1.5"), Some(Value::Float(1.5)));
        assert_eq!(FlagKind::Bool.parse("maybe"), None);
        assert_eq!(FlagKind::List.parse(""), Some(Value::Array(vec![])));
    }
}
