//! Registered languages and the parameters each interpreter accepts.
//!
//! Parameters are declared up front as a schema, so the CLI can list them,
//! validate `--param NAME=VALUE` pairs and fill in defaults without knowing
//! anything about the interpreter behind them.

use crate::error::LoadError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Bool,
    Integer,
    Text,
}

impl ParamKind {
    fn expected(self) -> &'static str {
        match self {
            ParamKind::Bool => "true or false",
            ParamKind::Integer => "an integer",
            ParamKind::Text => "text",
        }
    }

    /// Parse `raw` as a value of this kind.
    pub fn parse(self, name: &str, raw: &str) -> Result<ParamValue, LoadError> {
        let bad = || LoadError::BadParam {
            name: name.to_string(),
            expected: self.expected(),
            value: raw.to_string(),
        };
        match self {
            ParamKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err(bad()),
            },
            ParamKind::Integer => raw.trim().parse().map(ParamValue::Integer).map_err(|_| bad()),
            ParamKind::Text => Ok(ParamValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Bool => f.write_str("bool"),
            ParamKind::Integer => f.write_str("integer"),
            ParamKind::Text => f.write_str("text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Integer(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One declared parameter. `default` is written the way a user would pass
/// it on the command line.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: &'static str,
    pub help: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    /// Script file extension, without the dot.
    pub extension: &'static str,
    pub params: &'static [ParamSpec],
}

/// Resolved parameter values for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<&'static str, ParamValue>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// A boolean parameter, `false` if absent or not a bool.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ParamValue::Bool(true)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

pub const MORNINGTON_CRESCENT: LanguageDescriptor = LanguageDescriptor {
    id: "morningtoncrescent",
    name: "Mornington Crescent",
    extension: "mc",
    params: &[ParamSpec {
        name: "verbose",
        kind: ParamKind::Bool,
        default: "false",
        help: "print every journey with the accumulator and cell before and after",
    }],
};

static LANGUAGES: &[LanguageDescriptor] = &[MORNINGTON_CRESCENT];

pub fn languages() -> &'static [LanguageDescriptor] {
    LANGUAGES
}

/// Look a language up by id or display name (case-insensitive).
pub fn find(name: &str) -> Option<&'static LanguageDescriptor> {
    LANGUAGES
        .iter()
        .find(|l| l.id.eq_ignore_ascii_case(name) || l.name.eq_ignore_ascii_case(name))
}

impl LanguageDescriptor {
    /// Start from the declared defaults and apply `NAME=VALUE` overrides in
    /// order; a later override of the same name wins.
    pub fn parse_params<S: AsRef<str>>(&self, overrides: &[S]) -> Result<Params, LoadError> {
        let mut values = BTreeMap::new();
        for spec in self.params {
            values.insert(spec.name, spec.kind.parse(spec.name, spec.default)?);
        }
        for raw in overrides {
            let raw = raw.as_ref();
            let (name, value) = raw
                .split_once('=')
                .ok_or_else(|| LoadError::MalformedParam(raw.to_string()))?;
            let name = name.trim();
            let spec = self
                .params
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| LoadError::UnknownParam {
                    name: name.to_string(),
                    language: self.name.to_string(),
                })?;
            values.insert(spec.name, spec.kind.parse(spec.name, value)?);
        }
        Ok(Params { values })
    }
}
