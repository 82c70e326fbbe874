//! Option literals supplied by behaviour sources.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal value of a brick option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Array(Vec<Data>),
    Map(BTreeMap<String, Data>),
}

/// Options of a brick, keyed by option name.
pub type DataMap = BTreeMap<String, Data>;

impl Data {
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::Bool(_) => "boolean",
            Data::Int(_) => "integer",
            Data::Real(_) => "real",
            Data::String(_) => "string",
            Data::Array(_) => "array",
            Data::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Data::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric value; integers are widened.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Data::Int(i) => Some(*i as f64),
            Data::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Bool(b) => write!(f, "{b}"),
            Data::Int(i) => write!(f, "{i}"),
            Data::Real(v) => write!(f, "{v}"),
            Data::String(s) => write!(f, "\"{s}\""),
            Data::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Data::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Data::Bool(b)
    }
}

impl From<f64> for Data {
    fn from(v: f64) -> Self {
        Data::Real(v)
    }
}

impl From<i64> for Data {
    fn from(i: i64) -> Self {
        Data::Int(i)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::String(s.to_string())
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::String(s)
    }
}
