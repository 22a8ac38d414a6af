//! Tagged value representation shared by the accumulator and station cells.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;

/// Runtime values. Integers are arbitrary precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Integer(BigInt),
    Text(String),
}

impl Value {
    pub fn int(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn empty_text() -> Self {
        Value::Text(String::new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Text(_) => "Text",
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Integer(_) => None,
        }
    }

    /// Narrow an Integer to `i64`, if it is one and it fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|n| n.to_i64())
    }

    /// True only for an Integer other than zero. Text is never "nonzero".
    pub fn is_nonzero_integer(&self) -> bool {
        matches!(self, Value::Integer(n) if !n.is_zero())
    }

    /// Trace rendering: Text in double quotes, Integer bare.
    pub fn display_quoted(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Text(s) => format!("\"{}\"", s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}
