//! Field values and the tri-state boolean

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value, either declared locally or reported remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Value {
    /// Borrow the string content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the variant, used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A boolean that can also be left unspecified.
///
/// Declared as a string: `""` is [`TriState::Unset`], any boolean literal
/// is an explicit value. Unset never reaches the remote system, so the
/// remote default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    /// Parse the declared string form of `field`.
    ///
    /// Accepts the empty string and the usual boolean literals
    /// (`1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts).
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        match raw {
            "" => Ok(Self::Unset),
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Self::True),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Self::False),
            other => Err(Error::validation(
                field,
                format!("must be either 'true' or 'false' if provided, got {other:?}"),
            )),
        }
    }

    pub fn from_bool(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }

    /// The explicit boolean, or `None` when unset
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::True => Some(true),
            Self::False => Some(false),
        }
    }

    /// Canonical declared form: `""`, `"true"` or `"false"`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::True => "true",
            Self::False => "false",
        }
    }

    pub fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
