use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DiscError;

/// Declared parameter type of a capability operation. `Custom` names a
/// non-primitive type; its textual construction happens inside the
/// receiving capability (`FromStr` at the capability boundary), so the
/// dispatcher hands it the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Int,
    Float,
    Bool,
    Char,
    Text,
    Custom(String),
}

/// A coerced call argument or call result. Every variant has a canonical
/// textual form ([`fmt::Display`]); results stored in the heap round-trip
/// through that form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Text(String),
}

impl ArgValue {
    /// Coerces a textual argument to the declared parameter type. Numbers
    /// parse via `str::parse`, booleans accept `true`/`false` in any case,
    /// char takes the first character of the string.
    pub fn coerce(raw: &str, ty: &ParamType) -> Result<Self, DiscError> {
        match ty {
            ParamType::Int => raw.parse::<i64>().map(ArgValue::Int).map_err(|error| {
                DiscError::new(
                    "VALUE_COERCE_INT",
                    format!("Cannot parse \"{raw}\" as int: {error}"),
                )
            }),
            ParamType::Float => raw.parse::<f64>().map(ArgValue::Float).map_err(|error| {
                DiscError::new(
                    "VALUE_COERCE_FLOAT",
                    format!("Cannot parse \"{raw}\" as float: {error}"),
                )
            }),
            ParamType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" => Ok(ArgValue::Bool(true)),
                "false" => Ok(ArgValue::Bool(false)),
                _ => Err(DiscError::new(
                    "VALUE_COERCE_BOOL",
                    format!("Cannot parse \"{raw}\" as bool."),
                )),
            },
            ParamType::Char => raw.chars().next().map(ArgValue::Char).ok_or_else(|| {
                DiscError::new("VALUE_COERCE_CHAR", "Cannot take a char from an empty string.")
            }),
            ParamType::Text | ParamType::Custom(_) => Ok(ArgValue::Text(raw.to_string())),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Char(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}
