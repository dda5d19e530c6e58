//! Job variable map with typed accessors.
//!
//! The engine hands variables over as a JSON object. Handlers never cast
//! raw values; they read them through the accessors below, which report a
//! [`VariableError`] naming the offending variable instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A variable could not be read with the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    /// The variable is absent or `null`.
    #[error("missing variable '{name}'")]
    Missing { name: String },

    /// The variable is present but holds a value of another type.
    #[error("variable '{name}' must be {expected}, got {actual}")]
    WrongType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The variable payload is not a JSON object.
    #[error("variables must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Mapping from variable names to JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(Map<String, Value>);

impl Variables {
    /// Creates an empty variable map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a variable.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the raw value, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Reads a string variable.
    pub fn string(&self, name: &str) -> Result<&str, VariableError> {
        match self.present(name)? {
            Value::String(s) => Ok(s),
            other => Err(wrong_type(name, "a string", other)),
        }
    }

    /// Reads an integer variable. Floating-point numbers are rejected even
    /// when they have no fractional part.
    pub fn integer(&self, name: &str) -> Result<i64, VariableError> {
        let value = self.present(name)?;
        value
            .as_i64()
            .ok_or_else(|| wrong_type(name, "an integer", value))
    }

    /// Reads a floating-point variable. Integers are widened.
    pub fn float(&self, name: &str) -> Result<f64, VariableError> {
        let value = self.present(name)?;
        value
            .as_f64()
            .ok_or_else(|| wrong_type(name, "a number", value))
    }

    /// Consumes the map, returning the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Returns the variables as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    fn present(&self, name: &str) -> Result<&Value, VariableError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(VariableError::Missing {
                name: name.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }
}

fn wrong_type(name: &str, expected: &'static str, actual: &Value) -> VariableError {
    VariableError::WrongType {
        name: name.to_string(),
        expected,
        actual: kind(actual),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a floating-point number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Map<String, Value>> for Variables {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Variables {
    type Error = VariableError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(VariableError::NotAnObject(kind(&other))),
        }
    }
}

impl FromIterator<(String, Value)> for Variables {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
