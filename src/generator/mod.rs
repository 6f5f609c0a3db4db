//! Trace generator contract
//!
//! Every problem exposes a [`Generator`]: a pure function from [`Inputs`] to a
//! [`Trace`]. Generators are deterministic, never panic, and emit one snapshot
//! per semantically meaningful action.
//!
//! Degenerate but well-formed inputs (an empty array, an empty pattern) still
//! produce an `Ok` trace ending in an explanatory snapshot. Structurally invalid
//! inputs (a required key missing, a value of the wrong shape) produce a
//! [`GenerationError`].

use crate::snapshot::{Trace, TraceError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A trace generator: `(inputs) -> Trace`
pub type Generator = fn(&Inputs) -> Result<Trace, GenerationError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A required input key is absent
    #[error("Missing input '{name}'")]
    MissingInput { name: String },

    /// An input is present but has the wrong shape
    #[error("Input '{name}' must be {expected}")]
    InvalidInput { name: String, expected: String },

    #[error(transparent)]
    Trace(#[from] TraceError),
}

impl GenerationError {
    /// Arithmetic on the values of input `name` would leave the `i64` range
    pub fn too_large(name: &str) -> Self {
        GenerationError::InvalidInput {
            name: name.to_string(),
            expected: "small enough for its sums to fit in a 64-bit integer".to_string(),
        }
    }
}

/// One algorithm input value as supplied by an input form or the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Int(i64),
    Text(String),
    IntArray(Vec<i64>),
    /// Level-order encodings with holes, e.g. binary trees `[1, null, 2]`
    NullableIntArray(Vec<Option<i64>>),
}

impl InputValue {
    fn kind(&self) -> &'static str {
        match self {
            InputValue::Int(_) => "an integer",
            InputValue::Text(_) => "a string",
            InputValue::IntArray(_) => "an integer array",
            InputValue::NullableIntArray(_) => "an array with nulls",
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "<{}>", self.kind()),
        }
    }
}

/// Typed key/value map of algorithm inputs, passed opaquely to generators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, InputValue>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(BTreeMap::new())
    }

    /// Parse a JSON object such as `{"nums": [2, 7], "target": 9}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with(mut self, name: &str, value: InputValue) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    pub fn insert(&mut self, name: &str, value: InputValue) {
        self.0.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self`; keys in `other` win
    pub fn merged(mut self, other: &Inputs) -> Self {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }

    fn require(&self, name: &str) -> Result<&InputValue, GenerationError> {
        self.0.get(name).ok_or_else(|| GenerationError::MissingInput {
            name: name.to_string(),
        })
    }

    fn invalid(name: &str, expected: &str) -> GenerationError {
        GenerationError::InvalidInput {
            name: name.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, GenerationError> {
        match self.require(name)? {
            InputValue::Int(n) => Ok(*n),
            _ => Err(Self::invalid(name, "an integer")),
        }
    }

    pub fn int_array(&self, name: &str) -> Result<Vec<i64>, GenerationError> {
        match self.require(name)? {
            InputValue::IntArray(v) => Ok(v.clone()),
            // `[]` and hole-free nullable arrays are still plain arrays
            InputValue::NullableIntArray(v) => v
                .iter()
                .map(|x| x.ok_or_else(|| Self::invalid(name, "an integer array")))
                .collect(),
            _ => Err(Self::invalid(name, "an integer array")),
        }
    }

    pub fn text(&self, name: &str) -> Result<String, GenerationError> {
        match self.require(name)? {
            InputValue::Text(s) => Ok(s.clone()),
            _ => Err(Self::invalid(name, "a string")),
        }
    }

    pub fn nullable_int_array(&self, name: &str) -> Result<Vec<Option<i64>>, GenerationError> {
        match self.require(name)? {
            InputValue::NullableIntArray(v) => Ok(v.clone()),
            InputValue::IntArray(v) => Ok(v.iter().copied().map(Some).collect()),
            _ => Err(Self::invalid(name, "an array of integers or nulls")),
        }
    }
}

impl FromIterator<(String, InputValue)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (String, InputValue)>>(iter: I) -> Self {
        Inputs(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_from_json() {
        let inputs = Inputs::from_json(r#"{"nums": [2, 7, 11], "target": 9, "s": "abc", "tree": [1, null, 2]}"#)
            .unwrap();
        assert_eq!(inputs.int_array("nums").unwrap(), vec![2, 7, 11]);
        assert_eq!(inputs.int("target").unwrap(), 9);
        assert_eq!(inputs.text("s").unwrap(), "abc");
        assert_eq!(
            inputs.nullable_int_array("tree").unwrap(),
            vec![Some(1), None, Some(2)]
        );
    }

    #[test]
    fn test_missing_and_invalid() {
        let inputs = Inputs::new().with("target", InputValue::Text("x".into()));
        assert_eq!(
            inputs.int_array("nums"),
            Err(GenerationError::MissingInput { name: "nums".into() })
        );
        assert!(matches!(
            inputs.int("target"),
            Err(GenerationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_merged_overrides() {
        let base = Inputs::new()
            .with("target", InputValue::Int(1))
            .with("nums", InputValue::IntArray(vec![1]));
        let merged = base.merged(&Inputs::new().with("target", InputValue::Int(5)));
        assert_eq!(merged.int("target").unwrap(), 5);
        assert_eq!(merged.int_array("nums").unwrap(), vec![1]);
    }
}
