use std::fmt;

use serde::{Deserialize, Serialize};

/// A characteristic or image value: one string or several.
///
/// Never holds a singleton list; `from_parts` collapses one element to `One`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    One(String),
    Many(Vec<String>),
}

impl SpecValue {
    pub fn from_parts(mut parts: Vec<String>) -> Option<Self> {
        match parts.len() {
            0 => None,
            1 => parts.pop().map(SpecValue::One),
            _ => Some(SpecValue::Many(parts)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SpecValue::One(s) => s.is_empty(),
            SpecValue::Many(v) => v.is_empty(),
        }
    }

    /// Flat text for a single column: list items joined with ", ".
    pub fn to_text(&self) -> String {
        match self {
            SpecValue::One(s) => s.clone(),
            SpecValue::Many(v) => v.join(", "),
        }
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::One(s) => write!(f, "{}", s),
            SpecValue::Many(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}
