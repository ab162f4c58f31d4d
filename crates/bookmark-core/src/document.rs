//! The persisted JSON document and dot-separated key paths into it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const KEY_PATH_SEPARATOR: char = '.';

/// Address into the document: zero or more key segments.
///
/// The empty key path addresses the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::root();
        }
        Self {
            segments: raw.split(KEY_PATH_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Append one segment. The segment must not contain the separator.
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn split_last(&self) -> Option<(&String, &[String])> {
        self.segments.split_last()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{KEY_PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for KeyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Why a stored document could not be used.
#[derive(Debug, Error)]
pub enum CorruptDocument {
    #[error("malformed json: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("outdated bookmark format (array root)")]
    LegacyArray,
    #[error("document root is not an object")]
    NotAnObject,
}

/// Root of the persisted tree. Always a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw file contents. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, CorruptDocument> {
        match serde_json::from_str::<Value>(raw.trim())? {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(_) => Err(CorruptDocument::LegacyArray),
            _ => Err(CorruptDocument::NotAnObject),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.0.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Walk `path` through nested objects. `None` as soon as a segment is
    /// absent or the walk reaches a non-object.
    pub fn lookup(&self, path: &KeyPath) -> Option<&Value> {
        let Some((first, rest)) = path.segments().split_first() else {
            return None;
        };
        let mut current = self.0.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, path: &KeyPath) -> bool {
        path.is_root() || self.lookup(path).is_some()
    }

    /// Write `value` at `path`, creating empty objects for absent
    /// intermediate segments. An intermediate that holds a non-object value
    /// is replaced by an empty object. Returns `false` for the root path.
    pub fn insert(&mut self, path: &KeyPath, value: Value) -> bool {
        let Some((last, parents)) = path.split_last() else {
            return false;
        };
        let mut current = &mut self.0;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => return false,
            };
        }
        current.insert(last.clone(), value);
        true
    }

    /// Remove exactly the terminal key of `path`. Parents left empty stay.
    pub fn remove(&mut self, path: &KeyPath) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut current = &mut self.0;
        for segment in parents {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.remove(last)
    }
}
