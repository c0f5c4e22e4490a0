//! Configuration tree values.
//!
//! A configuration tree is a [`Record`]: field name to [`Value`]. Blocks are
//! nested records, repeated blocks are lists (ordered) or sets (unordered),
//! and flat key/value attributes are maps of scalars.

use crate::identity::SetIdentity;
use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// A block: field name to value.
pub type Record = BTreeMap<String, Value>;

/// One node of a configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    /// Ordered sequence; position is significant.
    List(Vec<Value>),
    /// Unordered collection keyed by set identity.
    Set(ValueSet),
    /// Nested block or flat key/value map.
    Map(Record),
}

impl Value {
    /// Short name of the value kind, for shape diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Map(record) => Some(record),
            _ => None,
        }
    }

    /// Elements of a list or set. Sets yield their identity order.
    pub fn elements(&self) -> Option<Vec<&Value>> {
        match self {
            Value::List(items) => Some(items.iter().collect()),
            Value::Set(set) => Some(set.iter().collect()),
            _ => None,
        }
    }

    /// Whether this is the zero value of its kind.
    ///
    /// Absent fields and zero values are interchangeable everywhere in the
    /// tree: readers substitute zero for absent, builders omit zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Int(i) => *i == 0,
            Value::Bool(b) => !b,
            Value::List(items) => items.is_empty(),
            Value::Set(set) => set.is_empty(),
            Value::Map(record) => record.is_empty(),
        }
    }

    /// Convert from JSON. `null` is an absent value and yields `None`;
    /// `null` entries inside objects are dropped.
    pub fn from_json(json: serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Value::Bool(b)),
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::String(n.to_string()),
            }),
            serde_json::Value::String(s) => Some(Value::String(s)),
            serde_json::Value::Array(items) => Some(Value::List(
                items.into_iter().filter_map(Value::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(Value::Map(
                map.into_iter()
                    .filter_map(|(key, value)| Value::from_json(value).map(|v| (key, v)))
                    .collect(),
            )),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => items.iter().map(Value::to_json).collect(),
            Value::Set(set) => set.iter().map(Value::to_json).collect(),
            Value::Map(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Convert a JSON object into a record. Non-object JSON yields `None`.
pub fn record_from_json(json: serde_json::Value) -> Option<Record> {
    match Value::from_json(json)? {
        Value::Map(record) => Some(record),
        _ => None,
    }
}

pub fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Map(record)
    }
}

impl From<ValueSet> for Value {
    fn from(set: ValueSet) -> Self {
        Value::Set(set)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Set(set) => {
                let mut seq = serializer.serialize_seq(Some(set.len()))?;
                for item in set.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (key, value) in record {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(json).ok_or_else(|| D::Error::custom("null is not a configuration value"))
    }
}

/// An unordered collection of values with value-based identity.
///
/// Elements are keyed by their identity hash, so two sets built from the
/// same elements in different orders are equal, and inserting an element
/// whose identity fields match an existing one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet {
    identity: SetIdentity,
    items: BTreeMap<u64, Value>,
}

impl ValueSet {
    pub fn new(identity: SetIdentity) -> Self {
        Self {
            identity,
            items: BTreeMap::new(),
        }
    }

    pub fn from_values(identity: SetIdentity, values: impl IntoIterator<Item = Value>) -> Self {
        let mut set = Self::new(identity);
        for value in values {
            set.insert(value);
        }
        set
    }

    /// Insert a value, returning its identity hash.
    pub fn insert(&mut self, value: Value) -> u64 {
        let hash = self.identity.hash(&value);
        self.items.insert(hash, value);
        hash
    }

    pub fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains_key(&self.identity.hash(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.values()
    }

    pub fn hashes(&self) -> impl Iterator<Item = u64> + '_ {
        self.items.keys().copied()
    }

    pub fn get(&self, hash: u64) -> Option<&Value> {
        self.items.get(&hash)
    }
}
