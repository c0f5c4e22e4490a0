//! Reading and building configuration tree blocks.
//!
//! Every expand function reads its block through a [`TreeReader`], and every
//! flatten function writes through a [`RecordBuilder`]. The reader owns the
//! path of the block it reads, so any error it produces names the full
//! location of the offending field.
//!
//! Zero-value rules:
//! - reading an absent field yields the zero value of the requested kind;
//! - building with a zero value omits the field.

use crate::error::{Result, TransformError};
use crate::identity::SetIdentity;
use crate::path::FieldPath;
use crate::value::{Record, Value, ValueSet};
use std::collections::BTreeMap;

/// A typed view over one block of a configuration tree.
#[derive(Debug, Clone)]
pub struct TreeReader<'a> {
    record: &'a Record,
    path: FieldPath,
}

impl<'a> TreeReader<'a> {
    /// Reader over a top-level tree.
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            path: FieldPath::root(),
        }
    }

    /// Reader over a block found at `path`.
    pub fn at(record: &'a Record, path: FieldPath) -> Self {
        Self { record, path }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn field_path(&self, name: &str) -> FieldPath {
        self.path.key(name)
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.record.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_zero())
    }

    fn wrong_kind(&self, name: &str, expected: &str, found: &Value) -> TransformError {
        TransformError::shape(
            &self.field_path(name),
            format!("expected {expected}, found {}", found.kind()),
        )
    }

    /// String field. Integers and booleans are accepted and rendered.
    pub fn string(&self, name: &str) -> Result<String> {
        match self.get(name) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Int(i)) => Ok(i.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(self.wrong_kind(name, "string", other)),
        }
    }

    /// String field that must be present and non-empty.
    pub fn required_string(&self, name: &str) -> Result<String> {
        let value = self.string(name)?;
        if value.is_empty() {
            return Err(TransformError::shape(
                &self.field_path(name),
                "required field is absent",
            ));
        }
        Ok(value)
    }

    /// Integer field. Numeric strings are accepted.
    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            None => Ok(0),
            Some(Value::Int(i)) => Ok(*i),
            Some(Value::String(s)) if s.is_empty() => Ok(0),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| {
                TransformError::shape(&self.field_path(name), format!("{s:?} is not an integer"))
            }),
            Some(other) => Err(self.wrong_kind(name, "int", other)),
        }
    }

    /// Boolean field. `"true"`/`"false"` strings are accepted.
    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.as_str() {
                "" | "false" => Ok(false),
                "true" => Ok(true),
                _ => Err(TransformError::shape(
                    &self.field_path(name),
                    format!("{s:?} is not a boolean"),
                )),
            },
            Some(other) => Err(self.wrong_kind(name, "bool", other)),
        }
    }

    /// Elements of a list or set field. Absent yields no elements.
    pub fn elements(&self, name: &str) -> Result<Vec<(FieldPath, &'a Value)>> {
        let Some(value) = self.get(name) else {
            return Ok(Vec::new());
        };
        let elements = value
            .elements()
            .ok_or_else(|| self.wrong_kind(name, "list or set", value))?;
        let base = self.field_path(name);
        Ok(elements
            .into_iter()
            .enumerate()
            .map(|(idx, item)| (base.index(idx), item))
            .collect())
    }

    /// Block elements of a list or set field.
    pub fn blocks(&self, name: &str) -> Result<Vec<TreeReader<'a>>> {
        self.elements(name)?
            .into_iter()
            .map(|(path, item)| match item {
                Value::Map(record) => Ok(TreeReader::at(record, path)),
                other => Err(TransformError::shape(
                    &path,
                    format!("expected block, found {}", other.kind()),
                )),
            })
            .collect()
    }

    /// String elements of a list or set field.
    pub fn strings(&self, name: &str) -> Result<Vec<String>> {
        self.elements(name)?
            .into_iter()
            .map(|(path, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(TransformError::shape(
                    &path,
                    format!("expected string, found {}", other.kind()),
                )),
            })
            .collect()
    }

    /// Optional singleton block, stored as a list of zero or one blocks.
    ///
    /// Absent and empty are the same; more than one element is a shape
    /// error.
    pub fn singleton(&self, name: &str) -> Result<Option<TreeReader<'a>>> {
        let mut blocks = self.blocks(name)?;
        match blocks.len() {
            0 => Ok(None),
            1 => Ok(blocks.pop()),
            n => Err(TransformError::shape(
                &self.field_path(name),
                format!("expected at most one block, found {n}"),
            )),
        }
    }

    /// Expand an optional singleton block with `expand`.
    pub fn expand_singleton<T>(
        &self,
        name: &str,
        expand: impl FnOnce(&TreeReader<'a>) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.singleton(name)? {
            Some(block) => expand(&block).map(Some),
            None => Ok(None),
        }
    }

    /// Expand every block of a list or set field with `expand`, in element
    /// order.
    pub fn expand_blocks<T>(
        &self,
        name: &str,
        mut expand: impl FnMut(&TreeReader<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.blocks(name)?.iter().map(&mut expand).collect()
    }

    /// Flat key/value map of scalars.
    pub fn string_map(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let Some(value) = self.get(name) else {
            return Ok(BTreeMap::new());
        };
        let record = value
            .as_record()
            .ok_or_else(|| self.wrong_kind(name, "map", value))?;
        let reader = TreeReader::at(record, self.field_path(name));
        record
            .keys()
            .map(|key| reader.string(key).map(|v| (key.clone(), v)))
            .collect()
    }
}

/// Builder for one block of a configuration tree.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field unless it holds a zero value.
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_zero() {
            self.record.insert(name.to_string(), value);
        }
        self
    }

    pub fn string(self, name: &str, value: impl Into<String>) -> Self {
        self.value(name, Value::String(value.into()))
    }

    pub fn int(self, name: &str, value: i64) -> Self {
        self.value(name, Value::Int(value))
    }

    pub fn bool(self, name: &str, value: bool) -> Self {
        self.value(name, Value::Bool(value))
    }

    pub fn list(self, name: &str, items: Vec<Value>) -> Self {
        self.value(name, Value::List(items))
    }

    pub fn blocks(self, name: &str, blocks: Vec<Record>) -> Self {
        self.list(name, blocks.into_iter().map(Value::Map).collect())
    }

    pub fn set(self, name: &str, identity: SetIdentity, items: Vec<Value>) -> Self {
        self.value(name, Value::Set(ValueSet::from_values(identity, items)))
    }

    /// Optional singleton block, wrapped as a one-element list.
    pub fn singleton(self, name: &str, block: Option<Record>) -> Self {
        match block {
            Some(record) => self.list(name, vec![Value::Map(record)]),
            None => self,
        }
    }

    pub fn string_map(self, name: &str, map: BTreeMap<String, String>) -> Self {
        self.value(
            name,
            Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ),
        )
    }

    pub fn build(self) -> Record {
        self.record
    }
}

/// Continue building on top of an existing block.
impl From<Record> for RecordBuilder {
    fn from(record: Record) -> Self {
        Self { record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(json: serde_json::Value) -> Record {
        crate::value::record_from_json(json).unwrap()
    }

    #[test]
    fn absent_fields_read_as_zero() {
        let record = tree(json!({}));
        let reader = TreeReader::new(&record);
        assert_eq!(reader.string("name").unwrap(), "");
        assert_eq!(reader.int("count").unwrap(), 0);
        assert!(!reader.bool("enabled").unwrap());
        assert!(reader.blocks("rule").unwrap().is_empty());
        assert!(reader.singleton("settings").unwrap().is_none());
    }

    #[test]
    fn loose_scalars_are_coerced() {
        let record = tree(json!({"count": "12", "enabled": "true", "name": 7}));
        let reader = TreeReader::new(&record);
        assert_eq!(reader.int("count").unwrap(), 12);
        assert!(reader.bool("enabled").unwrap());
        assert_eq!(reader.string("name").unwrap(), "7");
    }

    #[test]
    fn empty_singleton_is_absent() {
        let record = tree(json!({"settings": []}));
        let reader = TreeReader::new(&record);
        assert!(reader.singleton("settings").unwrap().is_none());
    }

    #[test]
    fn singleton_rejects_two_blocks() {
        let record = tree(json!({"settings": [{}, {}]}));
        let err = TreeReader::new(&record).singleton("settings").unwrap_err();
        assert_eq!(err.path().to_string(), "settings");
        assert!(err.to_string().contains("at most one block"));
    }

    #[test]
    fn nested_errors_carry_full_path() {
        let record = tree(json!({"settings": [{"rule": [{"count": "x"}]}]}));
        let reader = TreeReader::new(&record);
        let settings = reader.singleton("settings").unwrap().unwrap();
        let rule = settings.blocks("rule").unwrap().remove(0);
        let err = rule.int("count").unwrap_err();
        assert_eq!(err.path().to_string(), "settings.0.rule.0.count");
    }

    #[test]
    fn required_string_rejects_empty() {
        let record = tree(json!({"name": ""}));
        assert!(TreeReader::new(&record).required_string("name").is_err());
    }

    #[test]
    fn builder_omits_zero_values() {
        let record = RecordBuilder::new()
            .string("name", "")
            .int("count", 0)
            .bool("enabled", false)
            .string("id", "x")
            .singleton("settings", None)
            .build();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("id"), Some(&Value::from("x")));
    }
}
