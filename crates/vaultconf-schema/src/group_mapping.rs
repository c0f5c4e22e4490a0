//! Directory attribute to group mappings.
//!
//! Two tree shapes are accepted on expand:
//!
//! ```text
//! group_mapping = [{ attribute_value = "eng", group_name = "Engineering" }]
//! group_mapping = { eng = "Engineering" }
//! ```
//!
//! Both normalize to the same sorted sequence. Flatten always produces the
//! flat map. An attribute value mapped to two different groups is rejected
//! in either direction; an exact duplicate pair collapses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vaultconf_kernel::{
    FieldPath, RecordBuilder, Result, SetIdentity, TransformError, TreeReader, ValidationError,
    Value,
};

pub const GROUP_MAPPING_IDENTITY: [&str; 2] = ["attribute_value", "group_name"];

pub fn group_mapping_identity() -> SetIdentity {
    SetIdentity::fields(GROUP_MAPPING_IDENTITY)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupMapping {
    #[serde(rename = "AttributeValue")]
    pub attribute_value: String,
    #[serde(rename = "GroupName")]
    pub group_name: String,
}

impl GroupMapping {
    pub fn new(attribute_value: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            attribute_value: attribute_value.into(),
            group_name: group_name.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Map(
            RecordBuilder::new()
                .string("attribute_value", self.attribute_value.clone())
                .string("group_name", self.group_name.clone())
                .build(),
        )
    }
}

pub fn expand_group_mappings(parent: &TreeReader<'_>, field: &str) -> Result<Vec<GroupMapping>> {
    match parent.get(field) {
        None => Ok(Vec::new()),
        Some(Value::Map(_)) => {
            let mappings = parent
                .string_map(field)?
                .into_iter()
                .map(|(attribute, group)| GroupMapping::new(attribute, group))
                .collect();
            Ok(mappings)
        }
        Some(_) => {
            let pairs = parent.expand_blocks(field, |block| {
                Ok((
                    block.path().clone(),
                    GroupMapping::new(
                        block.required_string("attribute_value")?,
                        block.string("group_name")?,
                    ),
                ))
            })?;
            let mut by_attribute = BTreeMap::new();
            for (path, mapping) in pairs {
                merge(&mut by_attribute, mapping, &path)?;
            }
            Ok(into_sorted(by_attribute))
        }
    }
}

/// Flatten wire mappings to the flat `attribute_value -> group_name` map.
pub fn flatten_group_mappings(
    mappings: &[GroupMapping],
    path: &FieldPath,
) -> Result<BTreeMap<String, String>> {
    let mut by_attribute = BTreeMap::new();
    for (idx, mapping) in mappings.iter().enumerate() {
        merge(&mut by_attribute, mapping.clone(), &path.index(idx))?;
    }
    Ok(by_attribute)
}

/// Write the flat map form under `field`.
pub fn with_group_mappings(
    builder: RecordBuilder,
    field: &str,
    mappings: &[GroupMapping],
) -> Result<RecordBuilder> {
    let map = flatten_group_mappings(mappings, &FieldPath::root().key(field))?;
    Ok(builder.string_map(field, map))
}

fn merge(
    by_attribute: &mut BTreeMap<String, String>,
    mapping: GroupMapping,
    path: &FieldPath,
) -> Result<()> {
    match by_attribute.get(&mapping.attribute_value) {
        Some(existing) if *existing != mapping.group_name => Err(TransformError::validation(
            path,
            ValidationError::ConflictingGroupMapping {
                attribute_value: mapping.attribute_value,
                first: existing.clone(),
                second: mapping.group_name,
            },
        )),
        Some(_) => Ok(()),
        None => {
            by_attribute.insert(mapping.attribute_value, mapping.group_name);
            Ok(())
        }
    }
}

fn into_sorted(by_attribute: BTreeMap<String, String>) -> Vec<GroupMapping> {
    by_attribute
        .into_iter()
        .map(|(attribute, group)| GroupMapping::new(attribute, group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultconf_kernel::{Record, record_from_json};

    fn tree(json: serde_json::Value) -> Record {
        record_from_json(json).unwrap()
    }

    fn expand(record: &Record) -> Result<Vec<GroupMapping>> {
        expand_group_mappings(&TreeReader::new(record), "group_mapping")
    }

    #[test]
    fn both_input_shapes_agree() {
        let pairs = tree(json!({
            "group_mapping": [{"attribute_value": "eng", "group_name": "Engineering"}]
        }));
        let flat = tree(json!({"group_mapping": {"eng": "Engineering"}}));
        let expected = vec![GroupMapping::new("eng", "Engineering")];
        assert_eq!(expand(&pairs).unwrap(), expected);
        assert_eq!(expand(&flat).unwrap(), expected);
    }

    #[test]
    fn list_input_is_sorted_and_deduplicated() {
        let record = tree(json!({"group_mapping": [
            {"attribute_value": "ops", "group_name": "Operations"},
            {"attribute_value": "eng", "group_name": "Engineering"},
            {"attribute_value": "ops", "group_name": "Operations"}
        ]}));
        assert_eq!(
            expand(&record).unwrap(),
            vec![
                GroupMapping::new("eng", "Engineering"),
                GroupMapping::new("ops", "Operations"),
            ]
        );
    }

    #[test]
    fn conflicting_list_input_is_rejected() {
        let record = tree(json!({"group_mapping": [
            {"attribute_value": "eng", "group_name": "Engineering"},
            {"attribute_value": "eng", "group_name": "Platform"}
        ]}));
        let err = expand(&record).unwrap_err();
        assert_eq!(err.path().to_string(), "group_mapping.1");
        assert_eq!(
            err.validation_error(),
            Some(&ValidationError::ConflictingGroupMapping {
                attribute_value: "eng".into(),
                first: "Engineering".into(),
                second: "Platform".into(),
            })
        );
    }

    #[test]
    fn flatten_rejects_conflicting_wire_pairs() {
        let mappings = [
            GroupMapping::new("eng", "Engineering"),
            GroupMapping::new("eng", "Platform"),
        ];
        let err = flatten_group_mappings(&mappings, &FieldPath::root().key("GroupMappings"))
            .unwrap_err();
        assert_eq!(err.path().to_string(), "GroupMappings.1");
    }

    #[test]
    fn flatten_writes_flat_map() {
        let mappings = [
            GroupMapping::new("ops", "Operations"),
            GroupMapping::new("eng", "Engineering"),
        ];
        let record = with_group_mappings(RecordBuilder::new(), "group_mapping", &mappings)
            .unwrap()
            .build();
        assert_eq!(
            record,
            tree(json!({"group_mapping": {"eng": "Engineering", "ops": "Operations"}}))
        );
        assert_eq!(expand(&record).unwrap().len(), 2);
    }
}
