//! Workflow approvers.
//!
//! An approver is a user, role, group, or the requester's manager. A manager
//! approver says what happens when there is no manager; `useBackup` hands
//! the request to a backup approver, which is itself an approver block.
//!
//! On the wire the approver list travels as a JSON string. Reading it is a
//! two-stage pipeline: [`decode_approvers`] (string to typed records) then
//! [`flatten_workflow_approvers`] (typed records to tree).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vaultconf_kernel::{
    FieldPath, Record, RecordBuilder, Result, TransformError, TreeReader, ValidationError, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApproverType {
    User,
    Role,
    Group,
    Manager,
}

impl ApproverType {
    pub const ALL: &'static [ApproverType] = &[
        ApproverType::User,
        ApproverType::Role,
        ApproverType::Group,
        ApproverType::Manager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApproverType::User => "User",
            ApproverType::Role => "Role",
            ApproverType::Group => "Group",
            ApproverType::Manager => "Manager",
        }
    }
}

impl FromStr for ApproverType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApproverType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEnumValue {
                value: s.to_string(),
                expected: ApproverType::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

pub const NO_MANAGER_ACTIONS: &[&str] = &["approve", "deny", "useBackup"];
pub const USE_BACKUP: &str = "useBackup";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowApprover {
    #[serde(rename = "Guid", default, skip_serializing_if = "String::is_empty")]
    pub guid: String,
    #[serde(rename = "Name", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "Type")]
    pub approver_type: ApproverType,
    #[serde(rename = "OptionsSelector", default)]
    pub options_selector: bool,
    #[serde(rename = "NoManagerAction", default, skip_serializing_if = "String::is_empty")]
    pub no_manager_action: String,
    #[serde(rename = "BackupApprover", default, skip_serializing_if = "Option::is_none")]
    pub backup_approver: Option<Box<WorkflowApprover>>,
}

impl WorkflowApprover {
    fn label(&self) -> &str {
        if self.name.is_empty() {
            self.approver_type.as_str()
        } else {
            &self.name
        }
    }
}

pub fn expand_workflow_approvers(
    parent: &TreeReader<'_>,
    field: &str,
) -> Result<Vec<WorkflowApprover>> {
    parent.expand_blocks(field, expand_approver)
}

fn expand_approver(block: &TreeReader<'_>) -> Result<WorkflowApprover> {
    let approver_type = block
        .required_string("type")?
        .parse()
        .map_err(|err| TransformError::validation(&block.field_path("type"), err))?;

    let no_manager_action = block.string("no_manager_action")?;
    if !no_manager_action.is_empty() && !NO_MANAGER_ACTIONS.contains(&no_manager_action.as_str())
    {
        return Err(TransformError::validation(
            &block.field_path("no_manager_action"),
            ValidationError::UnknownEnumValue {
                value: no_manager_action,
                expected: NO_MANAGER_ACTIONS.iter().map(|a| a.to_string()).collect(),
            },
        ));
    }

    let backup_approver = block
        .expand_singleton("backup_approver", expand_approver)?
        .map(Box::new);

    let approver = WorkflowApprover {
        guid: block.string("guid")?,
        name: block.string("name")?,
        approver_type,
        options_selector: block.bool("options_selector")?,
        no_manager_action,
        backup_approver,
    };

    if approver.no_manager_action == USE_BACKUP && approver.backup_approver.is_none() {
        return Err(TransformError::validation(
            block.path(),
            ValidationError::MissingBackupApprover {
                approver: approver.label().to_string(),
            },
        ));
    }
    Ok(approver)
}

/// Serialize approvers to their wire string.
pub fn encode_approvers(approvers: &[WorkflowApprover]) -> String {
    serde_json::to_string(approvers).expect("workflow approvers must serialize")
}

/// Parse the wire string. Empty, `null`, and `[]` all decode to no
/// approvers.
pub fn decode_approvers(raw: &str, path: &FieldPath) -> Result<Vec<WorkflowApprover>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|err| TransformError::decode(path, err.to_string()))
}

fn approver_record(approver: &WorkflowApprover) -> Record {
    RecordBuilder::new()
        .string("guid", approver.guid.clone())
        .string("name", approver.name.clone())
        .string("type", approver.approver_type.as_str())
        .bool("options_selector", approver.options_selector)
        .string("no_manager_action", approver.no_manager_action.clone())
        .singleton(
            "backup_approver",
            approver.backup_approver.as_deref().map(approver_record),
        )
        .build()
}

pub fn flatten_workflow_approvers(approvers: &[WorkflowApprover]) -> Vec<Value> {
    approvers
        .iter()
        .map(|approver| Value::Map(approver_record(approver)))
        .collect()
}

/// Decode then flatten a wire approver string.
pub fn flatten_encoded_approvers(raw: &str, path: &FieldPath) -> Result<Vec<Value>> {
    Ok(flatten_workflow_approvers(&decode_approvers(raw, path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultconf_kernel::record_from_json;

    fn manager_with_backup() -> Record {
        record_from_json(json!({
            "workflow_approver": [{
                "type": "Manager",
                "options_selector": true,
                "no_manager_action": "useBackup",
                "backup_approver": [{"guid": "r1", "name": "approvers", "type": "Role"}]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn expands_recursive_backup() {
        let record = manager_with_backup();
        let approvers =
            expand_workflow_approvers(&TreeReader::new(&record), "workflow_approver").unwrap();
        assert_eq!(approvers.len(), 1);
        let backup = approvers[0].backup_approver.as_deref().unwrap();
        assert_eq!(backup.approver_type, ApproverType::Role);
        assert_eq!(backup.guid, "r1");
    }

    #[test]
    fn use_backup_requires_backup() {
        let record = record_from_json(json!({
            "workflow_approver": [{"type": "Manager", "no_manager_action": "useBackup"}]
        }))
        .unwrap();
        let err =
            expand_workflow_approvers(&TreeReader::new(&record), "workflow_approver").unwrap_err();
        assert!(matches!(
            err.validation_error(),
            Some(ValidationError::MissingBackupApprover { .. })
        ));
        assert_eq!(err.path().to_string(), "workflow_approver.0");
    }

    #[test]
    fn nested_backup_error_keeps_full_path() {
        let record = record_from_json(json!({
            "workflow_approver": [{
                "type": "Manager",
                "no_manager_action": "useBackup",
                "backup_approver": [{"type": "Robot"}]
            }]
        }))
        .unwrap();
        let err =
            expand_workflow_approvers(&TreeReader::new(&record), "workflow_approver").unwrap_err();
        assert_eq!(err.path().to_string(), "workflow_approver.0.backup_approver.0.type");
    }

    #[test]
    fn wire_string_round_trips_through_tree() {
        let record = manager_with_backup();
        let approvers =
            expand_workflow_approvers(&TreeReader::new(&record), "workflow_approver").unwrap();
        let encoded = encode_approvers(&approvers);
        let flattened = flatten_encoded_approvers(&encoded, &FieldPath::root()).unwrap();
        assert_eq!(Some(&Value::List(flattened)), record.get("workflow_approver"));
    }

    #[test]
    fn empty_encodings_decode_to_nothing() {
        for raw in ["", "  ", "null", "[]"] {
            assert!(decode_approvers(raw, &FieldPath::root()).unwrap().is_empty());
        }
    }

    #[test]
    fn malformed_encoding_is_a_decode_error() {
        let err = decode_approvers("[{", &FieldPath::root().key("approvers")).unwrap_err();
        assert!(matches!(err, TransformError::Decode { .. }));
        assert_eq!(err.path().to_string(), "approvers");
    }
}
