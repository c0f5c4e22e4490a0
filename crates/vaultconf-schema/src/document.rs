//! Whole-document expand and flatten, one entry point per record kind.
//!
//! A document is a tree holding one record kind under its conventional
//! field (`permission`, `member`, ...) or, for a policy, the whole tree.
//! Expand yields the wire JSON of the typed record; flatten takes wire JSON
//! and yields the document tree.

use crate::access_key::{AccessKey, access_key_identity, expand_access_keys, flatten_access_keys};
use crate::approver::{
    encode_approvers, expand_workflow_approvers, flatten_encoded_approvers,
    flatten_workflow_approvers,
};
use crate::catalog::RightsCatalog;
use crate::challenge::{ChallengeRules, expand_challenge_rules, with_challenge_rules};
use crate::command::{
    CommandParameter, expand_command_parameters, flatten_command_parameters, parameter_identity,
};
use crate::group_mapping::{GroupMapping, expand_group_mappings, with_group_mappings};
use crate::member::{RoleMember, expand_role_members, flatten_role_members, member_identity};
use crate::permission::{
    Permission, ResolveMode, expand_permissions_with, flatten_permissions, permission_identity,
};
use crate::policy::{expand_policy, flatten_policy};
use crate::settings::{PolicySettings, expand_policy_settings, with_policy_settings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vaultconf_kernel::{
    FieldPath, Record, RecordBuilder, Result, TransformError, TreeReader, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Policy,
    Settings,
    ChallengeRules,
    Permissions,
    RoleMembers,
    WorkflowApprovers,
    CommandParameters,
    AccessKeys,
    GroupMappings,
}

impl RecordKind {
    pub const ALL: &'static [RecordKind] = &[
        RecordKind::Policy,
        RecordKind::Settings,
        RecordKind::ChallengeRules,
        RecordKind::Permissions,
        RecordKind::RoleMembers,
        RecordKind::WorkflowApprovers,
        RecordKind::CommandParameters,
        RecordKind::AccessKeys,
        RecordKind::GroupMappings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Policy => "policy",
            RecordKind::Settings => "settings",
            RecordKind::ChallengeRules => "challenge-rules",
            RecordKind::Permissions => "permissions",
            RecordKind::RoleMembers => "role-members",
            RecordKind::WorkflowApprovers => "workflow-approvers",
            RecordKind::CommandParameters => "command-parameters",
            RecordKind::AccessKeys => "access-keys",
            RecordKind::GroupMappings => "group-mappings",
        }
    }

    /// Tree field holding this kind; a policy is the whole tree.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RecordKind::Policy => None,
            RecordKind::Settings => Some("settings"),
            RecordKind::ChallengeRules => Some("challenge_rule"),
            RecordKind::Permissions => Some("permission"),
            RecordKind::RoleMembers => Some("member"),
            RecordKind::WorkflowApprovers => Some("workflow_approver"),
            RecordKind::CommandParameters => Some("params"),
            RecordKind::AccessKeys => Some("access_key"),
            RecordKind::GroupMappings => Some("group_mapping"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEnumValue {
                value: s.to_string(),
                expected: RecordKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What permission documents resolve against. Other kinds ignore it.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub rights: &'a RightsCatalog,
    pub mode: ResolveMode,
}

impl<'a> DocumentContext<'a> {
    pub fn new(rights: &'a RightsCatalog) -> Self {
        Self {
            rights,
            mode: ResolveMode::Strict,
        }
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }
}

fn to_wire<T: Serialize>(record: &T) -> serde_json::Value {
    serde_json::to_value(record).expect("wire records serialize to JSON")
}

fn from_wire<T: DeserializeOwned>(wire: serde_json::Value) -> Result<T> {
    serde_json::from_value(wire)
        .map_err(|err| TransformError::decode(&FieldPath::root(), err.to_string()))
}

/// Wire lists may be absent (`null`).
fn from_wire_list<T: DeserializeOwned>(wire: serde_json::Value) -> Result<Vec<T>> {
    Ok(from_wire::<Option<Vec<T>>>(wire)?.unwrap_or_default())
}

/// Expand a document tree to the wire JSON of `kind`.
pub fn expand_document(
    kind: RecordKind,
    tree: &Record,
    context: &DocumentContext<'_>,
) -> Result<serde_json::Value> {
    let reader = TreeReader::new(tree);
    let field = kind.field().unwrap_or_default();
    let wire = match kind {
        RecordKind::Policy => to_wire(&expand_policy(&reader)?),
        RecordKind::Settings => to_wire(&expand_policy_settings(&reader, field)?),
        RecordKind::ChallengeRules => to_wire(&expand_challenge_rules(&reader, field)?),
        RecordKind::Permissions => to_wire(&expand_permissions_with(
            &reader,
            field,
            context.rights,
            context.mode,
        )?),
        RecordKind::RoleMembers => to_wire(&expand_role_members(&reader, field)?),
        RecordKind::WorkflowApprovers => serde_json::Value::String(encode_approvers(
            &expand_workflow_approvers(&reader, field)?,
        )),
        RecordKind::CommandParameters => to_wire(&expand_command_parameters(&reader, field)?),
        RecordKind::AccessKeys => to_wire(&expand_access_keys(&reader, field)?),
        RecordKind::GroupMappings => to_wire(&expand_group_mappings(&reader, field)?),
    };
    Ok(wire)
}

/// Flatten wire JSON of `kind` to a document tree.
///
/// Challenge rules accept the row-set envelope or a bare rule list.
/// Workflow approvers accept the encoded string or a decoded list.
pub fn flatten_document(
    kind: RecordKind,
    wire: serde_json::Value,
    context: &DocumentContext<'_>,
) -> Result<Record> {
    let field = kind.field().unwrap_or_default();
    let builder = RecordBuilder::new();
    let record = match kind {
        RecordKind::Policy => flatten_policy(&from_wire(wire)?),
        RecordKind::Settings => {
            let settings: Option<PolicySettings> = from_wire(wire)?;
            with_policy_settings(builder, field, settings.as_ref()).build()
        }
        RecordKind::ChallengeRules => {
            let rules: Option<ChallengeRules> = if wire.is_array() {
                Some(ChallengeRules::from_rules(from_wire(wire)?))
            } else {
                from_wire(wire)?
            };
            with_challenge_rules(builder, field, rules.as_ref()).build()
        }
        RecordKind::Permissions => {
            let permissions: Vec<Permission> = from_wire_list(wire)?;
            builder
                .set(
                    field,
                    permission_identity(),
                    flatten_permissions(&permissions, context.rights),
                )
                .build()
        }
        RecordKind::RoleMembers => {
            let members: Vec<RoleMember> = from_wire_list(wire)?;
            builder
                .set(field, member_identity(), flatten_role_members(&members))
                .build()
        }
        RecordKind::WorkflowApprovers => {
            let approvers = match wire {
                serde_json::Value::String(raw) => {
                    flatten_encoded_approvers(&raw, &FieldPath::root())?
                }
                other => flatten_workflow_approvers(&from_wire_list(other)?),
            };
            builder.list(field, approvers).build()
        }
        RecordKind::CommandParameters => {
            let parameters: Vec<CommandParameter> = from_wire_list(wire)?;
            builder
                .set(field, parameter_identity(), flatten_command_parameters(&parameters))
                .build()
        }
        RecordKind::AccessKeys => {
            let keys: Vec<AccessKey> = from_wire_list(wire)?;
            builder
                .set(field, access_key_identity(), flatten_access_keys(&keys))
                .build()
        }
        RecordKind::GroupMappings => {
            let mappings: Vec<GroupMapping> = from_wire_list(wire)?;
            with_group_mappings(builder, field, &mappings)?.build()
        }
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultconf_kernel::{record_from_json, record_to_json};

    fn catalog() -> RightsCatalog {
        RightsCatalog::new([("View", "R"), ("Edit", "W")])
    }

    #[test]
    fn kinds_parse_from_their_names() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), *kind);
        }
        assert!("printers".parse::<RecordKind>().is_err());
    }

    #[test]
    fn approvers_expand_to_an_encoded_string() {
        let tree = record_from_json(json!({
            "workflow_approver": [{"guid": "u1", "name": "alice", "type": "User"}]
        }))
        .unwrap();
        let catalog = catalog();
        let wire =
            expand_document(RecordKind::WorkflowApprovers, &tree, &DocumentContext::new(&catalog))
                .unwrap();
        let raw = wire.as_str().unwrap();
        assert!(raw.contains("\"Guid\":\"u1\""));

        let back =
            flatten_document(RecordKind::WorkflowApprovers, wire, &DocumentContext::new(&catalog))
                .unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn null_wire_lists_flatten_to_empty_documents() {
        let catalog = catalog();
        let context = DocumentContext::new(&catalog);
        for kind in [
            RecordKind::Permissions,
            RecordKind::RoleMembers,
            RecordKind::WorkflowApprovers,
            RecordKind::AccessKeys,
            RecordKind::GroupMappings,
            RecordKind::ChallengeRules,
        ] {
            let record = flatten_document(kind, serde_json::Value::Null, &context).unwrap();
            assert!(record.is_empty(), "{kind} flattened to {record:?}");
        }
    }

    #[test]
    fn lenient_context_drops_unknown_rights() {
        let tree = record_from_json(json!({"permission": [
            {"principal_name": "bob", "principal_type": "User", "rights": ["View", "Fly"]}
        ]}))
        .unwrap();
        let catalog = catalog();
        let strict = DocumentContext::new(&catalog);
        assert!(expand_document(RecordKind::Permissions, &tree, &strict).is_err());

        let lenient = strict.with_mode(ResolveMode::Lenient);
        let wire = expand_document(RecordKind::Permissions, &tree, &lenient).unwrap();
        assert_eq!(
            wire,
            json!([{
                "PrincipalId": "",
                "PrincipalName": "bob",
                "PrincipalType": "User",
                "Rights": "R"
            }])
        );
    }

    #[test]
    fn malformed_wire_is_a_decode_error() {
        let catalog = catalog();
        let err = flatten_document(
            RecordKind::AccessKeys,
            json!([{"ID": "k1"}]),
            &DocumentContext::new(&catalog),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Decode { .. }));
    }

    #[test]
    fn bare_rule_list_flattens_like_the_envelope() {
        let catalog = catalog();
        let context = DocumentContext::new(&catalog);
        let rule = json!({
            "ProfileId": "p1",
            "Conditions": [{"Prop": "Zso", "Op": "OpIs", "Val": "1"}]
        });
        let bare = flatten_document(RecordKind::ChallengeRules, json!([rule.clone()]), &context)
            .unwrap();
        let envelope = flatten_document(
            RecordKind::ChallengeRules,
            json!({"Enabled": true, "_Value": [rule]}),
            &context,
        )
        .unwrap();
        assert_eq!(bare, envelope);
        assert_eq!(
            record_to_json(&bare),
            json!({"challenge_rule": [{
                "authentication_profile_id": "p1",
                "rule": [{"condition": "OpIs", "filter": "Zso", "value": "1"}]
            }]})
        );
    }
}
