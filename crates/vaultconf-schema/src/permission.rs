//! Permissions and rights resolution.
//!
//! Users write rights by their human names (`View`, `Checkout`); the remote
//! service knows them by wire names (`View`, `Naked`). Resolution maps one
//! to the other through the catalog of the owning resource kind.
//!
//! In strict mode an unknown right fails the whole call. Lenient mode drops
//! unknown rights silently; it exists for tearing down a previous permission
//! set whose rights no longer need to validate.

use crate::catalog::RightsCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use vaultconf_kernel::{
    RecordBuilder, Result, SetIdentity, TransformError, TreeReader, ValidationError, Value,
};

pub const PERMISSION_IDENTITY: [&str; 4] =
    ["principal_id", "principal_name", "principal_type", "rights"];

pub fn permission_identity() -> SetIdentity {
    SetIdentity::fields(PERMISSION_IDENTITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrincipalType {
    User,
    Role,
    Group,
}

impl PrincipalType {
    pub const ALL: &'static [PrincipalType] =
        &[PrincipalType::User, PrincipalType::Role, PrincipalType::Group];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::User => "User",
            PrincipalType::Role => "Role",
            PrincipalType::Group => "Group",
        }
    }
}

impl FromStr for PrincipalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrincipalType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEnumValue {
                value: s.to_string(),
                expected: PrincipalType::ALL
                    .iter()
                    .map(|kind| kind.as_str().to_string())
                    .collect(),
            })
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission as the caller wrote it: human right names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub principal_id: String,
    pub principal_name: String,
    pub principal_type: PrincipalType,
    pub rights: BTreeSet<String>,
}

impl PermissionRequest {
    /// How the principal is named in diagnostics.
    pub fn principal_label(&self) -> &str {
        if self.principal_name.is_empty() {
            &self.principal_id
        } else {
            &self.principal_name
        }
    }
}

/// A resolved permission: wire right names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(rename = "PrincipalId", default)]
    pub principal_id: String,
    #[serde(rename = "PrincipalName", default)]
    pub principal_name: String,
    #[serde(rename = "PrincipalType")]
    pub principal_type: PrincipalType,
    /// Comma-joined on the wire.
    #[serde(rename = "Rights", with = "comma_separated", default)]
    pub rights: BTreeSet<String>,
}

mod comma_separated {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeSet;

    pub fn serialize<S: Serializer>(rights: &BTreeSet<String>, s: S) -> Result<S::Ok, S::Error> {
        let joined: Vec<&str> = rights.iter().map(String::as_str).collect();
        s.serialize_str(&joined.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<String>, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|right| !right.is_empty())
            .map(String::from)
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    #[default]
    Strict,
    Lenient,
}

/// Map one principal's requested rights to wire rights.
pub fn resolve_rights(
    principal: &str,
    requested: &BTreeSet<String>,
    catalog: &RightsCatalog,
    mode: ResolveMode,
) -> Result<BTreeSet<String>, ValidationError> {
    let mut resolved = BTreeSet::new();
    let mut unknown = Vec::new();
    for right in requested {
        match catalog.wire_right(right) {
            Some(wire) => {
                resolved.insert(wire.to_string());
            }
            None => unknown.push(right.clone()),
        }
    }

    if mode == ResolveMode::Strict && !unknown.is_empty() {
        return Err(ValidationError::UnknownRights {
            principal: principal.to_string(),
            requested: requested.iter().cloned().collect(),
            unknown,
            valid: catalog.names(),
        });
    }
    Ok(resolved)
}

/// Resolve a permission set. Fails on the first principal with an unknown
/// right when strict.
pub fn resolve_permissions(
    requested: &[PermissionRequest],
    catalog: &RightsCatalog,
    mode: ResolveMode,
) -> Result<Vec<Permission>, ValidationError> {
    requested
        .iter()
        .map(|request| {
            let rights =
                resolve_rights(request.principal_label(), &request.rights, catalog, mode)?;
            Ok(Permission {
                principal_id: request.principal_id.clone(),
                principal_name: request.principal_name.clone(),
                principal_type: request.principal_type,
                rights,
            })
        })
        .collect()
}

/// Expand a `permission` set in strict mode.
pub fn expand_permissions(
    parent: &TreeReader<'_>,
    field: &str,
    catalog: &RightsCatalog,
) -> Result<Vec<Permission>> {
    expand_permissions_with(parent, field, catalog, ResolveMode::Strict)
}

pub fn expand_permissions_with(
    parent: &TreeReader<'_>,
    field: &str,
    catalog: &RightsCatalog,
    mode: ResolveMode,
) -> Result<Vec<Permission>> {
    parent.expand_blocks(field, |block| {
        let request = expand_request(block)?;
        let mut resolved = resolve_permissions(std::slice::from_ref(&request), catalog, mode)
            .map_err(|err| TransformError::validation(&block.field_path("rights"), err))?;
        resolved
            .pop()
            .ok_or_else(|| TransformError::shape(block.path(), "permission did not resolve"))
    })
}

fn expand_request(block: &TreeReader<'_>) -> Result<PermissionRequest> {
    let principal_type = block
        .required_string("principal_type")?
        .parse()
        .map_err(|err| TransformError::validation(&block.field_path("principal_type"), err))?;
    Ok(PermissionRequest {
        principal_id: block.string("principal_id")?,
        principal_name: block.string("principal_name")?,
        principal_type,
        rights: block.strings("rights")?.into_iter().collect(),
    })
}

/// Flatten permissions to `permission` set elements, mapping wire rights
/// back to human names. Wire rights without a human name are kept as-is.
pub fn flatten_permissions(permissions: &[Permission], catalog: &RightsCatalog) -> Vec<Value> {
    permissions
        .iter()
        .map(|permission| {
            let rights = permission
                .rights
                .iter()
                .map(|wire| Value::from(catalog.human_right(wire).unwrap_or(wire)))
                .collect();
            Value::Map(
                RecordBuilder::new()
                    .string("principal_id", permission.principal_id.clone())
                    .string("principal_name", permission.principal_name.clone())
                    .string("principal_type", permission.principal_type.as_str())
                    .set("rights", SetIdentity::whole(), rights)
                    .build(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultconf_kernel::{ValueSet, record_from_json};

    fn catalog() -> RightsCatalog {
        RightsCatalog::new([("View", "R"), ("Edit", "W")])
    }

    fn rights(raw: &[&str]) -> BTreeSet<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strict_mode_names_the_offending_right() {
        let err = resolve_rights(
            "alice",
            &rights(&["View", "Delete"]),
            &catalog(),
            ResolveMode::Strict,
        )
        .unwrap_err();
        match &err {
            ValidationError::UnknownRights {
                principal,
                unknown,
                requested,
                valid,
            } => {
                assert_eq!(principal, "alice");
                assert_eq!(unknown, &vec!["Delete".to_string()]);
                assert_eq!(requested.len(), 2);
                assert_eq!(valid, &vec!["Edit".to_string(), "View".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Delete"));
    }

    #[test]
    fn lenient_mode_drops_unknown_rights() {
        let resolved =
            resolve_rights("alice", &rights(&["View", "Delete"]), &catalog(), ResolveMode::Lenient)
                .unwrap();
        assert_eq!(resolved, rights(&["R"]));
    }

    #[test]
    fn expand_resolves_to_wire_rights() {
        let record = record_from_json(json!({
            "permission": [{
                "principal_id": "g1",
                "principal_name": "admins",
                "principal_type": "Group",
                "rights": ["Edit", "View"]
            }]
        }))
        .unwrap();
        let permissions =
            expand_permissions(&TreeReader::new(&record), "permission", &catalog()).unwrap();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].rights, rights(&["R", "W"]));
        assert_eq!(
            serde_json::to_value(&permissions[0]).unwrap(),
            json!({
                "PrincipalId": "g1",
                "PrincipalName": "admins",
                "PrincipalType": "Group",
                "Rights": "R,W"
            })
        );
    }

    #[test]
    fn expand_error_points_at_rights() {
        let record = record_from_json(json!({
            "permission": [{"principal_name": "bob", "principal_type": "User", "rights": ["Fly"]}]
        }))
        .unwrap();
        let err =
            expand_permissions(&TreeReader::new(&record), "permission", &catalog()).unwrap_err();
        assert_eq!(err.path().to_string(), "permission.0.rights");
        assert!(err.to_string().contains("\"bob\""));
    }

    #[test]
    fn unknown_principal_type_is_rejected() {
        let record = record_from_json(json!({
            "permission": [{"principal_name": "bob", "principal_type": "Robot", "rights": ["View"]}]
        }))
        .unwrap();
        let err =
            expand_permissions(&TreeReader::new(&record), "permission", &catalog()).unwrap_err();
        assert_eq!(err.path().to_string(), "permission.0.principal_type");
    }

    #[test]
    fn flatten_maps_back_to_human_rights() {
        let permission = Permission {
            principal_id: "u1".into(),
            principal_name: "alice".into(),
            principal_type: PrincipalType::User,
            rights: rights(&["R", "Legacy"]),
        };
        let flattened = flatten_permissions(&[permission], &catalog());
        let record = flattened[0].as_record().unwrap();
        assert_eq!(
            record.get("rights"),
            Some(&Value::Set(ValueSet::from_values(
                SetIdentity::whole(),
                [Value::from("View"), Value::from("Legacy")]
            )))
        );
    }

    #[test]
    fn wire_rights_parse_from_comma_string() {
        let permission: Permission = serde_json::from_value(json!({
            "PrincipalId": "u1", "PrincipalType": "User", "Rights": "View, Edit,"
        }))
        .unwrap();
        assert_eq!(permission.rights, rights(&["Edit", "View"]));
    }
}
