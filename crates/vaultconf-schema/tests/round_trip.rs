//! Round trips through the document entry points.
//!
//! `expand(flatten(r)) == r` for records produced by expand, and
//! `flatten(expand(t)) == t` for trees already in flattened form.

use proptest::prelude::*;
use serde_json::json;
use vaultconf_kernel::{Record, record_from_json};
use vaultconf_schema::{
    CatalogRegistry, DocumentContext, RecordKind, RightsCatalog, expand_document, flatten_document,
};

fn tree(raw: serde_json::Value) -> Record {
    record_from_json(raw).unwrap()
}

/// Set-typed kinds expand in tree visitation order; compare as sets.
fn unordered(wire: serde_json::Value) -> serde_json::Value {
    match wire {
        serde_json::Value::Array(mut items) => {
            items.sort_by_key(|item| item.to_string());
            serde_json::Value::Array(items)
        }
        other => other,
    }
}

fn assert_round_trips(kind: RecordKind, authored: Record) {
    let registry = CatalogRegistry::builtin();
    let context = DocumentContext::new(registry.get("account").unwrap());

    let wire = expand_document(kind, &authored, &context).unwrap();
    let canonical = flatten_document(kind, wire.clone(), &context).unwrap();
    assert_eq!(
        unordered(expand_document(kind, &canonical, &context).unwrap()),
        unordered(wire),
        "{kind}: expand(flatten(r)) != r"
    );

    let rewire = expand_document(kind, &canonical, &context).unwrap();
    assert_eq!(
        flatten_document(kind, rewire, &context).unwrap(),
        canonical,
        "{kind}: flatten(expand(t)) != t"
    );
}

#[test]
fn permissions_round_trip() {
    assert_round_trips(
        RecordKind::Permissions,
        tree(json!({"permission": [
            {"principal_id": "u1", "principal_name": "alice", "principal_type": "User",
             "rights": ["Checkout", "View"]},
            {"principal_id": "g1", "principal_name": "ops", "principal_type": "Group",
             "rights": ["Edit"]}
        ]})),
    );
}

#[test]
fn role_members_round_trip() {
    assert_round_trips(
        RecordKind::RoleMembers,
        tree(json!({"member": [
            {"id": "u1", "name": "alice", "type": "User"},
            {"id": "r1", "name": "admins", "type": "Role"}
        ]})),
    );
}

#[test]
fn approvers_round_trip() {
    assert_round_trips(
        RecordKind::WorkflowApprovers,
        tree(json!({"workflow_approver": [
            {"type": "Manager", "no_manager_action": "useBackup", "backup_approver": [
                {"type": "Manager", "no_manager_action": "deny"}
            ]},
            {"guid": "g1", "name": "approvers", "type": "Group", "options_selector": true}
        ]})),
    );
}

#[test]
fn access_keys_and_parameters_round_trip() {
    assert_round_trips(
        RecordKind::AccessKeys,
        tree(json!({"access_key": [
            {"access_key_id": "AKIA1", "secret_access_key": "s1"},
            {"id": "k2", "access_key_id": "AKIA2"}
        ]})),
    );
    assert_round_trips(
        RecordKind::CommandParameters,
        tree(json!({"params": [
            {"name": "host", "type": "System", "target_object_id": "s1"},
            {"name": "port", "type": "Integer"}
        ]})),
    );
}

#[test]
fn policy_round_trip() {
    assert_round_trips(
        RecordKind::Policy,
        tree(json!({
            "name": "vault-access",
            "link_type": "Collection",
            "settings": [{
                "centrify_client": [{"authentication_enabled": true, "challenge_rule": [
                    {"authentication_profile_id": "p1", "rule": [
                        {"filter": "Browser", "condition": "OpNotEqual", "value": "IE"},
                        {"filter": "IdentityCookie", "condition": "OpNotExists"}
                    ]}
                ]}],
                "sshkey_set": [{"default_profile_id": "p2"}],
                "radius": [{"allow_radius": true}]
            }]
        })),
    );
}

#[test]
fn flattened_permission_shape() {
    let registry = CatalogRegistry::builtin();
    let context = DocumentContext::new(registry.get("account").unwrap());
    let record = flatten_document(
        RecordKind::Permissions,
        json!([{"PrincipalId": "u1", "PrincipalName": "alice", "PrincipalType": "User",
                "Rights": "Naked"}]),
        &context,
    )
    .unwrap();
    insta::assert_json_snapshot!(record, @r###"
    {
      "permission": [
        {
          "principal_id": "u1",
          "principal_name": "alice",
          "principal_type": "User",
          "rights": [
            "Checkout"
          ]
        }
      ]
    }
    "###);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn group_mapping_shapes_agree(
        pairs in proptest::collection::btree_map("[a-z]{1,6}", "[A-Z][a-z]{0,8}", 0..8)
    ) {
        let catalog = RightsCatalog::default();
        let context = DocumentContext::new(&catalog);
        let list: Vec<serde_json::Value> = pairs
            .iter()
            .rev()
            .map(|(attribute, group)| json!({"attribute_value": attribute, "group_name": group}))
            .collect();
        let as_list = tree(json!({"group_mapping": list}));
        let as_map = tree(json!({"group_mapping": pairs}));
        prop_assert_eq!(
            expand_document(RecordKind::GroupMappings, &as_list, &context).unwrap(),
            expand_document(RecordKind::GroupMappings, &as_map, &context).unwrap()
        );
    }
}
