//! # vaultconf schema
//!
//! Typed wire records for identity and access policy, and the expand and
//! flatten functions that move them to and from a configuration tree.
//!
//! ```text
//! tree ──expand──▶ typed record ──serde──▶ wire JSON
//!      ◀─flatten──              ◀─serde───
//! ```
//!
//! Validation happens during expand: challenge conditions go through the
//! [`RuleValidator`] and permission rights through a [`RightsCatalog`], so a
//! record that expands is a record the remote service will accept.

pub mod access_key;
pub mod approver;
pub mod catalog;
pub mod challenge;
pub mod command;
pub mod country;
pub mod document;
pub mod group_mapping;
pub mod member;
pub mod permission;
pub mod policy;
pub mod rules;
pub mod settings;

pub use access_key::{AccessKey, expand_access_keys, flatten_access_keys};
pub use approver::{
    ApproverType, WorkflowApprover, decode_approvers, encode_approvers, expand_workflow_approvers,
    flatten_encoded_approvers, flatten_workflow_approvers,
};
pub use catalog::{CatalogError, CatalogRegistry, RightsCatalog};
pub use challenge::{
    ChallengeCondition, ChallengeRule, ChallengeRules, Condition, Filter, expand_challenge_rules,
    expand_challenge_rules_with, flatten_challenge_rules,
};
pub use command::{CommandParameter, expand_command_parameters, flatten_command_parameters};
pub use country::{CountryLookup, Iso3166};
pub use document::{DocumentContext, RecordKind, expand_document, flatten_document};
pub use group_mapping::{GroupMapping, expand_group_mappings, flatten_group_mappings};
pub use member::{MemberType, RoleMember, expand_role_members, flatten_role_members};
pub use permission::{
    Permission, PermissionRequest, PrincipalType, ResolveMode, expand_permissions,
    expand_permissions_with, flatten_permissions, resolve_permissions, resolve_rights,
};
pub use policy::{LinkType, Policy, expand_policy, flatten_policy};
pub use rules::RuleValidator;
pub use settings::{PolicySettings, SettingsBlock, expand_policy_settings, flatten_policy_settings};
