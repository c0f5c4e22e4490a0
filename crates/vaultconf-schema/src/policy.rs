//! The policy envelope around a settings tree.

use crate::settings::{PolicySettings, expand_policy_settings, with_policy_settings};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vaultconf_kernel::{
    Record, RecordBuilder, Result, TransformError, TreeReader, ValidationError, Value,
};

/// What a policy is attached to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    #[default]
    Inactive,
    Global,
    Role,
    Collection,
}

impl LinkType {
    pub const ALL: &'static [LinkType] = &[
        LinkType::Inactive,
        LinkType::Global,
        LinkType::Role,
        LinkType::Collection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Inactive => "Inactive",
            LinkType::Global => "Global",
            LinkType::Role => "Role",
            LinkType::Collection => "Collection",
        }
    }
}

impl FromStr for LinkType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEnumValue {
                value: s.to_string(),
                expected: LinkType::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Policy {
    pub name: String,
    pub description: String,
    pub link_type: LinkType,
    /// Role or collection ids the policy applies to. Ordered.
    pub policy_assignment: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<PolicySettings>,
}

/// Expand a whole policy tree. An absent `link_type` means inactive.
pub fn expand_policy(tree: &TreeReader<'_>) -> Result<Policy> {
    let link_type = match tree.string("link_type")?.as_str() {
        "" => LinkType::default(),
        raw => raw
            .parse()
            .map_err(|err| TransformError::validation(&tree.field_path("link_type"), err))?,
    };
    Ok(Policy {
        name: tree.required_string("name")?,
        description: tree.string("description")?,
        link_type,
        policy_assignment: tree.strings("policy_assignment")?,
        settings: expand_policy_settings(tree, "settings")?,
    })
}

pub fn flatten_policy(policy: &Policy) -> Record {
    let link_type = match policy.link_type {
        LinkType::Inactive => "",
        other => other.as_str(),
    };
    let builder = RecordBuilder::new()
        .string("name", policy.name.clone())
        .string("description", policy.description.clone())
        .string("link_type", link_type)
        .list(
            "policy_assignment",
            policy
                .policy_assignment
                .iter()
                .map(|id| Value::from(id.as_str()))
                .collect(),
        );
    with_policy_settings(builder, "settings", policy.settings.as_ref()).build()
}
