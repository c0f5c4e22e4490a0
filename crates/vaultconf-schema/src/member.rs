//! Role members.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vaultconf_kernel::{
    Record, RecordBuilder, Result, SetIdentity, TransformError, TreeReader, ValidationError,
    Value, hash_record,
};

pub const MEMBER_IDENTITY: [&str; 3] = ["id", "name", "type"];

pub fn member_identity() -> SetIdentity {
    SetIdentity::fields(MEMBER_IDENTITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MemberType {
    User,
    Group,
    Role,
}

impl MemberType {
    pub const ALL: &'static [MemberType] = &[MemberType::User, MemberType::Group, MemberType::Role];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::User => "User",
            MemberType::Group => "Group",
            MemberType::Role => "Role",
        }
    }
}

impl FromStr for MemberType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownEnumValue {
                value: s.to_string(),
                expected: MemberType::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMember {
    #[serde(rename = "ID", default)]
    pub member_id: String,
    #[serde(rename = "Name", default)]
    pub member_name: String,
    #[serde(rename = "Type")]
    pub member_type: MemberType,
}

impl RoleMember {
    /// Set identity, equal to the identity of the flattened element.
    pub fn identity_hash(&self) -> u64 {
        hash_record(&member_record(self), &MEMBER_IDENTITY)
    }
}

pub fn expand_role_members(parent: &TreeReader<'_>, field: &str) -> Result<Vec<RoleMember>> {
    parent.expand_blocks(field, |block| {
        let member_type = block
            .required_string("type")?
            .parse()
            .map_err(|err| TransformError::validation(&block.field_path("type"), err))?;
        Ok(RoleMember {
            member_id: block.string("id")?,
            member_name: block.string("name")?,
            member_type,
        })
    })
}

fn member_record(member: &RoleMember) -> Record {
    RecordBuilder::new()
        .string("id", member.member_id.clone())
        .string("name", member.member_name.clone())
        .string("type", member.member_type.as_str())
        .build()
}

pub fn flatten_role_members(members: &[RoleMember]) -> Vec<Value> {
    members
        .iter()
        .map(|member| Value::Map(member_record(member)))
        .collect()
}
