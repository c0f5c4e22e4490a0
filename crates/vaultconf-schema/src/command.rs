//! Privileged command parameters.

use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, SetIdentity, TreeReader, Value, hash_record};

pub const PARAMETER_IDENTITY: [&str; 3] = ["name", "type", "target_object_id"];

pub fn parameter_identity() -> SetIdentity {
    SetIdentity::fields(PARAMETER_IDENTITY)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandParameter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub param_type: String,
    #[serde(rename = "TargetObjectId", default, skip_serializing_if = "String::is_empty")]
    pub target_object_id: String,
}

impl CommandParameter {
    pub fn identity_hash(&self) -> u64 {
        hash_record(&parameter_record(self), &PARAMETER_IDENTITY)
    }
}

pub fn expand_command_parameters(
    parent: &TreeReader<'_>,
    field: &str,
) -> Result<Vec<CommandParameter>> {
    parent.expand_blocks(field, |block| {
        Ok(CommandParameter {
            name: block.required_string("name")?,
            param_type: block.required_string("type")?,
            target_object_id: block.string("target_object_id")?,
        })
    })
}

fn parameter_record(parameter: &CommandParameter) -> Record {
    RecordBuilder::new()
        .string("name", parameter.name.clone())
        .string("type", parameter.param_type.clone())
        .string("target_object_id", parameter.target_object_id.clone())
        .build()
}

pub fn flatten_command_parameters(parameters: &[CommandParameter]) -> Vec<Value> {
    parameters
        .iter()
        .map(|parameter| Value::Map(parameter_record(parameter)))
        .collect()
}
