//! Cloud provider access keys.
//!
//! Identity is the access key id alone: rotating the secret of an existing
//! key is an update, not a new set element.

use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, SetIdentity, TreeReader, Value, hash_record};

pub const ACCESS_KEY_IDENTITY: [&str; 1] = ["access_key_id"];

pub fn access_key_identity() -> SetIdentity {
    SetIdentity::fields(ACCESS_KEY_IDENTITY)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    #[serde(rename = "ID", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "AccessKeyID")]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey", default, skip_serializing_if = "String::is_empty")]
    pub secret_access_key: String,
}

impl AccessKey {
    pub fn identity_hash(&self) -> u64 {
        hash_record(&access_key_record(self), &ACCESS_KEY_IDENTITY)
    }
}

pub fn expand_access_keys(parent: &TreeReader<'_>, field: &str) -> Result<Vec<AccessKey>> {
    parent.expand_blocks(field, |block| {
        Ok(AccessKey {
            id: block.string("id")?,
            access_key_id: block.required_string("access_key_id")?,
            secret_access_key: block.string("secret_access_key")?,
        })
    })
}

fn access_key_record(key: &AccessKey) -> Record {
    RecordBuilder::new()
        .string("id", key.id.clone())
        .string("access_key_id", key.access_key_id.clone())
        .string("secret_access_key", key.secret_access_key.clone())
        .build()
}

pub fn flatten_access_keys(keys: &[AccessKey]) -> Vec<Value> {
    keys.iter()
        .map(|key| Value::Map(access_key_record(key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultconf_kernel::record_from_json;

    fn key(id: &str, secret: &str) -> AccessKey {
        AccessKey {
            id: String::new(),
            access_key_id: id.into(),
            secret_access_key: secret.into(),
        }
    }

    #[test]
    fn secret_does_not_change_identity() {
        assert_eq!(key("AKIA1", "old").identity_hash(), key("AKIA1", "new").identity_hash());
        assert_ne!(key("AKIA1", "s").identity_hash(), key("AKIA2", "s").identity_hash());
    }

    #[test]
    fn expand_then_flatten_preserves_tree() {
        let record = record_from_json(json!({"access_key": [
            {"id": "k1", "access_key_id": "AKIA1", "secret_access_key": "shh"},
            {"access_key_id": "AKIA2"}
        ]}))
        .unwrap();
        let keys = expand_access_keys(&TreeReader::new(&record), "access_key").unwrap();
        assert_eq!(
            Some(&Value::List(flatten_access_keys(&keys))),
            record.get("access_key")
        );
    }

    #[test]
    fn wire_names_are_pascal_case() {
        let keys: Vec<AccessKey> =
            serde_json::from_value(json!([{"ID": "k1", "AccessKeyID": "AKIA1"}])).unwrap();
        assert_eq!(keys[0].id, "k1");
        assert!(keys[0].secret_access_key.is_empty());
    }
}
