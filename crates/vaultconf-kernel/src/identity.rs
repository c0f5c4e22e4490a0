//! Set identity hashing.
//!
//! Unordered collections in a configuration tree are mathematical sets: an
//! element's identity is determined by a canonical subset of its fields, and
//! two elements that agree on those fields are the same element no matter
//! how or in which order they were built.
//!
//! The hash is computed by feeding identity fields, sorted by name, into
//! SHA-256 as `name:value\n` lines and folding the digest to a `u64`. Zero
//! values and absent fields feed identically. Nested collections are fed as
//! their canonical string form, in which sequences are unordered: a set read
//! back from JSON arrives as a list and must hash like the set it came from.

use crate::value::{Record, Value};
use sha2::{Digest, Sha256};

/// Which part of a set element determines its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SetIdentity {
    /// The whole element (scalar sets, or blocks without a key).
    Whole,
    /// Only the named fields of a block element, sorted and deduplicated.
    Fields(Vec<String>),
}

impl SetIdentity {
    pub fn whole() -> Self {
        Self::Whole
    }

    /// Identity over named fields. The order names are given in does not
    /// matter.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self::Fields(names)
    }

    /// Identity hash of one set element.
    ///
    /// A non-block element under a field identity falls back to whole-value
    /// hashing.
    pub fn hash(&self, value: &Value) -> u64 {
        match (self, value) {
            (SetIdentity::Fields(fields), Value::Map(record)) => hash_record(record, fields),
            _ => hash_value(value),
        }
    }
}

/// Hash a block over a canonical set of identity fields.
pub fn hash_record<S: AsRef<str>>(record: &Record, fields: &[S]) -> u64 {
    let mut names: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    names.sort_unstable();
    names.dedup();

    names
        .into_iter()
        .fold(IdentityHasher::new(), |hasher, name| {
            hasher.field(name, record.get(name))
        })
        .finish()
}

/// Hash a whole value.
pub fn hash_value(value: &Value) -> u64 {
    IdentityHasher::new().field("", Some(value)).finish()
}

/// Incremental identity hash builder.
///
/// Callers feed fields in a fixed order; [`hash_record`] sorts for them.
pub struct IdentityHasher {
    hasher: Sha256,
}

impl Default for IdentityHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Feed a field; `None` feeds the same bytes as a zero value.
    pub fn field(mut self, name: &str, value: Option<&Value>) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b":");
        if let Some(value) = value {
            self.hasher.update(field_bytes(value));
        }
        self.hasher.update(b"\n");
        self
    }

    /// Feed a plain string field.
    pub fn field_str(mut self, name: &str, value: &str) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b":");
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\n");
        self
    }

    pub fn finish(self) -> u64 {
        let digest = self.hasher.finalize();
        let mut folded = [0u8; 8];
        folded.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(folded)
    }
}

/// Bytes fed for a top-level identity field: scalars as their literal text,
/// collections as canonical JSON.
fn field_bytes(value: &Value) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Int(i) => i.to_string().into_bytes(),
        Value::Bool(b) => b.to_string().into_bytes(),
        Value::List(_) | Value::Set(_) | Value::Map(_) => canonical_bytes(value),
    }
}

/// Canonical string form of a nested value.
///
/// Map keys are sorted and zero-valued entries skipped. Lists and sets are
/// both emitted as their sorted, deduplicated element forms.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => serde_json::to_vec(s).unwrap_or_default(),
        Value::Int(i) => i.to_string().into_bytes(),
        Value::Bool(b) => b.to_string().into_bytes(),
        Value::List(items) => sequence_bytes(items.iter()),
        Value::Set(set) => sequence_bytes(set.iter()),
        Value::Map(record) => {
            let mut out = vec![b'{'];
            let mut first = true;
            for (key, item) in record {
                if item.is_zero() {
                    continue;
                }
                if !first {
                    out.push(b',');
                }
                first = false;
                out.extend(serde_json::to_vec(key).unwrap_or_default());
                out.push(b':');
                out.extend(canonical_bytes(item));
            }
            out.push(b'}');
            out
        }
    }
}

fn sequence_bytes<'a>(items: impl Iterator<Item = &'a Value>) -> Vec<u8> {
    let mut elements: Vec<Vec<u8>> = items.map(canonical_bytes).collect();
    elements.sort_unstable();
    elements.dedup();

    let mut out = vec![b'['];
    out.extend(elements.join(&b','));
    out.push(b']');
    out
}
