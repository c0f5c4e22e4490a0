//! Error types for configuration transforms.

use crate::path::FieldPath;

/// A configuration value that is well-shaped but not allowed.
///
/// Validation is fail-fast: the first violation found is the one reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The filter exists but does not accept this condition.
    #[error(
        "filter {filter} does not accept condition {condition}; expected one of [{}]",
        .expected.join(", ")
    )]
    UnsupportedCondition {
        filter: String,
        condition: String,
        expected: Vec<String>,
    },

    /// The (filter, condition) pair is legal but the value is outside the
    /// filter's value domain.
    #[error("value {value:?} is not valid for filter {filter}; expected {expected}")]
    ValueOutOfDomain {
        filter: String,
        value: String,
        expected: String,
    },

    #[error("unknown filter {0:?}")]
    UnknownFilter(String),

    #[error("unknown condition {0:?}")]
    UnknownCondition(String),

    /// Strict permission resolution found rights outside the catalog.
    #[error(
        "principal {principal:?} requests rights [{}] but [{}] are unknown; valid rights are [{}]",
        .requested.join(", "),
        .unknown.join(", "),
        .valid.join(", ")
    )]
    UnknownRights {
        principal: String,
        requested: Vec<String>,
        unknown: Vec<String>,
        valid: Vec<String>,
    },

    #[error("attribute value {attribute_value:?} maps to both {first:?} and {second:?}")]
    ConflictingGroupMapping {
        attribute_value: String,
        first: String,
        second: String,
    },

    #[error("approver {approver:?} uses no_manager_action \"useBackup\" without a backup approver")]
    MissingBackupApprover { approver: String },

    #[error("{value:?} is not one of [{}]", .expected.join(", "))]
    UnknownEnumValue { value: String, expected: Vec<String> },
}

/// Errors arising while expanding or flattening a configuration tree.
///
/// Every variant carries the path of the field that caused it, relative to
/// the tree the top-level call was given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Wrong arity, wrong value kind, or a required field is absent.
    #[error("{path}: {message}")]
    Shape { path: FieldPath, message: String },

    /// The value is well-shaped but rejected by a validator.
    #[error("{path}: {source}")]
    Validation {
        path: FieldPath,
        #[source]
        source: ValidationError,
    },

    /// A string-encoded blob could not be decoded.
    #[error("{path}: cannot decode: {message}")]
    Decode { path: FieldPath, message: String },
}

impl TransformError {
    pub fn shape(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn validation(path: &FieldPath, source: ValidationError) -> Self {
        Self::Validation {
            path: path.clone(),
            source,
        }
    }

    pub fn decode(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Shape { path, .. }
            | Self::Validation { path, .. }
            | Self::Decode { path, .. } => path,
        }
    }

    /// Re-root this error underneath `prefix`.
    pub fn within(self, prefix: &FieldPath) -> Self {
        match self {
            Self::Shape { path, message } => Self::Shape {
                path: path.prefixed(prefix),
                message,
            },
            Self::Validation { path, source } => Self::Validation {
                path: path.prefixed(prefix),
                source,
            },
            Self::Decode { path, message } => Self::Decode {
                path: path.prefixed(prefix),
                message,
            },
        }
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T, E = TransformError> = std::result::Result<T, E>;
