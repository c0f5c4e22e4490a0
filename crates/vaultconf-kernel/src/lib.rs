//! # vaultconf kernel
//!
//! Schema-agnostic machinery for declarative policy configuration:
//!
//! ```text
//! Value / Record        ← configuration tree (scalars, lists, sets, maps)
//!     │
//! SetIdentity           ← order-independent identity of set elements
//!     │
//! TreeReader / Builder  ← path-aware block access for expand/flatten
//!     │
//! reconcile             ← set difference + sequential membership apply
//! ```
//!
//! Everything here is pure except [`reconcile::apply_plan`], which drives a
//! caller-supplied [`reconcile::MembershipClient`].

pub mod error;
pub mod identity;
pub mod path;
pub mod reconcile;
pub mod value;
pub mod walk;

pub use error::{Result, TransformError, ValidationError};
pub use identity::{IdentityHasher, SetIdentity, hash_record, hash_value};
pub use path::{FieldPath, Segment};
pub use reconcile::{
    ApplyOrder, ApplyStep, MembershipClient, PartialApplyError, ReconcilePlan, StepKind,
    apply_plan, reconcile, reconcile_values,
};
pub use value::{Record, Value, ValueSet, record_from_json, record_to_json};
pub use walk::{RecordBuilder, TreeReader};
