pub mod expand;
pub mod flatten;
pub mod hash;
pub mod reconcile;
pub mod resolve_permissions;
pub mod validate_rules;
