//! Valid-rights catalogs.
//!
//! A catalog maps the right names users write to the right names the remote
//! service expects. Each resource kind has its own vocabulary; the built-in
//! set ships as `catalogs.toml` and callers may extend or replace kinds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BUILTIN_CATALOGS: &str = include_str!("catalogs.toml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid rights catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown resource kind {kind:?}; known kinds are [{}]", .known.join(", "))]
    UnknownKind { kind: String, known: Vec<String> },

    #[error("catalog {kind:?} maps [{}] to the same wire right {wire:?}", .names.join(", "))]
    AmbiguousWireRight {
        kind: String,
        wire: String,
        names: Vec<String>,
    },
}

/// Human right name to wire right name, for one resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RightsCatalog {
    rights: BTreeMap<String, String>,
}

impl RightsCatalog {
    pub fn new<I, K, V>(rights: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rights: rights
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn wire_right(&self, name: &str) -> Option<&str> {
        self.rights.get(name).map(String::as_str)
    }

    /// The human name for a wire right, if the catalog has one.
    ///
    /// Catalogs held by a [`CatalogRegistry`] map each wire right from at
    /// most one name, so the answer is unique there.
    pub fn human_right(&self, wire: &str) -> Option<&str> {
        self.rights
            .iter()
            .find(|(_, w)| w.as_str() == wire)
            .map(|(name, _)| name.as_str())
    }

    /// Valid human right names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.rights.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rights.is_empty()
    }

    /// Fails when two names share a wire right.
    fn check_one_to_one(&self, kind: &str) -> Result<(), CatalogError> {
        let mut by_wire: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (name, wire) in &self.rights {
            by_wire.entry(wire.as_str()).or_default().push(name.clone());
        }
        match by_wire.into_iter().find(|(_, names)| names.len() > 1) {
            Some((wire, names)) => Err(CatalogError::AmbiguousWireRight {
                kind: kind.to_string(),
                wire: wire.to_string(),
                names,
            }),
            None => Ok(()),
        }
    }
}

/// Catalogs keyed by resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRegistry {
    kinds: BTreeMap<String, RightsCatalog>,
}

impl CatalogRegistry {
    /// The catalogs shipped with this crate.
    pub fn builtin() -> Self {
        Self::from_toml(BUILTIN_CATALOGS).expect("built-in rights catalogs must parse")
    }

    pub fn from_toml(raw: &str) -> Result<Self, CatalogError> {
        let registry: Self = toml::from_str(raw)?;
        for (kind, catalog) in &registry.kinds {
            catalog.check_one_to_one(kind)?;
        }
        Ok(registry)
    }

    pub fn get(&self, kind: &str) -> Option<&RightsCatalog> {
        self.kinds.get(kind)
    }

    /// Catalog for `kind`, or an error naming the known kinds.
    pub fn require(&self, kind: &str) -> Result<&RightsCatalog, CatalogError> {
        self.get(kind).ok_or_else(|| CatalogError::UnknownKind {
            kind: kind.to_string(),
            known: self.kinds(),
        })
    }

    pub fn kinds(&self) -> Vec<String> {
        self.kinds.keys().cloned().collect()
    }

    pub fn insert(&mut self, kind: impl Into<String>, catalog: RightsCatalog) {
        self.kinds.insert(kind.into(), catalog);
    }

    /// Overlay `other`: rights of shared kinds are added or replaced,
    /// new kinds are added.
    ///
    /// An overlay that leaves two names on one wire right is rejected and
    /// the registry is left unchanged.
    pub fn extend(&mut self, other: CatalogRegistry) -> Result<(), CatalogError> {
        let mut merged = self.kinds.clone();
        for (kind, catalog) in other.kinds {
            let target = merged.entry(kind.clone()).or_default();
            target.rights.extend(catalog.rights);
            target.check_one_to_one(&kind)?;
        }
        self.kinds = merged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogs_parse() {
        let registry = CatalogRegistry::builtin();
        for kind in ["account", "system", "set", "secret", "database", "domain"] {
            assert!(registry.get(kind).is_some(), "missing {kind}");
        }
        assert_eq!(
            registry.get("account").unwrap().wire_right("Checkout"),
            Some("Naked")
        );
    }

    #[test]
    fn human_right_inverts_wire_right() {
        let catalog = RightsCatalog::new([("View", "R"), ("Edit", "W")]);
        assert_eq!(catalog.human_right("W"), Some("Edit"));
        assert_eq!(catalog.human_right("X"), None);
    }

    #[test]
    fn extend_overlays_rights() {
        let mut registry = CatalogRegistry::builtin();
        let overlay = CatalogRegistry::from_toml(
            r#"
            [set]
            View = "View"
            [custom]
            Use = "Use"
            "#,
        )
        .unwrap();
        registry.extend(overlay).unwrap();
        assert_eq!(registry.get("set").unwrap().wire_right("View"), Some("View"));
        assert_eq!(registry.get("set").unwrap().wire_right("Edit"), Some("Edit"));
        assert!(registry.get("custom").is_some());
    }

    #[test]
    fn overlay_sharing_a_wire_right_is_rejected() {
        let mut registry = CatalogRegistry::builtin();
        let overlay = CatalogRegistry::from_toml(
            r#"
            [account]
            Open = "Naked"
            "#,
        )
        .unwrap();
        let err = registry.extend(overlay).unwrap_err();
        match &err {
            CatalogError::AmbiguousWireRight { kind, wire, names } => {
                assert_eq!(kind, "account");
                assert_eq!(wire, "Naked");
                assert_eq!(names, &vec!["Checkout".to_string(), "Open".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(registry, CatalogRegistry::builtin());
        assert_eq!(registry.get("account").unwrap().human_right("Naked"), Some("Checkout"));
    }

    #[test]
    fn overlay_replacing_a_name_keeps_inverse_unique() {
        let mut registry = CatalogRegistry::builtin();
        let overlay = CatalogRegistry::from_toml("[set]\nView = \"View\"\n").unwrap();
        registry.extend(overlay).unwrap();
        let set = registry.get("set").unwrap();
        assert_eq!(set.human_right("View"), Some("View"));
        assert_eq!(set.human_right("Read"), None);
    }

    #[test]
    fn from_toml_rejects_shared_wire_rights() {
        let err = CatalogRegistry::from_toml("[custom]\nA = \"X\"\nB = \"X\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::AmbiguousWireRight { .. }));
    }

    #[test]
    fn unknown_kind_lists_known_kinds() {
        let err = CatalogRegistry::builtin().require("printer").unwrap_err();
        assert!(err.to_string().contains("account"));
    }
}
