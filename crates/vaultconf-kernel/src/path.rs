//! Field paths into a configuration tree.

use std::fmt;

/// One step of a [`FieldPath`]: a block field name or a position inside a
/// list/set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a configuration tree.
///
/// Rendered the way the tree is addressed by the caller:
/// `settings.0.centrify_services.0.challenge_rule.1.rule`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The empty path (the tree itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Child path for a named field.
    pub fn key(&self, name: &str) -> Self {
        let mut out = self.clone();
        out.0.push(Segment::Key(name.to_string()));
        out
    }

    /// Child path for a collection element.
    pub fn index(&self, idx: usize) -> Self {
        let mut out = self.clone();
        out.0.push(Segment::Index(idx));
        out
    }

    /// This path re-rooted underneath `prefix`.
    pub fn prefixed(&self, prefix: &FieldPath) -> Self {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// Parse a dotted path; purely numeric segments become indices.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<usize>() {
                Ok(idx) => Segment::Index(idx),
                Err(_) => Segment::Key(part.to_string()),
            })
            .collect();
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ".")?;
            }
            match segment {
                Segment::Key(name) => write!(f, "{name}")?,
                Segment::Index(i) => write!(f, "{i}")?,
            }
        }
        Ok(())
    }
}
