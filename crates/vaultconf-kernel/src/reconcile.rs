//! Set reconciliation for multi-valued relationships.
//!
//! [`reconcile`] is a pure set difference over two versions of an ID set.
//! [`apply_plan`] issues the resulting steps one at a time through a
//! [`MembershipClient`], in the order the caller picks for the relationship.
//! A failure stops the run and reports exactly which steps were applied and
//! which were never attempted; re-running reconciliation against the new
//! remote state picks up where it stopped.

use crate::identity::SetIdentity;
use crate::value::{Value, ValueSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// Removals and additions that turn one ID set into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan<Id> {
    /// `old - new`, sorted.
    pub to_remove: Vec<Id>,
    /// `new - old`, sorted.
    pub to_add: Vec<Id>,
}

/// Compute `(old - new, new - old)`.
pub fn reconcile<Id: Ord + Clone>(
    old: impl IntoIterator<Item = Id>,
    new: impl IntoIterator<Item = Id>,
) -> ReconcilePlan<Id> {
    let old: BTreeSet<Id> = old.into_iter().collect();
    let new: BTreeSet<Id> = new.into_iter().collect();
    ReconcilePlan {
        to_remove: old.difference(&new).cloned().collect(),
        to_add: new.difference(&old).cloned().collect(),
    }
}

/// Reconcile two sets of tree values by set identity.
///
/// Elements are compared by the identity of the `new` set; the plan lists
/// elements in identity order.
pub fn reconcile_values(old: &ValueSet, new: &ValueSet) -> ReconcilePlan<Value> {
    let identity: &SetIdentity = new.identity();
    let old_by_hash: std::collections::BTreeMap<u64, &Value> =
        old.iter().map(|value| (identity.hash(value), value)).collect();
    let new_hashes: BTreeSet<u64> = new.hashes().collect();

    ReconcilePlan {
        to_remove: old_by_hash
            .iter()
            .filter(|(hash, _)| !new_hashes.contains(hash))
            .map(|(_, value)| (*value).clone())
            .collect(),
        to_add: new
            .hashes()
            .filter(|hash| !old_by_hash.contains_key(hash))
            .filter_map(|hash| new.get(hash).cloned())
            .collect(),
    }
}

impl<Id> ReconcilePlan<Id> {
    /// Nothing to apply.
    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

impl<Id: Clone> ReconcilePlan<Id> {
    /// The plan as a sequence of single-item steps in `order`.
    pub fn steps(&self, order: ApplyOrder) -> Vec<ApplyStep<Id>> {
        let removes = self.to_remove.iter().map(|id| ApplyStep {
            kind: StepKind::Remove,
            id: id.clone(),
        });
        let adds = self.to_add.iter().map(|id| ApplyStep {
            kind: StepKind::Add,
            id: id.clone(),
        });
        match order {
            ApplyOrder::RemoveFirst => removes.chain(adds).collect(),
            ApplyOrder::AddFirst => adds.chain(removes).collect(),
        }
    }
}

/// Which half of a plan is applied first. Chosen per relationship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOrder {
    /// For "member of at most one" constraints.
    #[default]
    RemoveFirst,
    /// For relationships that must never become empty mid-change.
    AddFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Add,
    Remove,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Add => write!(f, "add"),
            StepKind::Remove => write!(f, "remove"),
        }
    }
}

/// One membership edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyStep<Id> {
    pub kind: StepKind,
    pub id: Id,
}

impl<Id: fmt::Display> fmt::Display for ApplyStep<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// The seam to the remote client for one relationship.
pub trait MembershipClient<Id> {
    type Error: std::error::Error + Send + Sync + 'static;

    fn add(&mut self, id: &Id) -> Result<(), Self::Error>;

    fn remove(&mut self, id: &Id) -> Result<(), Self::Error>;
}

/// An apply step failed after zero or more earlier steps succeeded.
#[derive(Debug)]
pub struct PartialApplyError<Id> {
    pub failed: ApplyStep<Id>,
    pub applied: Vec<ApplyStep<Id>>,
    pub pending: Vec<ApplyStep<Id>>,
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl<Id: fmt::Display> fmt::Display for PartialApplyError<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed after {} applied step(s) with {} pending: {}",
            self.failed,
            self.applied.len(),
            self.pending.len(),
            self.source
        )
    }
}

impl<Id: fmt::Debug + fmt::Display> std::error::Error for PartialApplyError<Id> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Apply a plan step by step. Returns the number of steps applied.
pub fn apply_plan<Id, C>(
    plan: &ReconcilePlan<Id>,
    order: ApplyOrder,
    client: &mut C,
) -> Result<usize, PartialApplyError<Id>>
where
    Id: Clone + fmt::Display,
    C: MembershipClient<Id>,
{
    let mut steps = plan.steps(order).into_iter();
    let mut applied = Vec::new();

    while let Some(step) = steps.next() {
        debug!(kind = %step.kind, id = %step.id, "applying membership step");
        let outcome = match step.kind {
            StepKind::Add => client.add(&step.id),
            StepKind::Remove => client.remove(&step.id),
        };
        if let Err(err) = outcome {
            warn!(
                kind = %step.kind,
                id = %step.id,
                applied = applied.len(),
                error = %err,
                "membership step failed"
            );
            return Err(PartialApplyError {
                failed: step,
                applied,
                pending: steps.collect(),
                source: Box::new(err),
            });
        }
        applied.push(step);
    }

    Ok(applied.len())
}
