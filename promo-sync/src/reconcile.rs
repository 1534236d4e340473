//! Segment Reconciler: executes a [`SegmentPlan`] against a remote collection.
//!
//! Operations are issued one at a time in plan order. The identity map is only
//! touched for operations that succeeded, so a failed save never leaves an
//! entry pointing at an identifier the remote side does not have.

use std::collections::BTreeSet;

use promo_core::{IdentityMap, PromotionId, SegmentId, SegmentSpec};

use crate::error::SyncError;
use crate::plan::{plan, SegmentOp, SegmentPlan};
use crate::remote::{NewSegment, RemoteError, SegmentCollection, SegmentPatch};

/// What to do with the rest of the batch once an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep issuing the remaining operations.
    #[default]
    Continue,
    /// Stop at the first failure. The delete pass is skipped.
    FailFast,
}

/// A successfully issued operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOp {
    pub op: SegmentOp,
    /// Identifier the op acted on; for creates, the one the remote assigned.
    pub id: SegmentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpFailure {
    pub op: SegmentOp,
    pub error: RemoteError,
}

/// Result of one reconcile run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub identity: IdentityMap,
    /// Identifiers matched or created in this save.
    pub retained: BTreeSet<SegmentId>,
    /// Identifiers that may still exist remotely: seeds the next save's
    /// previous set. Equals `retained` after a clean run.
    pub known_ids: BTreeSet<SegmentId>,
    pub applied: Vec<AppliedOp>,
    pub failures: Vec<OpFailure>,
    /// True when [`FailurePolicy::FailFast`] cut the batch short.
    pub aborted: bool,
    /// Remote identifier per target, in target order, where one is known.
    pub assigned: Vec<Option<SegmentId>>,
}

impl ReconcileOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse failures into the single user-facing error.
    pub fn ensure_clean(&self) -> Result<(), SyncError> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(SyncError::SegmentsNotSaved {
                failed: self.failures.len(),
            })
        }
    }

    /// Copy assigned identifiers onto the target list they were computed for.
    pub fn write_back(&self, targets: &mut [SegmentSpec]) {
        for (target, id) in targets.iter_mut().zip(&self.assigned) {
            if let Some(id) = id {
                target.id = Some(*id);
            }
        }
    }
}

/// Plan and execute a save of `targets` into `promotion`'s segment collection.
pub fn reconcile<C: SegmentCollection + ?Sized>(
    collection: &mut C,
    promotion: PromotionId,
    targets: &[SegmentSpec],
    identity: &IdentityMap,
    previous: &BTreeSet<SegmentId>,
    policy: FailurePolicy,
) -> ReconcileOutcome {
    let planned = plan(targets, identity, previous);
    execute(collection, promotion, planned, identity, previous, policy)
}

/// Execute an already computed plan.
///
/// The first `n` ops of a plan built from `n` targets line up with those
/// targets; the remaining ones are deletes.
pub fn execute<C: SegmentCollection + ?Sized>(
    collection: &mut C,
    promotion: PromotionId,
    planned: SegmentPlan,
    identity: &IdentityMap,
    previous: &BTreeSet<SegmentId>,
    policy: FailurePolicy,
) -> ReconcileOutcome {
    let SegmentPlan { ops, mut retained } = planned;
    let mut outcome = ReconcileOutcome {
        identity: identity.clone(),
        known_ids: previous.clone(),
        ..ReconcileOutcome::default()
    };

    for op in ops {
        if outcome.aborted {
            break;
        }
        match apply(collection, promotion, &op) {
            Ok(id) => {
                match &op {
                    SegmentOp::Update { name, .. } => {
                        outcome.identity.bind(name, id);
                        outcome.assigned.push(Some(id));
                    }
                    SegmentOp::Create { name, .. } => {
                        outcome.identity.bind(name, id);
                        outcome.known_ids.insert(id);
                        retained.insert(id);
                        outcome.assigned.push(Some(id));
                    }
                    SegmentOp::Delete { .. } => {
                        outcome.identity.remove_id(id);
                        outcome.known_ids.remove(&id);
                    }
                }
                tracing::info!("segment {op} (#{id})");
                outcome.applied.push(AppliedOp { op, id });
            }
            Err(error) => {
                tracing::warn!("segment {op} failed: {error}");
                match &op {
                    // The id stays retained; deleting it as an orphan would lose it.
                    SegmentOp::Update { id, .. } => outcome.assigned.push(Some(*id)),
                    SegmentOp::Create { .. } => outcome.assigned.push(None),
                    SegmentOp::Delete { .. } => {}
                }
                outcome.failures.push(OpFailure { op, error });
                if policy == FailurePolicy::FailFast {
                    outcome.aborted = true;
                }
            }
        }
    }

    outcome.retained = retained;
    outcome
}

fn apply<C: SegmentCollection + ?Sized>(
    collection: &mut C,
    promotion: PromotionId,
    op: &SegmentOp,
) -> Result<SegmentId, RemoteError> {
    match op {
        SegmentOp::Update {
            id,
            name,
            category,
            order_index,
        } => {
            let patch = SegmentPatch::full(name, category, *order_index);
            collection.update_segment(promotion, *id, &patch)?;
            Ok(*id)
        }
        SegmentOp::Create {
            name,
            category,
            order_index,
        } => {
            let body = NewSegment {
                name: name.clone(),
                category: category.clone(),
                order_index: *order_index,
            };
            let id = collection.create_segment(promotion, &body)?;
            if id.0 <= 0 {
                return Err(RemoteError::MalformedResponse(format!(
                    "create of '{name}' returned no usable id ({id})"
                )));
            }
            Ok(id)
        }
        SegmentOp::Delete { id } => {
            collection.delete_segment(promotion, *id)?;
            Ok(*id)
        }
    }
}
