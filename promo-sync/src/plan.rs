//! Segment reconciliation planning.
//!
//! ## Matching rules
//!
//! 1. A target carrying a known identifier (present in the previous set or the
//!    identity map) claims that identifier, whatever its current name.
//! 2. Remaining targets look their name up in the identity map; the first
//!    target to claim an identifier wins.
//! 3. Unmatched targets are created.
//! 4. Previously known identifiers nobody claimed are deleted.
//!
//! Order index is the 1-based list position. The plan is pure: no remote call
//! is made here.

use std::collections::BTreeSet;
use std::fmt;

use promo_core::{IdentityMap, SegmentId, SegmentSpec};

/// One remote operation of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOp {
    Update {
        id: SegmentId,
        name: String,
        category: String,
        order_index: u32,
    },
    Create {
        name: String,
        category: String,
        order_index: u32,
    },
    Delete {
        id: SegmentId,
    },
}

impl fmt::Display for SegmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentOp::Update {
                id,
                name,
                category,
                order_index,
            } => write!(f, "update #{id} '{name}' [{category}] at {order_index}"),
            SegmentOp::Create {
                name,
                category,
                order_index,
            } => write!(f, "create '{name}' [{category}] at {order_index}"),
            SegmentOp::Delete { id } => write!(f, "delete #{id}"),
        }
    }
}

/// Ordered operations: one update/create per target in list order, then the
/// deletes in ascending identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentPlan {
    pub ops: Vec<SegmentOp>,
    /// Identifiers that survive this save.
    pub retained: BTreeSet<SegmentId>,
}

impl SegmentPlan {
    pub fn creates(&self) -> usize {
        self.count(|op| matches!(op, SegmentOp::Create { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|op| matches!(op, SegmentOp::Update { .. }))
    }

    pub fn deletes(&self) -> usize {
        self.count(|op| matches!(op, SegmentOp::Delete { .. }))
    }

    fn count(&self, pred: impl Fn(&SegmentOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

/// Compute the operations that make the remote collection match `targets`.
pub fn plan(
    targets: &[SegmentSpec],
    identity: &IdentityMap,
    previous: &BTreeSet<SegmentId>,
) -> SegmentPlan {
    let mut claimed = BTreeSet::new();
    let mut matched: Vec<Option<SegmentId>> = vec![None; targets.len()];

    // Explicit identifiers first so a renamed entry keeps its own id even when
    // an earlier entry took over its old name.
    for (slot, target) in matched.iter_mut().zip(targets) {
        if let Some(id) = target.id {
            let known = previous.contains(&id) || identity.contains_id(id);
            if known && claimed.insert(id) {
                *slot = Some(id);
            }
        }
    }

    for (slot, target) in matched.iter_mut().zip(targets) {
        if slot.is_some() {
            continue;
        }
        if let Some(id) = identity.get(&target.name) {
            if claimed.insert(id) {
                *slot = Some(id);
            }
        }
    }

    let mut ops = Vec::with_capacity(targets.len());
    for (index, (target, slot)) in targets.iter().zip(&matched).enumerate() {
        let order_index = (index + 1) as u32;
        let op = match slot {
            Some(id) => SegmentOp::Update {
                id: *id,
                name: target.name.clone(),
                category: target.category.clone(),
                order_index,
            },
            None => SegmentOp::Create {
                name: target.name.clone(),
                category: target.category.clone(),
                order_index,
            },
        };
        ops.push(op);
    }

    for id in previous {
        if !claimed.contains(id) {
            ops.push(SegmentOp::Delete { id: *id });
        }
    }

    SegmentPlan {
        ops,
        retained: claimed,
    }
}
