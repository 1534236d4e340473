//! # promo-sync
//!
//! Segment reconciliation and the promotion save/load pipeline.
//!
//! Call [`reconcile`] to bring a remote segment collection in line with an
//! ordered target list, or [`save_promotion`] / [`load_promotion`] for the full
//! settings round-trip against a [`PromotionBackend`].

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod reconcile;
pub mod remote;
pub mod staleness;
pub mod state_store;

pub use error::SyncError;
pub use pipeline::{
    load_promotion, save_promotion, IdentitySeed, LoadedPromotion, SaveOptions, SaveReport,
    StepFailure,
};
pub use plan::{plan, SegmentOp, SegmentPlan};
pub use reconcile::{reconcile, AppliedOp, FailurePolicy, OpFailure, ReconcileOutcome};
pub use remote::{PromotionBackend, RemoteError, SegmentCollection};
pub use staleness::StalenessSignal;
pub use state_store::SyncState;
