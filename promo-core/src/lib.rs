//! Promo core library: domain types, settings persistence, list editing,
//! and the local business rules of the promotion platform.
//!
//! - [`types`]: newtypes and settings structs
//! - [`error`]: [`SettingsError`], [`EditError`]
//! - [`settings`]: load / save / init of settings files
//! - [`identity`]: [`IdentityMap`]
//! - [`segments`]: [`SegmentEditor`] and theme suggestions
//! - [`auction`]: bid and purchase rules
//! - [`moderation`]: seller applications and bulk approval
//! - [`poll`]: poll payload shaping
//! - [`readiness`]: start-readiness rules

pub mod auction;
pub mod error;
pub mod identity;
pub mod moderation;
pub mod poll;
pub mod readiness;
pub mod segments;
pub mod settings;
pub mod types;

pub use error::{EditError, SettingsError};
pub use identity::IdentityMap;
pub use segments::SegmentEditor;
pub use types::{
    AnswerNode, AuctionSettings, IdentificationMode, PollQuestion, PricingModel, PromotionId,
    PromotionSettings, SegmentId, SegmentSpec, SlotId,
};
