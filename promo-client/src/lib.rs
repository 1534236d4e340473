//! # promo-client
//!
//! Blocking HTTP client of the promotion service. [`AdminClient`] implements
//! the `promo-sync` remote traits and the moderation endpoints;
//! [`SellerClient`] covers the slot market.

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod seller;
pub mod wire;

pub use admin::{AdminClient, BulkApproval};
pub use config::ClientConfig;
pub use error::ClientError;
pub use seller::{BetConfirmation, BidRequest, SellerClient, SlotMarket};
