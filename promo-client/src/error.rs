//! Error types for promo-client.

use thiserror::Error;

use promo_core::auction::BidError;
use promo_sync::RemoteError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// An environment variable held a value that cannot be used.
    #[error("invalid {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Refused locally before anything was sent.
    #[error("bid refused: {0}")]
    Bid(#[from] BidError),

    /// The backend answered but declined the bet.
    #[error("bid rejected by the service: {0}")]
    Rejected(String),

    #[error("no slot at position {position} in this segment")]
    NoSuchSlot { position: u32 },
}
