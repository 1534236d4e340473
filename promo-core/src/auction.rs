//! Slot purchase rules: auction bids and fixed-price buys.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SlotId;

/// An auctioned display slot as offered to sellers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSlot {
    pub id: SlotId,
    pub position: u32,
    pub current_bid: i64,
    /// Smallest acceptable bid right now (see [`next_min_bid`]).
    pub min_bid: i64,
    pub bid_step: i64,
    #[serde(default)]
    pub time_left: String,
    #[serde(default)]
    pub top_bidder: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Occupied,
}

/// A slot sold at a fixed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPriceSlot {
    pub id: SlotId,
    pub position: u32,
    pub price: i64,
    pub status: SlotStatus,
}

/// Why a bid or purchase was refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidError {
    #[error("bid must be at least {min}")]
    BelowMinimum { min: i64 },

    #[error("bid must move in steps of {step} from {base}")]
    OffStep { step: i64, base: i64 },

    #[error("slot at position {position} is not available")]
    SlotUnavailable { position: u32 },

    #[error("a product from the seller catalog is required")]
    MissingProduct,

    #[error("bid of {amount} is out of range")]
    OutOfRange { amount: i64 },
}

/// Smallest bid the auction accepts given its parameters and the top bid.
/// `None` when the next step would overflow: no further bid is possible.
pub fn next_min_bid(min_price: i64, bid_step: i64, current_bid: i64) -> Option<i64> {
    if current_bid <= 0 {
        return Some(min_price);
    }
    if bid_step > 0 {
        return current_bid.checked_add(bid_step);
    }
    Some(current_bid)
}

/// Check a bid against the slot's minimum and step.
pub fn validate_bid(amount: i64, slot: &AuctionSlot) -> Result<(), BidError> {
    if amount < slot.min_bid {
        return Err(BidError::BelowMinimum { min: slot.min_bid });
    }
    if slot.bid_step > 0 {
        let above = amount
            .checked_sub(slot.min_bid)
            .ok_or(BidError::OutOfRange { amount })?;
        if above % slot.bid_step != 0 {
            return Err(BidError::OffStep {
                step: slot.bid_step,
                base: slot.min_bid,
            });
        }
    }
    Ok(())
}

/// Check a fixed-price purchase; returns the price to pay.
pub fn check_fixed_purchase(slot: &FixedPriceSlot) -> Result<i64, BidError> {
    match slot.status {
        SlotStatus::Available => Ok(slot.price),
        SlotStatus::Occupied => Err(BidError::SlotUnavailable {
            position: slot.position,
        }),
    }
}
