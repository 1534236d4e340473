//! Seller endpoints: the slot market of a segment and bets.

use promo_core::{
    auction::{check_fixed_purchase, validate_bid, AuctionSlot, BidError, FixedPriceSlot},
    PromotionId, SegmentId,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::HttpTransport;
use crate::wire::{BetReply, MakeBet, WireSlotMarket};

/// Slots of one segment, split by pricing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMarket {
    pub auction: Vec<AuctionSlot>,
    pub fixed: Vec<FixedPriceSlot>,
}

impl SlotMarket {
    pub fn auction_slot(&self, position: u32) -> Option<&AuctionSlot> {
        self.auction.iter().find(|s| s.position == position)
    }

    pub fn fixed_slot(&self, position: u32) -> Option<&FixedPriceSlot> {
        self.fixed.iter().find(|s| s.position == position)
    }
}

/// What a seller wants to do with a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidRequest {
    /// Bid `amount` on the auction slot at `position`.
    Auction { position: u32, amount: i64 },
    /// Buy the fixed-price slot at `position`.
    Fixed { position: u32 },
}

/// Accepted bet, with the service's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetConfirmation {
    pub message: String,
    /// Amount bid or price paid.
    pub amount: i64,
}

pub struct SellerClient {
    http: HttpTransport,
    seller_id: i64,
}

impl SellerClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: HttpTransport::new(config),
            seller_id: config.seller_id,
        }
    }

    pub fn segment_slots(
        &self,
        promotion: PromotionId,
        segment: SegmentId,
    ) -> Result<SlotMarket, ClientError> {
        let path = format!("/seller/actions/{promotion}/segments/{segment}/slots");
        let wire: WireSlotMarket = self.http.get(&path)?;
        let mut market = SlotMarket {
            auction: wire.auction.into_iter().map(AuctionSlot::from).collect(),
            fixed: wire.fixed.into_iter().map(FixedPriceSlot::from).collect(),
        };
        market.auction.sort_by_key(|s| s.position);
        market.fixed.sort_by_key(|s| s.position);
        Ok(market)
    }

    /// Check `request` against the current market, then submit it.
    ///
    /// Nothing is sent when the local rules refuse the bid.
    pub fn place(
        &self,
        market: &SlotMarket,
        request: BidRequest,
        product_id: Option<i64>,
    ) -> Result<BetConfirmation, ClientError> {
        let product_id = product_id
            .filter(|id| *id > 0)
            .ok_or(BidError::MissingProduct)?;

        let (body, amount) = match request {
            BidRequest::Auction { position, amount } => {
                let slot = market
                    .auction_slot(position)
                    .ok_or(ClientError::NoSuchSlot { position })?;
                validate_bid(amount, slot)?;
                let body = MakeBet {
                    seller_id: self.seller_id,
                    slot_id: slot.id.0,
                    amount: Some(amount),
                    product_id,
                };
                (body, amount)
            }
            BidRequest::Fixed { position } => {
                let slot = market
                    .fixed_slot(position)
                    .ok_or(ClientError::NoSuchSlot { position })?;
                let price = check_fixed_purchase(slot)?;
                let body = MakeBet {
                    seller_id: self.seller_id,
                    slot_id: slot.id.0,
                    amount: None,
                    product_id,
                };
                (body, price)
            }
        };

        let reply: BetReply = self.http.send("POST", "/seller/bets/make", &body)?;
        if !reply.success {
            return Err(ClientError::Rejected(reply.message));
        }
        tracing::info!("bet on slot {} accepted", body.slot_id);
        Ok(BetConfirmation {
            message: reply.message,
            amount,
        })
    }
}
