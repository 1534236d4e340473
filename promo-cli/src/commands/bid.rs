//! `promo slots` and `promo bid`: the seller side of a segment.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use promo_client::{BidRequest, SellerClient, SlotMarket};
use promo_core::{auction::SlotStatus, PromotionId, SegmentId};

use super::Remote;

#[derive(Args, Debug)]
pub struct SlotsArgs {
    pub promotion: i64,
    pub segment: i64,
}

#[derive(Args, Debug)]
pub struct BidArgs {
    pub promotion: i64,
    pub segment: i64,

    /// Slot position (1-based).
    #[arg(long, short = 'p')]
    pub position: u32,

    /// Bid amount on an auction slot.
    #[arg(long, conflicts_with = "fixed", required_unless_present = "fixed")]
    pub amount: Option<i64>,

    /// Buy the fixed-price slot instead of bidding.
    #[arg(long)]
    pub fixed: bool,

    /// Catalog product to promote.
    #[arg(long)]
    pub product: Option<i64>,
}

#[derive(Tabled)]
struct AuctionRow {
    #[tabled(rename = "#")]
    position: u32,
    #[tabled(rename = "current bid")]
    current_bid: i64,
    #[tabled(rename = "min bid")]
    min_bid: i64,
    #[tabled(rename = "step")]
    bid_step: i64,
    #[tabled(rename = "leader")]
    leader: String,
    #[tabled(rename = "time left")]
    time_left: String,
}

#[derive(Tabled)]
struct FixedRow {
    #[tabled(rename = "#")]
    position: u32,
    #[tabled(rename = "price")]
    price: i64,
    #[tabled(rename = "status")]
    status: String,
}

fn load_market(remote: &Remote, promotion: i64, segment: i64) -> Result<(SellerClient, SlotMarket)> {
    let seller = SellerClient::new(&remote.config()?);
    let market = seller
        .segment_slots(PromotionId(promotion), SegmentId(segment))
        .with_context(|| format!("failed to load slots of segment {segment}"))?;
    Ok((seller, market))
}

impl SlotsArgs {
    pub fn run(self, remote: &Remote) -> Result<()> {
        let (_, market) = load_market(remote, self.promotion, self.segment)?;
        print_market(&market);
        Ok(())
    }
}

impl BidArgs {
    pub fn run(self, remote: &Remote) -> Result<()> {
        let request = match self.amount {
            Some(amount) if !self.fixed => BidRequest::Auction {
                position: self.position,
                amount,
            },
            _ => BidRequest::Fixed {
                position: self.position,
            },
        };

        let (seller, market) = load_market(remote, self.promotion, self.segment)?;
        let confirmation = seller
            .place(&market, request, self.product)
            .with_context(|| format!("slot {} not taken", self.position))?;

        match request {
            BidRequest::Auction { .. } => println!(
                "{} Bid of {} placed on slot {}",
                "✓".green(),
                confirmation.amount,
                self.position
            ),
            BidRequest::Fixed { .. } => println!(
                "{} Slot {} bought for {}",
                "✓".green(),
                self.position,
                confirmation.amount
            ),
        }
        if !confirmation.message.is_empty() {
            println!("  {}", confirmation.message);
        }
        Ok(())
    }
}

fn print_market(market: &SlotMarket) {
    if market.auction.is_empty() && market.fixed.is_empty() {
        println!("No slots in this segment.");
        return;
    }
    if !market.auction.is_empty() {
        println!("{}", "AUCTION".bold());
        let rows: Vec<AuctionRow> = market
            .auction
            .iter()
            .map(|s| AuctionRow {
                position: s.position,
                current_bid: s.current_bid,
                min_bid: s.min_bid,
                bid_step: s.bid_step,
                leader: s.top_bidder.clone().unwrap_or_else(|| "—".to_string()),
                time_left: s.time_left.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
    if !market.fixed.is_empty() {
        println!("{}", "FIXED PRICE".bold());
        let rows: Vec<FixedRow> = market
            .fixed
            .iter()
            .map(|s| FixedRow {
                position: s.position,
                price: s.price,
                status: match s.status {
                    SlotStatus::Available => "available".green().to_string(),
                    SlotStatus::Occupied => "occupied".red().to_string(),
                },
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}
