//! Rules a promotion must satisfy before it can start running.

use std::fmt;

use crate::types::{PricingModel, PromotionSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessIssue {
    MissingDates,
    DatesOutOfOrder,
    NoSlots,
    NoSegments,
    AuctionMinPrice,
    AuctionBidStep,
    MissingFixedPrice { position: u32 },
}

impl fmt::Display for ReadinessIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessIssue::MissingDates => write!(f, "start and end dates must be set"),
            ReadinessIssue::DatesOutOfOrder => {
                write!(f, "start date must be earlier than end date")
            }
            ReadinessIssue::NoSlots => write!(f, "slot count must be greater than 0"),
            ReadinessIssue::NoSegments => write!(f, "at least one segment is required"),
            ReadinessIssue::AuctionMinPrice => write!(f, "auction min price must be > 0"),
            ReadinessIssue::AuctionBidStep => write!(f, "auction bid step must be > 0"),
            ReadinessIssue::MissingFixedPrice { position } => {
                write!(f, "fixed price for position {position} must be set and > 0")
            }
        }
    }
}

/// Every rule violation, in a stable order. Empty means ready.
pub fn check(settings: &PromotionSettings) -> Vec<ReadinessIssue> {
    let mut issues = Vec::new();

    match (settings.start_date, settings.end_date) {
        (Some(start), Some(end)) if start >= end => issues.push(ReadinessIssue::DatesOutOfOrder),
        (Some(_), Some(_)) => {}
        _ => issues.push(ReadinessIssue::MissingDates),
    }
    if settings.slot_count == 0 {
        issues.push(ReadinessIssue::NoSlots);
    }
    if settings.segments.is_empty() {
        issues.push(ReadinessIssue::NoSegments);
    }

    match settings.pricing_model {
        PricingModel::Auction => {
            if settings.auction.min_price <= 0 {
                issues.push(ReadinessIssue::AuctionMinPrice);
            }
            if settings.auction.bid_step <= 0 {
                issues.push(ReadinessIssue::AuctionBidStep);
            }
        }
        PricingModel::Fixed => {
            for position in 1..=settings.slot_count {
                let priced = settings
                    .fixed_prices
                    .get(&position)
                    .is_some_and(|price| *price > 0);
                if !priced {
                    issues.push(ReadinessIssue::MissingFixedPrice { position });
                }
            }
        }
    }

    issues
}
