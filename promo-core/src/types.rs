//! Domain types for promotion settings.
//!
//! All types are serializable/deserializable via serde + serde_yaml. Missing
//! fields in a settings file fall back to the same defaults a freshly created
//! promotion gets.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Remote identifier of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromotionId(pub i64);

impl fmt::Display for PromotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for PromotionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Remote identifier of a segment inside a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub i64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for SegmentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Remote identifier of a display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub i64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for SlotId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How display slots of a promotion are sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PricingModel {
    #[default]
    Auction,
    Fixed,
}

impl PricingModel {
    /// Parse the wire representation; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auction" => Some(Self::Auction),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingModel::Auction => write!(f, "auction"),
            PricingModel::Fixed => write!(f, "fixed"),
        }
    }
}

/// How buyers are assigned to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationMode {
    #[default]
    Questions,
    UserProfile,
}

impl IdentificationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "questions" => Some(Self::Questions),
            "user_profile" => Some(Self::UserProfile),
            _ => None,
        }
    }
}

impl fmt::Display for IdentificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentificationMode::Questions => write!(f, "questions"),
            IdentificationMode::UserProfile => write!(f, "user_profile"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings structs
// ---------------------------------------------------------------------------

/// One entry of the ordered segment list.
///
/// `id` is the remote identifier once the segment exists remotely. It travels
/// with the entry through renames, so identity never depends on the name alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SegmentId>,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

impl SegmentSpec {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
        }
    }

    pub fn with_id(mut self, id: SegmentId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Auction parameters shared by every slot of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSettings {
    pub min_price: i64,
    pub bid_step: i64,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            min_price: 1000,
            bid_step: 500,
        }
    }
}

/// A segmentation quiz question as the admin edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Default for PollQuestion {
    fn default() -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(), String::new(), String::new()],
        }
    }
}

/// Nested answer tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerNode {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<AnswerNode>,
}

/// Complete admin-side configuration of a promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionSettings {
    /// Set once the promotion exists remotely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_id: Option<PromotionId>,
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub theme: String,
    pub segments: Vec<SegmentSpec>,
    pub pricing_model: PricingModel,
    pub auction: AuctionSettings,
    /// Slot position (1-based) -> price.
    pub fixed_prices: BTreeMap<u32, i64>,
    pub slot_count: u32,
    pub min_discount: u32,
    pub max_discount: u32,
    pub stop_factors: Vec<String>,
    pub identification_mode: IdentificationMode,
    pub poll_questions: Vec<PollQuestion>,
    pub answer_tree: Vec<AnswerNode>,
}

impl Default for PromotionSettings {
    fn default() -> Self {
        Self {
            promotion_id: None,
            name: String::new(),
            description: String::new(),
            start_date: None,
            end_date: None,
            theme: "zodiac".to_string(),
            segments: Vec::new(),
            pricing_model: PricingModel::Auction,
            auction: AuctionSettings::default(),
            fixed_prices: BTreeMap::new(),
            slot_count: 10,
            min_discount: 10,
            max_discount: 50,
            stop_factors: Vec::new(),
            identification_mode: IdentificationMode::Questions,
            poll_questions: vec![PollQuestion::default()],
            answer_tree: Vec::new(),
        }
    }
}

impl PromotionSettings {
    /// First segment with the given name.
    pub fn segment(&self, name: &str) -> Option<&SegmentSpec> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn segment_names(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
