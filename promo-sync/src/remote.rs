//! Contracts of the remote promotion service.
//!
//! The sync layer only talks to these traits; `promo-client` provides the HTTP
//! implementation and tests provide in-memory fakes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use promo_core::{
    poll::{FlatAnswerNode, PollQuestionPayload},
    AuctionSettings, PollQuestion, PromotionId, PromotionSettings, SegmentId,
};

/// A failed remote call. Not classified beyond what the transport reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("remote returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// Segment collection
// ---------------------------------------------------------------------------

/// Body of a segment create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSegment {
    pub name: String,
    #[serde(rename = "categoryName")]
    pub category: String,
    pub order_index: u32,
}

/// Body of a segment update; absent fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "categoryName", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<u32>,
}

impl SegmentPatch {
    pub fn full(name: &str, category: &str, order_index: u32) -> Self {
        Self {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            order_index: Some(order_index),
        }
    }
}

/// The remote segment collection of a promotion.
pub trait SegmentCollection {
    fn create_segment(
        &mut self,
        promotion: PromotionId,
        segment: &NewSegment,
    ) -> Result<SegmentId, RemoteError>;

    fn update_segment(
        &mut self,
        promotion: PromotionId,
        id: SegmentId,
        patch: &SegmentPatch,
    ) -> Result<(), RemoteError>;

    fn delete_segment(&mut self, promotion: PromotionId, id: SegmentId) -> Result<(), RemoteError>;
}

// ---------------------------------------------------------------------------
// Promotion backend
// ---------------------------------------------------------------------------

/// Body of a promotion create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionPayload {
    pub name: String,
    pub description: String,
    pub theme: String,
    pub date_from: String,
    pub date_to: String,
    pub identification_mode: String,
    pub pricing_model: String,
    pub slot_count: u32,
    /// The backend keeps a single discount; the lower bound is sent.
    pub discount: u32,
    pub stop_factors: Vec<String>,
}

impl PromotionPayload {
    pub fn from_settings(settings: &PromotionSettings) -> Self {
        Self {
            name: settings.name.clone(),
            description: settings.description.clone(),
            theme: settings.theme.clone(),
            date_from: to_rfc3339(settings.start_date),
            date_to: to_rfc3339(settings.end_date),
            identification_mode: settings.identification_mode.to_string(),
            pricing_model: settings.pricing_model.to_string(),
            slot_count: settings.slot_count,
            discount: settings.min_discount,
            stop_factors: settings.stop_factors.clone(),
        }
    }
}

/// Midnight UTC of `date`, or empty when unset.
pub fn to_rfc3339(date: Option<NaiveDate>) -> String {
    date.map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d")))
        .unwrap_or_default()
}

/// Leading `YYYY-MM-DD` of a remote timestamp.
pub fn parse_date_prefix(value: &str) -> Option<NaiveDate> {
    let prefix = value.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSegment {
    pub id: SegmentId,
    pub name: String,
    pub category: String,
    pub order_index: u32,
}

/// A promotion as the admin service returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemotePromotion {
    pub id: Option<PromotionId>,
    pub name: String,
    pub description: String,
    pub theme: String,
    pub status: String,
    pub date_from: String,
    pub date_to: String,
    pub identification_mode: String,
    pub pricing_model: String,
    pub slot_count: u32,
    pub discount: u32,
    pub stop_factors: Vec<String>,
    pub segments: Vec<RemoteSegment>,
    pub fixed_prices: BTreeMap<u32, i64>,
    pub poll_questions: Vec<PollQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrice {
    pub position: u32,
    pub price: i64,
}

/// The admin surface used by the save/load pipeline.
pub trait PromotionBackend: SegmentCollection {
    fn create_promotion(&mut self, payload: &PromotionPayload) -> Result<PromotionId, RemoteError>;

    fn update_promotion(
        &mut self,
        id: PromotionId,
        payload: &PromotionPayload,
    ) -> Result<(), RemoteError>;

    fn get_promotion(&mut self, id: PromotionId) -> Result<RemotePromotion, RemoteError>;

    fn get_auction_params(&mut self, id: PromotionId) -> Result<AuctionSettings, RemoteError>;

    fn set_auction_params(
        &mut self,
        id: PromotionId,
        params: &AuctionSettings,
    ) -> Result<(), RemoteError>;

    fn set_fixed_prices(&mut self, id: PromotionId, prices: &[FixedPrice])
        -> Result<(), RemoteError>;

    fn set_poll_questions(
        &mut self,
        id: PromotionId,
        questions: &[PollQuestionPayload],
    ) -> Result<(), RemoteError>;

    fn set_answer_tree(&mut self, id: PromotionId, nodes: &[FlatAnswerNode])
        -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_core::{IdentificationMode, PricingModel};

    #[test]
    fn payload_uses_min_discount_and_rfc3339_dates() {
        let mut s = PromotionSettings::default();
        s.name = "Spring".into();
        s.start_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        s.min_discount = 15;
        s.max_discount = 40;
        s.pricing_model = PricingModel::Fixed;
        s.identification_mode = IdentificationMode::UserProfile;

        let p = PromotionPayload::from_settings(&s);
        assert_eq!(p.date_from, "2026-03-01T00:00:00Z");
        assert_eq!(p.date_to, "");
        assert_eq!(p.discount, 15);
        assert_eq!(p.pricing_model, "fixed");
        assert_eq!(p.identification_mode, "user_profile");

        let json = serde_json::to_value(&p).expect("json");
        assert_eq!(json["dateFrom"], "2026-03-01T00:00:00Z");
        assert_eq!(json["slotCount"], 10);
    }

    #[test]
    fn segment_bodies_use_wire_names() {
        let create = serde_json::to_value(NewSegment {
            name: "A".into(),
            category: "Sport".into(),
            order_index: 2,
        })
        .expect("json");
        assert_eq!(
            create,
            serde_json::json!({"name": "A", "categoryName": "Sport", "orderIndex": 2})
        );

        let patch = serde_json::to_value(SegmentPatch {
            order_index: Some(1),
            ..SegmentPatch::default()
        })
        .expect("json");
        assert_eq!(patch, serde_json::json!({"orderIndex": 1}));
    }

    #[test]
    fn date_prefix_parsing() {
        assert_eq!(
            parse_date_prefix("2026-03-01T00:00:00Z"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(parse_date_prefix(""), None);
        assert_eq!(parse_date_prefix("garbage-value"), None);
    }
}
