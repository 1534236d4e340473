//! Admin endpoints: promotions, segments, pricing, poll and moderation.

use serde::Serialize;
use serde_json::json;

use promo_core::{
    moderation::{approvable, Application, ApplicationId, ApplicationStatus},
    poll::{FlatAnswerNode, PollQuestionPayload},
    AuctionSettings, PromotionId, SegmentId,
};
use promo_sync::remote::{
    FixedPrice, NewSegment, PromotionBackend, PromotionPayload, RemoteError, RemotePromotion,
    SegmentCollection, SegmentPatch,
};

use crate::config::ClientConfig;
use crate::http::HttpTransport;
use crate::wire::{Created, WireApplications, WireAuctionParams, WirePromotion};

pub struct AdminClient {
    http: HttpTransport,
}

/// Result of approving every clean pending application of a promotion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkApproval {
    pub approved: Vec<ApplicationId>,
    pub failed: Vec<(ApplicationId, RemoteError)>,
    /// Pending applications left for a manual decision (stop factors).
    pub flagged: usize,
}

#[derive(Serialize)]
struct FixedPriceEntry {
    position: u32,
    price: i64,
}

impl AdminClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: HttpTransport::new(config),
        }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    fn promotion_path(id: PromotionId) -> String {
        format!("/admin/promotions/{id}")
    }

    fn segment_path(promotion: PromotionId, id: SegmentId) -> String {
        format!("/admin/promotions/{promotion}/segments/{id}")
    }
}

// Moderation
impl AdminClient {
    pub fn applications(
        &self,
        promotion: PromotionId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, RemoteError> {
        let mut path = format!("{}/moderation/applications", Self::promotion_path(promotion));
        if let Some(status) = status {
            path.push_str(&format!("?status={status}"));
        }
        let wire: WireApplications = self.http.get(&path)?;
        wire.applications
            .into_iter()
            .map(|app| app.into_application())
            .collect()
    }

    pub fn approve_application(&self, id: ApplicationId) -> Result<(), RemoteError> {
        let path = format!("/admin/moderation/{id}/approve");
        self.http.send_unit("POST", &path, &json!({}))
    }

    pub fn reject_application(&self, id: ApplicationId, reason: &str) -> Result<(), RemoteError> {
        let path = format!("/admin/moderation/{id}/reject");
        self.http
            .send_unit("POST", &path, &json!({ "reason": reason }))
    }

    /// Approve every pending application without stop factors. A failed
    /// approval is recorded and the rest still run.
    pub fn approve_clean(&self, promotion: PromotionId) -> Result<BulkApproval, RemoteError> {
        let pending = self.applications(promotion, Some(ApplicationStatus::Pending))?;
        let ids = approvable(&pending);
        let mut result = BulkApproval {
            flagged: pending
                .iter()
                .filter(|app| app.status == ApplicationStatus::Pending && !app.is_clean_pending())
                .count(),
            ..BulkApproval::default()
        };
        for id in ids {
            match self.approve_application(id) {
                Ok(()) => result.approved.push(id),
                Err(error) => {
                    tracing::warn!("approving application {id} failed: {error}");
                    result.failed.push((id, error));
                }
            }
        }
        tracing::info!(
            "promotion {promotion}: {} approved, {} flagged",
            result.approved.len(),
            result.flagged
        );
        Ok(result)
    }
}

/// A create reply without a positive id is unusable.
fn created_id(reply: Created, what: &str) -> Result<i64, RemoteError> {
    match reply.id {
        Some(id) if id > 0 => Ok(id),
        other => Err(RemoteError::MalformedResponse(format!(
            "{what} reply carried no usable id ({other:?})"
        ))),
    }
}

impl SegmentCollection for AdminClient {
    fn create_segment(
        &mut self,
        promotion: PromotionId,
        segment: &NewSegment,
    ) -> Result<SegmentId, RemoteError> {
        let path = format!("/admin/promotions/{promotion}/segments");
        let reply: Created = self.http.send("POST", &path, segment)?;
        created_id(reply, "segment create").map(SegmentId)
    }

    fn update_segment(
        &mut self,
        promotion: PromotionId,
        id: SegmentId,
        patch: &SegmentPatch,
    ) -> Result<(), RemoteError> {
        self.http
            .send_unit("PATCH", &Self::segment_path(promotion, id), patch)
    }

    fn delete_segment(&mut self, promotion: PromotionId, id: SegmentId) -> Result<(), RemoteError> {
        self.http.delete(&Self::segment_path(promotion, id))
    }
}

impl PromotionBackend for AdminClient {
    fn create_promotion(&mut self, payload: &PromotionPayload) -> Result<PromotionId, RemoteError> {
        let reply: Created = self.http.send("POST", "/admin/promotions", payload)?;
        created_id(reply, "promotion create").map(PromotionId)
    }

    fn update_promotion(
        &mut self,
        id: PromotionId,
        payload: &PromotionPayload,
    ) -> Result<(), RemoteError> {
        self.http
            .send_unit("PATCH", &Self::promotion_path(id), payload)
    }

    fn get_promotion(&mut self, id: PromotionId) -> Result<RemotePromotion, RemoteError> {
        let wire: WirePromotion = self.http.get(&Self::promotion_path(id))?;
        let mut remote = RemotePromotion::from(wire);
        remote.id.get_or_insert(id);
        Ok(remote)
    }

    fn get_auction_params(&mut self, id: PromotionId) -> Result<AuctionSettings, RemoteError> {
        let path = format!("{}/auction-params", Self::promotion_path(id));
        let wire: WireAuctionParams = self.http.get(&path)?;
        Ok(wire.into_settings())
    }

    fn set_auction_params(
        &mut self,
        id: PromotionId,
        params: &AuctionSettings,
    ) -> Result<(), RemoteError> {
        let path = format!("{}/auction-params", Self::promotion_path(id));
        let body = json!({ "minPrice": params.min_price, "bidStep": params.bid_step });
        self.http.send_unit("PUT", &path, &body)
    }

    fn set_fixed_prices(&mut self, id: PromotionId, prices: &[FixedPrice]) -> Result<(), RemoteError> {
        let path = format!("{}/fixed-prices", Self::promotion_path(id));
        let entries: Vec<FixedPriceEntry> = prices
            .iter()
            .map(|p| FixedPriceEntry {
                position: p.position,
                price: p.price,
            })
            .collect();
        self.http
            .send_unit("PUT", &path, &json!({ "prices": entries }))
    }

    fn set_poll_questions(
        &mut self,
        id: PromotionId,
        questions: &[PollQuestionPayload],
    ) -> Result<(), RemoteError> {
        let path = format!("{}/poll/questions", Self::promotion_path(id));
        self.http
            .send_unit("POST", &path, &json!({ "questions": questions }))
    }

    fn set_answer_tree(&mut self, id: PromotionId, nodes: &[FlatAnswerNode]) -> Result<(), RemoteError> {
        let path = format!("{}/poll/answer-tree", Self::promotion_path(id));
        self.http
            .send_unit("POST", &path, &json!({ "nodes": nodes }))
    }
}
