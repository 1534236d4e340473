//! In-memory fakes of the remote promotion service.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use promo_core::{
    poll::{FlatAnswerNode, PollQuestionPayload},
    AuctionSettings, PromotionId, SegmentId,
};
use promo_sync::remote::{
    FixedPrice, NewSegment, PromotionBackend, PromotionPayload, RemoteError, RemotePromotion,
    RemoteSegment, SegmentCollection, SegmentPatch,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        name: String,
        category: String,
        order: u32,
    },
    Update {
        id: i64,
        name: String,
        order: u32,
    },
    Delete {
        id: i64,
    },
}

pub fn create(name: &str, order: u32) -> Call {
    Call::Create {
        name: name.into(),
        category: "cat".into(),
        order,
    }
}

pub fn update(id: i64, name: &str, order: u32) -> Call {
    Call::Update {
        id,
        name: name.into(),
        order,
    }
}

pub fn delete(id: i64) -> Call {
    Call::Delete { id }
}

/// Segment collection that records every call and keeps the resulting rows.
#[derive(Debug, Default)]
pub struct RecordingSegments {
    pub calls: Vec<Call>,
    pub rows: BTreeMap<SegmentId, RemoteSegment>,
    pub next_id: i64,
    pub fail_create: BTreeSet<String>,
    pub fail_update: BTreeSet<SegmentId>,
    pub fail_delete: BTreeSet<SegmentId>,
    /// Names whose create "succeeds" without a usable id.
    pub zero_id: BTreeSet<String>,
}

impl RecordingSegments {
    /// A collection already holding `rows` (name, id), ids allocated above them.
    pub fn with_rows(rows: &[(&str, i64)]) -> Self {
        let mut me = Self::default();
        for (index, (name, id)) in rows.iter().enumerate() {
            me.rows.insert(
                SegmentId(*id),
                RemoteSegment {
                    id: SegmentId(*id),
                    name: name.to_string(),
                    category: "cat".into(),
                    order_index: (index + 1) as u32,
                },
            );
            me.next_id = me.next_id.max(*id);
        }
        me
    }

    pub fn names_in_order(&self) -> Vec<String> {
        let mut rows: Vec<_> = self.rows.values().collect();
        rows.sort_by_key(|r| r.order_index);
        rows.into_iter().map(|r| r.name.clone()).collect()
    }

    fn rejected() -> RemoteError {
        RemoteError::Http {
            status: 500,
            message: "injected failure".into(),
        }
    }
}

impl SegmentCollection for RecordingSegments {
    fn create_segment(
        &mut self,
        _promotion: PromotionId,
        segment: &NewSegment,
    ) -> Result<SegmentId, RemoteError> {
        self.calls.push(Call::Create {
            name: segment.name.clone(),
            category: segment.category.clone(),
            order: segment.order_index,
        });
        if self.fail_create.contains(&segment.name) {
            return Err(Self::rejected());
        }
        if self.zero_id.contains(&segment.name) {
            return Ok(SegmentId(0));
        }
        self.next_id += 1;
        let id = SegmentId(self.next_id);
        self.rows.insert(
            id,
            RemoteSegment {
                id,
                name: segment.name.clone(),
                category: segment.category.clone(),
                order_index: segment.order_index,
            },
        );
        Ok(id)
    }

    fn update_segment(
        &mut self,
        _promotion: PromotionId,
        id: SegmentId,
        patch: &SegmentPatch,
    ) -> Result<(), RemoteError> {
        self.calls.push(Call::Update {
            id: id.0,
            name: patch.name.clone().unwrap_or_default(),
            order: patch.order_index.unwrap_or_default(),
        });
        if self.fail_update.contains(&id) {
            return Err(Self::rejected());
        }
        let row = self.rows.get_mut(&id).ok_or(RemoteError::Http {
            status: 404,
            message: "segment not found".into(),
        })?;
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(category) = &patch.category {
            row.category = category.clone();
        }
        if let Some(order) = patch.order_index {
            row.order_index = order;
        }
        Ok(())
    }

    fn delete_segment(&mut self, _promotion: PromotionId, id: SegmentId) -> Result<(), RemoteError> {
        self.calls.push(Call::Delete { id: id.0 });
        if self.fail_delete.contains(&id) {
            return Err(Self::rejected());
        }
        self.rows.remove(&id);
        Ok(())
    }
}

/// Whole admin backend for one promotion, segments delegated to
/// [`RecordingSegments`].
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub segments: RecordingSegments,
    pub promotion: Option<(PromotionId, PromotionPayload)>,
    pub creates: usize,
    pub auction: Option<AuctionSettings>,
    pub fixed: Vec<FixedPrice>,
    pub questions: Vec<PollQuestionPayload>,
    pub tree: Vec<FlatAnswerNode>,
    pub auction_unavailable: bool,
    /// Pricing writes fail with a transport error.
    pub pricing_down: bool,
    pub writes: usize,
}

impl FakeBackend {
    pub fn existing(id: i64, rows: &[(&str, i64)]) -> Self {
        Self {
            segments: RecordingSegments::with_rows(rows),
            promotion: Some((
                PromotionId(id),
                PromotionPayload {
                    name: "Remote".into(),
                    description: String::new(),
                    theme: "seasons".into(),
                    date_from: "2026-03-01T00:00:00Z".into(),
                    date_to: "2026-05-31T00:00:00Z".into(),
                    identification_mode: "questions".into(),
                    pricing_model: "auction".into(),
                    slot_count: 8,
                    discount: 15,
                    stop_factors: vec!["alcohol".into()],
                },
            )),
            ..Self::default()
        }
    }
}

impl SegmentCollection for FakeBackend {
    fn create_segment(
        &mut self,
        promotion: PromotionId,
        segment: &NewSegment,
    ) -> Result<SegmentId, RemoteError> {
        self.writes += 1;
        self.segments.create_segment(promotion, segment)
    }

    fn update_segment(
        &mut self,
        promotion: PromotionId,
        id: SegmentId,
        patch: &SegmentPatch,
    ) -> Result<(), RemoteError> {
        self.writes += 1;
        self.segments.update_segment(promotion, id, patch)
    }

    fn delete_segment(&mut self, promotion: PromotionId, id: SegmentId) -> Result<(), RemoteError> {
        self.writes += 1;
        self.segments.delete_segment(promotion, id)
    }
}

impl PromotionBackend for FakeBackend {
    fn create_promotion(&mut self, payload: &PromotionPayload) -> Result<PromotionId, RemoteError> {
        self.writes += 1;
        self.creates += 1;
        let id = PromotionId(40 + self.creates as i64);
        self.promotion = Some((id, payload.clone()));
        Ok(id)
    }

    fn update_promotion(
        &mut self,
        id: PromotionId,
        payload: &PromotionPayload,
    ) -> Result<(), RemoteError> {
        self.writes += 1;
        match &self.promotion {
            Some((current, _)) if *current == id => {
                self.promotion = Some((id, payload.clone()));
                Ok(())
            }
            _ => Err(RemoteError::Http {
                status: 404,
                message: "promotion not found".into(),
            }),
        }
    }

    fn get_promotion(&mut self, id: PromotionId) -> Result<RemotePromotion, RemoteError> {
        let Some((current, payload)) = &self.promotion else {
            return Err(RemoteError::Http {
                status: 404,
                message: "promotion not found".into(),
            });
        };
        if *current != id {
            return Err(RemoteError::Http {
                status: 404,
                message: "promotion not found".into(),
            });
        }
        Ok(RemotePromotion {
            id: Some(id),
            name: payload.name.clone(),
            description: payload.description.clone(),
            theme: payload.theme.clone(),
            status: "draft".into(),
            date_from: payload.date_from.clone(),
            date_to: payload.date_to.clone(),
            identification_mode: payload.identification_mode.clone(),
            pricing_model: payload.pricing_model.clone(),
            slot_count: payload.slot_count,
            discount: payload.discount,
            stop_factors: payload.stop_factors.clone(),
            segments: self.segments.rows.values().cloned().collect(),
            fixed_prices: self.fixed.iter().map(|p| (p.position, p.price)).collect(),
            poll_questions: Vec::new(),
        })
    }

    fn get_auction_params(&mut self, _id: PromotionId) -> Result<AuctionSettings, RemoteError> {
        if self.auction_unavailable {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        Ok(self.auction.unwrap_or(AuctionSettings {
            min_price: 2000,
            bid_step: 250,
        }))
    }

    fn set_auction_params(
        &mut self,
        _id: PromotionId,
        params: &AuctionSettings,
    ) -> Result<(), RemoteError> {
        self.writes += 1;
        if self.pricing_down {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        self.auction = Some(*params);
        Ok(())
    }

    fn set_fixed_prices(&mut self, _id: PromotionId, prices: &[FixedPrice]) -> Result<(), RemoteError> {
        self.writes += 1;
        if self.pricing_down {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        self.fixed = prices.to_vec();
        Ok(())
    }

    fn set_poll_questions(
        &mut self,
        _id: PromotionId,
        questions: &[PollQuestionPayload],
    ) -> Result<(), RemoteError> {
        self.writes += 1;
        self.questions = questions.to_vec();
        Ok(())
    }

    fn set_answer_tree(&mut self, _id: PromotionId, nodes: &[FlatAnswerNode]) -> Result<(), RemoteError> {
        self.writes += 1;
        self.tree = nodes.to_vec();
        Ok(())
    }
}
