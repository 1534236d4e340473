//! Save / load pipeline shared by `promo sync`, `promo pull` and `promo diff`.
//!
//! A save runs in a fixed order: promotion upsert, segment reconcile, pricing,
//! poll. Segment failures stop the pipeline after the reconcile result has been
//! captured in the report, so callers can still persist the identifiers that
//! did get assigned.

use std::collections::BTreeSet;

use promo_core::{
    poll::{build_poll_questions, flatten_answer_tree},
    AuctionSettings, IdentificationMode, IdentityMap, PollQuestion, PricingModel, PromotionId,
    PromotionSettings, SegmentId, SegmentSpec,
};

use crate::error::{remote_err, SyncError};
use crate::plan::{plan, SegmentPlan};
use crate::reconcile::{execute, FailurePolicy, ReconcileOutcome};
use crate::remote::{
    parse_date_prefix, FixedPrice, PromotionBackend, PromotionPayload, RemoteError,
    RemotePromotion,
};
use crate::state_store::SyncState;

/// Identity map and previous identifiers a save starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySeed {
    pub identity: IdentityMap,
    pub previous: BTreeSet<SegmentId>,
}

impl IdentitySeed {
    /// Seed from the segments a promotion currently has remotely.
    pub fn from_remote(remote: &RemotePromotion) -> Self {
        let mut ordered = remote.segments.clone();
        ordered.sort_by_key(|s| s.order_index);
        let mut identity = IdentityMap::new();
        for segment in &ordered {
            if identity.get(&segment.name).is_none() {
                identity.bind(&segment.name, segment.id);
            }
        }
        Self {
            identity,
            previous: ordered.iter().map(|s| s.id).collect(),
        }
    }

    /// Seed from the state the last sync of this file left behind.
    pub fn from_state(state: &SyncState) -> Self {
        Self {
            identity: state.segments.clone(),
            previous: state.known_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub policy: FailurePolicy,
    /// Compute the plan only; no remote write is issued.
    pub dry_run: bool,
}

/// What a save did (or, in dry-run, would do).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// `None` only for a dry-run of a promotion that does not exist yet.
    pub promotion_id: Option<PromotionId>,
    pub created_promotion: bool,
    pub plan: SegmentPlan,
    /// Absent in dry-run.
    pub outcome: Option<ReconcileOutcome>,
    /// Settings with the promotion id and segment ids written back.
    pub settings: PromotionSettings,
    pub pricing_saved: bool,
    pub poll_saved: bool,
    /// Pricing and poll calls that failed after the segments were saved.
    pub step_failures: Vec<StepFailure>,
}

/// A pricing or poll call that failed; later steps still ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: &'static str,
    pub error: RemoteError,
}

impl SaveReport {
    /// Fails with the aggregate segment error when the reconcile had failures,
    /// else with the first failed pricing or poll call.
    pub fn ensure_clean(&self) -> Result<(), SyncError> {
        if let Some(outcome) = &self.outcome {
            outcome.ensure_clean()?;
        }
        match self.step_failures.first() {
            Some(failure) => Err(remote_err(failure.step, failure.error.clone())),
            None => Ok(()),
        }
    }
}

/// Push `settings` to the backend.
///
/// `seed` overrides where the identity map and previous identifiers come from;
/// without it an existing promotion is read back first and a new one starts
/// empty. Once the promotion exists, the returned report carries segment,
/// pricing and poll failures rather than an error: call
/// [`SaveReport::ensure_clean`] after persisting what it holds.
pub fn save_promotion<B: PromotionBackend + ?Sized>(
    backend: &mut B,
    settings: &PromotionSettings,
    seed: Option<IdentitySeed>,
    options: SaveOptions,
) -> Result<SaveReport, SyncError> {
    let mut written = settings.clone();
    let payload = PromotionPayload::from_settings(settings);

    if options.dry_run {
        let seed = match (seed, settings.promotion_id) {
            (Some(seed), _) => seed,
            (None, Some(id)) => fetch_seed(backend, id)?,
            (None, None) => IdentitySeed::default(),
        };
        let planned = plan(&settings.segments, &seed.identity, &seed.previous);
        return Ok(SaveReport {
            promotion_id: settings.promotion_id,
            created_promotion: settings.promotion_id.is_none(),
            plan: planned,
            outcome: None,
            settings: written,
            pricing_saved: false,
            poll_saved: false,
            step_failures: Vec::new(),
        });
    }

    // 1. Promotion upsert.
    let (promotion, created) = match settings.promotion_id {
        Some(id) => {
            backend
                .update_promotion(id, &payload)
                .map_err(|e| remote_err(format!("update promotion {id}"), e))?;
            (id, false)
        }
        None => {
            let id = backend
                .create_promotion(&payload)
                .map_err(|e| remote_err("create promotion", e))?;
            tracing::info!("created promotion {id}");
            (id, true)
        }
    };
    written.promotion_id = Some(promotion);

    // 2. Segments.
    let seed = match seed {
        Some(seed) => seed,
        None if created => IdentitySeed::default(),
        None => fetch_seed(backend, promotion)?,
    };
    let planned = plan(&settings.segments, &seed.identity, &seed.previous);
    let outcome = execute(
        backend,
        promotion,
        planned.clone(),
        &seed.identity,
        &seed.previous,
        options.policy,
    );
    outcome.write_back(&mut written.segments);

    let mut report = SaveReport {
        promotion_id: Some(promotion),
        created_promotion: created,
        plan: planned,
        outcome: Some(outcome),
        settings: written,
        pricing_saved: false,
        poll_saved: false,
        step_failures: Vec::new(),
    };
    if report.ensure_clean().is_err() {
        tracing::warn!("segment save incomplete; pricing and poll not saved");
        return Ok(report);
    }

    // 3. Pricing. From here on a failed call is recorded, not returned: the
    // promotion and segment ids above must reach the caller either way.
    let pricing = match settings.pricing_model {
        PricingModel::Fixed => backend
            .set_fixed_prices(promotion, &fixed_prices(settings))
            .map_err(|e| ("save fixed prices", e)),
        PricingModel::Auction => backend
            .set_auction_params(promotion, &settings.auction)
            .map_err(|e| ("save auction parameters", e)),
    };
    match pricing {
        Ok(()) => report.pricing_saved = true,
        Err((step, error)) => record(&mut report, step, error),
    }

    // 4. Poll.
    if settings.identification_mode == IdentificationMode::Questions {
        let questions = build_poll_questions(&settings.poll_questions);
        let poll = backend
            .set_poll_questions(promotion, &questions)
            .map_err(|e| ("save poll questions", e))
            .and_then(|()| {
                if settings.answer_tree.is_empty() {
                    return Ok(());
                }
                let nodes = flatten_answer_tree(&settings.answer_tree);
                backend
                    .set_answer_tree(promotion, &nodes)
                    .map_err(|e| ("save answer tree", e))
            });
        match poll {
            Ok(()) => report.poll_saved = true,
            Err((step, error)) => record(&mut report, step, error),
        }
    }

    Ok(report)
}

/// A remote promotion turned into a settings file plus its identity seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPromotion {
    pub settings: PromotionSettings,
    pub seed: IdentitySeed,
    pub status: String,
}

/// Read promotion `id` into settings form.
pub fn load_promotion<B: PromotionBackend + ?Sized>(
    backend: &mut B,
    id: PromotionId,
) -> Result<LoadedPromotion, SyncError> {
    let remote = backend
        .get_promotion(id)
        .map_err(|e| remote_err(format!("load promotion {id}"), e))?;

    let auction = match backend.get_auction_params(id) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("auction parameters of promotion {id} unavailable ({e}); using defaults");
            AuctionSettings::default()
        }
    };

    let seed = IdentitySeed::from_remote(&remote);
    let settings = settings_from_remote(id, &remote, auction);
    Ok(LoadedPromotion {
        settings,
        seed,
        status: remote.status,
    })
}

fn fetch_seed<B: PromotionBackend + ?Sized>(
    backend: &mut B,
    id: PromotionId,
) -> Result<IdentitySeed, SyncError> {
    let remote = backend
        .get_promotion(id)
        .map_err(|e| remote_err(format!("load segments of promotion {id}"), e))?;
    Ok(IdentitySeed::from_remote(&remote))
}

fn record(report: &mut SaveReport, step: &'static str, error: RemoteError) {
    tracing::warn!("{step} failed: {error}");
    report.step_failures.push(StepFailure { step, error });
}

fn fixed_prices(settings: &PromotionSettings) -> Vec<FixedPrice> {
    settings
        .fixed_prices
        .iter()
        .filter(|(position, price)| **position > 0 && **price > 0)
        .map(|(position, price)| FixedPrice {
            position: *position,
            price: *price,
        })
        .collect()
}

fn settings_from_remote(
    id: PromotionId,
    remote: &RemotePromotion,
    auction: AuctionSettings,
) -> PromotionSettings {
    let defaults = PromotionSettings::default();

    let mut ordered = remote.segments.clone();
    ordered.sort_by_key(|s| s.order_index);
    let segments = ordered
        .into_iter()
        .map(|s| SegmentSpec::new(s.name, s.category).with_id(s.id))
        .collect();

    let poll_questions = if remote.poll_questions.is_empty() {
        vec![PollQuestion::default()]
    } else {
        remote.poll_questions.clone()
    };

    PromotionSettings {
        promotion_id: Some(id),
        name: remote.name.clone(),
        description: remote.description.clone(),
        start_date: parse_date_prefix(&remote.date_from),
        end_date: parse_date_prefix(&remote.date_to),
        theme: if remote.theme.is_empty() {
            defaults.theme.clone()
        } else {
            remote.theme.clone()
        },
        segments,
        pricing_model: PricingModel::parse(&remote.pricing_model).unwrap_or_default(),
        auction,
        fixed_prices: remote.fixed_prices.clone(),
        slot_count: remote.slot_count,
        min_discount: remote.discount,
        max_discount: defaults.max_discount.max(remote.discount),
        stop_factors: remote.stop_factors.clone(),
        identification_mode: IdentificationMode::parse(&remote.identification_mode)
            .unwrap_or_default(),
        poll_questions,
        answer_tree: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteSegment;

    #[test]
    fn seed_from_remote_keeps_first_duplicate_by_order() {
        let remote = RemotePromotion {
            segments: vec![
                RemoteSegment {
                    id: SegmentId(9),
                    name: "A".into(),
                    category: String::new(),
                    order_index: 2,
                },
                RemoteSegment {
                    id: SegmentId(4),
                    name: "A".into(),
                    category: String::new(),
                    order_index: 1,
                },
            ],
            ..RemotePromotion::default()
        };
        let seed = IdentitySeed::from_remote(&remote);
        assert_eq!(seed.identity.get("A"), Some(SegmentId(4)));
        assert_eq!(seed.previous, BTreeSet::from([SegmentId(4), SegmentId(9)]));
    }

    #[test]
    fn fixed_prices_drop_non_positive_entries() {
        let mut s = PromotionSettings::default();
        s.fixed_prices.insert(0, 100);
        s.fixed_prices.insert(1, 0);
        s.fixed_prices.insert(2, 700);
        assert_eq!(
            fixed_prices(&s),
            vec![FixedPrice {
                position: 2,
                price: 700
            }]
        );
    }

    #[test]
    fn remote_conversion_defaults() {
        let remote = RemotePromotion {
            name: "Autumn".into(),
            date_from: "2026-09-01T00:00:00Z".into(),
            pricing_model: "FIXED".into(),
            identification_mode: "bogus".into(),
            discount: 70,
            ..RemotePromotion::default()
        };
        let s = settings_from_remote(PromotionId(2), &remote, AuctionSettings::default());
        assert_eq!(s.theme, "zodiac");
        assert_eq!(s.pricing_model, PricingModel::Fixed);
        assert_eq!(s.identification_mode, IdentificationMode::Questions);
        assert_eq!(s.max_discount, 70);
        assert_eq!(s.poll_questions, vec![PollQuestion::default()]);
        assert_eq!(s.start_date.map(|d| d.to_string()).as_deref(), Some("2026-09-01"));
    }
}
