//! Save / load pipeline against an in-memory backend.

mod common;

use chrono::NaiveDate;
use common::FakeBackend;
use promo_core::{
    AnswerNode, AuctionSettings, IdentificationMode, PollQuestion, PricingModel, PromotionId,
    PromotionSettings, SegmentId, SegmentSpec,
};
use promo_sync::{
    load_promotion, pipeline::IdentitySeed, save_promotion, FailurePolicy, SaveOptions, SyncError,
};

/// Route the pipeline's warnings to the test output.
fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spring() -> PromotionSettings {
    PromotionSettings {
        name: "Spring".into(),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        end_date: NaiveDate::from_ymd_opt(2026, 5, 31),
        segments: vec![
            SegmentSpec::new("Овен", "Спорт и отдых"),
            SegmentSpec::new("Телец", "Электроника"),
        ],
        poll_questions: vec![PollQuestion {
            question: "Любимый сезон?".into(),
            options: vec!["Весна".into(), " ".into(), "Лето".into()],
        }],
        ..PromotionSettings::default()
    }
}

#[test]
fn new_promotion_is_created_and_ids_written_back() {
    let mut backend = FakeBackend::default();
    let report =
        save_promotion(&mut backend, &spring(), None, SaveOptions::default()).expect("save");

    assert!(report.created_promotion);
    assert_eq!(report.promotion_id, Some(PromotionId(41)));
    assert_eq!(report.settings.promotion_id, Some(PromotionId(41)));
    assert_eq!(report.settings.segments[0].id, Some(SegmentId(1)));
    assert_eq!(report.settings.segments[1].id, Some(SegmentId(2)));
    assert!(report.pricing_saved);
    assert!(report.poll_saved);
    report.ensure_clean().expect("clean");

    let (_, payload) = backend.promotion.as_ref().expect("promotion");
    assert_eq!(payload.date_from, "2026-03-01T00:00:00Z");
    assert_eq!(backend.auction, Some(AuctionSettings::default()));
    assert_eq!(backend.questions.len(), 1);
    assert_eq!(backend.questions[0].options.len(), 2);
    assert_eq!(backend.questions[0].options[0].value, "весна");
}

#[test]
fn existing_promotion_is_seeded_from_remote_segments() {
    let mut backend = FakeBackend::existing(7, &[("Овен", 3), ("Старый", 4)]);
    let mut settings = spring();
    settings.promotion_id = Some(PromotionId(7));

    let report = save_promotion(&mut backend, &settings, None, SaveOptions::default())
        .expect("save");
    let outcome = report.outcome.expect("outcome");
    assert_eq!(outcome.identity.get("Овен"), Some(SegmentId(3)));
    assert_eq!(outcome.identity.get("Телец"), Some(SegmentId(5)));
    assert!(outcome.identity.get("Старый").is_none());
    assert_eq!(backend.segments.names_in_order(), vec!["Овен", "Телец"]);
    assert_eq!(backend.creates, 0);
}

#[test]
fn explicit_seed_overrides_remote_lookup() {
    let mut backend = FakeBackend::existing(7, &[("Овен", 3)]);
    let mut settings = spring();
    settings.promotion_id = Some(PromotionId(7));
    settings.segments.truncate(1);

    let seed = IdentitySeed {
        identity: [("Овен", SegmentId(3))].into_iter().collect(),
        previous: [SegmentId(3)].into_iter().collect(),
    };
    save_promotion(&mut backend, &settings, Some(seed), SaveOptions::default()).expect("save");
    assert_eq!(backend.segments.calls, vec![common::Call::Update {
        id: 3,
        name: "Овен".into(),
        order: 1,
    }]);
}

#[test]
fn fixed_pricing_sends_positive_prices_only() {
    let mut backend = FakeBackend::default();
    let mut settings = spring();
    settings.pricing_model = PricingModel::Fixed;
    settings.fixed_prices.insert(1, 5000);
    settings.fixed_prices.insert(2, 0);

    save_promotion(&mut backend, &settings, None, SaveOptions::default()).expect("save");
    assert_eq!(backend.fixed.len(), 1);
    assert_eq!(backend.fixed[0].price, 5000);
    assert!(backend.auction.is_none());
}

#[test]
fn profile_identification_skips_poll_and_tree_is_flattened_otherwise() {
    let mut backend = FakeBackend::default();
    let mut settings = spring();
    settings.identification_mode = IdentificationMode::UserProfile;
    let report = save_promotion(&mut backend, &settings, None, SaveOptions::default())
        .expect("save");
    assert!(!report.poll_saved);
    assert!(backend.questions.is_empty());

    let mut backend = FakeBackend::default();
    let mut settings = spring();
    settings.answer_tree = vec![AnswerNode {
        label: "Да".into(),
        value: String::new(),
        next: vec![AnswerNode {
            label: String::new(),
            value: "deep".into(),
            next: Vec::new(),
        }],
    }];
    save_promotion(&mut backend, &settings, None, SaveOptions::default()).expect("save");
    assert_eq!(backend.tree.len(), 2);
    assert_eq!(backend.tree[1].parent_node_id, "root-1");
}

#[test]
fn segment_failure_stops_before_pricing() {
    init_logs();
    let mut backend = FakeBackend::default();
    backend.segments.fail_create.insert("Телец".into());

    let report = save_promotion(
        &mut backend,
        &spring(),
        None,
        SaveOptions {
            policy: FailurePolicy::Continue,
            dry_run: false,
        },
    )
    .expect("pipeline itself succeeds");

    assert!(!report.pricing_saved);
    assert!(backend.auction.is_none());
    assert_eq!(report.settings.segments[0].id, Some(SegmentId(1)));
    assert_eq!(report.settings.segments[1].id, None);
    let err = report.ensure_clean().unwrap_err();
    assert!(matches!(err, SyncError::SegmentsNotSaved { failed: 1 }));
    assert!(err.to_string().contains("could not save segment changes"));
}

#[test]
fn pricing_failure_keeps_ids_so_the_next_save_updates() {
    init_logs();
    let mut backend = FakeBackend::default();
    backend.pricing_down = true;

    let report =
        save_promotion(&mut backend, &spring(), None, SaveOptions::default()).expect("save");
    assert_eq!(report.settings.promotion_id, Some(PromotionId(41)));
    assert_eq!(report.settings.segments[0].id, Some(SegmentId(1)));
    assert_eq!(report.settings.segments[1].id, Some(SegmentId(2)));
    assert!(!report.pricing_saved);
    assert!(report.poll_saved);
    assert_eq!(report.step_failures.len(), 1);
    assert_eq!(report.step_failures[0].step, "save auction parameters");
    let err = report.ensure_clean().unwrap_err();
    assert!(matches!(err, SyncError::Remote { .. }));
    assert!(err.to_string().contains("save auction parameters"));

    // Persisted ids and identity drive the retry.
    let outcome = report.outcome.expect("outcome");
    let seed = IdentitySeed {
        identity: outcome.identity,
        previous: outcome.known_ids,
    };
    backend.pricing_down = false;
    let retry = save_promotion(&mut backend, &report.settings, Some(seed), SaveOptions::default())
        .expect("retry");
    assert!(!retry.created_promotion);
    assert_eq!(backend.creates, 1);
    let segment_creates = backend
        .segments
        .calls
        .iter()
        .filter(|c| matches!(c, common::Call::Create { .. }))
        .count();
    assert_eq!(segment_creates, 2);
    assert_eq!(backend.segments.names_in_order(), vec!["Овен", "Телец"]);
    retry.ensure_clean().expect("clean");
}

#[test]
fn dry_run_issues_no_writes() {
    let mut backend = FakeBackend::existing(7, &[("Овен", 3), ("Старый", 4)]);
    let mut settings = spring();
    settings.promotion_id = Some(PromotionId(7));

    let report = save_promotion(
        &mut backend,
        &settings,
        None,
        SaveOptions {
            policy: FailurePolicy::Continue,
            dry_run: true,
        },
    )
    .expect("dry run");

    assert_eq!(backend.writes, 0);
    assert!(report.outcome.is_none());
    assert_eq!(report.plan.updates(), 1);
    assert_eq!(report.plan.creates(), 1);
    assert_eq!(report.plan.deletes(), 1);
}

#[test]
fn update_of_missing_promotion_is_a_remote_error() {
    let mut backend = FakeBackend::default();
    let mut settings = spring();
    settings.promotion_id = Some(PromotionId(99));
    let err = save_promotion(&mut backend, &settings, None, SaveOptions::default()).unwrap_err();
    assert!(matches!(err, SyncError::Remote { .. }));
    assert!(err.to_string().contains("update promotion 99"));
}

#[test]
fn load_builds_settings_in_remote_order() {
    let mut backend = FakeBackend::existing(7, &[("Овен", 3), ("Телец", 4)]);
    let loaded = load_promotion(&mut backend, PromotionId(7)).expect("load");

    let s = &loaded.settings;
    assert_eq!(s.promotion_id, Some(PromotionId(7)));
    assert_eq!(s.theme, "seasons");
    assert_eq!(s.start_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    assert_eq!(s.min_discount, 15);
    assert_eq!(s.auction.min_price, 2000);
    assert_eq!(s.stop_factors, vec!["alcohol"]);
    assert_eq!(s.segment_names(), vec!["Овен", "Телец"]);
    assert_eq!(s.segments[1].id, Some(SegmentId(4)));
    assert_eq!(s.poll_questions, vec![PollQuestion::default()]);
    assert_eq!(loaded.seed.identity.get("Телец"), Some(SegmentId(4)));
    assert_eq!(loaded.status, "draft");
}

#[test]
fn load_falls_back_to_default_auction_params() {
    init_logs();
    let mut backend = FakeBackend::existing(7, &[]);
    backend.auction_unavailable = true;
    let loaded = load_promotion(&mut backend, PromotionId(7)).expect("load");
    assert_eq!(loaded.settings.auction, AuctionSettings::default());
}

#[test]
fn save_after_load_is_updates_only() {
    let mut backend = FakeBackend::existing(7, &[("Овен", 3), ("Телец", 4)]);
    let loaded = load_promotion(&mut backend, PromotionId(7)).expect("load");
    save_promotion(&mut backend, &loaded.settings, None, SaveOptions::default()).expect("save");
    assert!(backend
        .segments
        .calls
        .iter()
        .all(|c| matches!(c, common::Call::Update { .. })));
}
