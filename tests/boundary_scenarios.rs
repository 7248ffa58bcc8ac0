//! Boundary scenarios and universal invariants, seeded from the testable
//! properties (Scenarios A-F and the invariants list).

use chrono::{Duration, TimeZone, Utc};
use korinsic_core::bayesian::registry::ModelRegistry;
use korinsic_core::bayesian::{self, ModelOptions};
use korinsic_core::config::CoreConfig;
use korinsic_core::dqsi::{self, strategy_for_role, KdeObservation, Strategy, TrustBucket};
use korinsic_core::esi::{self, EsiBadge, EsiWeights};
use korinsic_core::types::{
    AnalysisOptions, AnalyzeBatch, MarketData, MaterialEvent, Order, OrderStatus, Side, Trade, TraderInfo,
};
use korinsic_core::typology::Typology;
use korinsic_core::{analyze, aggregate, Severity};
use std::collections::HashMap;

fn reference_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
}

fn trader(role: &str) -> TraderInfo {
    TraderInfo {
        id: "TR-1".to_string(),
        name: "Test Trader".to_string(),
        role: role.to_string(),
        department: "equities".to_string(),
        access_level: "standard".to_string(),
        start_date: reference_time() - Duration::days(400),
        supervisors: vec!["SUP-1".to_string()],
    }
}

fn neutral_market_data() -> MarketData {
    MarketData {
        volatility: 0.2,
        volume: 1_000_000.0,
        price_movement: 0.0,
        liquidity: 0.8,
        market_hours: true,
    }
}

fn empty_batch(role: &str) -> AnalyzeBatch {
    AnalyzeBatch {
        trades: vec![],
        orders: vec![],
        trader_info: trader(role),
        material_events: vec![],
        market_data: neutral_market_data(),
        options: AnalysisOptions::default(),
    }
}

// --- Scenario A/B/C: inference directly against hand-built evidence sets ---

#[test]
fn scenario_a_strong_insider_dealing_evidence_beats_sparse_and_empty() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());
    let options = ModelRegistry::default_options(Typology::InsiderDealing);
    let model = registry.create_model(Typology::InsiderDealing, options).unwrap();

    let mut strong_evidence = HashMap::new();
    for node in ["trade_pattern", "comms_intent", "pnl_drift", "mnpi_access", "news_timing"] {
        strong_evidence.insert(node.to_string(), 2);
    }
    let strong_trace = bayesian::infer(&model, &strong_evidence).unwrap();

    let mut sparse_evidence = HashMap::new();
    sparse_evidence.insert("mnpi_access".to_string(), 1);
    let sparse_trace = bayesian::infer(&model, &sparse_evidence).unwrap();

    let empty_trace = bayesian::infer(&model, &HashMap::new()).unwrap();

    let strong_top = strong_trace.outcome_posterior.last().copied().unwrap();
    let sparse_top = sparse_trace.outcome_posterior.last().copied().unwrap();
    let empty_top = empty_trace.outcome_posterior.last().copied().unwrap();

    assert!(strong_top > sparse_top, "strong {strong_top} should exceed sparse {sparse_top}");
    assert!(sparse_top >= empty_top - 1e-9, "sparse {sparse_top} should be at least the empty marginal {empty_top}");
    assert!(strong_top >= 0.75, "strong scenario's top outcome state {strong_top} should clear the documented 0.75 floor");

    let evidence_nodes: Vec<String> = model.evidence_node_names().to_vec();
    let strong_esi = esi::compute(&strong_trace, &evidence_nodes, EsiWeights::default());
    // Insider dealing's roster has eight evidence nodes; this scenario only
    // observes five of them, so activation and cluster coverage land at 5/8
    // rather than full coverage, keeping the badge at Weak, not Strong.
    // See Open Question 8 in DESIGN.md for why this is accepted rather than
    // tuned away, and why the assertion below reflects the real figure
    // instead of a widened range that would hide it.
    assert_eq!(strong_esi.esi_badge, EsiBadge::Weak);
    assert!(strong_esi.evidence_sufficiency_index > 0.6 && strong_esi.evidence_sufficiency_index < 0.65);
}

#[test]
fn scenario_b_spoofing_sparse_evidence_yields_mid_range_activation() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());
    let options = ModelRegistry::default_options(Typology::Spoofing);
    let model = registry.create_model(Typology::Spoofing, options).unwrap();

    let mut evidence = HashMap::new();
    evidence.insert("order_clustering".to_string(), 2);
    evidence.insert("order_cancellation".to_string(), 2);
    let trace = bayesian::infer(&model, &evidence).unwrap();

    let evidence_nodes: Vec<String> = model.evidence_node_names().to_vec();
    assert_eq!(evidence_nodes.len(), 6, "spoofing's evidence roster should carry six nodes");
    let esi_result = esi::compute(&trace, &evidence_nodes, EsiWeights::default());

    let activation_ratio = esi_result.node_count as f64 / evidence_nodes.len() as f64;
    assert!(
        (activation_ratio - (1.0 / 3.0)).abs() < 0.01,
        "activation ratio {activation_ratio} should sit at the documented ~0.33 for this sparse-evidence scenario"
    );

    let top_state = trace.outcome_posterior.last().copied().unwrap();
    assert!((0.4..0.7).contains(&top_state), "outcome top state {top_state} should fall in [0.4, 0.7)");
    assert!(
        matches!(esi_result.esi_badge, EsiBadge::Weak | EsiBadge::Moderate),
        "badge {:?} should be Weak or Moderate for sparse evidence",
        esi_result.esi_badge
    );
}

#[test]
fn scenario_c_all_evidence_absent_yields_no_activation_and_low_trust() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());

    for typology in Typology::all() {
        let options = ModelRegistry::default_options(typology);
        let model = registry.create_model(typology, options).unwrap();
        let trace = bayesian::infer(&model, &HashMap::new()).unwrap();
        assert!(trace.active_nodes.is_empty());

        let evidence_nodes: Vec<String> = model.evidence_node_names().to_vec();
        let esi_result = esi::compute(&trace, &evidence_nodes, EsiWeights::default());
        assert!((esi_result.evidence_sufficiency_index).abs() < 1e-9, "no active nodes must yield zero ESI");
    }

    let batch = empty_batch("analyst");
    let observations = dqsi::observe_batch(&batch, reference_time());
    let strategy = strategy_for_role(Some("analyst"));
    let dqsi_result = dqsi::compute(&config.dqsi, &observations, strategy);
    assert_eq!(dqsi_result.dqsi_trust_bucket, TrustBucket::Low);

    let result = analyze(&batch, &config).unwrap();
    assert!(result.alerts.is_empty());
}

// --- Scenario D: a missing critical KDE caps dqsi_score ---

#[test]
fn scenario_d_missing_trader_id_caps_dqsi_score() {
    let config = CoreConfig::default_config();
    let mut batch = empty_batch("analyst");
    batch.trader_info.id = String::new();
    batch.trades.push(Trade {
        id: "T1".to_string(),
        timestamp_iso: reference_time(),
        instrument: "SIM.INSTRUMENT".to_string(),
        volume: 1000.0,
        price: 100.0,
        side: Side::Buy,
        trader_id: "TR-1".to_string(),
    });

    let observations = dqsi::observe_batch(&batch, reference_time());
    let strategy = strategy_for_role(Some("analyst"));
    let dqsi_result = dqsi::compute(&config.dqsi, &observations, strategy);

    assert!(dqsi_result.dqsi_score <= 0.75 + 1e-9);
    assert!(dqsi_result.missing_critical_kdes.contains(&"trader_id".to_string()));
}

#[test]
fn critical_kde_cap_holds_for_arbitrary_low_critical_observation() {
    let config = CoreConfig::default_config();
    let mut observations: HashMap<String, KdeObservation> = HashMap::new();
    observations.insert("trader_id".to_string(), KdeObservation::default());
    let dqsi_result = dqsi::compute(&config.dqsi, &observations, Strategy::RoleAware("analyst"));
    assert!(dqsi_result.dqsi_score <= 0.75 + 1e-9);
}

// --- Scenario E: news-context suppression reduces severity ---

#[test]
fn scenario_e_news_context_suppresses_severity_relative_to_no_context() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());
    let options = ModelRegistry::default_options(Typology::InsiderDealing);
    let model = registry.create_model(Typology::InsiderDealing, options).unwrap();

    let mut strong_evidence = HashMap::new();
    for node in ["trade_pattern", "comms_intent", "pnl_drift", "mnpi_access", "news_timing"] {
        strong_evidence.insert(node.to_string(), 2);
    }
    let trace = bayesian::infer(&model, &strong_evidence).unwrap();
    let evidence_nodes: Vec<String> = model.evidence_node_names().to_vec();
    let esi_result = esi::compute(&trace, &evidence_nodes, EsiWeights::default());

    let mut observations: HashMap<String, KdeObservation> = HashMap::new();
    observations.insert("trader_id".to_string(), KdeObservation { present: true, conforms_to_format: true, matches_reference: Some(true), ..Default::default() });
    let dqsi_result = dqsi::compute(&config.dqsi, &observations, Strategy::RoleAware("analyst"));

    let baseline = aggregate::aggregate(
        &trace.outcome_posterior,
        &esi_result,
        &dqsi_result,
        aggregate::ContextMultiplier::none(),
        aggregate::SeverityThresholds::default(),
    );

    let suppressed_multiplier = aggregate::news_context_multiplier(0.9, 10);
    let suppressed = aggregate::aggregate(
        &trace.outcome_posterior,
        &esi_result,
        &dqsi_result,
        aggregate::ContextMultiplier::bounded(suppressed_multiplier, "material event"),
        aggregate::SeverityThresholds::default(),
    );

    assert!(suppressed.adjusted_score < baseline.adjusted_score);
    assert!(suppressed.severity <= baseline.severity);
}

// --- Scenario F: grouped vs ungrouped insider-dealing structural variants ---

#[test]
fn scenario_f_grouped_and_ungrouped_insider_dealing_agree_within_tolerance() {
    const TOLERANCE: f64 = 0.3;

    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());

    let mut evidence = HashMap::new();
    for node in ["trade_pattern", "comms_intent", "pnl_drift", "mnpi_access", "news_timing"] {
        evidence.insert(node.to_string(), 2);
    }

    let grouped_model = registry
        .create_model(Typology::InsiderDealing, ModelOptions { use_latent_intent: true, grouped: true })
        .unwrap();
    let ungrouped_model = registry
        .create_model(Typology::InsiderDealing, ModelOptions { use_latent_intent: true, grouped: false })
        .unwrap();

    let grouped_top = bayesian::infer(&grouped_model, &evidence).unwrap().outcome_posterior.last().copied().unwrap();
    let ungrouped_top = bayesian::infer(&ungrouped_model, &evidence).unwrap().outcome_posterior.last().copied().unwrap();

    assert!(
        (grouped_top - ungrouped_top).abs() <= TOLERANCE,
        "grouped {grouped_top} and ungrouped {ungrouped_top} diverge beyond tolerance"
    );
}

// --- Universal invariants ---

#[test]
fn invariant_no_constructed_node_exceeds_four_parents() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());

    for typology in Typology::all() {
        for use_latent_intent in [false, true] {
            for grouped in [false, true] {
                let model = registry
                    .create_model(typology, ModelOptions { use_latent_intent, grouped })
                    .unwrap();
                for node in model.all_nodes() {
                    assert!(node.parents().len() <= 4, "{} exceeds fan-in bound", node.name());
                }
            }
        }
    }
}

#[test]
fn invariant_outcome_posterior_always_sums_to_one() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());

    for typology in Typology::all() {
        let options = ModelRegistry::default_options(typology);
        let model = registry.create_model(typology, options).unwrap();
        let trace = bayesian::infer(&model, &HashMap::new()).unwrap();
        let sum: f64 = trace.outcome_posterior.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "{}: posterior sums to {sum}", typology.as_str());
    }
}

#[test]
fn invariant_determinism_across_repeated_calls() {
    let config = CoreConfig::default_config();
    let registry = ModelRegistry::new(config.probability.clone());
    let options = ModelRegistry::default_options(Typology::WashTrading);
    let model = registry.create_model(Typology::WashTrading, options).unwrap();

    let mut evidence = HashMap::new();
    evidence.insert("trade_pattern".to_string(), 2);

    let a = bayesian::infer(&model, &evidence).unwrap();
    let b = bayesian::infer(&model, &evidence).unwrap();
    assert_eq!(a.outcome_posterior, b.outcome_posterior);
}

// --- End-to-end wiring sanity ---

#[test]
fn analyze_end_to_end_produces_well_formed_response_on_empty_batch() {
    let config = CoreConfig::default_config();
    let batch = empty_batch("analyst");
    let result = analyze(&batch, &config).unwrap();

    assert_eq!(result.risk_scores.len(), Typology::all().len());
    assert!(result.disabled_typologies.is_empty());
    for score in result.risk_scores.values() {
        let sum: f64 = score.distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(score.overall >= 0.0 && score.overall <= 1.0);
    }
}

#[test]
fn analyze_respects_requested_typology_subset() {
    let config = CoreConfig::default_config();
    let mut batch = empty_batch("analyst");
    batch.options.typologies = Some(vec![Typology::Spoofing, Typology::WashTrading]);

    let result = analyze(&batch, &config).unwrap();
    assert_eq!(result.risk_scores.len(), 2);
    assert!(result.risk_scores.contains_key(&Typology::Spoofing));
    assert!(result.risk_scores.contains_key(&Typology::WashTrading));
}

#[test]
fn analyze_dismissed_alert_round_trips_through_the_lifecycle() {
    let config = CoreConfig::default_config();
    let mut batch = empty_batch("analyst");
    batch.trades.push(Trade {
        id: "T1".to_string(),
        timestamp_iso: reference_time(),
        instrument: "SIM.INSTRUMENT".to_string(),
        volume: 500_000.0,
        price: 100.0,
        side: Side::Sell,
        trader_id: "TR-1".to_string(),
    });
    batch.orders.extend((0..10).map(|i| Order {
        id: format!("O{i}"),
        timestamp_iso: reference_time() - Duration::seconds(i),
        instrument: "SIM.INSTRUMENT".to_string(),
        size: 100.0,
        price: 100.0,
        side: Side::Buy,
        status: OrderStatus::Cancelled,
        trader_id: "TR-1".to_string(),
        cancellation_timestamp: Some(reference_time() - Duration::seconds(i) + Duration::seconds(1)),
    }));

    let result = analyze(&batch, &config).unwrap();
    if let Some(mut alert) = result.alerts.into_iter().next() {
        assert_eq!(alert.status, korinsic_core::AlertStatus::Generated);
        alert.transition(korinsic_core::AlertStatus::UnderReview, reference_time()).unwrap();
        alert.transition(korinsic_core::AlertStatus::Investigated, reference_time()).unwrap();
        alert.transition(korinsic_core::AlertStatus::Dismissed, reference_time()).unwrap();
        assert!(alert.status.is_terminal());
        assert!(alert
            .transition(korinsic_core::AlertStatus::UnderReview, reference_time())
            .is_err());
    }
}

#[test]
fn unknown_material_event_far_in_past_does_not_suppress() {
    let events = vec![MaterialEvent {
        id: "E1".to_string(),
        timestamp_iso: reference_time() - Duration::days(30),
        event_type: "earnings_announcement".to_string(),
        instruments_affected: vec!["SIM.INSTRUMENT".to_string()],
        materiality_score: 0.95,
    }];
    let multiplier = aggregate::strongest_news_suppression(&events, "SIM.INSTRUMENT", reference_time());
    assert!((multiplier - 1.0).abs() < 1e-9);
}
