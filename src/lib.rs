//! Market-abuse Bayesian risk inference core.
//!
//! Discrete-state Bayesian networks (one per typology), a deterministic
//! evidence pipeline, and DQSI/ESI confidence scoring are assembled here
//! into two pure in-process entry points: [`analyze`] and
//! [`simulate::simulate`].
//!
//! # Example
//!
//! ```no_run
//! use korinsic_core::{analyze, config::CoreConfig};
//! use korinsic_core::types::AnalyzeBatch;
//!
//! # fn example(batch: AnalyzeBatch) -> korinsic_core::error::CoreResult<()> {
//! let config = CoreConfig::default_config();
//! let result = analyze(&batch, &config)?;
//! println!("alerts: {}", result.alerts.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod alert;
pub mod bayesian;
pub mod config;
pub mod dqsi;
pub mod error;
pub mod esi;
pub mod evidence;
pub mod explain;
pub mod simulate;
pub mod types;
pub mod typology;

pub use aggregate::{AggregatedRisk, Severity};
pub use alert::{Alert, AlertStatus};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use typology::Typology;

use crate::bayesian::registry::ModelRegistry;
use crate::bayesian::ModelOptions;
use crate::dqsi::{strategy_for_role, trader_role};
use crate::types::{AnalyzeBatch, RiskScore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const CONFIG_VERSION: &str = "1";

/// Full response of one [`analyze`] call.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub timestamp_iso: DateTime<Utc>,
    pub risk_scores: HashMap<Typology, RiskScore>,
    pub alerts: Vec<Alert>,
    pub dqsi: dqsi::DqsiResult,
    /// Typologies whose model failed to construct, with the reason.
    pub disabled_typologies: HashMap<Typology, String>,
}

/// Primary entry point: run every requested typology's network
/// against `batch`'s evidence, score it through ESI/DQSI, aggregate and
/// grade it, and emit an alert for anything above `Low` severity.
#[instrument(skip(batch, config), fields(trader_id = %batch.trader_info.id))]
pub fn analyze(batch: &AnalyzeBatch, config: &CoreConfig) -> CoreResult<AnalysisResult> {
    let now = Utc::now();
    let registry = ModelRegistry::new(config.probability.clone());

    let role = trader_role(&batch.trader_info);
    let strategy = strategy_for_role(role);
    let observations = dqsi::observe_batch(batch, now);
    let dqsi_result = dqsi::compute(&config.dqsi, &observations, strategy);
    if dqsi_result.dqsi_trust_bucket == dqsi::TrustBucket::Low {
        warn!(code = "E_DQSI_DEGRADED", "DQSI trust bucket degraded to Low");
    }

    let mut risk_scores = HashMap::new();
    let mut alerts = Vec::new();
    let mut disabled_typologies = HashMap::new();

    for typology in batch.options.requested_typologies() {
        let entry = config.models.entry(typology);
        let options = resolve_options(typology, &batch.options, entry.options());

        match analyze_typology(
            typology,
            options,
            entry.thresholds(),
            batch,
            &registry,
            &dqsi_result,
            now,
        ) {
            Ok((score, alert)) => {
                risk_scores.insert(typology, score);
                if let Some(alert) = alert {
                    alerts.push(alert);
                }
            }
            Err(e) => {
                warn!(typology = typology.as_str(), error = %e, "model construction failed, typology disabled");
                disabled_typologies.insert(typology, e.to_string());
            }
        }
    }

    debug!(
        requested = batch.options.requested_typologies().len(),
        scored = risk_scores.len(),
        alerts = alerts.len(),
        "analyze complete"
    );

    Ok(AnalysisResult {
        analysis_id: Uuid::new_v4().to_string(),
        timestamp_iso: now,
        risk_scores,
        alerts,
        dqsi: dqsi_result,
        disabled_typologies,
    })
}

fn resolve_options(
    typology: Typology,
    requested: &types::AnalysisOptions,
    configured: ModelOptions,
) -> ModelOptions {
    let _ = typology;
    ModelOptions {
        use_latent_intent: requested.use_latent_intent.unwrap_or(configured.use_latent_intent),
        grouped: requested.grouped.unwrap_or(configured.grouped),
    }
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip(batch, registry, dqsi_result), fields(typology = typology.as_str()))]
fn analyze_typology(
    typology: Typology,
    options: ModelOptions,
    thresholds: aggregate::SeverityThresholds,
    batch: &AnalyzeBatch,
    registry: &ModelRegistry,
    dqsi_result: &dqsi::DqsiResult,
    now: DateTime<Utc>,
) -> CoreResult<(RiskScore, Option<Alert>)> {
    let model = registry.create_model(typology, options)?;

    let evidence = evidence::map_evidence(typology, batch);
    let fallback_report = bayesian::fallback::apply_fallback(&model, evidence);
    let trace = bayesian::infer(&model, &fallback_report.evidence)?;

    let esi_result = esi::compute(&trace, model.evidence_node_names(), esi::EsiWeights::default());

    let instrument = batch
        .trades
        .first()
        .map_or("", |t| t.instrument.as_str());
    let context_value =
        aggregate::strongest_news_suppression(&batch.material_events, instrument, now);
    let context = if (context_value - 1.0).abs() < f64::EPSILON {
        aggregate::ContextMultiplier::none()
    } else {
        aggregate::ContextMultiplier::bounded(context_value, "contemporaneous material news event")
    };

    let aggregated = aggregate::aggregate(
        &trace.outcome_posterior,
        &esi_result,
        dqsi_result,
        context,
        thresholds,
    );

    let score = aggregate::to_risk_score(&trace.outcome_posterior, esi_result.clone(), &aggregated);

    let alert = if aggregated.severity > aggregate::Severity::Low {
        let explanation = explain::explain(
            typology,
            &trace,
            &aggregated,
            &esi_result,
            model.evidence_node_names(),
            CONFIG_VERSION,
            now,
        );
        Some(Alert::new(typology, aggregated.severity, explanation, now))
    } else {
        None
    };

    Ok((score, alert))
}
