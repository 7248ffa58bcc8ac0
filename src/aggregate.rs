//! Risk aggregator: combines a typology's
//! outcome posterior with its ESI and DQSI into a single severity-graded
//! [`RiskScore`].

use crate::dqsi::{DqsiResult, TrustBucket};
use crate::esi::{EsiBadge, EsiResult};
use crate::types::{MaterialEvent, RiskScore};
use serde::{Deserialize, Serialize};

const LOW_THRESHOLD: f64 = 0.3;
const MEDIUM_THRESHOLD: f64 = 0.5;
const HIGH_THRESHOLD: f64 = 0.7;

const NEWS_SUPPRESSION_STRONG: f64 = 0.5;
const NEWS_SUPPRESSION_MODERATE: f64 = 0.75;
const NEWS_SUPPRESSION_NONE: f64 = 1.0;

const CONTEXT_MULTIPLIER_MIN: f64 = 0.5;
const CONTEXT_MULTIPLIER_MAX: f64 = 2.0;

/// Severity cut-points, overridable per typology via `bayesian_models.json`
///.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self { low: LOW_THRESHOLD, medium: MEDIUM_THRESHOLD, high: HIGH_THRESHOLD }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        Self::from_score_with_thresholds(score, SeverityThresholds::default())
    }

    #[must_use]
    pub fn from_score_with_thresholds(score: f64, thresholds: SeverityThresholds) -> Self {
        if score < thresholds.low {
            Severity::Low
        } else if score < thresholds.medium {
            Severity::Medium
        } else if score < thresholds.high {
            Severity::High
        } else {
            Severity::Critical
        }
    }
}

/// A contextual adjustment applied to the raw posterior before severity
/// grading.
#[derive(Debug, Clone, Copy)]
pub struct ContextMultiplier {
    pub value: f64,
    pub reason: &'static str,
}

impl ContextMultiplier {
    #[must_use]
    pub fn none() -> Self {
        Self { value: 1.0, reason: "no contextual adjustment" }
    }

    #[must_use]
    pub fn bounded(value: f64, reason: &'static str) -> Self {
        Self { value: value.clamp(CONTEXT_MULTIPLIER_MIN, CONTEXT_MULTIPLIER_MAX), reason }
    }
}

/// Returns the news-context suppression multiplier for a trade near a
/// material event: a disclosed, material event close in time
/// to the activity explains it away, at three levels of confidence.
#[must_use]
pub fn news_context_multiplier(materiality_score: f64, minutes_from_event: i64) -> f64 {
    if minutes_from_event.abs() > 24 * 60 {
        return NEWS_SUPPRESSION_NONE;
    }
    if materiality_score >= 0.8 {
        NEWS_SUPPRESSION_STRONG
    } else if materiality_score >= 0.4 {
        NEWS_SUPPRESSION_MODERATE
    } else {
        NEWS_SUPPRESSION_NONE
    }
}

/// Find the strongest (lowest) news-context multiplier among all material
/// events, relative to a reference trade timestamp.
#[must_use]
pub fn strongest_news_suppression(
    events: &[MaterialEvent],
    instrument: &str,
    at: chrono::DateTime<chrono::Utc>,
) -> f64 {
    events
        .iter()
        .filter(|e| e.instruments_affected.iter().any(|i| i == instrument))
        .map(|e| {
            let minutes = (at - e.timestamp_iso).num_minutes();
            news_context_multiplier(e.materiality_score, minutes)
        })
        .fold(NEWS_SUPPRESSION_NONE, f64::min)
}

/// Full aggregation result before it is trimmed into the public
/// [`RiskScore`] (carries the severity and gating rationale for the
/// explainability builder).
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedRisk {
    pub raw_posterior_top: f64,
    pub context_multiplier: f64,
    pub context_reason: String,
    pub adjusted_score: f64,
    pub severity: Severity,
    pub gated: bool,
    pub gate_reason: Option<String>,
}

/// Combine an outcome posterior with ESI/DQSI into a graded, gated risk
/// score.
///
/// DQSI gating: a `Low` trust bucket caps severity at `High` unless the ESI
/// badge is `Strong`, since overwhelming evidence sufficiency can still
/// justify escalation despite poor data quality.
#[must_use]
pub fn aggregate(
    outcome_posterior: &[f64],
    esi: &EsiResult,
    dqsi: &DqsiResult,
    context: ContextMultiplier,
    thresholds: SeverityThresholds,
) -> AggregatedRisk {
    let raw_top = outcome_posterior.last().copied().unwrap_or(0.0);
    let weighted = raw_top * esi.evidence_sufficiency_index;
    let adjusted = (weighted * context.value).clamp(0.0, 1.0);
    let mut severity = Severity::from_score_with_thresholds(adjusted, thresholds);

    let mut gated = false;
    let mut gate_reason = None;
    if dqsi.dqsi_trust_bucket == TrustBucket::Low
        && esi.esi_badge != EsiBadge::Strong
        && severity == Severity::Critical
    {
        severity = Severity::High;
        gated = true;
        gate_reason = Some(
            "DQSI trust bucket is Low and ESI badge has not reached Strong; capped at High"
                .to_string(),
        );
    }

    AggregatedRisk {
        raw_posterior_top: raw_top,
        context_multiplier: context.value,
        context_reason: context.reason.to_string(),
        adjusted_score: adjusted,
        severity,
        gated,
        gate_reason,
    }
}

/// Project an [`AggregatedRisk`] plus the raw posterior into the public
/// output type.
#[must_use]
pub fn to_risk_score(outcome_posterior: &[f64], esi: EsiResult, aggregated: &AggregatedRisk) -> RiskScore {
    RiskScore {
        overall: aggregated.adjusted_score,
        distribution: outcome_posterior.to_vec(),
        esi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dqsi::KdeScore;

    fn esi_fixture(badge: EsiBadge, value: f64) -> EsiResult {
        EsiResult {
            evidence_sufficiency_index: value,
            esi_badge: badge,
            node_count: 3,
            mean_confidence: crate::esi::ConfidenceBand::Medium,
            fallback_ratio: 0.2,
            contribution_spread: crate::esi::ContributionSpread::Balanced,
            clusters: vec!["pnl".to_string()],
        }
    }

    fn dqsi_fixture(bucket: TrustBucket) -> DqsiResult {
        DqsiResult {
            dqsi_score: 0.9,
            dqsi_confidence_index: 0.9,
            dqsi_trust_bucket: bucket,
            per_kde: vec![KdeScore { name: "trader_id".into(), score: 1.0, critical: true }],
            missing_critical_kdes: vec![],
            synthetic_timeliness: 0.9,
            synthetic_coverage: 0.9,
        }
    }

    #[test]
    fn high_posterior_with_strong_evidence_is_critical() {
        let posterior = vec![0.05, 0.1, 0.85];
        let esi = esi_fixture(EsiBadge::Strong, 0.95);
        let dqsi = dqsi_fixture(TrustBucket::High);
        let result = aggregate(&posterior, &esi, &dqsi, ContextMultiplier::none(), SeverityThresholds::default());
        assert_eq!(result.severity, Severity::Critical);
        assert!(!result.gated);
    }

    #[test]
    fn low_trust_bucket_gates_critical_down_to_high() {
        let posterior = vec![0.05, 0.1, 0.9];
        let esi = esi_fixture(EsiBadge::Moderate, 0.7);
        let dqsi = dqsi_fixture(TrustBucket::Low);
        let result = aggregate(&posterior, &esi, &dqsi, ContextMultiplier::none(), SeverityThresholds::default());
        assert_eq!(result.severity, Severity::High);
        assert!(result.gated);
    }

    #[test]
    fn strong_esi_overrides_low_trust_gate() {
        let posterior = vec![0.05, 0.1, 0.9];
        let esi = esi_fixture(EsiBadge::Strong, 0.95);
        let dqsi = dqsi_fixture(TrustBucket::Low);
        let result = aggregate(&posterior, &esi, &dqsi, ContextMultiplier::none(), SeverityThresholds::default());
        assert_eq!(result.severity, Severity::Critical);
        assert!(!result.gated);
    }

    #[test]
    fn news_context_near_material_event_suppresses_severity() {
        let multiplier = news_context_multiplier(0.9, 10);
        assert!((multiplier - NEWS_SUPPRESSION_STRONG).abs() < 1e-9);
    }

    #[test]
    fn news_context_far_from_event_does_not_suppress() {
        let multiplier = news_context_multiplier(0.9, 3 * 24 * 60);
        assert!((multiplier - NEWS_SUPPRESSION_NONE).abs() < 1e-9);
    }
}
