//! DQSI calculator: seven-dimension KDE-level scoring with
//! trust-bucket output.

use crate::dqsi::config::DqsiConfig;
use crate::dqsi::kde::{Dimension, KdeObservation, Tier};
use serde::Serialize;
use std::collections::HashMap;

const CRITICAL_CAP: f64 = 0.75;
const CRITICAL_SCORE_FLOOR: f64 = 0.5;
const FALLBACK_BASE: f64 = 0.7;
const ROLE_AWARE_BASE: f64 = 0.9;
const MISSING_CRITICAL_CONFIDENCE_PENALTY: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum TrustBucket {
    High,
    Moderate,
    Low,
}

/// Per-KDE sub-score, for the output's `per_kde[]` array.
#[derive(Debug, Clone, Serialize)]
pub struct KdeScore {
    pub name: String,
    pub score: f64,
    pub critical: bool,
}

/// DQSI output.
#[derive(Debug, Clone, Serialize)]
pub struct DqsiResult {
    pub dqsi_score: f64,
    pub dqsi_confidence_index: f64,
    pub dqsi_trust_bucket: TrustBucket,
    pub per_kde: Vec<KdeScore>,
    pub missing_critical_kdes: Vec<String>,
    pub synthetic_timeliness: f64,
    pub synthetic_coverage: f64,
}

/// The two DQSI strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Foundational tier only, used when role/HR context is absent.
    Fallback,
    /// All tiers; the role selects the trust-bucket thresholds.
    RoleAware(&'static str),
}

#[must_use]
pub fn strategy_for_role(role: Option<&str>) -> Strategy {
    match role {
        None => Strategy::Fallback,
        Some("analyst") => Strategy::RoleAware("analyst"),
        Some("auditor") => Strategy::RoleAware("auditor"),
        Some("producer") => Strategy::RoleAware("producer"),
        Some(_) => Strategy::RoleAware("consumer"),
    }
}

/// Compute the DQSI for one batch of KDE observations.
#[must_use]
pub fn compute(
    config: &DqsiConfig,
    observations: &HashMap<String, KdeObservation>,
    strategy: Strategy,
) -> DqsiResult {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut per_kde = Vec::new();
    let mut missing_critical = Vec::new();
    let mut timeliness_scores = Vec::new();
    let mut coverage_scores = Vec::new();
    let mut critical_below_floor = false;
    let mut imputed = 0usize;
    let mut total = 0usize;

    for kde in &config.kdes {
        if strategy == Strategy::Fallback && kde.tier() != Tier::Foundational {
            continue;
        }

        let observation = observations.get(&kde.name).cloned().unwrap_or_default();
        if !observation.present {
            imputed += 1;
        }
        total += 1;

        let dimensions: Vec<Dimension> = kde
            .applicable_dimensions
            .iter()
            .copied()
            .filter(|d| strategy != Strategy::Fallback || d.tier() == Tier::Foundational)
            .collect();

        let score = if dimensions.is_empty() {
            0.0
        } else {
            dimensions.iter().map(|d| observation.score_dimension(*d)).sum::<f64>()
                / dimensions.len() as f64
        };

        if kde.applicable_dimensions.contains(&Dimension::Timeliness) {
            timeliness_scores.push(observation.score_dimension(Dimension::Timeliness));
        }
        if kde.applicable_dimensions.contains(&Dimension::Coverage) {
            coverage_scores.push(observation.score_dimension(Dimension::Coverage));
        }

        if kde.critical {
            if score < CRITICAL_SCORE_FLOOR {
                critical_below_floor = true;
            }
            if !observation.present {
                missing_critical.push(kde.name.clone());
            }
        }

        let weight = f64::from(kde.risk_weight) * kde.tier().weight();
        weighted_sum += score * weight;
        weight_sum += weight;

        per_kde.push(KdeScore {
            name: kde.name.clone(),
            score,
            critical: kde.critical,
        });
    }

    let mut dqsi_score = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    };
    if critical_below_floor {
        dqsi_score = dqsi_score.min(CRITICAL_CAP);
    }

    let synthetic_timeliness = mean(&timeliness_scores);
    let synthetic_coverage = mean(&coverage_scores);

    let base = match strategy {
        Strategy::Fallback => FALLBACK_BASE,
        Strategy::RoleAware(_) => ROLE_AWARE_BASE,
    };
    let imputed_rate = if total > 0 { imputed as f64 / total as f64 } else { 0.0 };
    let mode_modifier = 1.0;
    let critical_penalty = if missing_critical.is_empty() {
        1.0
    } else {
        MISSING_CRITICAL_CONFIDENCE_PENALTY
    };
    let confidence = (base * mode_modifier * (1.0 - 0.5 * imputed_rate) * critical_penalty)
        .clamp(0.0, 1.0);

    let profile = match strategy {
        Strategy::RoleAware(role) => config.role_profiles.get(role).unwrap_or(&config.default_profile),
        Strategy::Fallback => &config.default_profile,
    };
    let trust_bucket = if confidence >= profile.high_threshold {
        TrustBucket::High
    } else if confidence >= profile.moderate_threshold {
        TrustBucket::Moderate
    } else {
        TrustBucket::Low
    };

    DqsiResult {
        dqsi_score,
        dqsi_confidence_index: confidence,
        dqsi_trust_bucket: trust_bucket,
        per_kde,
        missing_critical_kdes: missing_critical,
        synthetic_timeliness,
        synthetic_coverage,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
