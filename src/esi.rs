//! Evidence Sufficiency Index calculator.

use crate::bayesian::InferenceTrace;
use serde::Serialize;
use std::collections::HashMap;

/// Fixed grouping of evidence-node names into clusters.
#[must_use]
pub fn clusters() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("pnl", &["pnl_drift", "volume_anomaly"]),
        (
            "mnpi",
            &["mnpi_access", "news_timing", "comms_intent", "comms_frequency"],
        ),
        (
            "trade_pattern",
            &["trade_pattern", "order_clustering", "order_cancellation", "layering_pattern"],
        ),
        (
            "coordination",
            &["coordination_signal", "counterparty_relationship", "trading_frequency"],
        ),
        (
            "market",
            &["price_impact_ratio", "liquidity_impact", "withholding_signal"],
        ),
    ]
}

/// Weights `W1..W5`, summing to 1.
#[derive(Debug, Clone, Copy)]
pub struct EsiWeights {
    pub activation: f64,
    pub confidence: f64,
    pub non_fallback: f64,
    pub contribution_entropy: f64,
    pub cluster_diversity: f64,
}

impl Default for EsiWeights {
    fn default() -> Self {
        Self {
            activation: 0.3,
            confidence: 0.25,
            non_fallback: 0.2,
            contribution_entropy: 0.15,
            cluster_diversity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum EsiBadge {
    Sparse,
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ContributionSpread {
    Uneven,
    Balanced,
}

/// ESI output.
#[derive(Debug, Clone, Serialize)]
pub struct EsiResult {
    pub evidence_sufficiency_index: f64,
    pub esi_badge: EsiBadge,
    pub node_count: usize,
    pub mean_confidence: ConfidenceBand,
    pub fallback_ratio: f64,
    pub contribution_spread: ContributionSpread,
    pub clusters: Vec<String>,
}

impl EsiResult {
    #[must_use]
    pub fn adjusted_risk(&self, raw_risk: f64) -> f64 {
        raw_risk * self.evidence_sufficiency_index
    }
}

fn shannon_entropy(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    weights
        .iter()
        .filter(|&&w| w > 0.0)
        .map(|&w| {
            let p = w / total;
            -p * p.ln()
        })
        .sum()
}

/// Compute ESI from an inference trace, restricted to `evidence_nodes`.
#[must_use]
pub fn compute(trace: &InferenceTrace, evidence_nodes: &[String], weights: EsiWeights) -> EsiResult {
    let total = evidence_nodes.len().max(1);
    let active = evidence_nodes
        .iter()
        .filter(|n| trace.active_nodes.contains(*n))
        .count();
    let fallback = evidence_nodes
        .iter()
        .filter(|n| trace.fallback_nodes.contains(*n))
        .count();

    let activation_ratio = active as f64 / total as f64;
    let fallback_ratio = fallback as f64 / total as f64;

    let active_confidences: Vec<f64> = evidence_nodes
        .iter()
        .filter(|n| trace.active_nodes.contains(*n))
        .filter_map(|n| trace.node_records.get(n))
        .map(|r| r.confidence)
        .collect();
    let mean_confidence_value = if active_confidences.is_empty() {
        0.0
    } else {
        active_confidences.iter().sum::<f64>() / active_confidences.len() as f64
    };

    let contribution_weights: Vec<f64> = evidence_nodes
        .iter()
        .filter_map(|n| trace.node_records.get(n))
        .map(|r| r.contribution_weight)
        .collect();
    let raw_entropy = shannon_entropy(&contribution_weights);
    let max_entropy = if contribution_weights.len() > 1 {
        (contribution_weights.len() as f64).ln()
    } else {
        1.0
    };
    let normalized_entropy = if max_entropy > 0.0 {
        (raw_entropy / max_entropy).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let contribution_entropy = 1.0 - normalized_entropy;

    let declared_clusters = clusters();
    let mut active_cluster_names = Vec::new();
    for (name, members) in declared_clusters {
        if members.iter().any(|m| trace.active_nodes.contains(*m)) {
            active_cluster_names.push((*name).to_string());
        }
    }
    let cluster_diversity = active_cluster_names.len() as f64 / declared_clusters.len() as f64;

    let esi = (weights.activation * activation_ratio
        + weights.confidence * mean_confidence_value
        + weights.non_fallback * (1.0 - fallback_ratio)
        + weights.contribution_entropy * contribution_entropy
        + weights.cluster_diversity * cluster_diversity)
        .clamp(0.0, 1.0);

    let badge = if esi >= 0.85 {
        EsiBadge::Strong
    } else if esi >= 0.65 {
        EsiBadge::Moderate
    } else if esi >= 0.4 {
        EsiBadge::Weak
    } else {
        EsiBadge::Sparse
    };

    let mean_confidence = if mean_confidence_value >= 0.75 {
        ConfidenceBand::High
    } else if mean_confidence_value >= 0.4 {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    };

    let contribution_spread = if normalized_entropy >= 0.6 {
        ContributionSpread::Balanced
    } else {
        ContributionSpread::Uneven
    };

    EsiResult {
        evidence_sufficiency_index: esi,
        esi_badge: badge,
        node_count: active,
        mean_confidence,
        fallback_ratio,
        contribution_spread,
        clusters: active_cluster_names,
    }
}

#[allow(dead_code)]
fn _unused(_: &HashMap<String, usize>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayesian::NodeRecord;
    use std::collections::HashSet;

    fn trace_with(active: &[&str], fallback: &[&str]) -> InferenceTrace {
        let mut node_records = HashMap::new();
        for name in active.iter().chain(fallback.iter()) {
            node_records.insert(
                (*name).to_string(),
                NodeRecord {
                    name: (*name).to_string(),
                    states: vec!["low".into(), "medium".into(), "high".into()],
                    observed_state: if active.contains(name) { Some(2) } else { None },
                    posterior: vec![0.1, 0.2, 0.7],
                    confidence: 0.8,
                    contribution_weight: 0.7,
                },
            );
        }
        InferenceTrace {
            outcome_posterior: vec![0.2, 0.3, 0.5],
            node_records,
            active_nodes: active.iter().map(|s| (*s).to_string()).collect::<HashSet<_>>(),
            fallback_nodes: fallback.iter().map(|s| (*s).to_string()).collect::<HashSet<_>>(),
            high_risk_nodes: HashSet::new(),
            critical_nodes: HashSet::new(),
        }
    }

    #[test]
    fn esi_in_bounds() {
        let trace = trace_with(&["trade_pattern", "pnl_drift"], &["mnpi_access"]);
        let nodes = vec!["trade_pattern".to_string(), "pnl_drift".to_string(), "mnpi_access".to_string()];
        let result = compute(&trace, &nodes, EsiWeights::default());
        assert!(result.evidence_sufficiency_index >= 0.0 && result.evidence_sufficiency_index <= 1.0);
    }

    #[test]
    fn no_active_nodes_yields_zero_activation() {
        let trace = trace_with(&[], &["trade_pattern", "pnl_drift"]);
        let nodes = vec!["trade_pattern".to_string(), "pnl_drift".to_string()];
        let result = compute(&trace, &nodes, EsiWeights::default());
        assert_eq!(result.node_count, 0);
        assert!((result.fallback_ratio - 1.0).abs() < 1e-9);
    }
}
