//! Explainability builder: deterministic,
//! template-driven narrative generation from an inference trace.

use crate::aggregate::{AggregatedRisk, Severity};
use crate::bayesian::{InferenceTrace, NodeRecord};
use crate::esi::EsiResult;
use crate::typology::Typology;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One step in the structured inference path.
#[derive(Debug, Clone, Serialize)]
pub struct InferencePathStep {
    pub index: usize,
    pub node: String,
    pub observed_state: Option<String>,
    pub top_state_probability: f64,
    pub is_fallback: bool,
}

/// Audit header accompanying every explanation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditHeader {
    pub model_name: String,
    pub model_version: String,
    pub config_version: String,
    pub processed_at: DateTime<Utc>,
    pub trace_id: String,
}

/// Full explanation for one typology's analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub audit: AuditHeader,
    pub narrative: String,
    pub inference_path: Vec<InferencePathStep>,
    pub regulatory_frameworks: Vec<String>,
}

fn state_name(record: &NodeRecord, state: usize) -> String {
    record.states.get(state).cloned().unwrap_or_else(|| state.to_string())
}

/// Build the node-level rationale clause for one evidence node.
fn node_clause(record: &NodeRecord) -> String {
    match record.observed_state {
        Some(state) => format!(
            "{} observed at '{}' (top-state probability {:.2})",
            record.name,
            state_name(record, state),
            record.top_state_probability()
        ),
        None => format!("{} unobserved, held at its fallback prior", record.name),
    }
}

/// Build a deterministic narrative for one typology's inference trace and
/// aggregated risk, restricted to `evidence_nodes` (mirrors `esi::compute`'s
/// scoping: only evidence nodes are ever "observed" or "fell back", not the
/// structural intermediate/outcome/latent nodes built on top of them).
#[must_use]
pub fn build_narrative(
    typology: Typology,
    trace: &InferenceTrace,
    aggregated: &AggregatedRisk,
    evidence_nodes: &[String],
) -> String {
    let mut active: Vec<&NodeRecord> = evidence_nodes
        .iter()
        .filter(|n| trace.active_nodes.contains(*n))
        .filter_map(|n| trace.node_records.get(n))
        .collect();
    active.sort_by(|a, b| a.name.cmp(&b.name));

    let mut fallback: Vec<&NodeRecord> = evidence_nodes
        .iter()
        .filter(|n| trace.fallback_nodes.contains(*n))
        .filter_map(|n| trace.node_records.get(n))
        .collect();
    fallback.sort_by(|a, b| a.name.cmp(&b.name));

    let mut narrative = format!(
        "{} assessed at {:?} severity (adjusted score {:.2}).",
        typology, aggregated.severity, aggregated.adjusted_score
    );

    if !active.is_empty() {
        let clauses: Vec<String> = active.iter().map(|r| node_clause(r)).collect();
        narrative.push_str(" Evidence: ");
        narrative.push_str(&clauses.join("; "));
        narrative.push('.');
    } else {
        narrative.push_str(" No evidence nodes were observed; the assessment rests entirely on fallback priors.");
    }

    if !fallback.is_empty() {
        narrative.push_str(&format!(
            " {} node(s) fell back to their configured prior: {}.",
            fallback.len(),
            fallback.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }

    if aggregated.context_multiplier < 1.0 {
        narrative.push_str(&format!(
            " Context adjustment applied ({}): multiplier {:.2}.",
            aggregated.context_reason, aggregated.context_multiplier
        ));
    }

    if let Some(reason) = &aggregated.gate_reason {
        narrative.push(' ');
        narrative.push_str(reason);
        narrative.push('.');
    }

    narrative
}

/// Build the integer-indexed inference path for cross-referencing from the
/// narrative, restricted to `evidence_nodes` for the same reason as
/// `build_narrative`.
#[must_use]
pub fn build_inference_path(trace: &InferenceTrace, evidence_nodes: &[String]) -> Vec<InferencePathStep> {
    let mut names: Vec<&String> = evidence_nodes
        .iter()
        .filter(|n| trace.node_records.contains_key(*n))
        .collect();
    names.sort();

    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let record = &trace.node_records[name];
            InferencePathStep {
                index,
                node: name.clone(),
                observed_state: record.observed_state.map(|s| state_name(record, s)),
                top_state_probability: record.top_state_probability(),
                is_fallback: record.is_fallback(),
            }
        })
        .collect()
}

/// Assemble the full explanation for one typology's result.
#[must_use]
pub fn explain(
    typology: Typology,
    trace: &InferenceTrace,
    aggregated: &AggregatedRisk,
    _esi: &EsiResult,
    evidence_nodes: &[String],
    config_version: &str,
    processed_at: DateTime<Utc>,
) -> Explanation {
    Explanation {
        audit: AuditHeader {
            model_name: typology.as_str().to_string(),
            model_version: "1".to_string(),
            config_version: config_version.to_string(),
            processed_at,
            trace_id: Uuid::new_v4().to_string(),
        },
        narrative: build_narrative(typology, trace, aggregated, evidence_nodes),
        inference_path: build_inference_path(trace, evidence_nodes),
        regulatory_frameworks: typology
            .regulatory_frameworks()
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn trace_fixture() -> InferenceTrace {
        let mut node_records = HashMap::new();
        node_records.insert(
            "trade_pattern".to_string(),
            NodeRecord {
                name: "trade_pattern".to_string(),
                states: vec!["low".into(), "medium".into(), "high".into()],
                observed_state: Some(2),
                posterior: vec![0.1, 0.2, 0.7],
                confidence: 0.8,
                contribution_weight: 0.7,
            },
        );
        node_records.insert(
            "pnl_drift".to_string(),
            NodeRecord {
                name: "pnl_drift".to_string(),
                states: vec!["low".into(), "medium".into(), "high".into()],
                observed_state: None,
                posterior: vec![0.65, 0.25, 0.10],
                confidence: 0.4,
                contribution_weight: 0.1,
            },
        );
        InferenceTrace {
            outcome_posterior: vec![0.1, 0.2, 0.7],
            node_records,
            active_nodes: HashSet::from(["trade_pattern".to_string()]),
            fallback_nodes: HashSet::from(["pnl_drift".to_string()]),
            high_risk_nodes: HashSet::new(),
            critical_nodes: HashSet::new(),
        }
    }

    fn aggregated_fixture() -> AggregatedRisk {
        AggregatedRisk {
            raw_posterior_top: 0.7,
            context_multiplier: 1.0,
            context_reason: "no contextual adjustment".to_string(),
            adjusted_score: 0.6,
            severity: Severity::High,
            gated: false,
            gate_reason: None,
        }
    }

    fn evidence_nodes_fixture() -> Vec<String> {
        vec!["trade_pattern".to_string(), "pnl_drift".to_string()]
    }

    #[test]
    fn narrative_mentions_active_and_fallback_nodes() {
        let trace = trace_fixture();
        let aggregated = aggregated_fixture();
        let narrative = build_narrative(Typology::WashTrading, &trace, &aggregated, &evidence_nodes_fixture());
        assert!(narrative.contains("trade_pattern"));
        assert!(narrative.contains("pnl_drift"));
    }

    #[test]
    fn narrative_ignores_non_evidence_fallback_nodes() {
        let mut trace = trace_fixture();
        trace.node_records.insert(
            "behavioral_intent".to_string(),
            NodeRecord {
                name: "behavioral_intent".to_string(),
                states: vec!["low".into(), "medium".into(), "high".into()],
                observed_state: None,
                posterior: vec![0.4, 0.4, 0.2],
                confidence: 0.3,
                contribution_weight: 0.2,
            },
        );
        trace.fallback_nodes.insert("behavioral_intent".to_string());
        let aggregated = aggregated_fixture();
        let narrative = build_narrative(Typology::WashTrading, &trace, &aggregated, &evidence_nodes_fixture());
        assert!(!narrative.contains("behavioral_intent"));
        assert!(narrative.contains("1 node(s) fell back"));
    }

    #[test]
    fn inference_path_is_sorted_and_indexed() {
        let trace = trace_fixture();
        let path = build_inference_path(&trace, &evidence_nodes_fixture());
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].index, 0);
        assert_eq!(path[1].index, 1);
        assert!(path[0].node < path[1].node);
    }
}
