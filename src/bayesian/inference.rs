//! Inference engine: variable elimination over a
//! [`TypologyModel`], producing an [`InferenceTrace`].

use crate::bayesian::factor::Factor;
use crate::bayesian::model::TypologyModel;
use crate::bayesian::node::Node;
use crate::error::{CoreError, CoreResult};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};

const POSTERIOR_TOLERANCE: f64 = 1e-9;

/// Per-node record in an inference trace.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub name: String,
    pub states: Vec<String>,
    /// `Some(state)` if evidence was supplied; `None` if left to fallback.
    pub observed_state: Option<usize>,
    pub posterior: Vec<f64>,
    pub confidence: f64,
    pub contribution_weight: f64,
}

impl NodeRecord {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.observed_state.is_none()
    }

    #[must_use]
    pub fn top_state_probability(&self) -> f64 {
        self.posterior.last().copied().unwrap_or(0.0)
    }
}

/// The full result of one `infer` call.
#[derive(Debug, Clone)]
pub struct InferenceTrace {
    pub outcome_posterior: Vec<f64>,
    pub node_records: HashMap<String, NodeRecord>,
    pub active_nodes: HashSet<String>,
    pub fallback_nodes: HashSet<String>,
    pub high_risk_nodes: HashSet<String>,
    pub critical_nodes: HashSet<String>,
}

fn entropy(dist: &[f64]) -> f64 {
    dist.iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum()
}

fn confidence(dist: &[f64]) -> f64 {
    if dist.len() <= 1 {
        return 1.0;
    }
    let max_entropy = (dist.len() as f64).ln();
    if max_entropy <= 0.0 {
        return 1.0;
    }
    (1.0 - entropy(dist) / max_entropy).clamp(0.0, 1.0)
}

/// Elimination ordering: reverse topological order of the network's DAG,
/// computed via `petgraph::algo::toposort`.
fn elimination_order(model: &TypologyModel) -> CoreResult<Vec<String>> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut indices = HashMap::new();

    for node in model.all_nodes() {
        let idx = graph.add_node(node.name().to_string());
        indices.insert(node.name().to_string(), idx);
    }
    for node in model.all_nodes() {
        let child_idx = indices[node.name()];
        for parent in node.parents() {
            if let Some(&parent_idx) = indices.get(parent) {
                graph.add_edge(parent_idx, child_idx, ());
            }
        }
    }

    let order = toposort(&graph, None).map_err(|_| {
        CoreError::InferenceInstability(vec![model.outcome_name.clone()])
    })?;

    let mut names: Vec<String> = order.into_iter().map(|idx| graph[idx].clone()).collect();
    names.reverse();
    names.retain(|n| n != &model.outcome_name);
    Ok(names)
}

/// Run variable elimination for `model` given `evidence`, with the outcome
/// node as the query variable.
pub fn infer(
    model: &TypologyModel,
    evidence: &HashMap<String, usize>,
) -> CoreResult<InferenceTrace> {
    let mut factors: Vec<Factor> = Vec::new();

    for node in model.all_nodes() {
        let factor = match node {
            Node::Evidence(n) => Factor::new(
                vec![n.name.clone()],
                vec![n.states.len()],
                n.fallback_prior.clone(),
            ),
            _ => node
                .cpt()
                .expect("non-evidence node always carries a CPT")
                .clone(),
        };
        factors.push(factor.apply_evidence(evidence));
    }

    let elimination_vars = elimination_order(model)?;

    for var in &elimination_vars {
        let (to_combine, remaining): (Vec<Factor>, Vec<Factor>) = factors
            .into_iter()
            .partition(|f| f.variables.iter().any(|v| v == var));

        if to_combine.is_empty() {
            factors = remaining;
            continue;
        }

        let mut combined = to_combine[0].clone();
        for f in &to_combine[1..] {
            combined = combined.multiply(f);
        }
        let marginalized = combined.marginalize(var);

        factors = remaining;
        factors.push(marginalized);
    }

    let mut outcome_factor = factors[0].clone();
    for f in &factors[1..] {
        outcome_factor = outcome_factor.multiply(f);
    }

    let sum = outcome_factor.sum();
    if sum <= 0.0 {
        return Err(CoreError::InferenceInstability(vec![model.outcome_name.clone()]));
    }
    outcome_factor.normalize();

    let final_sum: f64 = outcome_factor.values.iter().sum();
    if (final_sum - 1.0).abs() > POSTERIOR_TOLERANCE.max(1e-6) {
        return Err(CoreError::InferenceInstability(vec![model.outcome_name.clone()]));
    }

    let outcome_posterior = outcome_factor.values.clone();

    let mut node_records = HashMap::new();
    let mut active_nodes = HashSet::new();
    let mut fallback_nodes = HashSet::new();
    let mut high_risk_nodes = HashSet::new();
    let mut critical_nodes = HashSet::new();

    for node in model.all_nodes() {
        let name = node.name().to_string();
        let observed_state = evidence.get(&name).copied();

        let posterior = if name == model.outcome_name {
            outcome_posterior.clone()
        } else if let Some(state) = observed_state {
            let mut dist = vec![0.0; node.states().len()];
            dist[state] = 1.0;
            dist
        } else {
            match node {
                Node::Evidence(n) => n.fallback_prior.clone(),
                _ => uniform(node.states().len()),
            }
        };

        let conf = confidence(&posterior);
        let top = posterior.last().copied().unwrap_or(0.0);

        if matches!(node, Node::Evidence(_)) {
            if observed_state.is_some() {
                active_nodes.insert(name.clone());
            } else {
                fallback_nodes.insert(name.clone());
            }
        }
        if top > 0.6 {
            high_risk_nodes.insert(name.clone());
        }
        if top > 0.85 {
            critical_nodes.insert(name.clone());
        }

        node_records.insert(
            name.clone(),
            NodeRecord {
                name,
                states: node.states().to_vec(),
                observed_state,
                posterior,
                confidence: conf,
                contribution_weight: top,
            },
        );
    }

    Ok(InferenceTrace {
        outcome_posterior,
        node_records,
        active_nodes,
        fallback_nodes,
        high_risk_nodes,
        critical_nodes,
    })
}

fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayesian::model::{build_model, tests_support::test_probability_config, ModelOptions};
    use crate::typology::Typology;

    #[test]
    fn outcome_posterior_sums_to_one() {
        let cfg = test_probability_config();
        let model = build_model(
            Typology::Spoofing,
            ModelOptions {
                use_latent_intent: false,
                grouped: true,
            },
            &cfg,
        )
        .unwrap();
        let trace = infer(&model, &HashMap::new()).unwrap();
        let sum: f64 = trace.outcome_posterior.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn determinism_across_repeated_calls() {
        let cfg = test_probability_config();
        let model = build_model(
            Typology::WashTrading,
            ModelOptions {
                use_latent_intent: false,
                grouped: true,
            },
            &cfg,
        )
        .unwrap();
        let mut evidence = HashMap::new();
        evidence.insert("trade_pattern".to_string(), 2);
        let a = infer(&model, &evidence).unwrap();
        let b = infer(&model, &evidence).unwrap();
        assert_eq!(a.outcome_posterior, b.outcome_posterior);
    }

    #[test]
    fn empty_evidence_yields_fallback_marginal() {
        let cfg = test_probability_config();
        let model = build_model(
            Typology::CommodityManipulation,
            ModelOptions {
                use_latent_intent: false,
                grouped: true,
            },
            &cfg,
        )
        .unwrap();
        let trace = infer(&model, &HashMap::new()).unwrap();
        assert!(trace.active_nodes.is_empty());
        assert_eq!(
            trace.fallback_nodes.len(),
            model.evidence_node_names().len()
        );
    }
}
