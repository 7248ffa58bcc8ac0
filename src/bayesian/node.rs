//! The node library: evidence, intermediate, outcome and
//! latent-intent node factories, plus noisy-OR CPT construction.

use crate::bayesian::factor::Factor;
use crate::bayesian::probability::NoisyOrParams;
use crate::error::{CoreError, CoreResult};
use crate::typology::Typology;
use serde::{Deserialize, Serialize};

const CPT_TOLERANCE: f64 = 1e-6;
const MAX_FAN_IN: usize = 4;

/// The six canonical intermediate-node types, reusable across typologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntermediateKind {
    MarketImpact,
    BehavioralIntent,
    CoordinationPatterns,
    InformationAdvantage,
    EconomicRationality,
    TechnicalManipulation,
}

impl IntermediateKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketImpact => "market_impact",
            Self::BehavioralIntent => "behavioral_intent",
            Self::CoordinationPatterns => "coordination_patterns",
            Self::InformationAdvantage => "information_advantage",
            Self::EconomicRationality => "economic_rationality",
            Self::TechnicalManipulation => "technical_manipulation",
        }
    }

    /// Typologies this intermediate type applies to. A closed set kept here
    /// rather than in config: it is structural, not tunable.
    #[must_use]
    pub fn applicable_typologies(self) -> &'static [Typology] {
        use Typology::{
            CircularTrading, CommodityManipulation, CrossDeskCollusion, EconomicWithholding,
            InsiderDealing, MarketCornering, Spoofing, WashTrading,
        };
        match self {
            Self::MarketImpact => &[Spoofing, WashTrading, MarketCornering],
            Self::BehavioralIntent => &[InsiderDealing, Spoofing, CrossDeskCollusion],
            Self::CoordinationPatterns => {
                &[CircularTrading, CrossDeskCollusion, MarketCornering]
            }
            Self::InformationAdvantage => &[InsiderDealing, CrossDeskCollusion],
            Self::EconomicRationality => &[CommodityManipulation, EconomicWithholding],
            Self::TechnicalManipulation => {
                &[WashTrading, CircularTrading, CommodityManipulation]
            }
        }
    }
}

/// An evidence node: observable, state set by the mapper or left to the
/// fallback prior.
#[derive(Debug, Clone)]
pub struct EvidenceNode {
    pub name: String,
    pub states: Vec<String>,
    pub fallback_prior: Vec<f64>,
}

/// A deterministic aggregator over ≤4 evidence parents.
#[derive(Debug, Clone)]
pub struct IntermediateNode {
    pub name: String,
    pub kind: IntermediateKind,
    pub parents: Vec<String>,
    pub states: Vec<String>,
    pub cpt: Factor,
}

/// The root risk node for a typology.
#[derive(Debug, Clone)]
pub struct OutcomeNode {
    pub name: String,
    pub parents: Vec<String>,
    pub states: Vec<String>,
    pub cpt: Factor,
}

/// Hidden node parented by a subset of evidence, child of the outcome node.
#[derive(Debug, Clone)]
pub struct LatentNode {
    pub name: String,
    pub parents: Vec<String>,
    pub states: Vec<String>,
    pub cpt: Factor,
}

/// The four node roles a network may contain.
#[derive(Debug, Clone)]
pub enum Node {
    Evidence(EvidenceNode),
    Intermediate(IntermediateNode),
    Outcome(OutcomeNode),
    Latent(LatentNode),
}

impl Node {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Evidence(n) => &n.name,
            Node::Intermediate(n) => &n.name,
            Node::Outcome(n) => &n.name,
            Node::Latent(n) => &n.name,
        }
    }

    #[must_use]
    pub fn states(&self) -> &[String] {
        match self {
            Node::Evidence(n) => &n.states,
            Node::Intermediate(n) => &n.states,
            Node::Outcome(n) => &n.states,
            Node::Latent(n) => &n.states,
        }
    }

    #[must_use]
    pub fn parents(&self) -> &[String] {
        match self {
            Node::Evidence(_) => &[],
            Node::Intermediate(n) => &n.parents,
            Node::Outcome(n) => &n.parents,
            Node::Latent(n) => &n.parents,
        }
    }

    #[must_use]
    pub fn cpt(&self) -> Option<&Factor> {
        match self {
            Node::Evidence(_) => None,
            Node::Intermediate(n) => Some(&n.cpt),
            Node::Outcome(n) => Some(&n.cpt),
            Node::Latent(n) => Some(&n.cpt),
        }
    }
}

/// Construct an evidence node, validating its state list and fallback prior.
pub fn evidence_node(
    name: impl Into<String>,
    states: Vec<String>,
    fallback_prior: Vec<f64>,
) -> CoreResult<Node> {
    let name = name.into();
    if states.is_empty() {
        return Err(CoreError::ConfigInvalid(format!(
            "evidence node '{name}' has an empty state list"
        )));
    }
    if fallback_prior.len() != states.len() {
        return Err(CoreError::ConfigInvalid(format!(
            "evidence node '{name}' fallback prior has {} entries, expected {}",
            fallback_prior.len(),
            states.len()
        )));
    }
    let sum: f64 = fallback_prior.iter().sum();
    if (sum - 1.0).abs() > CPT_TOLERANCE {
        return Err(CoreError::ConfigInvalid(format!(
            "evidence node '{name}' fallback prior sums to {sum}, expected 1.0"
        )));
    }
    Ok(Node::Evidence(EvidenceNode {
        name,
        states,
        fallback_prior,
    }))
}

/// Construct an intermediate node. `parents` is `(name, cardinality)` pairs,
/// in CPT-column order. Fails with a diagnostic including the node name when
/// no parents are supplied, or fan-in exceeds 4.
pub fn intermediate_node(
    name: impl Into<String>,
    kind: IntermediateKind,
    parents: &[(String, usize)],
    states: Vec<String>,
    params: &NoisyOrParams,
) -> CoreResult<Node> {
    let name = name.into();
    let cpt = build_noisy_or_factor(&name, &states, parents, params)?;
    Ok(Node::Intermediate(IntermediateNode {
        name,
        kind,
        parents: parents.iter().map(|(n, _)| n.clone()).collect(),
        states,
        cpt,
    }))
}

/// Construct a latent-intent node. Uses the same noisy-OR mechanism as
/// intermediate nodes, parameterized separately.
pub fn latent_node(
    name: impl Into<String>,
    parents: &[(String, usize)],
    states: Vec<String>,
    params: &NoisyOrParams,
) -> CoreResult<Node> {
    let name = name.into();
    let cpt = build_noisy_or_factor(&name, &states, parents, params)?;
    Ok(Node::Latent(LatentNode {
        name,
        parents: parents.iter().map(|(n, _)| n.clone()).collect(),
        states,
        cpt,
    }))
}

/// Construct an outcome node conditioned on its intermediate (and
/// optionally latent) parents, via the same noisy-OR mechanism as
/// intermediate/latent nodes — the outcome's parent count varies with
/// `ModelOptions`, so its CPT cannot be a fixed-shape hand-authored table.
pub fn outcome_node(
    name: impl Into<String>,
    parents: &[(String, usize)],
    states: Vec<String>,
    params: &NoisyOrParams,
) -> CoreResult<Node> {
    let name = name.into();
    let cpt = build_noisy_or_factor(&name, &states, parents, params)?;
    Ok(Node::Outcome(OutcomeNode {
        name,
        parents: parents.iter().map(|(n, _)| n.clone()).collect(),
        states,
        cpt,
    }))
}

/// Every conditional column of a CPT (fixing all parent states, varying the
/// node's own state) must sum to 1.0 within tolerance.
pub fn validate_cpt_columns(node_name: &str, cpt: &Factor) -> CoreResult<()> {
    let node_card = cpt.cardinalities[0];
    let parent_cards = &cpt.cardinalities[1..];
    let num_columns: usize = parent_cards.iter().product::<usize>().max(1);

    for column in 0..num_columns {
        let parent_indices = Factor::decode_index(column, parent_cards);
        let mut sum = 0.0;
        for state in 0..node_card {
            let mut full = vec![state];
            full.extend_from_slice(&parent_indices);
            let idx = Factor::encode_index(&full, &cpt.cardinalities);
            sum += cpt.values[idx];
        }
        if (sum - 1.0).abs() > CPT_TOLERANCE {
            return Err(CoreError::ConfigInvalid(format!(
                "node '{node_name}' CPT column {column} sums to {sum}, expected 1.0"
            )));
        }
    }
    Ok(())
}

/// Build a noisy-OR CPT for a node with `parents` evidence parents, per the
/// formula:
/// `P(top | s) = 1 − (1−leak) · Πᵢ(1 − pᵢ·sᵢ/(cᵢ−1))`.
pub fn build_noisy_or_factor(
    node_name: &str,
    states: &[String],
    parents: &[(String, usize)],
    params: &NoisyOrParams,
) -> CoreResult<Factor> {
    if parents.is_empty() {
        return Err(CoreError::ConfigInvalid(format!(
            "node '{node_name}' noisy-OR construction requires at least one parent"
        )));
    }
    if parents.len() > MAX_FAN_IN {
        return Err(CoreError::ConfigInvalid(format!(
            "node '{node_name}' has {} parents, exceeding the fan-in bound of {MAX_FAN_IN}",
            parents.len()
        )));
    }
    if params.parent_probabilities.len() != parents.len() {
        return Err(CoreError::ConfigInvalid(format!(
            "node '{node_name}' noisy-OR params declare {} parent probabilities for {} parents",
            params.parent_probabilities.len(),
            parents.len()
        )));
    }
    if states.is_empty() {
        return Err(CoreError::ConfigInvalid(format!(
            "node '{node_name}' has an empty state list"
        )));
    }

    let parent_cardinalities: Vec<usize> = parents.iter().map(|(_, c)| *c).collect();
    let num_states = states.len();

    let mut variables = vec![node_name.to_string()];
    variables.extend(parents.iter().map(|(n, _)| n.clone()));
    let mut full_cardinalities = vec![num_states];
    full_cardinalities.extend(&parent_cardinalities);

    let num_columns: usize = parent_cardinalities.iter().product::<usize>().max(1);
    let mut values = vec![0.0; num_states * num_columns];

    for column in 0..num_columns {
        let parent_states = Factor::decode_index(column, &parent_cardinalities);

        let activation_product: f64 = parent_states
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let cardinality = parent_cardinalities[i];
                let denom = (cardinality.saturating_sub(1)).max(1) as f64;
                1.0 - params.parent_probabilities[i] * (s as f64) / denom
            })
            .product();

        let p_top = (1.0 - (1.0 - params.leak_probability) * activation_product).clamp(0.0, 1.0);
        let distribution = noisy_or_distribution(p_top, num_states, params.residual_split);

        for (state, &p) in distribution.iter().enumerate() {
            let mut full = vec![state];
            full.extend_from_slice(&parent_states);
            let idx = Factor::encode_index(&full, &full_cardinalities);
            values[idx] = p;
        }
    }

    Ok(Factor::new(variables, full_cardinalities, values))
}

/// Split the non-top-state mass of a noisy-OR CPT column. For 3-state
/// children this is the configured middle/low split;
/// for any other cardinality the residual is shared evenly.
fn noisy_or_distribution(p_top: f64, num_states: usize, residual_split: (f64, f64)) -> Vec<f64> {
    let mut dist = vec![0.0; num_states];
    if num_states == 1 {
        dist[0] = 1.0;
        return dist;
    }
    dist[num_states - 1] = p_top;
    let residual = 1.0 - p_top;

    if num_states == 3 {
        dist[1] = residual * residual_split.0;
        dist[0] = residual * residual_split.1;
    } else {
        let share = residual / (num_states - 1) as f64;
        for slot in dist.iter_mut().take(num_states - 1) {
            *slot = share;
        }
    }
    dist
}
