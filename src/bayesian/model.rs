//! Model builder: assembles a typology's nodes, edges and
//! CPDs into an immutable [`TypologyModel`].

use crate::bayesian::node::{
    evidence_node, intermediate_node, latent_node, outcome_node, IntermediateKind, Node,
};
use crate::bayesian::probability::ProbabilityConfig;
use crate::error::{CoreError, CoreResult};
use crate::typology::Typology;
use std::collections::HashMap;

/// Options selecting a structural variant of a typology's model
///.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelOptions {
    pub use_latent_intent: bool,
    pub grouped: bool,
}

/// An immutable, constructed Bayesian network for one typology.
#[derive(Debug, Clone)]
pub struct TypologyModel {
    pub typology: Typology,
    pub options: ModelOptions,
    pub outcome_name: String,
    pub evidence_nodes: Vec<String>,
    nodes: HashMap<String, Node>,
    /// Topological build order (parents before children); used directly as
    /// the elimination order's seed in `inference.rs`.
    pub build_order: Vec<String>,
}

impl TypologyModel {
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn outcome(&self) -> &Node {
        self.nodes
            .get(&self.outcome_name)
            .expect("outcome node always present after construction")
    }

    #[must_use]
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    #[must_use]
    pub fn evidence_node_names(&self) -> &[String] {
        &self.evidence_nodes
    }
}

/// One evidence item declared by a typology: its node name and three-state
/// evidence-type key used for the fallback prior lookup.
struct EvidenceSpec {
    name: &'static str,
}

fn spec(name: &'static str) -> EvidenceSpec {
    EvidenceSpec { name }
}

fn evidence_roster(typology: Typology) -> Vec<EvidenceSpec> {
    match typology {
        Typology::InsiderDealing => vec![
            spec("trade_pattern"),
            spec("comms_intent"),
            spec("pnl_drift"),
            spec("mnpi_access"),
            spec("news_timing"),
            spec("trading_frequency"),
            spec("price_impact_ratio"),
            spec("comms_frequency"),
        ],
        Typology::Spoofing => vec![
            spec("order_clustering"),
            spec("order_cancellation"),
            spec("layering_pattern"),
            spec("price_impact_ratio"),
            spec("trading_frequency"),
            spec("volume_anomaly"),
        ],
        Typology::WashTrading => vec![
            spec("trade_pattern"),
            spec("counterparty_relationship"),
            spec("volume_anomaly"),
            spec("price_impact_ratio"),
        ],
        Typology::CircularTrading => vec![
            spec("counterparty_relationship"),
            spec("trade_pattern"),
            spec("volume_anomaly"),
            spec("coordination_signal"),
        ],
        Typology::CrossDeskCollusion => vec![
            spec("comms_intent"),
            spec("coordination_signal"),
            spec("mnpi_access"),
            spec("trading_frequency"),
        ],
        Typology::MarketCornering => vec![
            spec("volume_anomaly"),
            spec("price_impact_ratio"),
            spec("coordination_signal"),
            spec("liquidity_impact"),
        ],
        Typology::CommodityManipulation => vec![
            spec("volume_anomaly"),
            spec("price_impact_ratio"),
            spec("withholding_signal"),
            spec("liquidity_impact"),
        ],
        Typology::EconomicWithholding => vec![
            spec("withholding_signal"),
            spec("price_impact_ratio"),
            spec("liquidity_impact"),
        ],
    }
}

/// The evidence node names declared for `typology`, in build order.
#[must_use]
pub fn evidence_roster_names(typology: Typology) -> Vec<&'static str> {
    evidence_roster(typology).into_iter().map(|e| e.name).collect()
}

/// Default evidence-node -> evidence-type mapping, overridable in config.
#[must_use]
pub fn default_evidence_type(node_name: &str) -> &'static str {
    match node_name {
        "comms_intent" | "comms_frequency" => "behavioral",
        "pnl_drift" | "volume_anomaly" | "liquidity_impact" => "financial",
        "news_timing" | "trading_frequency" => "timing",
        "mnpi_access" => "access",
        "trade_pattern" | "order_clustering" | "order_cancellation" | "layering_pattern" => {
            "pattern"
        }
        "counterparty_relationship" | "coordination_signal" | "price_impact_ratio"
        | "withholding_signal" => "coordination",
        _ => "pattern",
    }
}

const THREE_STATES: [&str; 3] = ["low", "medium", "high"];

fn three_states() -> Vec<String> {
    THREE_STATES.iter().map(|s| s.to_string()).collect()
}

/// Build a typology's network. The grouped insider-dealing variant is the
/// registry default.
pub fn build_model(
    typology: Typology,
    options: ModelOptions,
    prob_config: &ProbabilityConfig,
) -> CoreResult<TypologyModel> {
    let mut nodes: HashMap<String, Node> = HashMap::new();
    let mut build_order: Vec<String> = Vec::new();
    let roster = evidence_roster(typology);
    let evidence_nodes: Vec<String> = roster.iter().map(|e| e.name.to_string()).collect();

    for item in &roster {
        let fallback_prior = prob_config.get_evidence_cpd(item.name, 3)?;
        let node = evidence_node(item.name, three_states(), fallback_prior)?;
        nodes.insert(item.name.to_string(), node);
        build_order.push(item.name.to_string());
    }

    let outcome_name = typology.as_str().to_string();

    if typology == Typology::InsiderDealing {
        build_insider_dealing(&mut nodes, &mut build_order, options, prob_config)?;
    } else {
        build_generic(
            typology,
            &evidence_nodes,
            &mut nodes,
            &mut build_order,
            options,
            prob_config,
        )?;
    }

    Ok(TypologyModel {
        typology,
        options,
        outcome_name,
        evidence_nodes,
        nodes,
        build_order,
    })
}

fn parent_tuple(nodes: &HashMap<String, Node>, name: &str) -> CoreResult<(String, usize)> {
    let node = nodes.get(name).ok_or_else(|| {
        CoreError::ConfigInvalid(format!("parent node '{name}' not yet constructed"))
    })?;
    Ok((name.to_string(), node.states().len()))
}

/// Generic baseline/latent-intent build for the seven non-insider-dealing
/// typologies: evidence feeds one intermediate (baseline) or a latent node
/// plus one intermediate (latent-intent), then the outcome.
fn build_generic(
    typology: Typology,
    evidence_nodes: &[String],
    nodes: &mut HashMap<String, Node>,
    build_order: &mut Vec<String>,
    options: ModelOptions,
    prob_config: &ProbabilityConfig,
) -> CoreResult<()> {
    let kind = primary_intermediate_kind(typology);
    let intermediate_name = format!("{}_{}", typology.as_str(), kind.as_str());

    let parents: Vec<(String, usize)> = evidence_nodes
        .iter()
        .take(4)
        .map(|n| parent_tuple(nodes, n))
        .collect::<CoreResult<_>>()?;
    let params = prob_config.get_intermediate_params(kind)?;
    let intermediate = intermediate_node(&intermediate_name, kind, &parents, three_states(), params)?;
    nodes.insert(intermediate_name.clone(), intermediate);
    build_order.push(intermediate_name.clone());

    let mut outcome_parents = vec![intermediate_name.clone()];

    if options.use_latent_intent {
        let latent_name = format!("{}_latent_intent", typology.as_str());
        let latent_parents: Vec<(String, usize)> = evidence_nodes
            .iter()
            .rev()
            .take(4)
            .map(|n| parent_tuple(nodes, n))
            .collect::<CoreResult<_>>()?;
        let latent_params = prob_config.get_intermediate_params(kind)?;
        let latent = latent_node(&latent_name, &latent_parents, three_states(), latent_params)?;
        nodes.insert(latent_name.clone(), latent);
        build_order.push(latent_name.clone());
        outcome_parents.push(latent_name);
    }

    let outcome_parent_tuples: Vec<(String, usize)> = outcome_parents
        .iter()
        .map(|n| parent_tuple(nodes, n))
        .collect::<CoreResult<_>>()?;
    let outcome_params = prob_config.outcome_noisy_or_params(typology, outcome_parent_tuples.len())?;
    let outcome = outcome_node(typology.as_str(), &outcome_parent_tuples, three_states(), &outcome_params)?;
    nodes.insert(typology.as_str().to_string(), outcome);
    build_order.push(typology.as_str().to_string());
    Ok(())
}

fn primary_intermediate_kind(typology: Typology) -> IntermediateKind {
    match typology {
        Typology::InsiderDealing | Typology::CrossDeskCollusion => {
            IntermediateKind::InformationAdvantage
        }
        Typology::Spoofing => IntermediateKind::MarketImpact,
        Typology::WashTrading | Typology::CircularTrading => {
            IntermediateKind::TechnicalManipulation
        }
        Typology::MarketCornering => IntermediateKind::CoordinationPatterns,
        Typology::CommodityManipulation | Typology::EconomicWithholding => {
            IntermediateKind::EconomicRationality
        }
    }
}

/// Insider dealing gets a dedicated build: two 4-parent evidence groups feed
/// either a single latent node (grouped, the default) or a latent node plus
/// an intermediate node (the ungrouped comparison variant).
fn build_insider_dealing(
    nodes: &mut HashMap<String, Node>,
    build_order: &mut Vec<String>,
    options: ModelOptions,
    prob_config: &ProbabilityConfig,
) -> CoreResult<()> {
    let group_a = ["comms_intent", "mnpi_access", "news_timing", "comms_frequency"];
    let group_b = [
        "trade_pattern",
        "pnl_drift",
        "trading_frequency",
        "price_impact_ratio",
    ];

    let latent_params = prob_config.get_intermediate_params(IntermediateKind::BehavioralIntent)?;
    let info_params = prob_config.get_intermediate_params(IntermediateKind::InformationAdvantage)?;

    if options.grouped {
        let group_a_parents: Vec<(String, usize)> = group_a
            .iter()
            .map(|n| parent_tuple(nodes, n))
            .collect::<CoreResult<_>>()?;
        let behavioral = intermediate_node(
            "insider_dealing_behavioral_intent",
            IntermediateKind::BehavioralIntent,
            &group_a_parents,
            three_states(),
            latent_params,
        )?;
        nodes.insert("insider_dealing_behavioral_intent".to_string(), behavioral);
        build_order.push("insider_dealing_behavioral_intent".to_string());

        let group_b_parents: Vec<(String, usize)> = group_b
            .iter()
            .map(|n| parent_tuple(nodes, n))
            .collect::<CoreResult<_>>()?;
        let info = intermediate_node(
            "insider_dealing_information_advantage",
            IntermediateKind::InformationAdvantage,
            &group_b_parents,
            three_states(),
            info_params,
        )?;
        nodes.insert(
            "insider_dealing_information_advantage".to_string(),
            info,
        );
        build_order.push("insider_dealing_information_advantage".to_string());

        let latent_name = "insider_dealing_latent_intent";
        let latent_parents = vec![
            parent_tuple(nodes, "insider_dealing_behavioral_intent")?,
            parent_tuple(nodes, "insider_dealing_information_advantage")?,
        ];
        let latent = if options.use_latent_intent {
            latent_node(latent_name, &latent_parents, three_states(), latent_params)?
        } else {
            intermediate_node(
                latent_name,
                IntermediateKind::BehavioralIntent,
                &latent_parents,
                three_states(),
                latent_params,
            )?
        };
        nodes.insert(latent_name.to_string(), latent);
        build_order.push(latent_name.to_string());

        let outcome_parents = vec![parent_tuple(nodes, latent_name)?];
        let outcome_params = prob_config.outcome_noisy_or_params(Typology::InsiderDealing, outcome_parents.len())?;
        let outcome = outcome_node(
            Typology::InsiderDealing.as_str(),
            &outcome_parents,
            three_states(),
            &outcome_params,
        )?;
        nodes.insert(Typology::InsiderDealing.as_str().to_string(), outcome);
        build_order.push(Typology::InsiderDealing.as_str().to_string());
    } else {
        // Ungrouped comparison variant: the two evidence groups feed
        // directly into a latent node and an intermediate (not into a
        // shared aggregator pair first), giving the outcome node the same
        // two logical parents with finer-grained per-evidence weighting.
        let group_a_parents: Vec<(String, usize)> = group_a
            .iter()
            .map(|n| parent_tuple(nodes, n))
            .collect::<CoreResult<_>>()?;
        let latent_name = "insider_dealing_latent_intent";
        let latent = latent_node(latent_name, &group_a_parents, three_states(), latent_params)?;
        nodes.insert(latent_name.to_string(), latent);
        build_order.push(latent_name.to_string());

        let group_b_parents: Vec<(String, usize)> = group_b
            .iter()
            .map(|n| parent_tuple(nodes, n))
            .collect::<CoreResult<_>>()?;
        let info_name = "insider_dealing_information_advantage";
        let info = intermediate_node(
            info_name,
            IntermediateKind::InformationAdvantage,
            &group_b_parents,
            three_states(),
            info_params,
        )?;
        nodes.insert(info_name.to_string(), info);
        build_order.push(info_name.to_string());

        let outcome_parents = vec![
            parent_tuple(nodes, latent_name)?,
            parent_tuple(nodes, info_name)?,
        ];
        let outcome_params = prob_config.outcome_noisy_or_params(Typology::InsiderDealing, outcome_parents.len())?;
        let outcome = outcome_node(
            Typology::InsiderDealing.as_str(),
            &outcome_parents,
            three_states(),
            &outcome_params,
        )?;
        nodes.insert(Typology::InsiderDealing.as_str().to_string(), outcome);
        build_order.push(Typology::InsiderDealing.as_str().to_string());
    }

    Ok(())
}
