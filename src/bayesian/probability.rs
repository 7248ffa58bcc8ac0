//! Probability configuration: the single source of truth
//! for evidence priors, noisy-OR parameters and outcome CPDs. No inline
//! magic numbers elsewhere in the crate — everything flows through here.

use crate::bayesian::node::IntermediateKind;
use crate::error::{CoreError, CoreResult};
use crate::typology::Typology;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOLERANCE: f64 = 1e-6;

/// A prior distribution for one evidence *type*, with its documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorEntry {
    pub probabilities: Vec<f64>,
    pub description: String,
    pub regulatory_basis: String,
}

/// Noisy-OR construction parameters for one intermediate or latent node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoisyOrParams {
    pub leak_probability: f64,
    pub parent_probabilities: Vec<f64>,
    /// (middle, low) split of the residual mass for 3-state children
    ///.
    pub residual_split: (f64, f64),
}

/// A configured outcome CPD, conditioned on a typology's intermediate (and
/// optionally latent) node states.
///
/// Built with the same noisy-OR mechanism as intermediate/latent nodes
/// rather than a hand-authored flat table: the outcome's parent
/// count varies with `ModelOptions` (1 parent when grouped without a
/// separate latent, 2 when `use_latent_intent` or insider dealing's
/// ungrouped variant is active), so `noisy_or.parent_probabilities` is sized
/// to the maximum fan-in and truncated to the actual parent count at build
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeCpdConfig {
    pub noisy_or: NoisyOrParams,
    pub description: String,
    pub regulatory_basis: String,
}

/// The process-wide, immutable probability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityConfig {
    pub evidence_type_priors: HashMap<String, PriorEntry>,
    pub evidence_node_types: HashMap<String, String>,
    pub intermediate_params: HashMap<IntermediateKind, NoisyOrParams>,
    pub outcome_cpds: HashMap<Typology, OutcomeCpdConfig>,
}

impl ProbabilityConfig {
    /// Evidence-node fallback prior, validated against `cardinality`
    ///.
    pub fn get_evidence_cpd(&self, node_name: &str, cardinality: usize) -> CoreResult<Vec<f64>> {
        let evidence_type = self.evidence_node_types.get(node_name).ok_or_else(|| {
            CoreError::ConfigInvalid(format!(
                "no evidence-type mapping for node '{node_name}'"
            ))
        })?;
        let prior = self.evidence_type_priors.get(evidence_type).ok_or_else(|| {
            CoreError::ConfigInvalid(format!(
                "no prior configured for evidence type '{evidence_type}' (node '{node_name}')"
            ))
        })?;
        if prior.probabilities.len() != cardinality {
            return Err(CoreError::ConfigInvalid(format!(
                "evidence type '{evidence_type}' prior has {} states, node '{node_name}' declares {cardinality}",
                prior.probabilities.len()
            )));
        }
        let sum: f64 = prior.probabilities.iter().sum();
        if (sum - 1.0).abs() > TOLERANCE {
            return Err(CoreError::ConfigInvalid(format!(
                "evidence type '{evidence_type}' prior sums to {sum}, expected 1.0"
            )));
        }
        Ok(prior.probabilities.clone())
    }

    pub fn get_intermediate_params(&self, kind: IntermediateKind) -> CoreResult<&NoisyOrParams> {
        self.intermediate_params.get(&kind).ok_or_else(|| {
            CoreError::ConfigInvalid(format!(
                "no noisy-OR parameters configured for intermediate type '{}'",
                kind.as_str()
            ))
        })
    }

    pub fn get_outcome_cpd(&self, typology: Typology) -> CoreResult<&OutcomeCpdConfig> {
        self.outcome_cpds.get(&typology).ok_or_else(|| {
            CoreError::ConfigInvalid(format!(
                "no outcome CPD configured for typology '{}'",
                typology.as_str()
            ))
        })
    }

    /// The outcome node's noisy-OR parameters truncated to `parent_count`
    /// entries, since the outcome's actual parent count depends on
    /// `ModelOptions` (see [`OutcomeCpdConfig`]).
    pub fn outcome_noisy_or_params(&self, typology: Typology, parent_count: usize) -> CoreResult<NoisyOrParams> {
        let cpd = self.get_outcome_cpd(typology)?;
        if cpd.noisy_or.parent_probabilities.len() < parent_count {
            return Err(CoreError::ConfigInvalid(format!(
                "outcome CPD for '{}' declares {} parent probabilities, need at least {parent_count}",
                typology.as_str(),
                cpd.noisy_or.parent_probabilities.len()
            )));
        }
        Ok(NoisyOrParams {
            leak_probability: cpd.noisy_or.leak_probability,
            parent_probabilities: cpd.noisy_or.parent_probabilities[..parent_count].to_vec(),
            residual_split: cpd.noisy_or.residual_split,
        })
    }

    /// Validate every probability carried in this table sums to 1.0 within
    /// tolerance. Run once at load.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, entry) in &self.evidence_type_priors {
            let sum: f64 = entry.probabilities.iter().sum();
            if (sum - 1.0).abs() > TOLERANCE {
                return Err(CoreError::ConfigInvalid(format!(
                    "evidence type '{name}' prior sums to {sum}, expected 1.0"
                )));
            }
        }
        for (typology, cpd) in &self.outcome_cpds {
            if cpd.noisy_or.parent_probabilities.is_empty() {
                return Err(CoreError::ConfigInvalid(format!(
                    "outcome CPD for '{}' declares no parent probabilities",
                    typology.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Deserialize and validate a configuration payload.
    pub fn from_json(payload: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|e| CoreError::ConfigInvalid(format!("probability_config parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in probability configuration used when no `probability_config`
    /// file is supplied.
    #[must_use]
    pub fn default_config() -> Self {
        use crate::bayesian::node::IntermediateKind;
        use crate::typology::Typology;

        let mut evidence_type_priors = HashMap::new();
        for (ty, probs, description) in [
            ("behavioral", [0.70, 0.25, 0.05], "baseline behavioral-signal prior"),
            ("financial", [0.65, 0.25, 0.10], "baseline P&L/volume-signal prior"),
            ("timing", [0.75, 0.20, 0.05], "baseline timing-signal prior"),
            ("access", [0.80, 0.15, 0.05], "baseline information-access prior"),
            ("pattern", [0.68, 0.24, 0.08], "baseline order/trade-pattern prior"),
            ("coordination", [0.72, 0.22, 0.06], "baseline cross-party coordination prior"),
        ] {
            evidence_type_priors.insert(
                ty.to_string(),
                PriorEntry {
                    probabilities: probs.to_vec(),
                    description: description.to_string(),
                    regulatory_basis: "MAR Art.8".into(),
                },
            );
        }

        let mut evidence_node_types = HashMap::new();
        for typology in Typology::all() {
            for name in crate::bayesian::model::evidence_roster_names(typology) {
                evidence_node_types.insert(
                    name.to_string(),
                    crate::bayesian::model::default_evidence_type(name).to_string(),
                );
            }
        }

        let mut intermediate_params = HashMap::new();
        for kind in [
            IntermediateKind::MarketImpact,
            IntermediateKind::BehavioralIntent,
            IntermediateKind::CoordinationPatterns,
            IntermediateKind::InformationAdvantage,
            IntermediateKind::EconomicRationality,
            IntermediateKind::TechnicalManipulation,
        ] {
            intermediate_params.insert(
                kind,
                NoisyOrParams {
                    leak_probability: 0.02,
                    parent_probabilities: vec![0.6, 0.6, 0.6, 0.6],
                    residual_split: (0.7, 0.3),
                },
            );
        }

        let mut outcome_cpds = HashMap::new();
        for typology in Typology::all() {
            outcome_cpds.insert(
                typology,
                OutcomeCpdConfig {
                    noisy_or: NoisyOrParams {
                        leak_probability: 0.03,
                        parent_probabilities: vec![0.75, 0.65],
                        residual_split: (0.7, 0.3),
                    },
                    description: format!("default outcome noisy-OR parameters for {}", typology.as_str()),
                    regulatory_basis: "MAR Art.12".into(),
                },
            );
        }

        Self {
            evidence_type_priors,
            evidence_node_types,
            intermediate_params,
            outcome_cpds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProbabilityConfig {
        let mut evidence_type_priors = HashMap::new();
        evidence_type_priors.insert(
            "behavioral".to_string(),
            PriorEntry {
                probabilities: vec![0.70, 0.25, 0.05],
                description: "default behavioral prior".into(),
                regulatory_basis: "MAR Art.8".into(),
            },
        );
        let mut evidence_node_types = HashMap::new();
        evidence_node_types.insert("comms_intent".to_string(), "behavioral".to_string());

        ProbabilityConfig {
            evidence_type_priors,
            evidence_node_types,
            intermediate_params: HashMap::new(),
            outcome_cpds: HashMap::new(),
        }
    }

    #[test]
    fn get_evidence_cpd_returns_configured_prior() {
        let cfg = sample();
        let prior = cfg.get_evidence_cpd("comms_intent", 3).unwrap();
        assert_eq!(prior, vec![0.70, 0.25, 0.05]);
    }

    #[test]
    fn get_evidence_cpd_rejects_cardinality_mismatch() {
        let cfg = sample();
        assert!(cfg.get_evidence_cpd("comms_intent", 2).is_err());
    }

    #[test]
    fn get_evidence_cpd_rejects_unmapped_node() {
        let cfg = sample();
        assert!(cfg.get_evidence_cpd("unknown_node", 3).is_err());
    }

    #[test]
    fn default_config_validates_and_truncates_outcome_params() {
        let cfg = ProbabilityConfig::default_config();
        cfg.validate().unwrap();
        let one_parent = cfg.outcome_noisy_or_params(Typology::Spoofing, 1).unwrap();
        assert_eq!(one_parent.parent_probabilities.len(), 1);
        let two_parent = cfg.outcome_noisy_or_params(Typology::Spoofing, 2).unwrap();
        assert_eq!(two_parent.parent_probabilities.len(), 2);
    }
}
