//! Fallback engine: the evidence set passes through unchanged —
//! unobserved nodes are *not* imputed, since their fallback prior is already
//! baked into the node's CPT and used automatically during inference. This
//! module's only job is to record which nodes were left unobserved, so the
//! ESI calculator can measure the uncertainty that preserves.

use crate::bayesian::model::TypologyModel;
use std::collections::{HashMap, HashSet};

/// The evidence set, unchanged, plus the set of declared evidence nodes that
/// were not present in it.
#[derive(Debug, Clone)]
pub struct FallbackReport {
    pub evidence: HashMap<String, usize>,
    pub unobserved: HashSet<String>,
}

#[must_use]
pub fn apply_fallback(model: &TypologyModel, evidence: HashMap<String, usize>) -> FallbackReport {
    let unobserved = model
        .evidence_node_names()
        .iter()
        .filter(|name| !evidence.contains_key(*name))
        .cloned()
        .collect();
    FallbackReport { evidence, unobserved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayesian::model::{build_model, tests_support::test_probability_config, ModelOptions};
    use crate::typology::Typology;

    #[test]
    fn unobserved_nodes_are_recorded_not_imputed() {
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
        let mut evidence = HashMap::new();
        evidence.insert("order_clustering".to_string(), 2);

        let report = apply_fallback(&model, evidence.clone());
        assert_eq!(report.evidence, evidence);
        assert!(report.unobserved.contains("order_cancellation"));
        assert!(!report.unobserved.contains("order_clustering"));
    }
}
