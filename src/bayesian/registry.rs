//! Model registry: named, cached lookup of typology
//! models. Process-wide, immutable once populated, safe for concurrent
//! reads.

use crate::bayesian::model::{build_model, ModelOptions, TypologyModel};
use crate::bayesian::probability::ProbabilityConfig;
use crate::error::CoreResult;
use crate::typology::Typology;
use std::collections::HashMap;
use std::sync::RwLock;

type ConstructionKey = (Typology, bool, bool);

fn construction_key(typology: Typology, options: ModelOptions) -> ConstructionKey {
    (typology, options.use_latent_intent, options.grouped)
}

/// Caches constructed networks by `(typology, use_latent_intent, grouped)`.
/// `create_model` is idempotent: repeated calls with the same key return the
/// same compiled network without rebuilding it.
pub struct ModelRegistry {
    prob_config: ProbabilityConfig,
    cache: RwLock<HashMap<ConstructionKey, TypologyModel>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(prob_config: ProbabilityConfig) -> Self {
        Self {
            prob_config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Default options for a typology: insider dealing, cross-desk collusion,
    /// market cornering and spoofing have six-or-more-node evidence rosters
    /// spanning two conceptual evidence groups, so they default to the
    /// grouped, latent-intent build to give every evidence node a path to
    /// the outcome within the four-parent fan-in bound.
    #[must_use]
    pub fn default_options(typology: Typology) -> ModelOptions {
        match typology {
            Typology::InsiderDealing
            | Typology::CrossDeskCollusion
            | Typology::MarketCornering
            | Typology::Spoofing => ModelOptions {
                use_latent_intent: true,
                grouped: true,
            },
            _ => ModelOptions {
                use_latent_intent: false,
                grouped: true,
            },
        }
    }

    pub fn create_model(
        &self,
        typology: Typology,
        options: ModelOptions,
    ) -> CoreResult<TypologyModel> {
        let key = construction_key(typology, options);
        if let Some(model) = self.cache.read().expect("registry lock poisoned").get(&key) {
            return Ok(model.clone());
        }

        let model = build_model(typology, options, &self.prob_config)?;
        self.cache
            .write()
            .expect("registry lock poisoned")
            .insert(key, model.clone());
        Ok(model)
    }

    #[must_use]
    pub fn probability_config(&self) -> &ProbabilityConfig {
        &self.prob_config
    }
}
