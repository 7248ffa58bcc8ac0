//! Top-level configuration loader: JSON + JSON-Schema
//! validation for the three persisted configuration files, assembled into
//! one [`CoreConfig`].

use crate::aggregate::SeverityThresholds;
use crate::bayesian::model::ModelOptions;
use crate::bayesian::probability::ProbabilityConfig;
use crate::bayesian::registry::ModelRegistry;
use crate::dqsi::DqsiConfig;
use crate::error::{CoreError, CoreResult};
use crate::typology::Typology;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PROBABILITY_CONFIG_SCHEMA: &str = include_str!("../schema/probability_config.schema.json");
const DQSI_CONFIG_SCHEMA: &str = include_str!("../schema/dqsi_config.schema.json");
const BAYESIAN_MODELS_SCHEMA: &str = include_str!("../schema/bayesian_models.schema.json");

/// One typology's registry entry from `bayesian_models.json`: its default
/// structural variant and optional severity-threshold override.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypologyModelEntry {
    pub use_latent_intent: bool,
    pub grouped: bool,
    #[serde(default)]
    pub severity_thresholds: Option<SeverityThresholds>,
}

impl TypologyModelEntry {
    #[must_use]
    pub fn options(&self) -> ModelOptions {
        ModelOptions { use_latent_intent: self.use_latent_intent, grouped: self.grouped }
    }

    #[must_use]
    pub fn thresholds(&self) -> SeverityThresholds {
        self.severity_thresholds.unwrap_or_default()
    }
}

/// `bayesian_models.json`: per-typology node-set variant and risk-threshold
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianModelsConfig {
    pub typologies: HashMap<Typology, TypologyModelEntry>,
}

impl BayesianModelsConfig {
    #[must_use]
    pub fn entry(&self, typology: Typology) -> TypologyModelEntry {
        self.typologies.get(&typology).copied().unwrap_or_else(|| {
            let options = ModelRegistry::default_options(typology);
            TypologyModelEntry {
                use_latent_intent: options.use_latent_intent,
                grouped: options.grouped,
                severity_thresholds: None,
            }
        })
    }

    /// The crate's built-in defaults.
    #[must_use]
    pub fn default_config() -> Self {
        let mut typologies = HashMap::new();
        for typology in Typology::all() {
            let options = ModelRegistry::default_options(typology);
            typologies.insert(
                typology,
                TypologyModelEntry {
                    use_latent_intent: options.use_latent_intent,
                    grouped: options.grouped,
                    severity_thresholds: None,
                },
            );
        }
        Self { typologies }
    }

    fn validate_against_schema(payload: &serde_json::Value) -> CoreResult<()> {
        validate_json(payload, BAYESIAN_MODELS_SCHEMA, "bayesian_models")
    }

    pub fn from_json(payload: &str) -> CoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| CoreError::ConfigInvalid(format!("bayesian_models parse error: {e}")))?;
        Self::validate_against_schema(&value)?;
        serde_json::from_value(value)
            .map_err(|e| CoreError::ConfigInvalid(format!("bayesian_models deserialize error: {e}")))
    }
}

fn validate_json(payload: &serde_json::Value, schema: &str, label: &str) -> CoreResult<()> {
    let schema_value: serde_json::Value = serde_json::from_str(schema)
        .map_err(|e| CoreError::ConfigInvalid(format!("{label} schema is malformed: {e}")))?;
    let validator = jsonschema::validator_for(&schema_value)
        .map_err(|e| CoreError::ConfigInvalid(format!("{label} schema failed to compile: {e}")))?;
    if !validator.is_valid(payload) {
        let messages: Vec<String> = validator.iter_errors(payload).map(|e| format!("  - {e}")).collect();
        return Err(CoreError::ConfigInvalid(format!(
            "{label} failed schema validation:\n{}",
            messages.join("\n")
        )));
    }
    Ok(())
}

/// Validate a `probability_config` payload against its JSON Schema before
/// deserializing.
pub fn load_probability_config(payload: &str) -> CoreResult<ProbabilityConfig> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| CoreError::ConfigInvalid(format!("probability_config parse error: {e}")))?;
    validate_json(&value, PROBABILITY_CONFIG_SCHEMA, "probability_config")?;
    ProbabilityConfig::from_json(payload)
}

/// Validate a `dqsi_config` payload against its JSON Schema before
/// deserializing.
pub fn load_dqsi_config(payload: &str) -> CoreResult<DqsiConfig> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| CoreError::ConfigInvalid(format!("dqsi_config parse error: {e}")))?;
    validate_json(&value, DQSI_CONFIG_SCHEMA, "dqsi_config")?;
    DqsiConfig::from_json(payload)
}

/// The process-wide configuration aggregate: the probability, DQSI and
/// model-variant configuration assembled from the three persisted files
///. Construction failure here is fatal.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub probability: ProbabilityConfig,
    pub dqsi: DqsiConfig,
    pub models: BayesianModelsConfig,
}

impl CoreConfig {
    /// Load and cross-validate all three configuration files.
    pub fn load(probability_json: &str, dqsi_json: &str, models_json: &str) -> CoreResult<Self> {
        let probability = load_probability_config(probability_json)?;
        let dqsi = load_dqsi_config(dqsi_json)?;
        let models = BayesianModelsConfig::from_json(models_json)?;
        Ok(Self { probability, dqsi, models })
    }

    /// The crate's built-in bootstrap configuration, used when no persisted
    /// files are supplied.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            probability: ProbabilityConfig::default_config(),
            dqsi: DqsiConfig::default_config(),
            models: BayesianModelsConfig::default_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_schema_validation() {
        let config = CoreConfig::default_config();
        let probability_json = serde_json::to_string(&config.probability).unwrap();
        let dqsi_json = serde_json::to_string(&config.dqsi).unwrap();
        let models_json = serde_json::to_string(&config.models).unwrap();

        let reloaded = CoreConfig::load(&probability_json, &dqsi_json, &models_json).unwrap();
        assert_eq!(reloaded.models.typologies.len(), Typology::all().len());
    }

    #[test]
    fn malformed_dqsi_json_is_rejected() {
        let err = load_dqsi_config("{\"kdes\": \"not-an-array\"}").unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid(_)));
    }

    #[test]
    fn entry_falls_back_to_default_for_unlisted_typology() {
        let config = BayesianModelsConfig { typologies: HashMap::new() };
        let entry = config.entry(Typology::Spoofing);
        assert!(!entry.use_latent_intent);
    }
}
