//! DQSI configuration: KDE roster, critical set,
//! role profiles and trust-bucket thresholds.

use crate::dqsi::kde::{ComparisonType, Dimension, Kde};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trust-bucket thresholds for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleProfile {
    pub high_threshold: f64,
    pub moderate_threshold: f64,
}

/// The process-wide DQSI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqsiConfig {
    pub kdes: Vec<Kde>,
    pub critical_kdes: Vec<String>,
    pub role_profiles: HashMap<String, RoleProfile>,
    pub default_profile: RoleProfile,
}

impl DqsiConfig {
    pub fn validate(&self) -> CoreResult<()> {
        for name in &self.critical_kdes {
            if !self.kdes.iter().any(|k| &k.name == name) {
                return Err(CoreError::ConfigInvalid(format!(
                    "critical KDE '{name}' is not in the configured KDE roster"
                )));
            }
        }
        for (role, profile) in &self.role_profiles {
            if profile.high_threshold <= profile.moderate_threshold {
                return Err(CoreError::ConfigInvalid(format!(
                    "role profile '{role}' has high_threshold <= moderate_threshold"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(payload: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|e| CoreError::ConfigInvalid(format!("dqsi_config parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Critical KDEs are treated as configuration input, defaulting to
    /// `[trader_id, trade_time, notional]`.
    #[must_use]
    pub fn default_config() -> Self {
        let kdes = vec![
            Kde {
                name: "trader_id".into(),
                risk_weight: 3,
                critical: true,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Conformity, Dimension::Uniqueness],
                allowed_comparisons: vec![ComparisonType::None, ComparisonType::ReferenceTable],
            },
            Kde {
                name: "trade_time".into(),
                risk_weight: 3,
                critical: true,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Timeliness, Dimension::Conformity],
                allowed_comparisons: vec![ComparisonType::None, ComparisonType::Trend],
            },
            Kde {
                name: "notional".into(),
                risk_weight: 3,
                critical: true,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Accuracy, Dimension::Consistency],
                allowed_comparisons: vec![ComparisonType::GoldenSource, ComparisonType::CrossSystem],
            },
            Kde {
                name: "instrument".into(),
                risk_weight: 2,
                critical: false,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Conformity],
                allowed_comparisons: vec![ComparisonType::ReferenceTable],
            },
            Kde {
                name: "price".into(),
                risk_weight: 2,
                critical: false,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Accuracy],
                allowed_comparisons: vec![ComparisonType::GoldenSource],
            },
            Kde {
                name: "volume".into(),
                risk_weight: 2,
                critical: false,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Coverage],
                allowed_comparisons: vec![ComparisonType::Trend],
            },
            Kde {
                name: "order_status".into(),
                risk_weight: 1,
                critical: false,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Conformity],
                allowed_comparisons: vec![ComparisonType::None],
            },
            Kde {
                name: "material_event_id".into(),
                risk_weight: 1,
                critical: false,
                applicable_dimensions: vec![Dimension::Completeness, Dimension::Consistency],
                allowed_comparisons: vec![ComparisonType::CrossSystem],
            },
        ];

        let mut role_profiles = HashMap::new();
        role_profiles.insert(
            "analyst".to_string(),
            RoleProfile { high_threshold: 0.85, moderate_threshold: 0.65 },
        );
        role_profiles.insert(
            "auditor".to_string(),
            RoleProfile { high_threshold: 0.92, moderate_threshold: 0.75 },
        );
        role_profiles.insert(
            "producer".to_string(),
            RoleProfile { high_threshold: 0.80, moderate_threshold: 0.60 },
        );
        role_profiles.insert(
            "consumer".to_string(),
            RoleProfile { high_threshold: 0.85, moderate_threshold: 0.65 },
        );

        Self {
            kdes,
            critical_kdes: vec!["trader_id".into(), "trade_time".into(), "notional".into()],
            role_profiles,
            default_profile: RoleProfile { high_threshold: 0.85, moderate_threshold: 0.65 },
        }
    }
}
