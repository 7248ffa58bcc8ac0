//! Key Data Elements: named input fields carrying a risk tier,
//! a criticality flag, and the sub-dimensions they are scored on.

use serde::{Deserialize, Serialize};

/// The two scoring tiers. `tier_weight` is fixed by definition,
/// not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Foundational,
    Enhanced,
}

impl Tier {
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Tier::Foundational => 1.0,
            Tier::Enhanced => 0.75,
        }
    }
}

/// The seven DQSI dimensions, grouped into the two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Completeness,
    Conformity,
    Timeliness,
    Coverage,
    Accuracy,
    Uniqueness,
    Consistency,
}

impl Dimension {
    #[must_use]
    pub const fn tier(self) -> Tier {
        match self {
            Dimension::Completeness
            | Dimension::Conformity
            | Dimension::Timeliness
            | Dimension::Coverage => Tier::Foundational,
            Dimension::Accuracy | Dimension::Uniqueness | Dimension::Consistency => Tier::Enhanced,
        }
    }
}

/// Documented comparison types a KDE sub-dimension score can be computed
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonType {
    None,
    ReferenceTable,
    GoldenSource,
    CrossSystem,
    Trend,
}

/// A named KDE, its risk tier (high=3, medium=2, low=1), criticality flag,
/// and the dimensions it is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kde {
    pub name: String,
    pub risk_weight: u8,
    pub critical: bool,
    pub applicable_dimensions: Vec<Dimension>,
    pub allowed_comparisons: Vec<ComparisonType>,
}

impl Kde {
    /// A KDE's overall tier for the `DQSI_Score` weighting: if
    /// any applicable dimension is foundational, the KDE counts as
    /// foundational — enhanced-only KDEs are the exception, not the rule.
    #[must_use]
    pub fn tier(&self) -> Tier {
        if self
            .applicable_dimensions
            .iter()
            .any(|d| d.tier() == Tier::Foundational)
        {
            Tier::Foundational
        } else {
            Tier::Enhanced
        }
    }
}

/// A single KDE's observed raw-data facts, from which per-dimension scores
/// are derived.
#[derive(Debug, Clone, Default)]
pub struct KdeObservation {
    pub present: bool,
    pub conforms_to_format: bool,
    /// Seconds between the KDE's timestamp and the analysis's `as_of`
    /// instant; `None` for non-timestamp KDEs.
    pub age_seconds: Option<i64>,
    pub matches_reference: Option<bool>,
    pub volume_ratio: Option<f64>,
}

impl KdeObservation {
    /// Score one applicable dimension in `[0,1]` for this observation.
    #[must_use]
    pub fn score_dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Completeness => f64::from(self.present as u8),
            Dimension::Conformity => {
                if self.present {
                    f64::from(self.conforms_to_format as u8)
                } else {
                    0.0
                }
            }
            Dimension::Timeliness => self.age_seconds.map_or(0.5, freshness_score),
            Dimension::Coverage => self.volume_ratio.map_or(0.5, |r| r.clamp(0.0, 1.0)),
            Dimension::Accuracy | Dimension::Consistency => {
                self.matches_reference.map_or(0.5, |m| f64::from(m as u8))
            }
            Dimension::Uniqueness => {
                if self.present {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Freshness decays linearly from 1.0 at age 0 to 0.0 at 24 hours old, then
/// floors at 0.0.
#[must_use]
pub fn freshness_score(age_seconds: i64) -> f64 {
    const DAY_SECONDS: f64 = 86_400.0;
    (1.0 - (age_seconds.max(0) as f64 / DAY_SECONDS)).clamp(0.0, 1.0)
}
