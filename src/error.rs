//! Core error taxonomy.
//!
//! The core never lets a raw library error escape; every failure mode is
//! translated into one of these variants at the point it is discovered.
//! `CoreError` carries a stable error code in its `code()`.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Structured error taxonomy.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration failed schema or arithmetic validation. Fatal: the
    /// caller must refuse to start rather than run with a partial config.
    #[error("configuration invalid: {0}")]
    ConfigInvalid(String),

    /// A typology name was not found in the registry.
    #[error("model unknown: typology '{0}' is not registered")]
    ModelUnknown(String),

    /// A mapper or caller produced a state index outside a node's
    /// cardinality.
    #[error("evidence out of range: node '{node}' state {state} >= cardinality {cardinality}")]
    EvidenceOutOfRange {
        node: String,
        state: usize,
        cardinality: usize,
    },

    /// A factor's values summed outside tolerance during elimination.
    #[error("inference instability: factor over node(s) {0:?} does not sum to 1.0 within tolerance")]
    InferenceInstability(Vec<String>),

    /// Construction of a single typology's model failed; the typology is
    /// disabled but the rest of the request continues.
    #[error("model construction failed for typology '{typology}': {reason}")]
    ModelConstruction { typology: String, reason: String },
}

impl CoreError {
    /// The stable error code, for audit headers and callers that branch
    /// on error class rather than message text.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ConfigInvalid(_) => "E_CONFIG_INVALID",
            Self::ModelUnknown(_) => "E_MODEL_UNKNOWN",
            Self::EvidenceOutOfRange { .. } => "E_EVIDENCE_OUT_OF_RANGE",
            Self::InferenceInstability(_) => "E_INFERENCE_INSTABILITY",
            Self::ModelConstruction { .. } => "E_MODEL_UNKNOWN",
        }
    }
}
