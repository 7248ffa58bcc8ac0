//! The Bayesian Risk Inference Core: node library,
//! probability configuration, model builder/registry, inference engine and
//! fallback engine.

pub mod factor;
pub mod fallback;
pub mod inference;
pub mod model;
pub mod node;
pub mod probability;
pub mod registry;

pub use factor::Factor;
pub use inference::{infer, InferenceTrace, NodeRecord};
pub use model::{build_model, ModelOptions, TypologyModel};
pub use node::{IntermediateKind, Node};
pub use probability::ProbabilityConfig;
pub use registry::ModelRegistry;
