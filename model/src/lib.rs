mod basic_model;
mod device;
mod error;
pub mod traits;

pub use basic_model::{BasicModel, ModelConfig};
pub use device::ComputeDevice;
pub use error::ModelError;
use std::collections::BTreeMap;

pub struct LearningStepInfo {
    pub loss: f32,
    pub average_q_val: f32,
}

/// Flattened network parameters keyed by variable name.
#[derive(Clone, Debug, PartialEq)]
pub struct Params(pub BTreeMap<String, Vec<f32>>);
