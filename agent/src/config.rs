use crate::AgentError;
use model::{ComputeDevice, ModelConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub gamma: f64,
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Minimum replay size before any training step runs.
    pub train_start: usize,
    pub memory_capacity: usize,
    pub eps_start: f64,
    pub eps_min: f64,
    /// Multiplicative epsilon decay applied after every training step.
    pub eps_decay: f64,
    /// Training steps between policy → target copies.
    pub target_update_frequency: u64,
    pub max_grad_norm: f64,
    pub hidden_size: usize,
    pub device: ComputeDevice,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            learning_rate: 1e-3,
            batch_size: 64,
            train_start: 1000,
            memory_capacity: 100_000,
            eps_start: 1.0,
            eps_min: 0.05,
            eps_decay: 0.9995,
            target_update_frequency: 1000,
            max_grad_norm: 10.0,
            hidden_size: 128,
            device: ComputeDevice::Cpu,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), AgentError> {
        let invalid = |msg: String| Err(AgentError::InvalidConfig(msg));
        if self.batch_size == 0 {
            return invalid("batch_size must be positive".into());
        }
        if self.train_start < self.batch_size {
            return invalid(format!(
                "train_start ({}) must be at least batch_size ({})",
                self.train_start, self.batch_size
            ));
        }
        if self.memory_capacity < self.train_start {
            return invalid(format!(
                "memory_capacity ({}) must be at least train_start ({})",
                self.memory_capacity, self.train_start
            ));
        }
        if self.target_update_frequency == 0 {
            return invalid("target_update_frequency must be positive".into());
        }
        for (name, eps) in [("eps_start", self.eps_start), ("eps_min", self.eps_min)] {
            if !(0.0..=1.0).contains(&eps) {
                return invalid(format!("{name} ({eps}) must lie in [0, 1]"));
            }
        }
        if self.eps_min > self.eps_start {
            return invalid("eps_min must not exceed eps_start".into());
        }
        if !(0.0..=1.0).contains(&self.eps_decay) {
            return invalid(format!("eps_decay ({}) must lie in [0, 1]", self.eps_decay));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma ({}) must lie in [0, 1]", self.gamma));
        }
        if self.hidden_size == 0 || self.learning_rate <= 0.0 {
            return invalid("hidden_size and learning_rate must be positive".into());
        }
        Ok(())
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            hidden_size: self.hidden_size,
            learning_rate: self.learning_rate,
            gamma: self.gamma,
            max_grad_norm: self.max_grad_norm,
            device: self.device,
        }
    }
}
