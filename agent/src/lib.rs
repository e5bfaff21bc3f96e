mod config;
mod dqn_agent;
mod error;
mod training_schedule;

pub use config::AgentConfig;
pub use dqn_agent::{DqnAgent, POLICY_FILE};
pub use error::AgentError;
pub use model::LearningStepInfo;
pub use training_schedule::{Mode, Phase, TrainingSchedule, SCHEDULE_FILE};
