use super::{LearningStepInfo, ModelError, Params};
use std::path::Path;

pub trait Actor<State> {
    fn best_action(&self, state: &State) -> Result<u8, ModelError>;
}

pub trait BasicLearner<Transition> {
    fn train_batch(&mut self, batch: &[&Transition]) -> Result<LearningStepInfo, ModelError>;
}

pub trait TargetNet {
    fn copy_control_to_target(&mut self) -> Result<(), ModelError>;
}

pub trait Persistable {
    fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), ModelError>;
    fn load<P: AsRef<Path>>(&mut self, filepath: P) -> Result<(), ModelError>;
}

pub trait ParamFetcher {
    fn params(&self) -> Result<Params, ModelError>;
    fn target_params(&self) -> Result<Params, ModelError>;
}
