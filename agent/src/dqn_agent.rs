use crate::{AgentConfig, AgentError, Mode, TrainingSchedule, SCHEDULE_FILE};
use model::traits::{Actor, BasicLearner, Persistable, TargetNet};
use model::{BasicModel, LearningStepInfo};
use packets::{ActionPacket, ACTION_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replay_data::{State, Transition};
use replay_memories::ReplayQueue;
use std::fs;
use std::path::Path;

pub const POLICY_FILE: &str = "policy.safetensors";

/// Epsilon-greedy DQN agent: a model plus its replay memory and schedule.
pub struct DqnAgent<M = BasicModel> {
    model: M,
    memory: ReplayQueue<Transition>,
    schedule: TrainingSchedule,
    rng: StdRng,
    batch_size: usize,
    train_start: usize,
}

impl DqnAgent<BasicModel> {
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let model = BasicModel::new(&config.model_config())?;
        Ok(Self::wrap(model, config))
    }
}

impl<M> DqnAgent<M> {
    pub fn wrap(model: M, config: &AgentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            model,
            memory: ReplayQueue::with_max_size(config.memory_capacity),
            schedule: TrainingSchedule::new(config),
            rng,
            batch_size: config.batch_size,
            train_start: config.train_start,
        }
    }
    pub fn model(&self) -> &M {
        &self.model
    }
    pub fn schedule(&self) -> &TrainingSchedule {
        &self.schedule
    }
    pub fn memory(&self) -> &ReplayQueue<Transition> {
        &self.memory
    }
    pub fn remember(&mut self, transition: Transition) {
        self.memory.add_transition(transition);
    }
    pub fn enter_serving(&mut self) {
        self.schedule.enter_serving();
    }
}

impl<M: Actor<State>> DqnAgent<M> {
    pub fn select_action_index(&mut self, state: &State) -> Result<usize, AgentError> {
        if self.rng.gen::<f64>() < self.schedule.eps() {
            Ok(self.rng.gen_range(0..ACTION_COUNT))
        } else {
            Ok(usize::from(self.model.best_action(state)?))
        }
    }

    pub fn get_action(&mut self, state: &State) -> Result<ActionPacket, AgentError> {
        self.select_action_index(state).map(ActionPacket::from_index)
    }
}

impl<M: BasicLearner<Transition> + TargetNet> DqnAgent<M> {
    /// Runs one training step, or returns `None` while serving or while the
    /// memory holds fewer than `train_start` transitions.
    pub fn train_step(&mut self) -> Result<Option<LearningStepInfo>, AgentError> {
        if self.schedule.mode() == Mode::Serving || self.memory.len() < self.train_start {
            return Ok(None);
        }
        let batch = self.memory.sample_batch(self.batch_size, &mut self.rng);
        let step_info = self.model.train_batch(&batch)?;
        self.schedule.step();
        if self.schedule.is_time_to_update_target() {
            self.model.copy_control_to_target()?;
            tracing::debug!(n_step = self.schedule.n_step(), "synced target network");
        }
        Ok(Some(step_info))
    }
}

impl<M: Persistable> DqnAgent<M> {
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), AgentError> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        self.model.save(path.join(POLICY_FILE))?;
        self.schedule.save(path)?;
        tracing::info!(path = %path.display(), n_step = self.schedule.n_step(), "saved checkpoint");
        Ok(())
    }

    /// Returns `Ok(false)` and leaves the agent untouched when `path` holds
    /// no weights. Otherwise the agent comes back in serving mode. A schedule
    /// that fails to read leaves the weights untouched as well.
    pub fn load_checkpoint<P: AsRef<Path>>(&mut self, path: P) -> Result<bool, AgentError> {
        let path = path.as_ref();
        let weights = path.join(POLICY_FILE);
        if !weights.exists() {
            tracing::warn!(path = %weights.display(), "no checkpoint found, starting from fresh weights");
            return Ok(false);
        }
        let saved = if path.join(SCHEDULE_FILE).exists() {
            Some(TrainingSchedule::read(path)?)
        } else {
            tracing::warn!(path = %path.display(), "checkpoint has no schedule, step counter not restored");
            None
        };
        self.model.load(&weights)?;
        if let Some(saved) = &saved {
            self.schedule.restore_progress(saved);
        }
        self.schedule.enter_serving();
        tracing::info!(path = %path.display(), n_step = self.schedule.n_step(), "loaded checkpoint");
        Ok(true)
    }
}
