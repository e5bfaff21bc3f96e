use crate::{AgentConfig, AgentError};
use file_io::{create_file_buf_write, has_data_left, open_file_buf_read};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SCHEDULE_FILE: &str = "schedule";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Training,
    /// Loaded from a checkpoint: epsilon pinned at its floor, no training.
    Serving,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Exploring,
    ExploitingWithNoise,
    ConvergedServing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSchedule {
    n_step: u64,
    eps: f64,
    eps_min: f64,
    eps_decay: f64,
    target_update_interval_steps: u64,
    mode: Mode,
}

impl TrainingSchedule {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            n_step: 0,
            eps: config.eps_start,
            eps_min: config.eps_min,
            eps_decay: config.eps_decay,
            target_update_interval_steps: config.target_update_frequency,
            mode: Mode::Training,
        }
    }
    pub fn eps(&self) -> f64 {
        self.eps
    }
    pub fn n_step(&self) -> u64 {
        self.n_step
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn phase(&self) -> Phase {
        if self.mode == Mode::Serving || self.eps <= self.eps_min {
            Phase::ConvergedServing
        } else if self.n_step == 0 {
            Phase::Exploring
        } else {
            Phase::ExploitingWithNoise
        }
    }
    /// Records one finished training step and decays epsilon toward its floor.
    pub fn step(&mut self) {
        self.n_step += 1;
        self.eps = (self.eps * self.eps_decay).max(self.eps_min);
    }
    pub fn is_time_to_update_target(&self) -> bool {
        self.n_step % self.target_update_interval_steps == 0
    }
    pub fn enter_serving(&mut self) {
        self.eps = self.eps_min;
        self.mode = Mode::Serving;
    }
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AgentError> {
        let file = create_file_buf_write(path.as_ref().join(SCHEDULE_FILE))?;
        bincode::serialize_into(file, self)?;
        Ok(())
    }
    /// Reads a saved schedule without touching this one.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, AgentError> {
        let path = path.as_ref().join(SCHEDULE_FILE);
        let mut file = open_file_buf_read(&path)?;
        let loaded = bincode::deserialize_from(&mut file)?;
        if has_data_left(file)? {
            return Err(AgentError::TrailingData(path));
        }
        Ok(loaded)
    }
    /// Takes over the progress of `saved` while keeping this schedule's
    /// decay, floor and target interval.
    pub fn restore_progress(&mut self, saved: &TrainingSchedule) {
        self.n_step = saved.n_step;
        self.eps = saved.eps.clamp(self.eps_min, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> TrainingSchedule {
        TrainingSchedule::new(&AgentConfig {
            eps_start: 1.0,
            eps_min: 0.5,
            eps_decay: 0.5,
            target_update_frequency: 3,
            ..Default::default()
        })
    }

    #[test]
    fn epsilon_decays_multiplicatively_to_its_floor() {
        let mut schedule = schedule();
        assert_eq!(schedule.phase(), Phase::Exploring);
        schedule.step();
        assert_eq!(schedule.eps(), 0.5);
        schedule.step();
        assert_eq!(schedule.eps(), 0.5);
        assert_eq!(schedule.n_step(), 2);
        assert_eq!(schedule.phase(), Phase::ConvergedServing);
    }

    #[test]
    fn phases_follow_training_progress() {
        let mut schedule = TrainingSchedule::new(&AgentConfig::default());
        assert_eq!(schedule.phase(), Phase::Exploring);
        schedule.step();
        assert_eq!(schedule.phase(), Phase::ExploitingWithNoise);
        schedule.enter_serving();
        assert_eq!(schedule.phase(), Phase::ConvergedServing);
        assert_eq!(schedule.mode(), Mode::Serving);
        assert_eq!(schedule.eps(), 0.05);
    }

    #[test]
    fn target_updates_every_interval() {
        let mut schedule = schedule();
        let due = (0..9)
            .map(|_| {
                schedule.step();
                schedule.is_time_to_update_target()
            })
            .collect::<Vec<_>>();
        assert_eq!(
            due,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn save_then_load_restores_everything() {
        let dir = std::env::temp_dir().join(format!("schedule-roundtrip-{}", std::process::id()));
        let mut saved = schedule();
        saved.step();
        saved.step();
        saved.save(&dir).unwrap();

        let loaded = TrainingSchedule::read(&dir).unwrap();
        assert_eq!(loaded, saved);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let dir = std::env::temp_dir().join(format!("schedule-trailing-{}", std::process::id()));
        schedule().save(&dir).unwrap();
        let path = dir.join(SCHEDULE_FILE);
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.push(0);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            TrainingSchedule::read(&dir),
            Err(AgentError::TrailingData(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn restoring_progress_keeps_configured_hyperparameters() {
        let mut saved = schedule();
        for _ in 0..4 {
            saved.step();
        }

        let config = AgentConfig {
            eps_min: 0.1,
            eps_decay: 0.99,
            target_update_frequency: 7,
            ..Default::default()
        };
        let mut current = TrainingSchedule::new(&config);
        current.restore_progress(&saved);
        assert_eq!(current.n_step(), 4);
        assert_eq!(current.eps(), 0.5);

        current.enter_serving();
        assert_eq!(current.eps(), 0.1);
        assert!(!current.is_time_to_update_target());
        current.step();
        current.step();
        current.step();
        assert!(current.is_time_to_update_target());
    }
}
