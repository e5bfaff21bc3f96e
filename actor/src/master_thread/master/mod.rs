mod command;
mod message;

use crate::{build_control_loop, spawn_env_thread, ActorSettings};
pub use command::Command;
use crossbeam_channel::{Receiver, Sender};
pub use message::{MasterMessage, MasterThreadMessage, Query};
use std::path::PathBuf;
use std::thread::JoinHandle;

pub enum CommandError {
    ModeMatch,
    EnvGone,
    Failed(String),
}

#[derive(Copy, Clone)]
pub enum Mode {
    Running,
    Held,
}

/// Owns the control-loop thread and serializes commands to it.
pub struct Master {
    mode: Mode,
    default_checkpoint: PathBuf,
    sender: Sender<MasterMessage>,
    receiver: Receiver<MasterThreadMessage>,
    env_thread: JoinHandle<()>,
}

impl Master {
    /// Fails without spawning anything when the control loop cannot be built.
    pub fn new(settings: &ActorSettings) -> anyhow::Result<Self> {
        let control_loop = build_control_loop(settings)?;
        let (sender, env_receiver) = crossbeam_channel::unbounded::<MasterMessage>();
        let (env_sender, receiver) = crossbeam_channel::unbounded::<MasterThreadMessage>();
        let env_thread = spawn_env_thread(env_receiver, env_sender, control_loop, settings);
        Ok(Self {
            mode: Mode::Held,
            default_checkpoint: settings.checkpoint.path.clone(),
            sender,
            receiver,
            env_thread,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn request(&self, message: MasterMessage) -> Result<Option<String>, CommandError> {
        self.sender.send(message).map_err(|_| CommandError::EnvGone)?;
        match self.receiver.recv().map_err(|_| CommandError::EnvGone)? {
            MasterThreadMessage::Done => Ok(None),
            MasterThreadMessage::Answer(answer) => Ok(Some(answer)),
            MasterThreadMessage::Failed(reason) => Err(CommandError::Failed(reason)),
        }
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<Option<String>, CommandError> {
        match self.mode {
            Mode::Running => Err(CommandError::ModeMatch),
            Mode::Held => {
                let path = path.unwrap_or_else(|| self.default_checkpoint.clone());
                self.request(MasterMessage::Save(path))
            }
        }
    }

    pub fn load(&self, path: Option<PathBuf>) -> Result<Option<String>, CommandError> {
        match self.mode {
            Mode::Running => Err(CommandError::ModeMatch),
            Mode::Held => {
                let path = path.unwrap_or_else(|| self.default_checkpoint.clone());
                self.request(MasterMessage::Load(path))
            }
        }
    }

    pub fn hold(&mut self) -> Result<Option<String>, CommandError> {
        match self.mode {
            Mode::Running => {
                let reply = self.request(MasterMessage::Hold)?;
                self.mode = Mode::Held;
                Ok(reply)
            }
            Mode::Held => Err(CommandError::ModeMatch),
        }
    }

    pub fn resume(&mut self) -> Result<Option<String>, CommandError> {
        match self.mode {
            Mode::Running => Err(CommandError::ModeMatch),
            Mode::Held => {
                let reply = self.request(MasterMessage::Resume)?;
                self.mode = Mode::Running;
                Ok(reply)
            }
        }
    }

    pub fn query(&self, query: Query) -> Result<Option<String>, CommandError> {
        self.request(MasterMessage::Query(query))
    }

    /// Blocks until the control loop exits on its own.
    pub fn wait(self) {
        if self.env_thread.join().is_err() {
            tracing::error!("env thread panicked");
        }
    }

    /// Holds first when running, then shuts the control loop down.
    pub fn close(mut self) -> Result<(), CommandError> {
        if let Mode::Running = self.mode {
            self.hold()?;
        }
        let reply = self.request(MasterMessage::Close);
        if self.env_thread.join().is_err() {
            tracing::error!("env thread panicked");
        }
        reply.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_agent_settings_fail_before_any_thread_starts() {
        let mut settings = ActorSettings::default();
        settings.agent.batch_size = 0;
        assert!(Master::new(&settings).is_err());
    }

    #[test]
    fn corrupt_checkpoint_under_serve_fails_startup() {
        let dir = std::env::temp_dir().join(format!("actor-corrupt-serve-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(agent::POLICY_FILE), b"not safetensors").unwrap();

        let mut settings = ActorSettings::default();
        settings.serve = true;
        settings.checkpoint.path = dir.clone();
        let err = Master::new(&settings).err().expect("startup should fail");
        assert!(format!("{err:#}").contains("checkpoint"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
