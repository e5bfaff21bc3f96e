use crate::Args;
use agent::AgentConfig;
use config::{Config, ConfigError, Environment, File};
use replay_data::Schema;
use reward::RewardWeights;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub url: String,
    pub request_timeout_ms: u64,
    pub tick_ms: u64,
    pub not_active_backoff_ms: u64,
    pub connection_backoff_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8765".to_string(),
            request_timeout_ms: 1000,
            tick_ms: 16,
            not_active_backoff_ms: 1000,
            connection_backoff_ms: 2000,
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub schema: Schema,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CheckpointSettings {
    pub path: PathBuf,
    /// Training steps between automatic saves; 0 disables them.
    pub save_every_train_steps: u64,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("saved"),
            save_every_train_steps: 10_000,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ActorSettings {
    pub server: ServerSettings,
    pub agent: AgentConfig,
    pub reward: RewardWeights,
    pub encoder: EncoderSettings,
    pub checkpoint: CheckpointSettings,
    pub logging: LoggingSettings,
    /// Start playing immediately instead of waiting for `resume`.
    pub activate: bool,
    /// Load the checkpoint at startup and never train.
    pub serve: bool,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            agent: AgentConfig::default(),
            reward: RewardWeights::default(),
            encoder: EncoderSettings::default(),
            checkpoint: CheckpointSettings::default(),
            logging: LoggingSettings::default(),
            activate: true,
            serve: false,
        }
    }
}

impl ActorSettings {
    /// Defaults, then the optional TOML file, then `ACTOR__SECTION__KEY`
    /// environment variables, then command line flags.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        builder = builder
            .add_source(
                Environment::with_prefix("ACTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.url", args.server_url.clone())?
            .set_override_option(
                "checkpoint.path",
                args.checkpoint
                    .as_ref()
                    .map(|path| path.to_string_lossy().into_owned()),
            )?;
        if args.serve {
            builder = builder.set_override("serve", true)?;
        }
        if args.held {
            builder = builder.set_override("activate", false)?;
        }
        builder.build()?.try_deserialize()
    }
}
