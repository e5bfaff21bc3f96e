use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(version, about = "DQN agent that plays the arcade game over its HTTP API", long_about = None)]
pub struct Args {
    /// TOML file layered over the built-in defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Checkpoint directory used by save/load and the periodic saves.
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Load the checkpoint and play with epsilon at its floor, without training.
    #[arg(long)]
    pub serve: bool,

    /// Base URL of the game server, e.g. http://127.0.0.1:8765.
    #[arg(long)]
    pub server_url: Option<String>,

    /// Start held; type `resume` to begin playing.
    #[arg(long)]
    pub held: bool,
}
