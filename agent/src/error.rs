use model::ModelError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schedule encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("deserialization of {0} didn't reach EOF")]
    TrailingData(PathBuf),
}
