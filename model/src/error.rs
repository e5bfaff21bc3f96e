use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no checkpoint at {0}")]
    CheckpointNotFound(PathBuf),

    #[error("parameter store lock poisoned")]
    Poisoned,

    #[error("parameter {0} missing from the policy network")]
    MissingParam(String),

    #[error("unknown compute device {0:?}")]
    UnknownDevice(String),
}
