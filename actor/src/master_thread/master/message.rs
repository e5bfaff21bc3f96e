use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    NStep,
    Eps,
    Phase,
    Memory,
    Ticks,
}

pub enum MasterThreadMessage {
    Done,
    Failed(String),
    Answer(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum MasterMessage {
    Save(PathBuf),
    Load(PathBuf),
    Hold,
    Resume,
    Query(Query),
    Close,
}
