use crate::State;

/// One step of experience. Never mutated once it has been stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: State,
    pub action: u8,
    pub reward: f64,
    pub next_state: State,
    pub terminated: bool,
}
