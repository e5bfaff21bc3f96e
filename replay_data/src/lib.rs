mod state;
mod transition;

pub use state::{Schema, State, StateEncoder, STATE_LEN};
pub use transition::Transition;
