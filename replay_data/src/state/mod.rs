mod encoder;

pub use encoder::{Schema, StateEncoder};

/// Length of every encoded state.
pub const STATE_LEN: usize = 120;

/// Fixed-length, normalized view of a [`packets::RawState`].
#[derive(Clone, Debug, PartialEq)]
pub struct State([f32; STATE_LEN]);

impl State {
    pub fn zeros() -> Self {
        Self([0.0; STATE_LEN])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<[f32; STATE_LEN]> for State {
    fn from(values: [f32; STATE_LEN]) -> Self {
        Self(values)
    }
}
