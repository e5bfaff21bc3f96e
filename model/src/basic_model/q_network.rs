use candle_core::{Result, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use packets::ACTION_COUNT;
use replay_data::STATE_LEN;

/// Two hidden ReLU layers followed by one Q-value per action.
pub struct QNetwork {
    fc1: Linear,
    fc2: Linear,
    head: Linear,
}

impl QNetwork {
    pub fn new(vs: VarBuilder, hidden_size: usize) -> Result<Self> {
        let fc1 = linear(STATE_LEN, hidden_size, vs.pp("fc1"))?;
        let fc2 = linear(hidden_size, hidden_size, vs.pp("fc2"))?;
        let head = linear(hidden_size, ACTION_COUNT, vs.pp("head"))?;
        Ok(Self { fc1, fc2, head })
    }

    /// `states` is `(batch, STATE_LEN)`, the result `(batch, ACTION_COUNT)`.
    pub fn forward(&self, states: &Tensor) -> Result<Tensor> {
        let x = self.fc1.forward(states)?.relu()?;
        let x = self.fc2.forward(&x)?.relu()?;
        self.head.forward(&x)
    }
}
