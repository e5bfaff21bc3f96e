use candle_core::{Device, Result, Tensor};
use replay_data::{State, Transition, STATE_LEN};

pub fn state_to_tensor(state: &State, device: &Device) -> Result<Tensor> {
    Tensor::from_slice(state.as_slice(), (1, STATE_LEN), device)
}

/// Column tensors for one minibatch. `not_dones` is 0 for terminal
/// transitions so their bootstrap term vanishes.
pub struct BatchTensors {
    pub states: Tensor,
    pub next_states: Tensor,
    pub actions: Tensor,
    pub rewards: Tensor,
    pub not_dones: Tensor,
}

impl BatchTensors {
    pub fn new(batch: &[&Transition], device: &Device) -> Result<Self> {
        let batch_len = batch.len();
        let mut states = Vec::with_capacity(batch_len * STATE_LEN);
        let mut next_states = Vec::with_capacity(batch_len * STATE_LEN);
        let mut actions = Vec::with_capacity(batch_len);
        let mut rewards = Vec::with_capacity(batch_len);
        let mut not_dones = Vec::with_capacity(batch_len);
        for transition in batch {
            states.extend_from_slice(transition.state.as_slice());
            next_states.extend_from_slice(transition.next_state.as_slice());
            actions.push(u32::from(transition.action));
            rewards.push(transition.reward as f32);
            not_dones.push(if transition.terminated { 0.0f32 } else { 1.0 });
        }

        Ok(Self {
            states: Tensor::from_vec(states, (batch_len, STATE_LEN), device)?,
            next_states: Tensor::from_vec(next_states, (batch_len, STATE_LEN), device)?,
            actions: Tensor::from_vec(actions, (batch_len, 1), device)?,
            rewards: Tensor::from_vec(rewards, batch_len, device)?,
            not_dones: Tensor::from_vec(not_dones, batch_len, device)?,
        })
    }
}
