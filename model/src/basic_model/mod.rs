mod clip;
mod q_network;
mod to_tensors;

use super::traits::{Actor, BasicLearner, ParamFetcher, Persistable, TargetNet};
use super::{ComputeDevice, LearningStepInfo, ModelError, Params};
use candle_core::{DType, Device, D};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use clip::clip_gradients;
use q_network::QNetwork;
use replay_data::{State, Transition};
use std::collections::BTreeMap;
use std::path::Path;
use to_tensors::{state_to_tensor, BatchTensors};

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub hidden_size: usize,
    pub learning_rate: f64,
    pub gamma: f64,
    pub max_grad_norm: f64,
    pub device: ComputeDevice,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_size: 128,
            learning_rate: 1e-3,
            gamma: 0.99,
            max_grad_norm: 10.0,
            device: ComputeDevice::Cpu,
        }
    }
}

fn snapshot(varmap: &VarMap) -> Result<Params, ModelError> {
    let data = varmap.data().lock().map_err(|_| ModelError::Poisoned)?;
    let mut params = BTreeMap::new();
    for (name, var) in data.iter() {
        let values = var.as_tensor().flatten_all()?.to_vec1::<f32>()?;
        params.insert(name.clone(), values);
    }
    Ok(Params(params))
}

/// A policy network trained online plus a frozen target network that only
/// changes through [`TargetNet::copy_control_to_target`].
pub struct BasicModel {
    policy_varmap: VarMap,
    target_varmap: VarMap,
    policy: QNetwork,
    target: QNetwork,
    optimizer: AdamW,
    device: Device,
    gamma: f64,
    max_grad_norm: f64,
}

impl BasicModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let device = config.device.to_candle()?;
        let policy_varmap = VarMap::new();
        let target_varmap = VarMap::new();
        let policy = QNetwork::new(
            VarBuilder::from_varmap(&policy_varmap, DType::F32, &device),
            config.hidden_size,
        )?;
        let target = QNetwork::new(
            VarBuilder::from_varmap(&target_varmap, DType::F32, &device),
            config.hidden_size,
        )?;
        let optimizer = AdamW::new(
            policy_varmap.all_vars(),
            ParamsAdamW {
                lr: config.learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        let mut model = Self {
            policy_varmap,
            target_varmap,
            policy,
            target,
            optimizer,
            device,
            gamma: config.gamma,
            max_grad_norm: config.max_grad_norm,
        };
        model.copy_control_to_target()?;
        tracing::debug!(device = ?config.device, hidden = config.hidden_size, "built q-networks");
        Ok(model)
    }
}

impl Actor<State> for BasicModel {
    fn best_action(&self, state: &State) -> Result<u8, ModelError> {
        let input = state_to_tensor(state, &self.device)?;
        let q = self.policy.forward(&input)?.detach();
        let action = q.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;
        Ok(action as u8)
    }
}

impl BasicLearner<Transition> for BasicModel {
    fn train_batch(&mut self, batch: &[&Transition]) -> Result<LearningStepInfo, ModelError> {
        assert!(!batch.is_empty(), "cannot train on an empty batch");
        let tensors = BatchTensors::new(batch, &self.device)?;

        let q_taken = self
            .policy
            .forward(&tensors.states)?
            .gather(&tensors.actions, 1)?
            .squeeze(1)?;
        let next_max = self
            .target
            .forward(&tensors.next_states)?
            .max(D::Minus1)?
            .detach();
        let targets = (&tensors.rewards + (next_max * &tensors.not_dones)?.affine(self.gamma, 0.0)?)?;

        let loss = q_taken.sub(&targets.detach())?.sqr()?.mean_all()?;
        let mut grads = loss.backward()?;
        clip_gradients(&mut grads, &self.policy_varmap.all_vars(), self.max_grad_norm)?;
        self.optimizer.step(&grads)?;

        Ok(LearningStepInfo {
            loss: loss.to_scalar::<f32>()?,
            average_q_val: q_taken.mean_all()?.to_scalar::<f32>()?,
        })
    }
}

impl TargetNet for BasicModel {
    fn copy_control_to_target(&mut self) -> Result<(), ModelError> {
        let policy_data = self
            .policy_varmap
            .data()
            .lock()
            .map_err(|_| ModelError::Poisoned)?;
        let mut target_data = self
            .target_varmap
            .data()
            .lock()
            .map_err(|_| ModelError::Poisoned)?;
        for (name, target_var) in target_data.iter_mut() {
            let policy_var = policy_data
                .get(name)
                .ok_or_else(|| ModelError::MissingParam(name.clone()))?;
            target_var.set(&policy_var.as_tensor().detach())?;
        }
        Ok(())
    }
}

impl Persistable for BasicModel {
    fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), ModelError> {
        file_io::ensure_parent_dir(filepath.as_ref())?;
        self.policy_varmap.save(filepath.as_ref())?;
        Ok(())
    }

    /// Loads policy weights and syncs the target to them.
    fn load<P: AsRef<Path>>(&mut self, filepath: P) -> Result<(), ModelError> {
        let filepath = filepath.as_ref();
        if !filepath.exists() {
            return Err(ModelError::CheckpointNotFound(filepath.to_path_buf()));
        }
        self.policy_varmap.load(filepath)?;
        self.copy_control_to_target()
    }
}

impl ParamFetcher for BasicModel {
    fn params(&self) -> Result<Params, ModelError> {
        snapshot(&self.policy_varmap)
    }

    fn target_params(&self) -> Result<Params, ModelError> {
        snapshot(&self.target_varmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packets::ACTION_COUNT;
    use replay_data::STATE_LEN;

    fn model() -> BasicModel {
        BasicModel::new(&ModelConfig::default()).unwrap()
    }

    fn state(seed: f32) -> State {
        let mut values = [0.0f32; STATE_LEN];
        for (i, v) in values.iter_mut().enumerate() {
            *v = ((i as f32 * 0.37 + seed).sin() + 1.0) / 2.0;
        }
        State::from(values)
    }

    fn transitions() -> Vec<Transition> {
        (0..8)
            .map(|i| Transition {
                state: state(i as f32),
                action: (i * 2) as u8,
                reward: if i % 2 == 0 { 1.0 } else { -1.0 },
                next_state: state(i as f32 + 0.5),
                terminated: true,
            })
            .collect()
    }

    #[test]
    fn q_values_cover_every_action() {
        let model = model();
        let input = state_to_tensor(&state(0.0), &model.device).unwrap();
        let q = model
            .policy
            .forward(&input)
            .unwrap()
            .squeeze(0)
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert_eq!(q.len(), ACTION_COUNT);
        assert!(q.iter().all(|v| v.is_finite()));
        let best = model.best_action(&state(0.0)).unwrap();
        assert!((best as usize) < ACTION_COUNT);
        let argmax = q
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(best as usize, argmax);
    }

    #[test]
    fn target_starts_equal_and_stays_frozen_until_synced() {
        let mut model = model();
        assert_eq!(model.params().unwrap(), model.target_params().unwrap());
        let frozen = model.target_params().unwrap();

        let owned = transitions();
        let batch = owned.iter().collect::<Vec<_>>();
        for _ in 0..3 {
            model.train_batch(&batch).unwrap();
        }
        assert_eq!(model.target_params().unwrap(), frozen);
        assert_ne!(model.params().unwrap(), frozen);

        model.copy_control_to_target().unwrap();
        assert_eq!(model.params().unwrap(), model.target_params().unwrap());
    }

    #[test]
    fn loss_falls_on_a_fixed_batch() {
        let mut model = model();
        let owned = transitions();
        let batch = owned.iter().collect::<Vec<_>>();
        let first = model.train_batch(&batch).unwrap().loss;
        let mut last = first;
        for _ in 0..200 {
            last = model.train_batch(&batch).unwrap().loss;
        }
        assert!(last.is_finite());
        assert!(last < first, "loss went from {first} to {last}");
    }

    #[test]
    fn save_then_load_restores_policy_and_target() {
        let dir = std::env::temp_dir().join(format!("model-roundtrip-{}", std::process::id()));
        let path = dir.join("nested").join("policy.safetensors");

        let mut trained = model();
        let owned = transitions();
        let batch = owned.iter().collect::<Vec<_>>();
        trained.train_batch(&batch).unwrap();
        trained.save(&path).unwrap();

        let mut restored = model();
        restored.load(&path).unwrap();
        assert_eq!(restored.params().unwrap(), trained.params().unwrap());
        assert_eq!(restored.target_params().unwrap(), trained.params().unwrap());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn loading_missing_file_is_reported() {
        let mut model = model();
        let missing = std::env::temp_dir().join("model-missing-checkpoint.safetensors");
        assert!(matches!(
            model.load(&missing),
            Err(ModelError::CheckpointNotFound(_))
        ));
    }
}
