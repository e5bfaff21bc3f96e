use crate::settings::{CheckpointSettings, ServerSettings};
use crate::{ActorSettings, Query};
use agent::{AgentError, DqnAgent, Mode};
use game_client::{GameServer, StatePoll};
use model::traits::{Actor, BasicLearner, Persistable, TargetNet};
use model::BasicModel;
use packets::{ActionPacket, RawState};
use replay_data::{State, StateEncoder, Transition};
use reward::{RewardWeights, ShapingContext};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct TickTiming {
    pub tick: Duration,
    pub not_active_backoff: Duration,
    pub connection_backoff: Duration,
}

impl From<&ServerSettings> for TickTiming {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            tick: Duration::from_millis(settings.tick_ms),
            not_active_backoff: Duration::from_millis(settings.not_active_backoff_ms),
            connection_backoff: Duration::from_millis(settings.connection_backoff_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Acted,
    Skipped,
    NotActive,
    Disconnected,
}

impl TickOutcome {
    /// How long to wait before the next poll, given how long this tick took.
    pub fn delay(self, timing: &TickTiming, elapsed: Duration) -> Duration {
        match self {
            Self::Acted | Self::Skipped => timing.tick.saturating_sub(elapsed),
            Self::NotActive => timing.not_active_backoff,
            Self::Disconnected => timing.connection_backoff,
        }
    }
}

struct PreviousTick {
    raw: RawState,
    state: State,
    action: ActionPacket,
}

/// One poll → shape → remember → train → act cycle per tick.
pub struct ControlLoop<G, M = BasicModel> {
    server: G,
    agent: DqnAgent<M>,
    encoder: StateEncoder,
    weights: RewardWeights,
    shaping: ShapingContext,
    previous: Option<PreviousTick>,
    checkpoint: CheckpointSettings,
    episode_reward: f64,
    ticks: u64,
}

impl<G, M> ControlLoop<G, M>
where
    G: GameServer,
    M: Actor<State> + BasicLearner<Transition> + TargetNet + Persistable,
{
    pub fn new(server: G, agent: DqnAgent<M>, settings: &ActorSettings) -> Self {
        Self {
            server,
            agent,
            encoder: StateEncoder::new(settings.encoder.schema),
            weights: settings.reward.clone(),
            shaping: ShapingContext::default(),
            previous: None,
            checkpoint: settings.checkpoint.clone(),
            episode_reward: 0.0,
            ticks: 0,
        }
    }

    pub fn agent(&self) -> &DqnAgent<M> {
        &self.agent
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn check_health(&self) {
        match self.server.health() {
            Ok(true) => tracing::info!("game server is healthy"),
            Ok(false) => tracing::warn!("game server reports unhealthy"),
            Err(err) => tracing::warn!(%err, "game server health check failed"),
        }
    }

    /// Drops the remembered tick so no transition spans the gap.
    pub fn forget_previous(&mut self) {
        self.previous = None;
        self.shaping = ShapingContext::default();
        self.episode_reward = 0.0;
    }

    pub fn step(&mut self) -> Result<TickOutcome, AgentError> {
        match self.server.fetch_state() {
            Ok(StatePoll::Active(value)) => self.act_on(&value),
            Ok(StatePoll::Empty) => Ok(TickOutcome::Skipped),
            Ok(StatePoll::NotActive) => {
                tracing::debug!("game not active");
                self.forget_previous();
                Ok(TickOutcome::NotActive)
            }
            Err(err) if err.is_connection_failure() => {
                tracing::warn!(%err, "game server unreachable");
                Ok(TickOutcome::Disconnected)
            }
            Err(err) => {
                tracing::warn!(%err, "state poll failed");
                Ok(TickOutcome::Skipped)
            }
        }
    }

    fn act_on(&mut self, value: &Value) -> Result<TickOutcome, AgentError> {
        let (raw, state) = self.encoder.encode_value(value);

        match (&raw, self.previous.take()) {
            (Some(raw), Some(previous)) => self.record_transition(previous, raw, &state),
            (None, _) => self.forget_previous(),
            (Some(_), None) => {}
        }

        if let Some(step_info) = self.agent.train_step()? {
            tracing::debug!(
                n_step = self.agent.schedule().n_step(),
                loss = step_info.loss,
                average_q_val = step_info.average_q_val,
                eps = self.agent.schedule().eps(),
                "trained"
            );
            self.save_periodically();
        }

        let action = self.agent.get_action(&state)?;
        if let Err(err) = self.server.send_action(&action) {
            tracing::warn!(%err, "sending action failed");
        }

        self.previous = match raw {
            Some(raw) if !raw.is_dead() => Some(PreviousTick { raw, state, action }),
            _ => None,
        };
        self.ticks += 1;
        Ok(TickOutcome::Acted)
    }

    fn record_transition(&mut self, previous: PreviousTick, raw: &RawState, state: &State) {
        let (breakdown, shaping) = reward::shape(
            &previous.raw,
            raw,
            &previous.action,
            self.shaping,
            &self.weights,
        );
        self.shaping = shaping;
        let reward = breakdown.total();
        let terminated = raw.is_dead();
        tracing::trace!(frame = raw.frame, reward, ?breakdown, "shaped reward");
        self.episode_reward += reward;

        self.agent.remember(Transition {
            state: previous.state,
            action: previous.action.to_index() as u8,
            reward,
            next_state: state.clone(),
            terminated,
        });

        if terminated {
            tracing::info!(
                score = raw.score,
                frame = raw.frame,
                episode_reward = self.episode_reward,
                "episode ended"
            );
            self.forget_previous();
        }
    }

    fn save_periodically(&self) {
        let every = self.checkpoint.save_every_train_steps;
        if every == 0 || self.agent.schedule().n_step() % every != 0 {
            return;
        }
        if let Err(err) = self.agent.save_checkpoint(&self.checkpoint.path) {
            tracing::error!(%err, "periodic checkpoint failed");
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AgentError> {
        self.agent.save_checkpoint(path)
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<bool, AgentError> {
        let loaded = self.agent.load_checkpoint(path)?;
        if loaded {
            self.forget_previous();
        }
        Ok(loaded)
    }

    /// Final save on shutdown; serving agents have nothing new to persist.
    pub fn save_on_close(&self) {
        let schedule = self.agent.schedule();
        if schedule.mode() == Mode::Serving || schedule.n_step() == 0 {
            return;
        }
        if let Err(err) = self.agent.save_checkpoint(&self.checkpoint.path) {
            tracing::error!(%err, "checkpoint on close failed");
        }
    }

    pub fn answer(&self, query: Query) -> String {
        let schedule = self.agent.schedule();
        match query {
            Query::NStep => format!("n_step {}", schedule.n_step()),
            Query::Eps => format!("eps {:.4}", schedule.eps()),
            Query::Phase => format!("phase {:?}", schedule.phase()),
            Query::Memory => format!("memory {}", self.agent.memory().len()),
            Query::Ticks => format!("ticks {}", self.ticks),
        }
    }
}
