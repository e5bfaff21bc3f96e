//! Reward shaping: turns two consecutive game snapshots into a scalar
//! learning signal.
//!
//! Every term is a free function of the snapshots and the weight table so it
//! can be checked on its own; [`shape`] adds them up.

mod breakdown;
mod shaper;
mod weights;

pub use breakdown::RewardBreakdown;
pub use shaper::{
    boss_damage_term, boss_kill_term, damage_event_term, death_term, dodge_term, hit_term,
    item_term, position_term, score_term, shape, shot_term, stage_clear_term,
};
pub use weights::{DamageAccounting, RewardWeights};

/// State carried from one reward computation to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapingContext {
    /// Calls left before another item pickup can be rewarded.
    pub item_cooldown: u32,
}
