use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which signal pays for damaging and killing enemies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageAccounting {
    /// Score increases pay for kills; damage events are only counted.
    #[default]
    ScoreDelta,
    /// Damage events pay for damage; ordinary score increases pay nothing.
    DamageEvents,
}

/// Tunable constants of every reward term.
///
/// Coordinates are screen pixels with the origin at the top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    pub time_penalty: f64,

    pub world_width: f64,
    /// Distance from the left/right edge that counts as hugging the wall.
    pub edge_margin: f64,
    /// Player positions with `y` below this are too far up the screen.
    pub top_margin: f64,
    /// Added once per violated margin.
    pub position_penalty: f64,

    /// Radius around the player inside which enemy/boss bullets are threats.
    pub danger_radius: f64,
    /// Paid per threatening bullet, positive when the nearest threat moved away.
    pub dodge_reward: f64,

    /// Reward per point of ordinary score increase.
    pub score_weight: f64,
    /// Score increase that identifies the low-value UFO bonus.
    pub ufo_score_delta: f64,
    /// How far a score increase may be from `ufo_score_delta` and still
    /// count as the UFO bonus.
    pub ufo_tolerance: f64,
    /// Reward per point of a UFO-sized score increase.
    pub ufo_weight: f64,

    pub boss_damage_weight: f64,
    pub boss_kill_bonus: f64,

    pub hit_penalty: f64,
    pub death_penalty: f64,

    /// Bonus per item label.
    pub item_bonuses: BTreeMap<String, f64>,
    pub unknown_item_bonus: f64,
    pub item_cooldown_steps: u32,
    /// Items that reappear within this many pixels under the same label are
    /// treated as moved, not picked up.
    pub item_drift_tolerance: f64,

    pub stage_clear_bonus: f64,

    pub damage_event_weight: f64,
    pub damage_accounting: DamageAccounting,

    /// Charged when the previous action fired.
    pub shot_cost: f64,
}

fn default_item_bonuses() -> BTreeMap<String, f64> {
    [
        ("HP", 3.0),
        ("POWER", 2.0),
        ("SPEED", 1.0),
        ("BOMB", 2.0),
        ("Heal", 3.0),
        ("Shield", 2.0),
        ("Explode", 2.0),
        ("Slow", 1.0),
        ("Stop", 1.5),
        ("Push", 1.0),
    ]
    .into_iter()
    .map(|(label, bonus)| (label.to_string(), bonus))
    .collect()
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            time_penalty: -0.05,
            world_width: 448.0,
            edge_margin: 30.0,
            top_margin: 150.0,
            position_penalty: -0.1,
            danger_radius: 60.0,
            dodge_reward: 0.1,
            score_weight: 0.01,
            ufo_score_delta: 100.0,
            ufo_tolerance: 0.5,
            ufo_weight: 0.002,
            boss_damage_weight: 0.5,
            boss_kill_bonus: 50.0,
            hit_penalty: -5.0,
            death_penalty: -20.0,
            item_bonuses: default_item_bonuses(),
            unknown_item_bonus: 0.5,
            item_cooldown_steps: 10,
            item_drift_tolerance: 0.0,
            stage_clear_bonus: 30.0,
            damage_event_weight: 0.1,
            damage_accounting: DamageAccounting::default(),
            shot_cost: 0.0,
        }
    }
}

impl RewardWeights {
    /// Exact label match first, then a case-insensitive one, since layered
    /// config sources may lowercase map keys.
    pub fn item_bonus(&self, label: &str) -> f64 {
        self.item_bonuses
            .get(label)
            .or_else(|| {
                self.item_bonuses
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(label))
                    .map(|(_, bonus)| bonus)
            })
            .copied()
            .unwrap_or(self.unknown_item_bonus)
    }
}
