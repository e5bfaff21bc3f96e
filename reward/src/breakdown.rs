/// Reward of one tick, kept per term.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardBreakdown {
    pub time: f64,
    pub position: f64,
    pub dodge: f64,
    pub score: f64,
    pub boss_damage: f64,
    pub boss_kill: f64,
    pub hit: f64,
    pub item: f64,
    pub stage_clear: f64,
    pub death: f64,
    pub damage_events: f64,
    pub shot: f64,
    /// Damage events reported this tick, whether or not they were rewarded.
    pub damage_events_seen: usize,
}

impl RewardBreakdown {
    pub fn total(&self) -> f64 {
        self.time
            + self.position
            + self.dodge
            + self.score
            + self.boss_damage
            + self.boss_kill
            + self.hit
            + self.item
            + self.stage_clear
            + self.death
            + self.damage_events
            + self.shot
    }
}
