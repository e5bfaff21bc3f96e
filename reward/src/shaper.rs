use crate::{DamageAccounting, RewardBreakdown, RewardWeights, ShapingContext};
use packets::{ActionPacket, Item, ItemKey, RawState};
use std::collections::HashSet;

pub fn shape(
    prev: &RawState,
    curr: &RawState,
    prev_action: &ActionPacket,
    ctx: ShapingContext,
    weights: &RewardWeights,
) -> (RewardBreakdown, ShapingContext) {
    let (item, ctx) = item_term(prev, curr, ctx, weights);
    let breakdown = RewardBreakdown {
        time: weights.time_penalty,
        position: position_term(curr, weights),
        dodge: dodge_term(prev, curr, weights),
        score: score_term(prev, curr, weights),
        boss_damage: boss_damage_term(prev, curr, weights),
        boss_kill: boss_kill_term(prev, curr, weights),
        hit: hit_term(prev, curr, weights),
        item,
        stage_clear: stage_clear_term(prev, curr, weights),
        death: death_term(prev, curr, weights),
        damage_events: damage_event_term(curr, weights),
        shot: shot_term(prev_action, weights),
        damage_events_seen: curr.damage_events.len(),
    };
    (breakdown, ctx)
}

pub fn position_term(curr: &RawState, weights: &RewardWeights) -> f64 {
    let near_side = curr.player_x < weights.edge_margin
        || curr.player_x > weights.world_width - weights.edge_margin;
    let too_high = curr.player_y < weights.top_margin;
    f64::from(u8::from(near_side) + u8::from(too_high)) * weights.position_penalty
}

fn nearest_threat(state: &RawState) -> Option<f64> {
    state
        .dangerous_bullets()
        .map(|b| (b.x - state.player_x).hypot(b.y - state.player_y))
        .min_by(f64::total_cmp)
}

/// Rewards moving away from nearby enemy and boss bullets.
///
/// Paid once per threat inside the danger radius, with the sign given by
/// whether the nearest threat is farther away than it was last tick. Without
/// a threat last tick there is nothing to compare against and the term is 0.
pub fn dodge_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    let threats = curr
        .dangerous_bullets()
        .filter(|b| (b.x - curr.player_x).hypot(b.y - curr.player_y) <= weights.danger_radius)
        .count();
    if threats == 0 {
        return 0.0;
    }
    match (nearest_threat(prev), nearest_threat(curr)) {
        (Some(before), Some(now)) => {
            let sign = if now > before { 1.0 } else { -1.0 };
            sign * weights.dodge_reward * threats as f64
        }
        _ => 0.0,
    }
}

fn is_ufo_delta(delta: f64, weights: &RewardWeights) -> bool {
    (delta - weights.ufo_score_delta).abs() < weights.ufo_tolerance
}

pub fn score_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    let delta = curr.score - prev.score;
    if delta <= 0.0 {
        return 0.0;
    }
    if is_ufo_delta(delta, weights) {
        delta * weights.ufo_weight
    } else {
        match weights.damage_accounting {
            DamageAccounting::ScoreDelta => delta * weights.score_weight,
            DamageAccounting::DamageEvents => 0.0,
        }
    }
}

/// HP the boss lost this tick. A boss that disappears lost all of its
/// remaining HP.
pub fn boss_damage_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    let lost = match (prev.boss, curr.boss) {
        (Some(before), Some(now)) => before.hp - now.hp,
        (Some(before), None) => before.hp,
        _ => 0.0,
    };
    lost.max(0.0) * weights.boss_damage_weight
}

pub fn boss_kill_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    if prev.boss.is_some() && curr.boss.is_none() {
        weights.boss_kill_bonus
    } else {
        0.0
    }
}

pub fn hit_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    if curr.player_hp < prev.player_hp {
        weights.hit_penalty
    } else {
        0.0
    }
}

pub fn death_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    if curr.is_dead() && !prev.is_dead() {
        weights.death_penalty
    } else {
        0.0
    }
}

fn drifted(item: &Item, curr: &RawState, tolerance: f64) -> bool {
    tolerance > 0.0
        && curr
            .items
            .iter()
            .any(|c| c.label == item.label && (c.x - item.x).hypot(c.y - item.y) <= tolerance)
}

/// Pays for items that were on screen last tick and are gone now.
///
/// The returned context carries the pickup cooldown forward.
pub fn item_term(
    prev: &RawState,
    curr: &RawState,
    ctx: ShapingContext,
    weights: &RewardWeights,
) -> (f64, ShapingContext) {
    let cooling_down = ctx.item_cooldown > 0;
    let mut ctx = ShapingContext {
        item_cooldown: ctx.item_cooldown.saturating_sub(1),
    };
    let current: HashSet<ItemKey> = curr.items.iter().map(Item::key).collect();
    let picked: Vec<&Item> = prev
        .items
        .iter()
        .filter(|item| !current.contains(&item.key()))
        .filter(|item| !drifted(item, curr, weights.item_drift_tolerance))
        .collect();
    if picked.is_empty() {
        return (0.0, ctx);
    }
    if cooling_down {
        tracing::debug!(count = picked.len(), "item pickup ignored during cooldown");
        return (0.0, ctx);
    }
    ctx.item_cooldown = weights.item_cooldown_steps;
    let bonus = picked.iter().map(|item| weights.item_bonus(&item.label)).sum();
    (bonus, ctx)
}

pub fn stage_clear_term(prev: &RawState, curr: &RawState, weights: &RewardWeights) -> f64 {
    if curr.is_field_clear() && !prev.is_field_clear() {
        weights.stage_clear_bonus
    } else {
        0.0
    }
}

pub fn damage_event_term(curr: &RawState, weights: &RewardWeights) -> f64 {
    match weights.damage_accounting {
        DamageAccounting::ScoreDelta => 0.0,
        DamageAccounting::DamageEvents => {
            curr.damage_events.iter().map(|e| e.amount).sum::<f64>() * weights.damage_event_weight
        }
    }
}

pub fn shot_term(prev_action: &ActionPacket, weights: &RewardWeights) -> f64 {
    if prev_action.shoot {
        -weights.shot_cost
    } else {
        0.0
    }
}
