use super::{State, STATE_LEN};
use packets::{BulletOwner, RawState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const WORLD_WIDTH: f64 = 448.0;
const WORLD_HEIGHT: f64 = 520.0;
const MAX_PLAYER_HP: f64 = 3.0;
const SCORE_SCALE: f64 = 10_000.0;
const ENEMY_HP_SCALE: f64 = 50.0;
const ENEMY_KIND_SCALE: f64 = 3.0;

const MAX_BULLETS_PER_OWNER: usize = 10;
const MAX_ENEMIES: usize = 10;
const MAX_ITEMS: usize = 5;

const BULLET_OWNER_ORDER: [BulletOwner; 3] =
    [BulletOwner::Player, BulletOwner::Enemy, BulletOwner::Boss];

/// Which blocks make up the encoded state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    /// Player, bullets and enemies.
    Baseline,
    /// Baseline plus item positions.
    #[default]
    WithItems,
}

/// Turns raw game snapshots into [`State`]s.
///
/// Layout: player (4) | self bullets (10x2) | enemy bullets (10x2) |
/// boss bullets (10x2) | enemies (10x4) | items (5x2, `WithItems` only),
/// zero padded up to [`STATE_LEN`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StateEncoder {
    schema: Schema,
}

fn norm_x(x: f64) -> f64 {
    x / WORLD_WIDTH
}

fn norm_y(y: f64) -> f64 {
    y / WORLD_HEIGHT
}

/// Appends at most `max_entries` entries and zero-pads the block to its full width.
fn push_block<const N: usize>(
    out: &mut Vec<f64>,
    entries: impl Iterator<Item = [f64; N]>,
    max_entries: usize,
) {
    let start = out.len();
    for entry in entries.take(max_entries) {
        out.extend_from_slice(&entry);
    }
    out.resize(start + N * max_entries, 0.0);
}

impl StateEncoder {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn encode(&self, raw: &RawState) -> State {
        let mut values = Vec::with_capacity(STATE_LEN);
        values.extend_from_slice(&[
            norm_x(raw.player_x),
            norm_y(raw.player_y),
            raw.player_hp / MAX_PLAYER_HP,
            raw.score / SCORE_SCALE,
        ]);
        for owner in BULLET_OWNER_ORDER {
            push_block(
                &mut values,
                raw.bullets_of(owner).map(|b| [norm_x(b.x), norm_y(b.y)]),
                MAX_BULLETS_PER_OWNER,
            );
        }
        push_block(
            &mut values,
            raw.enemies.iter().map(|e| {
                [
                    norm_x(e.x),
                    norm_y(e.y),
                    e.hp / ENEMY_HP_SCALE,
                    e.kind / ENEMY_KIND_SCALE,
                ]
            }),
            MAX_ENEMIES,
        );
        if self.schema == Schema::WithItems {
            push_block(
                &mut values,
                raw.items.iter().map(|i| [norm_x(i.x), norm_y(i.y)]),
                MAX_ITEMS,
            );
        }

        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            tracing::warn!(position = bad, "non-finite value while encoding state, using zeros");
            return State::zeros();
        }
        let mut encoded = [0.0f32; STATE_LEN];
        for (slot, value) in encoded.iter_mut().zip(values) {
            *slot = value as f32;
        }
        State(encoded)
    }

    /// Parses and encodes a `/state` payload. A malformed payload yields no
    /// raw state and the all-zero encoding.
    pub fn encode_value(&self, value: &Value) -> (Option<RawState>, State) {
        match RawState::from_value(value) {
            Ok(raw) => {
                let state = self.encode(&raw);
                (Some(raw), state)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not extract state, using zeros");
                (None, State::zeros())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packets::{Boss, Bullet, Enemy, Item};
    use serde_json::json;

    const SELF_BULLETS: usize = 4;
    const ENEMY_BULLETS: usize = SELF_BULLETS + 20;
    const BOSS_BULLETS: usize = ENEMY_BULLETS + 20;
    const ENEMIES: usize = BOSS_BULLETS + 20;
    const ITEMS: usize = ENEMIES + 40;

    fn bullet(x: f64, y: f64, owner: BulletOwner) -> Bullet {
        Bullet { x, y, owner }
    }

    fn enemy(i: usize) -> Enemy {
        Enemy {
            x: i as f64,
            y: 2.0 * i as f64,
            hp: 10.0,
            kind: 1.0,
        }
    }

    fn crowded_state(n: usize) -> RawState {
        let mut bullets = vec![];
        for i in 0..n {
            bullets.push(bullet(i as f64, 1.0, BulletOwner::Player));
            bullets.push(bullet(i as f64, 2.0, BulletOwner::Enemy));
            bullets.push(bullet(i as f64, 3.0, BulletOwner::Boss));
        }
        RawState {
            player_x: 224.0,
            player_y: 260.0,
            player_hp: 3.0,
            score: 5000.0,
            enemies: (0..n).map(enemy).collect(),
            bullets,
            items: (0..n)
                .map(|i| Item {
                    x: i as f64,
                    y: 1.0,
                    label: "Heal".to_string(),
                })
                .collect(),
            boss: Some(Boss {
                x: 1.0,
                y: 1.0,
                hp: 50.0,
            }),
            ..RawState::default()
        }
    }

    #[test]
    fn length_is_fixed_for_any_entity_count() {
        for schema in [Schema::Baseline, Schema::WithItems] {
            let encoder = StateEncoder::new(schema);
            for n in [0, 3, 10, 11, 50] {
                let state = encoder.encode(&crowded_state(n));
                assert_eq!(state.as_slice().len(), STATE_LEN);
            }
        }
    }

    #[test]
    fn player_block_is_normalized() {
        let state = StateEncoder::default().encode(&crowded_state(0));
        assert_eq!(&state.as_slice()[..4], &[0.5, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn bullets_are_split_by_owner_in_fixed_order() {
        let raw = RawState {
            bullets: vec![
                bullet(448.0, 0.0, BulletOwner::Boss),
                bullet(0.0, 520.0, BulletOwner::Enemy),
                bullet(224.0, 260.0, BulletOwner::Player),
            ],
            ..RawState::default()
        };
        let state = StateEncoder::default().encode(&raw);
        let v = state.as_slice();
        assert_eq!(&v[SELF_BULLETS..SELF_BULLETS + 2], &[0.5, 0.5]);
        assert_eq!(&v[ENEMY_BULLETS..ENEMY_BULLETS + 2], &[0.0, 1.0]);
        assert_eq!(&v[BOSS_BULLETS..BOSS_BULLETS + 2], &[1.0, 0.0]);
        assert!(v[SELF_BULLETS + 2..ENEMY_BULLETS].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn overflowing_enemies_keep_the_first_ten_in_order() {
        let state = StateEncoder::default().encode(&crowded_state(15));
        let v = state.as_slice();
        for i in 0..MAX_ENEMIES {
            let x = v[ENEMIES + 4 * i] as f64;
            assert!((x - norm_x(i as f64)).abs() < 1e-6);
        }
        assert_eq!(v[ENEMIES + 2], 0.2);
    }

    #[test]
    fn item_block_follows_schema() {
        let raw = crowded_state(2);
        let with_items = StateEncoder::new(Schema::WithItems).encode(&raw);
        let baseline = StateEncoder::new(Schema::Baseline).encode(&raw);
        assert!((with_items.as_slice()[ITEMS + 2] as f64 - norm_x(1.0)).abs() < 1e-6);
        assert!(baseline.as_slice()[ITEMS..].iter().all(|x| *x == 0.0));
        assert!(with_items.as_slice()[ITEMS + 10..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn payload_missing_collections_encodes_without_error() {
        let (raw, state) = StateEncoder::default()
            .encode_value(&json!({"playerX": 448, "playerY": 520, "playerHp": 3, "score": 0}));
        assert!(raw.is_some());
        assert_eq!(&state.as_slice()[..4], &[1.0, 1.0, 1.0, 0.0]);
        assert!(state.as_slice()[4..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn malformed_payload_encodes_to_zeros() {
        let encoder = StateEncoder::default();
        for payload in [
            json!({"playerX": 10, "enemies": [[1, 2]]}),
            json!("not a state"),
            json!(null),
        ] {
            let (raw, state) = encoder.encode_value(&payload);
            assert!(raw.is_none(), "{payload} should not parse");
            assert!(state.is_zero());
        }
    }

    #[test]
    fn non_finite_values_encode_to_zeros() {
        let raw = RawState {
            player_x: f64::NAN,
            player_hp: 3.0,
            ..RawState::default()
        };
        assert!(StateEncoder::default().encode(&raw).is_zero());
    }
}
