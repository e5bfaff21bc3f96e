use crate::PacketError;
use serde::Deserialize;
use serde_json::Value;

/// Side that fired a bullet, decoded from the game's owner tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulletOwner {
    Player,
    Enemy,
    Boss,
}

impl BulletOwner {
    /// Player ships carry positive tags, boss bullets carry negative tags and
    /// everything else is an ordinary enemy bullet.
    pub fn from_tag(tag: f64) -> Self {
        if tag > 0.0 {
            Self::Player
        } else if tag < 0.0 {
            Self::Boss
        } else {
            Self::Enemy
        }
    }

    pub fn is_dangerous(self) -> bool {
        !matches!(self, Self::Player)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    pub x: f64,
    pub y: f64,
    pub hp: f64,
    pub kind: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
    pub owner: BulletOwner,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// Identity of an item between two polls: rounded position plus label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub x: i64,
    pub y: i64,
    pub label: String,
}

impl Item {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
            label: self.label.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boss {
    pub x: f64,
    pub y: f64,
    pub hp: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageEvent {
    pub attacker_id: i64,
    pub amount: f64,
}

/// One snapshot of the game as reported by `GET /state`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawState {
    pub frame: i64,
    pub player_x: f64,
    pub player_y: f64,
    pub player_hp: f64,
    pub score: f64,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub items: Vec<Item>,
    pub boss: Option<Boss>,
    pub damage_events: Vec<DamageEvent>,
}

impl RawState {
    pub fn from_value(value: &Value) -> Result<Self, PacketError> {
        let wire = RawStateWire::deserialize(value)?;
        wire.try_into()
    }

    pub fn bullets_of(&self, owner: BulletOwner) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter().filter(move |b| b.owner == owner)
    }

    pub fn dangerous_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter().filter(|b| b.owner.is_dangerous())
    }

    /// No enemies and no boss on screen.
    pub fn is_field_clear(&self) -> bool {
        self.enemies.is_empty() && self.boss.is_none()
    }

    pub fn is_dead(&self) -> bool {
        self.player_hp <= 0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStateWire {
    #[serde(default)]
    frame: Option<f64>,
    #[serde(default)]
    player_x: Option<f64>,
    #[serde(default)]
    player_y: Option<f64>,
    #[serde(default)]
    player_hp: Option<f64>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    enemies: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    bullets: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    items: Option<Vec<Vec<Scalar>>>,
    #[serde(default)]
    boss: Option<Vec<f64>>,
    #[serde(default)]
    enemy_damage_events: Option<Vec<Vec<f64>>>,
}

fn check_len(
    entity: &'static str,
    index: usize,
    row_len: usize,
    expected: usize,
) -> Result<(), PacketError> {
    if row_len < expected {
        Err(PacketError::ShortEntity {
            entity,
            index,
            found: row_len,
            expected,
        })
    } else {
        Ok(())
    }
}

fn finite(entity: &'static str, value: f64) -> Result<f64, PacketError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PacketError::NonFinite(entity))
    }
}

fn scalar_to_f64(entity: &'static str, index: usize, scalar: &Scalar) -> Result<f64, PacketError> {
    let value = match scalar {
        Scalar::Number(n) => *n,
        Scalar::Text(s) => s.trim().parse().map_err(|_| PacketError::NotANumber {
            entity,
            index,
            value: s.clone(),
        })?,
    };
    finite(entity, value)
}

fn scalar_to_label(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Number(n) => n.to_string(),
        Scalar::Text(s) => s.clone(),
    }
}

impl TryFrom<RawStateWire> for RawState {
    type Error = PacketError;

    fn try_from(wire: RawStateWire) -> Result<Self, Self::Error> {
        let enemies = wire
            .enemies
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                check_len("enemy", index, row.len(), 4)?;
                Ok(Enemy {
                    x: row[0],
                    y: row[1],
                    hp: row[2],
                    kind: row[3],
                })
            })
            .collect::<Result<Vec<_>, PacketError>>()?;

        let bullets = wire
            .bullets
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                check_len("bullet", index, row.len(), 2)?;
                let tag = row.get(2).copied().unwrap_or(0.0);
                Ok(Bullet {
                    x: row[0],
                    y: row[1],
                    owner: BulletOwner::from_tag(tag),
                })
            })
            .collect::<Result<Vec<_>, PacketError>>()?;

        let items = wire
            .items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                check_len("item", index, row.len(), 2)?;
                Ok(Item {
                    x: scalar_to_f64("item", index, &row[0])?,
                    y: scalar_to_f64("item", index, &row[1])?,
                    label: row.get(2).map(scalar_to_label).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, PacketError>>()?;

        let boss = match wire.boss {
            None => None,
            Some(row) if row.is_empty() => None,
            Some(row) => {
                check_len("boss", 0, row.len(), 3)?;
                Some(Boss {
                    x: row[0],
                    y: row[1],
                    hp: row[2],
                })
            }
        };

        let damage_events = wire
            .enemy_damage_events
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                check_len("damage event", index, row.len(), 2)?;
                Ok(DamageEvent {
                    attacker_id: row[0] as i64,
                    amount: row[1],
                })
            })
            .collect::<Result<Vec<_>, PacketError>>()?;

        Ok(Self {
            frame: wire.frame.unwrap_or_default() as i64,
            player_x: wire.player_x.unwrap_or_default(),
            player_y: wire.player_y.unwrap_or_default(),
            player_hp: wire.player_hp.unwrap_or_default(),
            score: wire.score.unwrap_or_default(),
            enemies,
            bullets,
            items,
            boss,
            damage_events,
        })
    }
}
