mod action;
mod error;
mod state;

pub use action::{ActionPacket, ACTION_COUNT};
pub use error::PacketError;
pub use state::{Boss, Bullet, BulletOwner, DamageEvent, Enemy, Item, ItemKey, RawState};
