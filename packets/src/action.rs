use serde::{Deserialize, Serialize};

/// Number of distinct actions: 3 horizontal x 3 vertical x 2 fire.
pub const ACTION_COUNT: usize = 18;

const AXIS_VALUES: [i8; 3] = [-1, 0, 1];

/// Structured action sent to the game once per tick.
///
/// Serialized as `{"moveX": -1|0|1, "moveY": -1|0|1, "shoot": bool}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPacket {
    pub move_x: i8,
    pub move_y: i8,
    pub shoot: bool,
}

impl ActionPacket {
    pub const fn new(move_x: i8, move_y: i8, shoot: bool) -> Self {
        Self {
            move_x,
            move_y,
            shoot,
        }
    }

    fn axis_slot(value: i8) -> Option<usize> {
        AXIS_VALUES.iter().position(|v| *v == value)
    }

    /// Index in `[0, ACTION_COUNT)`, movement-x varying slowest and the fire
    /// flag fastest.
    ///
    /// A packet with an axis outside `{-1, 0, 1}` has no index; it is mapped
    /// to 0 and a warning is logged.
    pub fn to_index(&self) -> usize {
        match (Self::axis_slot(self.move_x), Self::axis_slot(self.move_y)) {
            (Some(x), Some(y)) => x * 6 + y * 2 + usize::from(self.shoot),
            _ => {
                tracing::warn!(packet = ?self, "action packet outside the action set, using index 0");
                0
            }
        }
    }

    /// Inverse of [`ActionPacket::to_index`].
    ///
    /// # Panics
    ///
    /// Panics if `index >= ACTION_COUNT`; an out-of-range index means the
    /// network head and the codec disagree.
    pub fn from_index(index: usize) -> Self {
        assert!(
            index < ACTION_COUNT,
            "action index {index} out of range 0..{ACTION_COUNT}"
        );
        Self {
            move_x: AXIS_VALUES[index / 6],
            move_y: AXIS_VALUES[(index / 2) % 3],
            shoot: index % 2 == 1,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..ACTION_COUNT).map(Self::from_index)
    }
}
