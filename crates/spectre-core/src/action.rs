//! The per-buster action vocabulary.

use serde::{Deserialize, Serialize};

use crate::entities::{BusterId, GhostId};
use crate::geometry::Point;

/// Exactly one action is emitted per controlled buster per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Advance one bounded step toward a point.
    Move { to: Point },
    /// Work a ghost inside the capture band.
    Bust { ghost: GhostId },
    /// Disable an enemy inside stun range.
    Stun { enemy: BusterId },
    /// Drop the carried ghost (scores inside release range of own base).
    /// Also the forfeit action of a stunned buster.
    Release,
}

impl Action {
    pub fn move_to(to: Point) -> Self {
        Action::Move { to }
    }
}
