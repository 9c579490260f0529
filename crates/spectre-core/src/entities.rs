//! Entity value records.
//!
//! Entities are plain immutable data; each turn produces a fresh
//! generation from observations or belief extrapolation. Game logic lives
//! in the engine crates, not here.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::geometry::Point;

pub type BusterId = u32;
pub type GhostId = u32;

/// A controlled or hostile buster as known this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buster {
    pub id: BusterId,
    pub pos: Point,
    /// Ghost currently carried, if any.
    pub carrying: Option<GhostId>,
    /// Turns left disabled. While nonzero the only legal action is to
    /// forfeit the turn (Release).
    pub stun_duration: u32,
    /// Turns until the stun ability is usable again.
    pub stun_cooldown: u32,
    /// Turn of the last direct observation.
    pub last_seen: u32,
}

impl Buster {
    pub fn is_carrying(&self) -> bool {
        self.carrying.is_some()
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_duration > 0
    }

    pub fn stun_ready(&self) -> bool {
        self.stun_cooldown == 0
    }
}

/// A capturable ghost as known this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ghost {
    pub id: GhostId,
    pub pos: Point,
    /// Remaining capture effort. Frozen once any capture progress on it is
    /// underway within a turn.
    pub stamina: u32,
    /// Busters currently working it; a contested ghost does not flee.
    pub bust_cnt: u32,
}

/// Fixed exploration waypoint. `last_seen` is `None` until some ally first
/// gets sensor coverage over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub pos: Point,
    pub last_seen: Option<u32>,
}

impl Checkpoint {
    /// The waypoint grid: `checkpoint_rows x checkpoint_cols` points spread
    /// across the arena, minus the two base corners.
    pub fn grid(cfg: &GameConfig) -> Vec<Checkpoint> {
        let rows = cfg.checkpoint_rows;
        let cols = cfg.checkpoint_cols;
        let mut r = Vec::with_capacity(rows * cols - 2);
        for i in 0..rows {
            for j in 0..cols {
                if (i == 0 && j == 0) || (i == rows - 1 && j == cols - 1) {
                    continue;
                }
                let y = (i as f64 * (cfg.height - 1) as f64 / (rows - 1) as f64).round() as i32;
                let x = (j as f64 * (cfg.width - 1) as f64 / (cols - 1) as f64).round() as i32;
                r.push(Checkpoint {
                    pos: Point::new(x, y),
                    last_seen: None,
                });
            }
        }
        r
    }
}

/// How an entity entered this turn's working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Directly inside some ally's sensor radius this turn.
    Observed,
    /// Carried forward from an earlier sighting; `age` turns since the
    /// entity was last actually seen.
    Inferred { age: u32 },
}

/// An entity together with how we know about it. Inferred entries are the
/// "phantoms": beliefs advanced by the response simulator, retracted on
/// contradiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracked<T> {
    pub entity: T,
    pub provenance: Provenance,
}

impl<T> Tracked<T> {
    pub fn observed(entity: T) -> Self {
        Self {
            entity,
            provenance: Provenance::Observed,
        }
    }

    pub fn inferred(entity: T, age: u32) -> Self {
        Self {
            entity,
            provenance: Provenance::Inferred { age },
        }
    }

    pub fn is_observed(&self) -> bool {
        matches!(self.provenance, Provenance::Observed)
    }
}

/// Everything directly visible to one side on one turn, as delivered by
/// the I/O layer (or the offline referee).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnObservation {
    pub turn: u32,
    pub allies: Vec<Buster>,
    pub enemies: Vec<Buster>,
    pub ghosts: Vec<Ghost>,
}
