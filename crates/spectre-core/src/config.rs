//! Game rule parameters and tuning constants.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Rule parameters for one game.
///
/// `Default` is the official arena. Tests build shrunken arenas with the
/// same field names so range relationships stay recognizable.
///
/// The last four fields are empirically tuned constants; they are carried
/// as named configuration rather than re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Arena width (columns); valid x is `0..width`.
    pub width: i32,
    /// Arena height (rows); valid y is `0..height`.
    pub height: i32,
    /// Max buster displacement per turn.
    pub move_range: i32,
    /// Max ghost displacement per turn.
    pub ghost_move_range: i32,
    /// Sensor radius; entities beyond it are invisible.
    pub fog_range: i32,
    /// Inner edge of the capture band; busting closer than this is illegal.
    pub min_bust_range: i32,
    /// Outer edge of the capture band.
    pub max_bust_range: i32,
    /// Max distance from own base at which a carried ghost scores.
    pub release_range: i32,
    /// Stun ability reach.
    pub stun_range: i32,
    /// Turns a stunned buster stays disabled.
    pub stun_duration: u32,
    /// Turns until the stun ability recharges.
    pub stun_cooldown: u32,
    /// Ghosts at or above this stamina are ignored until the near half of
    /// the map has been scouted.
    pub fat_ghost_stamina: u32,
    /// Turns an unseen non-carrier enemy is tracked before the belief is
    /// dropped as stale.
    pub phantom_enemy_ttl: u32,
    /// Exploration waypoint grid rows.
    pub checkpoint_rows: usize,
    /// Exploration waypoint grid columns.
    pub checkpoint_cols: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 16001,
            height: 9001,
            move_range: 800,
            ghost_move_range: 400,
            fog_range: 2200,
            min_bust_range: 900,
            max_bust_range: 1760,
            release_range: 1600,
            stun_range: 1760,
            stun_duration: 10,
            stun_cooldown: 20,
            fat_ghost_stamina: 30,
            phantom_enemy_ttl: 20,
            checkpoint_rows: 4,
            checkpoint_cols: 6,
        }
    }
}

impl GameConfig {
    /// Base corner for a team: team 0 owns the top-left corner, team 1 the
    /// bottom-right one.
    pub fn base_for_team(&self, team_id: u32) -> Point {
        if team_id == 0 {
            Point::new(0, 0)
        } else {
            Point::new(self.width - 1, self.height - 1)
        }
    }

    /// Arena center (ghost spawns are centrally symmetric around it).
    pub fn center(&self) -> Point {
        Point::new((self.width - 1) / 2, (self.height - 1) / 2)
    }

    /// Whether `dist` lies inside the legal capture band.
    pub fn in_bust_band(&self, dist: f64) -> bool {
        dist >= self.min_bust_range as f64 && dist <= self.max_bust_range as f64
    }
}
