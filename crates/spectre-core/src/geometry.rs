//! Arena geometry and bounded-step kinematics.
//!
//! Game rules operate on integer coordinates; float intermediates use
//! `glam::DVec2` and are rounded back to the grid. Rounding direction is
//! part of each contract: plain moves round to nearest, "stop short of"
//! points round toward the reference, "stay outside of" points round away
//! from it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Integer position on the arena. `x` is the column (`0..width`),
/// `y` is the row (`0..height`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.x as f64, self.y as f64)
    }

    /// Round a float position to the nearest grid point.
    pub fn round(v: DVec2) -> Self {
        Self::new(v.x.round() as i32, v.y.round() as i32)
    }

    /// Euclidean distance.
    pub fn dist(self, other: Point) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }

    /// Clamp into the arena.
    pub fn clamp_to(self, cfg: &GameConfig) -> Self {
        Self::new(
            self.x.clamp(0, cfg.width - 1),
            self.y.clamp(0, cfg.height - 1),
        )
    }
}

/// One bounded move step: reach `to` if it is within `range`, otherwise
/// advance `range` along the segment. The result is always clamped into
/// the arena.
pub fn step_toward(from: Point, to: Point, range: i32, cfg: &GameConfig) -> Point {
    let dist = from.dist(to);
    let next = if dist <= range as f64 {
        to
    } else {
        let w = range as f64 / dist;
        Point::round(from.as_dvec2() + (to.as_dvec2() - from.as_dvec2()) * w)
    };
    next.clamp_to(cfg)
}

/// The point on the segment `from -> to` that stops `keep` short of `to`,
/// rounded per axis toward `to`. Returns `from` unchanged when already
/// closer than `keep`.
pub fn approach_at_range(from: Point, to: Point, keep: i32) -> Point {
    let dist = from.dist(to);
    if dist < keep as f64 {
        return from;
    }
    let w = (dist - keep as f64) / dist;
    let dx = (to.x - from.x) as f64 * w;
    let dy = (to.y - from.y) as f64 * w;
    Point::new(
        round_toward(from.x as f64 + dx, to.x),
        round_toward(from.y as f64 + dy, to.y),
    )
}

/// Same point as [`approach_at_range`] but rounded per axis away from
/// `to`, guaranteeing the result stays outside `keep` of it. Returns
/// `from` unchanged when already inside `keep`.
pub fn retreat_at_range(from: Point, to: Point, keep: i32) -> Point {
    let dist = from.dist(to);
    if dist < keep as f64 {
        return from;
    }
    let w = (dist - keep as f64) / dist;
    let dx = (to.x - from.x) as f64 * w;
    let dy = (to.y - from.y) as f64 * w;
    Point::new(
        round_away(from.x as f64 + dx, to.x),
        round_away(from.y as f64 + dy, to.y),
    )
}

/// `from` displaced `range` directly away from `scary`. Unchanged when the
/// two coincide (no defined direction). Not clamped; callers feed the
/// result through [`step_toward`] when a legal position is required.
pub fn runaway_point(scary: Point, from: Point, range: i32) -> Point {
    if from == scary {
        return from;
    }
    let dir = (from.as_dvec2() - scary.as_dvec2()).normalize();
    Point::round(from.as_dvec2() + dir * range as f64)
}

/// Central symmetry of the arena: maps one base corner onto the other and
/// a ghost spawn onto its symmetric twin.
pub fn mirror(p: Point, cfg: &GameConfig) -> Point {
    Point::new(cfg.width - 1 - p.x, cfg.height - 1 - p.y)
}

fn round_toward(v: f64, to: i32) -> i32 {
    if (to as f64) > v {
        v.ceil() as i32
    } else {
        v.floor() as i32
    }
}

fn round_away(v: f64, to: i32) -> i32 {
    if (to as f64) < v {
        v.ceil() as i32
    } else {
        v.floor() as i32
    }
}
