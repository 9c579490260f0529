//! Candidate action generation.
//!
//! Produces the bounded, deduplicated, order-preserving action set one
//! buster chooses from. Order matters twice: it fixes which action wins a
//! full evaluation tie (the earliest generated), and it keeps the safe
//! fallback — holding position — unconditionally present.

use std::collections::HashSet;

use spectre_core::action::Action;
use spectre_core::config::GameConfig;
use spectre_core::entities::{Buster, Checkpoint, Ghost, GhostId};
use spectre_core::geometry::{
    approach_at_range, retreat_at_range, runaway_point, step_toward, Point,
};

/// Everything one buster's candidate generation and evaluation share.
pub struct DecisionContext<'a> {
    pub cfg: &'a GameConfig,
    pub my_base: Point,
    pub enemy_base: Point,
    pub allies: &'a [Buster],
    pub enemies: &'a [Buster],
    /// Working ghost set (already fat-filtered while the near half of the
    /// map is unscouted).
    pub ghosts: &'a [Ghost],
    pub checkpoints: &'a [Checkpoint],
    /// Priority checkpoint for this buster.
    pub checkpoint: Point,
    /// Ghosts no ally should commit to this turn (out-contested).
    pub forbidden: &'a HashSet<GhostId>,
    /// Ghosts already claimed by earlier allied decisions this turn.
    pub locked: &'a HashSet<GhostId>,
    /// Extrapolated homeward path of each hostile carrier.
    pub carrier_paths: &'a [Vec<Point>],
    /// Allied carriers assessed as needing escort.
    pub escortees: &'a [Buster],
    /// Whether any ally could intercept some hostile carrier at all.
    pub anyone_can_intercept: bool,
}

/// Ordered set of unique candidate actions for one buster.
pub fn generate(buster: &Buster, ctx: &DecisionContext) -> Vec<Action> {
    let cfg = ctx.cfg;
    let mut set = CandidateSet::default();

    set.add(Action::move_to(approach_at_range(
        buster.pos,
        ctx.my_base,
        cfg.release_range,
    )));
    set.add(Action::move_to(buster.pos));

    for enemy in ctx.enemies {
        set.add(Action::move_to(runaway_point(
            enemy.pos,
            buster.pos,
            cfg.move_range,
        )));
        set.add(Action::move_to(retreat_at_range(
            buster.pos,
            enemy.pos,
            cfg.stun_range,
        )));
    }

    for ghost in ctx.ghosts {
        let dist = buster.pos.dist(ghost.pos);
        if cfg.in_bust_band(dist) && !ctx.forbidden.contains(&ghost.id) {
            set.add(Action::Bust { ghost: ghost.id });
        }
        set.add(Action::move_to(ghost.pos));
    }

    for checkpoint in ctx.checkpoints {
        set.add(Action::move_to(checkpoint.pos));
    }

    for enemy in ctx.enemies {
        set.add(Action::move_to(enemy.pos));
    }
    for path in ctx.carrier_paths {
        for p in path {
            set.add(Action::move_to(*p));
        }
        if let Some(first) = path.first() {
            set.add(Action::move_to(retreat_at_range(
                buster.pos,
                *first,
                cfg.stun_range,
            )));
        }
    }

    for carrier in ctx.escortees {
        let projected = step_toward(carrier.pos, ctx.my_base, cfg.move_range, cfg);
        set.add(Action::move_to(carrier.pos));
        set.add(Action::move_to(projected));
        set.add(Action::move_to(retreat_at_range(
            buster.pos,
            carrier.pos,
            cfg.stun_range,
        )));
        set.add(Action::move_to(retreat_at_range(
            buster.pos,
            projected,
            cfg.stun_range,
        )));
    }

    set.into_vec()
}

/// Whether every checkpoint on our half of the arena (closer to our base
/// than to the enemy's) has been covered at least once.
pub fn explored_near_half(checkpoints: &[Checkpoint], my_base: Point, enemy_base: Point) -> bool {
    checkpoints
        .iter()
        .filter(|c| c.pos.dist(my_base) <= c.pos.dist(enemy_base))
        .all(|c| c.last_seen.is_some())
}

/// The exploration waypoint this buster should bias toward: least
/// recently covered, never-covered first, nearest among equals. First
/// strict improvement wins so scan order breaks exact ties.
pub fn priority_checkpoint(buster: &Buster, checkpoints: &[Checkpoint]) -> Option<Point> {
    let mut best: Option<(&Checkpoint, f64)> = None;
    for checkpoint in checkpoints {
        let dist = buster.pos.dist(checkpoint.pos);
        let better = match best {
            None => true,
            Some((b, bd)) => {
                checkpoint.last_seen < b.last_seen
                    || (checkpoint.last_seen == b.last_seen && dist < bd)
            }
        };
        if better {
            best = Some((checkpoint, dist));
        }
    }
    best.map(|(c, _)| c.pos)
}

/// Whether an allied carrier is unsafe enough that `decider` should weigh
/// escorting it. Threatening enemies are counted against the allies
/// already positioned at least as close to the carrier as the decider.
pub fn needs_escort(
    carrier: &Buster,
    decider: &Buster,
    allies: &[Buster],
    enemies: &[Buster],
    my_base: Point,
    cfg: &GameConfig,
) -> bool {
    let projected = step_toward(carrier.pos, my_base, cfg.move_range, cfg);
    let reach = (cfg.move_range + cfg.stun_range) as f64;
    let threats = enemies
        .iter()
        .filter(|e| !e.is_stunned())
        .filter(|e| {
            e.pos.dist(carrier.pos) <= cfg.stun_range as f64
                || e.pos.dist(my_base) < carrier.pos.dist(my_base)
                || e.pos.dist(projected) <= reach
        })
        .count();
    if threats == 0 {
        return false;
    }
    let guards = allies
        .iter()
        .filter(|a| a.id != carrier.id && a.id != decider.id && !a.is_stunned())
        .filter(|a| a.pos.dist(carrier.pos) <= decider.pos.dist(carrier.pos))
        .count();
    threats > guards
}

/// Ghosts the team should not commit a capture to this turn: the hostiles
/// able to reach and out-contest one outnumber the allies already working
/// it. Turns-to-capture is `ceil(stamina / workers)`; a stunned hostile
/// still counts when it recovers in time to contest.
pub fn forbidden_ghosts(
    ghosts: &[Ghost],
    allies: &[Buster],
    enemies: &[Buster],
    cfg: &GameConfig,
) -> HashSet<GhostId> {
    let mut r = HashSet::new();
    for ghost in ghosts {
        let workers = allies
            .iter()
            .filter(|a| !a.is_stunned() && cfg.in_bust_band(a.pos.dist(ghost.pos)))
            .count() as u32;
        let turns = div_ceil(ghost.stamina, workers.max(1));
        let contesters = enemies
            .iter()
            .filter(|e| {
                let gap = (e.pos.dist(ghost.pos) - cfg.max_bust_range as f64).max(0.0);
                let arrival = (gap / cfg.move_range as f64).ceil() as u32 + e.stun_duration;
                arrival <= turns
            })
            .count() as u32;
        if contesters > workers {
            r.insert(ghost.id);
        }
    }
    r
}

fn div_ceil(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

#[derive(Default)]
struct CandidateSet(Vec<Action>);

impl CandidateSet {
    fn add(&mut self, action: Action) {
        if !self.0.contains(&action) {
            self.0.push(action);
        }
    }

    fn into_vec(self) -> Vec<Action> {
        self.0
    }
}
