//! One-step consequence evaluation.
//!
//! Advances the simulated world by one step under a candidate action and
//! derives the fixed-shape feature vector the comparator ranks. Feature
//! vectors are recomputed per comparison and never persisted.

use std::cmp::Ordering;

use spectre_core::action::Action;
use spectre_core::config::GameConfig;
use spectre_core::entities::{Buster, Ghost};
use spectre_core::geometry::{step_toward, Point};

use crate::candidates::DecisionContext;
use crate::simulator;

/// Cost of closing out a capture: full turns of work plus approach,
/// tie-broken by raw distance. Ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureCost {
    pub turns: u32,
    pub dist: f64,
}

impl CaptureCost {
    pub fn cmp(&self, other: &CaptureCost) -> Ordering {
        self.turns
            .cmp(&other.turns)
            .then_with(|| self.dist.total_cmp(&other.dist))
    }
}

/// The feature vector for one hypothetical post-action state.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalState {
    /// Own stun ready. Identical across one decision's candidates.
    pub have_stun: bool,
    /// Some ally could intercept a hostile carrier at all. Identical
    /// across one decision's candidates.
    pub anyone_can_intercept: bool,
    /// An un-stunned enemy could reach and stun us next turn.
    pub can_be_stunned: bool,
    /// We end the turn holding a ghost.
    pub carrying_after: bool,
    pub in_release_range: bool,
    pub dist_to_base: f64,
    pub dist_to_checkpoint: f64,
    /// Cheapest capture among working ghosts; `None` when none visible.
    pub capture_cost: Option<CaptureCost>,
    /// Earliest carrier-path index we could stun at; `None` if unreachable.
    pub turns_to_intercept: Option<u32>,
    /// Distance to the nearest ally needing escort; zero when we are the
    /// one needing it.
    pub dist_to_escortee: Option<f64>,
    /// Whether the working ghost set is nonempty.
    pub ghosts_visible: bool,
}

/// Where the buster ends up after the action: a bounded step for a move,
/// in place for everything else.
pub fn position_after(buster: &Buster, action: &Action, cfg: &GameConfig) -> Point {
    match action {
        Action::Move { to } => step_toward(buster.pos, *to, cfg.move_range, cfg),
        _ => buster.pos,
    }
}

/// Evaluate one candidate action for one buster.
pub fn evaluate(buster: &Buster, new_pos: Point, action: &Action, ctx: &DecisionContext) -> EvalState {
    let cfg = ctx.cfg;

    let all_busters: Vec<Buster> = ctx.allies.iter().chain(ctx.enemies).copied().collect();
    let ghosts: Vec<Ghost> = ctx
        .ghosts
        .iter()
        .map(|g| simulator::step_ghost(g, Some(action), &all_busters, ctx.locked, cfg))
        .collect();
    let enemies: Vec<Buster> = ctx
        .enemies
        .iter()
        .map(|e| {
            if e.is_carrying() {
                simulator::step_carrier(e, ctx.enemy_base, cfg)
            } else {
                *e
            }
        })
        .collect();

    let can_be_stunned = enemies.iter().any(|e| {
        !e.is_stunned() && e.pos.dist(new_pos) <= (cfg.stun_range + cfg.move_range) as f64
    });

    let carrying_after = buster.is_carrying()
        || match action {
            Action::Bust { ghost } => {
                let target = ghosts.iter().find(|g| g.id == *ghost).unwrap_or_else(|| {
                    panic!("bust candidate references ghost {ghost} missing from the working set")
                });
                target.stamina == 0
            }
            _ => false,
        };

    let dist_to_base = new_pos.dist(ctx.my_base);
    let capture_cost = ghosts
        .iter()
        .map(|g| capture_cost_for(new_pos, action, g, cfg))
        .min_by(CaptureCost::cmp);

    let dist_to_escortee = if ctx.escortees.iter().any(|a| a.id == buster.id) {
        Some(0.0)
    } else {
        ctx.escortees
            .iter()
            .map(|a| new_pos.dist(a.pos))
            .min_by(f64::total_cmp)
    };

    EvalState {
        have_stun: buster.stun_ready(),
        anyone_can_intercept: ctx.anyone_can_intercept,
        can_be_stunned,
        carrying_after,
        in_release_range: dist_to_base <= cfg.release_range as f64,
        dist_to_base,
        dist_to_checkpoint: new_pos.dist(ctx.checkpoint),
        capture_cost,
        turns_to_intercept: intercept_turns(new_pos, buster.stun_cooldown, ctx.carrier_paths, cfg),
        dist_to_escortee,
        ghosts_visible: !ghosts.is_empty(),
    }
}

/// Earliest index along any hostile-carrier path at which a buster
/// standing at `pos` could have it in stun range, given `i` further moves
/// and the ability recharged by then. Monotonic: only compared.
pub fn intercept_turns(
    pos: Point,
    stun_cooldown: u32,
    carrier_paths: &[Vec<Point>],
    cfg: &GameConfig,
) -> Option<u32> {
    let ready_in = stun_cooldown.saturating_sub(1);
    let mut best: Option<u32> = None;
    for path in carrier_paths {
        for (i, p) in path.iter().enumerate() {
            let i = i as u32;
            if i < ready_in {
                continue;
            }
            let reach = cfg.stun_range as f64 + i as f64 * cfg.move_range as f64;
            if pos.dist(*p) <= reach {
                best = Some(best.map_or(i, |b| b.min(i)));
                break;
            }
        }
    }
    best
}

fn capture_cost_for(new_pos: Point, action: &Action, ghost: &Ghost, cfg: &GameConfig) -> CaptureCost {
    let mut turns = ghost.stamina;
    if matches!(action, Action::Bust { ghost: id } if *id == ghost.id) && ghost.stamina > 0 {
        turns -= 1;
    }
    let dist = new_pos.dist(ghost.pos);
    let band_gap = if dist >= cfg.max_bust_range as f64 {
        dist - cfg.max_bust_range as f64
    } else if dist >= cfg.min_bust_range as f64 {
        0.0
    } else {
        cfg.min_bust_range as f64 - dist
    };
    turns += (band_gap / cfg.move_range as f64).ceil() as u32;
    CaptureCost { turns, dist }
}
