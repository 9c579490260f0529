//! One-step response simulation.
//!
//! Predicts how ghosts flee and how ghost-carrying busters advance toward
//! their base. Invoked authoritatively by the belief tracker (advancing
//! real uncertainty one turn) and hypothetically by the evaluator (scoring
//! a candidate action against the predicted next state).

use std::collections::HashSet;

use spectre_core::action::Action;
use spectre_core::config::GameConfig;
use spectre_core::entities::{Buster, Ghost, GhostId};
use spectre_core::geometry::{runaway_point, step_toward, Point};

/// Hard cap on carrier path extrapolation. The arena diagonal divided by
/// the move range is ~23 steps; the cap only guards a non-advancing step.
const MAX_CARRIER_PATH: usize = 64;

/// Busters within sensor range of the ghost at strictly minimum distance
/// (ties included); the ghost flees from their centroid.
pub fn nearest_threat_centroid(ghost: &Ghost, busters: &[Buster], cfg: &GameConfig) -> Option<Point> {
    let mut min_dist = f64::INFINITY;
    let mut nearest: Vec<Point> = Vec::new();
    for buster in busters {
        let dist = buster.pos.dist(ghost.pos);
        if dist > cfg.fog_range as f64 {
            continue;
        }
        if dist < min_dist {
            min_dist = dist;
            nearest.clear();
            nearest.push(buster.pos);
        } else if dist == min_dist {
            nearest.push(buster.pos);
        }
    }
    if nearest.is_empty() {
        return None;
    }
    let sum = nearest
        .iter()
        .fold(glam::DVec2::ZERO, |acc, p| acc + p.as_dvec2());
    Some(Point::round(sum / nearest.len() as f64))
}

/// Advance one ghost by one turn, given the action hypothetically taken by
/// the deciding buster. A locked ghost (already contested, claimed by an
/// earlier allied decision this turn, or the subject of the hypothetical
/// bust) does not move.
pub fn step_ghost(
    ghost: &Ghost,
    action: Option<&Action>,
    busters: &[Buster],
    locked: &HashSet<GhostId>,
    cfg: &GameConfig,
) -> Ghost {
    if ghost.bust_cnt > 0 || locked.contains(&ghost.id) {
        return *ghost;
    }
    if let Some(Action::Bust { ghost: target }) = action {
        if *target == ghost.id {
            return *ghost;
        }
    }
    let Some(centroid) = nearest_threat_centroid(ghost, busters, cfg) else {
        return *ghost;
    };
    let flee = runaway_point(centroid, ghost.pos, cfg.ghost_move_range);
    let pos = step_toward(ghost.pos, flee, cfg.ghost_move_range, cfg);
    Ghost { pos, ..*ghost }
}

/// One bounded step of a ghost-carrying buster toward its home base.
pub fn step_carrier(buster: &Buster, base: Point, cfg: &GameConfig) -> Buster {
    Buster {
        pos: step_toward(buster.pos, base, cfg.move_range, cfg),
        ..*buster
    }
}

/// Future positions of a hostile carrier walking home, one entry per turn.
/// The step that lands inside release range is the delivery and is not
/// part of the path; a carrier already inside it yields an empty path.
pub fn carrier_path(enemy: &Buster, enemy_base: Point, cfg: &GameConfig) -> Vec<Point> {
    let mut path = Vec::new();
    let mut pos = enemy.pos;
    while path.len() < MAX_CARRIER_PATH {
        if pos.dist(enemy_base) <= cfg.release_range as f64 {
            break;
        }
        let next = step_toward(pos, enemy_base, cfg.move_range, cfg);
        if next == pos || next.dist(enemy_base) <= cfg.release_range as f64 {
            break;
        }
        path.push(next);
        pos = next;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GameConfig {
        GameConfig {
            width: 51,
            height: 51,
            move_range: 2,
            ghost_move_range: 1,
            fog_range: 7,
            min_bust_range: 3,
            max_bust_range: 6,
            release_range: 4,
            stun_range: 5,
            ..GameConfig::default()
        }
    }

    fn buster(id: u32, x: i32, y: i32) -> Buster {
        Buster {
            id,
            pos: Point::new(x, y),
            carrying: None,
            stun_duration: 0,
            stun_cooldown: 0,
            last_seen: 0,
        }
    }

    fn ghost(id: u32, x: i32, y: i32) -> Ghost {
        Ghost {
            id,
            pos: Point::new(x, y),
            stamina: 3,
            bust_cnt: 0,
        }
    }

    #[test]
    fn test_ghost_flees_nearest_buster() {
        let cfg = cfg();
        let g = ghost(0, 10, 10);
        let stepped = step_ghost(&g, None, &[buster(0, 10, 6)], &HashSet::new(), &cfg);
        assert_eq!(stepped.pos, Point::new(10, 11));
    }

    #[test]
    fn test_ghost_ignores_busters_beyond_fog() {
        let cfg = cfg();
        let g = ghost(0, 10, 10);
        let stepped = step_ghost(&g, None, &[buster(0, 10, 30)], &HashSet::new(), &cfg);
        assert_eq!(stepped.pos, g.pos);
    }

    #[test]
    fn test_ghost_flees_tie_centroid() {
        let cfg = cfg();
        let g = ghost(0, 10, 10);
        // Two equidistant busters straddling the ghost on x; the centroid
        // sits straight below, so the ghost flees straight up.
        let threats = [buster(0, 8, 8), buster(1, 12, 8)];
        let stepped = step_ghost(&g, None, &threats, &HashSet::new(), &cfg);
        assert_eq!(stepped.pos, Point::new(10, 11));
    }

    #[test]
    fn test_contested_ghost_holds() {
        let cfg = cfg();
        let g = Ghost { bust_cnt: 1, ..ghost(0, 10, 10) };
        let stepped = step_ghost(&g, None, &[buster(0, 10, 6)], &HashSet::new(), &cfg);
        assert_eq!(stepped.pos, g.pos);
    }

    #[test]
    fn test_bust_target_holds() {
        let cfg = cfg();
        let g = ghost(7, 10, 10);
        let action = Action::Bust { ghost: 7 };
        let stepped = step_ghost(&g, Some(&action), &[buster(0, 10, 6)], &HashSet::new(), &cfg);
        assert_eq!(stepped.pos, g.pos);

        // Busting a different ghost does not pin this one.
        let other = Action::Bust { ghost: 3 };
        let stepped = step_ghost(&g, Some(&other), &[buster(0, 10, 6)], &HashSet::new(), &cfg);
        assert_ne!(stepped.pos, g.pos);
    }

    #[test]
    fn test_locked_ghost_holds() {
        let cfg = cfg();
        let g = ghost(4, 10, 10);
        let locked: HashSet<_> = [4].into_iter().collect();
        let stepped = step_ghost(&g, None, &[buster(0, 10, 6)], &locked, &cfg);
        assert_eq!(stepped.pos, g.pos);
    }

    #[test]
    fn test_ghost_step_clamped_at_wall() {
        let cfg = cfg();
        let g = ghost(0, 10, 0);
        let stepped = step_ghost(&g, None, &[buster(0, 10, 4)], &HashSet::new(), &cfg);
        // Fleeing downward off the arena pins it against the wall.
        assert_eq!(stepped.pos, Point::new(10, 0));
    }

    #[test]
    fn test_carrier_steps_toward_base() {
        let cfg = cfg();
        let carrier = Buster {
            carrying: Some(0),
            ..buster(1, 50, 25)
        };
        let stepped = step_carrier(&carrier, Point::new(50, 50), &cfg);
        assert_eq!(stepped.pos, Point::new(50, 27));
    }

    #[test]
    fn test_carrier_path_drops_delivery_step() {
        let cfg = cfg();
        let carrier = Buster {
            carrying: Some(0),
            ..buster(1, 50, 43)
        };
        let path = carrier_path(&carrier, Point::new(50, 50), &cfg);
        // 43 -> 45 is the only pre-delivery step; 45 -> 47 lands within
        // release range (4) of y=50 and is dropped.
        assert_eq!(path, vec![Point::new(50, 45)]);
    }

    #[test]
    fn test_carrier_path_empty_when_home() {
        let cfg = cfg();
        let carrier = Buster {
            carrying: Some(0),
            ..buster(1, 50, 48)
        };
        assert!(carrier_path(&carrier, Point::new(50, 50), &cfg).is_empty());
    }
}
