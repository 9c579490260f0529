#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::entities::Checkpoint;
    use crate::geometry::{
        approach_at_range, mirror, retreat_at_range, runaway_point, step_toward, Point,
    };

    fn small_cfg() -> GameConfig {
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

    #[test]
    fn test_approach_at_range() {
        assert_eq!(
            approach_at_range(Point::new(0, 0), Point::new(0, 0), 5),
            Point::new(0, 0)
        );
        // Already closer than the keep distance: stay put.
        assert_eq!(
            approach_at_range(Point::new(1, 0), Point::new(0, 0), 5),
            Point::new(1, 0)
        );
        assert_eq!(
            approach_at_range(Point::new(10, 0), Point::new(0, 0), 5),
            Point::new(5, 0)
        );
        // Diagonal rounding goes toward the target.
        assert_eq!(
            approach_at_range(Point::new(1, 1), Point::new(2, 2), 1),
            Point::new(2, 2)
        );
    }

    #[test]
    fn test_retreat_rounds_away_from_target() {
        // dist((0,0),(10,0)) = 10, keep 5 -> exactly (5,0) either way.
        assert_eq!(
            retreat_at_range(Point::new(0, 0), Point::new(10, 0), 5),
            Point::new(5, 0)
        );
        // Diagonal: the fractional point rounds away, so the result is
        // never inside the keep radius.
        let p = retreat_at_range(Point::new(0, 0), Point::new(10, 10), 5);
        assert!(p.dist(Point::new(10, 10)) >= 5.0, "retreated to {p:?}");
    }

    #[test]
    fn test_step_toward_reaches_close_target() {
        let cfg = small_cfg();
        assert_eq!(
            step_toward(Point::new(0, 0), Point::new(1, 1), 2, &cfg),
            Point::new(1, 1)
        );
    }

    #[test]
    fn test_step_toward_is_bounded_and_clamped() {
        let cfg = small_cfg();
        let from = Point::new(10, 10);
        let to = Point::new(10, 40);
        let stepped = step_toward(from, to, cfg.move_range, &cfg);
        assert_eq!(stepped, Point::new(10, 12));

        // A step aimed outside the arena lands on the boundary.
        let clamped = step_toward(Point::new(0, 1), Point::new(0, -50), 2, &cfg);
        assert_eq!(clamped, Point::new(0, 0));
    }

    #[test]
    fn test_runaway_point_directly_away() {
        let p = runaway_point(Point::new(0, 0), Point::new(3, 0), 2);
        assert_eq!(p, Point::new(5, 0));
        // No defined direction when threat and subject coincide.
        let p = runaway_point(Point::new(4, 4), Point::new(4, 4), 2);
        assert_eq!(p, Point::new(4, 4));
    }

    #[test]
    fn test_mirror_swaps_base_corners() {
        let cfg = GameConfig::default();
        assert_eq!(
            mirror(cfg.base_for_team(0), &cfg),
            cfg.base_for_team(1)
        );
        assert_eq!(mirror(cfg.center(), &cfg), cfg.center());
    }

    #[test]
    fn test_checkpoint_grid_skips_base_corners() {
        let cfg = GameConfig::default();
        let grid = Checkpoint::grid(&cfg);
        assert_eq!(
            grid.len(),
            cfg.checkpoint_rows * cfg.checkpoint_cols - 2
        );
        assert!(grid.iter().all(|c| c.last_seen.is_none()));
        assert!(!grid.iter().any(|c| c.pos == Point::new(0, 0)));
        assert!(!grid
            .iter()
            .any(|c| c.pos == Point::new(cfg.width - 1, cfg.height - 1)));
        // Every waypoint is inside the arena.
        assert!(grid.iter().all(|c| c.pos == c.pos.clamp_to(&cfg)));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let cfg = GameConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.width, back.width);
        assert_eq!(cfg.stun_cooldown, back.stun_cooldown);
        assert_eq!(cfg.fat_ghost_stamina, back.fat_ghost_stamina);
    }
}
