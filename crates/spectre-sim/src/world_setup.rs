//! Seeded world generation for offline matches.
//!
//! Ghost spawns are centrally symmetric (each ghost's twin is mirrored
//! through the arena center, matching the pairing the belief tracker
//! assumes); buster spawns sit in a diagonal row off each base corner.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use spectre_core::config::GameConfig;
use spectre_core::entities::{BusterId, GhostId};
use spectre_core::geometry::{mirror, Point};

/// Configuration for one offline match. Same seed, same match.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u64,
    pub busters_per_player: u32,
    pub ghost_count: u32,
    pub rules: GameConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            busters_per_player: 3,
            ghost_count: 9,
            rules: GameConfig::default(),
        }
    }
}

/// A buster as the referee knows it (full information).
#[derive(Debug, Clone, Copy)]
pub struct RefBuster {
    pub id: BusterId,
    pub team: u32,
    pub pos: Point,
    pub carrying: Option<GhostId>,
    pub stun_duration: u32,
    pub stun_cooldown: u32,
}

/// A ghost as the referee knows it.
#[derive(Debug, Clone, Copy)]
pub struct RefGhost {
    pub id: GhostId,
    pub pos: Point,
    pub stamina: u32,
    pub bust_cnt: u32,
    pub carried_by: Option<BusterId>,
    /// Scored and off the board.
    pub captured: bool,
}

const STAMINA_TIERS: [u32; 3] = [3, 15, 40];

/// Busters for both teams: ids `0..n` are team 0, `n..2n` team 1, each
/// row mirrored through the center.
pub fn spawn_busters(config: &SimConfig) -> Vec<RefBuster> {
    let rules = &config.rules;
    let n = config.busters_per_player;
    let step = rules.fog_range / 2;
    let mut busters = Vec::with_capacity(2 * n as usize);
    for i in 0..n {
        let offset = step * (i as i32 + 1);
        let pos = Point::new(offset, offset).clamp_to(rules);
        busters.push(RefBuster {
            id: i,
            team: 0,
            pos,
            carrying: None,
            stun_duration: 0,
            stun_cooldown: 0,
        });
    }
    for i in 0..n {
        let twin = busters[i as usize].pos;
        busters.push(RefBuster {
            id: n + i,
            team: 1,
            pos: mirror(twin, rules),
            carrying: None,
            stun_duration: 0,
            stun_cooldown: 0,
        });
    }
    busters
}

/// Symmetric ghost spawns. Odd counts put ghost 0 alone at the center and
/// pair (1,2), (3,4), ...; even counts pair (0,1), (2,3), ...
pub fn spawn_ghosts(config: &SimConfig, rng: &mut ChaCha8Rng) -> Vec<RefGhost> {
    let rules = &config.rules;
    let mut ghosts = Vec::with_capacity(config.ghost_count as usize);
    let mut next_id = 0;

    if config.ghost_count % 2 == 1 {
        ghosts.push(make_ghost(next_id, rules.center(), pick_stamina(rng)));
        next_id += 1;
    }
    while next_id < config.ghost_count {
        let pos = random_spawn(rules, rng);
        let stamina = pick_stamina(rng);
        ghosts.push(make_ghost(next_id, pos, stamina));
        ghosts.push(make_ghost(next_id + 1, mirror(pos, rules), stamina));
        next_id += 2;
    }
    ghosts
}

fn make_ghost(id: GhostId, pos: Point, stamina: u32) -> RefGhost {
    RefGhost {
        id,
        pos,
        stamina,
        bust_cnt: 0,
        carried_by: None,
        captured: false,
    }
}

fn pick_stamina(rng: &mut ChaCha8Rng) -> u32 {
    STAMINA_TIERS[rng.gen_range(0..STAMINA_TIERS.len())]
}

/// A spawn point clear of both base corners by at least the fog range.
fn random_spawn(rules: &GameConfig, rng: &mut ChaCha8Rng) -> Point {
    let margin = rules.fog_range;
    loop {
        let p = Point::new(
            rng.gen_range(0..rules.width),
            rng.gen_range(0..rules.height),
        );
        let clear = p.dist(Point::new(0, 0)) > margin as f64
            && p.dist(Point::new(rules.width - 1, rules.height - 1)) > margin as f64;
        if clear {
            return p;
        }
    }
}
