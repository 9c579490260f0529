//! Cross-turn belief state.
//!
//! The tracker owns everything that survives between turns: tracked
//! enemies and ghosts (observed or inferred "phantoms"), checkpoint
//! coverage timestamps, the set of ghost ids ever sighted, and the stun
//! bookkeeping fed by the investigator. Phantoms are advanced one
//! simulated step per unobserved turn and retracted the moment they
//! contradict an observation.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use spectre_core::action::Action;
use spectre_core::config::GameConfig;
use spectre_core::entities::{
    Buster, BusterId, Checkpoint, Ghost, GhostId, Provenance, Tracked, TurnObservation,
};
use spectre_core::geometry::{mirror, runaway_point, step_toward, Point};

use crate::investigator;
use crate::simulator;

pub struct BeliefTracker {
    cfg: GameConfig,
    enemy_base: Point,
    ghost_count: u32,

    /// Working enemy set: observed this turn plus surviving phantoms,
    /// sorted by id.
    pub enemies: Vec<Tracked<Buster>>,
    /// Working ghost set: observed this turn plus surviving phantoms.
    pub ghosts: Vec<Tracked<Ghost>>,
    /// Exploration waypoints with coverage timestamps.
    pub checkpoints: Vec<Checkpoint>,

    seen_ghost_ids: HashSet<GhostId>,
    past_ally_positions: Vec<Point>,
    prev_allies: Vec<Buster>,
    prev_enemies: Vec<Buster>,
    /// Turn on which each enemy last burned its stun (from attribution).
    enemy_stun_turn: HashMap<BusterId, u32>,
}

impl BeliefTracker {
    pub fn new(cfg: GameConfig, enemy_base: Point, ghost_count: u32) -> Self {
        let checkpoints = Checkpoint::grid(&cfg);
        Self {
            cfg,
            enemy_base,
            ghost_count,
            enemies: Vec::new(),
            ghosts: Vec::new(),
            checkpoints,
            seen_ghost_ids: HashSet::new(),
            past_ally_positions: Vec::new(),
            prev_allies: Vec::new(),
            prev_enemies: Vec::new(),
            enemy_stun_turn: HashMap::new(),
        }
    }

    /// Fold one turn of observations into the belief state. Must run once
    /// per turn, before any buster decides.
    pub fn refresh(&mut self, obs: &TurnObservation) {
        let stunners = investigator::who_stunned_last_turn(
            &obs.allies,
            &self.prev_allies,
            &obs.enemies,
            &self.prev_enemies,
            &self.cfg,
        );
        for id in &stunners {
            self.enemy_stun_turn.insert(*id, obs.turn.saturating_sub(1));
        }

        // Observed enemies with reconstructed cooldowns: the protocol does
        // not transmit enemy cooldowns, attribution does.
        let enemies_now: Vec<Buster> = obs
            .enemies
            .iter()
            .map(|e| Buster {
                stun_cooldown: e.stun_cooldown.max(self.remaining_cooldown(e.id, obs.turn)),
                last_seen: obs.turn,
                ..*e
            })
            .collect();

        self.update_enemies(&obs.allies, &enemies_now, obs.turn);
        self.update_ghosts(&obs.ghosts, &obs.allies, &enemies_now);
        self.update_checkpoints(&obs.allies, obs.turn);

        self.past_ally_positions
            .extend(obs.allies.iter().map(|a| a.pos));
        self.prev_allies = obs.allies.clone();
        self.prev_enemies = self.enemy_units();

        debug!(
            turn = obs.turn,
            enemies = self.enemies.len(),
            phantom_enemies = self.enemies.iter().filter(|t| !t.is_observed()).count(),
            ghosts = self.ghosts.len(),
            phantom_ghosts = self.ghosts.iter().filter(|t| !t.is_observed()).count(),
            "belief refreshed"
        );
    }

    /// Working enemy entities, observed and inferred alike.
    pub fn enemy_units(&self) -> Vec<Buster> {
        self.enemies.iter().map(|t| t.entity).collect()
    }

    /// Working ghost entities, observed and inferred alike.
    pub fn ghost_units(&self) -> Vec<Ghost> {
        self.ghosts.iter().map(|t| t.entity).collect()
    }

    fn remaining_cooldown(&self, id: BusterId, turn: u32) -> u32 {
        match self.enemy_stun_turn.get(&id) {
            Some(used) => (used + self.cfg.stun_cooldown).saturating_sub(turn),
            None => 0,
        }
    }

    /// Carry unseen enemies forward: keep observed ones, advance carrier
    /// phantoms toward the enemy base, retract on staleness, delivery, or
    /// sensor contradiction.
    fn update_enemies(&mut self, allies: &[Buster], enemies_now: &[Buster], turn: u32) {
        let mut r: Vec<Tracked<Buster>> =
            enemies_now.iter().copied().map(Tracked::observed).collect();

        for tracked in &self.enemies {
            let phantom = tracked.entity;
            if enemies_now.iter().any(|e| e.id == phantom.id) {
                continue;
            }
            let age = turn.saturating_sub(phantom.last_seen);
            if !phantom.is_carrying() && age >= self.cfg.phantom_enemy_ttl {
                continue;
            }
            let advanced = if phantom.is_carrying() {
                if phantom.pos.dist(self.enemy_base) <= self.cfg.release_range as f64 {
                    // Delivered: the carried ghost is gone with it.
                    continue;
                }
                simulator::step_carrier(&phantom, self.enemy_base, &self.cfg)
            } else {
                phantom
            };
            if vision_over(allies, advanced.pos, &self.cfg) {
                continue;
            }
            r.push(Tracked::inferred(advanced, age));
        }

        r.sort_by_key(|t| t.entity.id);
        self.enemies = r;
    }

    /// Carry unseen ghosts forward against the union of all observed
    /// busters, and seed mirror twins of first-sighted ghosts.
    fn update_ghosts(&mut self, ghosts_now: &[Ghost], allies: &[Buster], enemies_now: &[Buster]) {
        let mut r: Vec<Tracked<Ghost>> =
            ghosts_now.iter().copied().map(Tracked::observed).collect();

        let all_observed: Vec<Buster> = allies.iter().chain(enemies_now).copied().collect();
        let no_locks = HashSet::new();

        for tracked in &self.ghosts {
            let phantom = tracked.entity;
            if ghosts_now.iter().any(|g| g.id == phantom.id) {
                continue;
            }
            if all_observed.iter().any(|b| b.carrying == Some(phantom.id)) {
                continue;
            }
            let advanced = simulator::step_ghost(&phantom, None, &all_observed, &no_locks, &self.cfg);
            if vision_over(allies, advanced.pos, &self.cfg) {
                continue;
            }
            let age = match tracked.provenance {
                Provenance::Observed => 1,
                Provenance::Inferred { age } => age + 1,
            };
            r.push(Tracked::inferred(advanced, age));
        }

        // Ghost spawns are centrally symmetric: the first sighting of a
        // ghost reveals where its unseen twin started.
        let newly_seen: Vec<Ghost> = ghosts_now
            .iter()
            .filter(|g| !self.seen_ghost_ids.contains(&g.id))
            .copied()
            .collect();
        self.seen_ghost_ids.extend(ghosts_now.iter().map(|g| g.id));
        for g in &newly_seen {
            let twin = self.twin_id(g.id);
            if twin == g.id || twin >= self.ghost_count {
                continue;
            }
            if self.seen_ghost_ids.contains(&twin) || r.iter().any(|t| t.entity.id == twin) {
                continue;
            }
            let twin_pos = mirror(g.pos, &self.cfg);
            let ever_covered = vision_over(allies, twin_pos, &self.cfg)
                || self
                    .past_ally_positions
                    .iter()
                    .any(|p| p.dist(twin_pos) <= self.cfg.fog_range as f64);
            if ever_covered {
                continue;
            }
            debug!(ghost = g.id, twin, "seeding mirror twin");
            r.push(Tracked::inferred(
                Ghost {
                    id: twin,
                    pos: twin_pos,
                    stamina: g.stamina,
                    bust_cnt: 0,
                },
                0,
            ));
        }

        self.ghosts = r;
    }

    fn update_checkpoints(&mut self, allies: &[Buster], turn: u32) {
        for checkpoint in &mut self.checkpoints {
            if allies
                .iter()
                .any(|a| a.pos.dist(checkpoint.pos) <= self.cfg.fog_range as f64)
            {
                checkpoint.last_seen = Some(turn);
            }
        }
    }

    /// Fold our own finalized actions back into the belief: stunning a
    /// carrier knocks it loose and drops its ghost where it staggers to.
    /// Runs after every buster's decision is final.
    pub fn apply_own_stuns(&mut self, decisions: &[(BusterId, Action)], allies: &[Buster]) {
        for (buster_id, action) in decisions {
            let Action::Stun { enemy } = action else {
                continue;
            };
            let ally = allies
                .iter()
                .find(|a| a.id == *buster_id)
                .unwrap_or_else(|| panic!("stun decision from unknown ally {buster_id}"));
            let idx = self
                .enemies
                .iter()
                .position(|t| t.entity.id == *enemy)
                .unwrap_or_else(|| panic!("stunned enemy {enemy} is not tracked"));
            let target = self.enemies[idx].entity;
            let Some(ghost_id) = target.carrying else {
                continue;
            };
            let flee = runaway_point(ally.pos, target.pos, self.cfg.move_range);
            let pos = step_toward(target.pos, flee, self.cfg.move_range, &self.cfg);
            self.enemies[idx].entity = Buster {
                pos,
                carrying: None,
                stun_duration: self.cfg.stun_duration,
                stun_cooldown: 0,
                ..target
            };
            self.ghosts.push(Tracked::inferred(
                Ghost {
                    id: ghost_id,
                    pos,
                    stamina: 0,
                    bust_cnt: 0,
                },
                0,
            ));
        }
        self.prev_enemies = self.enemy_units();
    }

    fn twin_id(&self, id: GhostId) -> GhostId {
        if self.ghost_count % 2 == 1 {
            // Odd count: ghost 0 spawns alone at the center.
            match id {
                0 => 0,
                i if i % 2 == 1 => i + 1,
                i => i - 1,
            }
        } else {
            id ^ 1
        }
    }
}

/// Whether any ally has sensor coverage over `pos`.
pub fn vision_over(allies: &[Buster], pos: Point, cfg: &GameConfig) -> bool {
    allies.iter().any(|a| a.pos.dist(pos) <= cfg.fog_range as f64)
}
