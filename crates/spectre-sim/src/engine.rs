//! Lockstep match engine.
//!
//! An authoritative referee for offline matches: it owns full world state,
//! extracts per-team fog-of-war observations, and resolves both teams'
//! actions simultaneously. It exists to exercise the decision engine
//! end-to-end in tests; the bot itself never links it at runtime.
//!
//! Resolution each turn: stuns land first (a stunned carrier drops its
//! ghost in place), then releases, then moves, then busts (a ghost worked
//! down to zero stamina goes to the nearest worker, lowest id on ties),
//! then uncontested ghosts flee with the same response rule the decision
//! engine predicts with, then timers tick.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use spectre_ai::simulator;
use spectre_core::action::Action;
use spectre_core::config::GameConfig;
use spectre_core::entities::{Buster, BusterId, Ghost, TurnObservation};

use crate::world_setup::{self, RefBuster, RefGhost, SimConfig};

pub struct MatchEngine {
    config: SimConfig,
    turn: u32,
    busters: Vec<RefBuster>,
    ghosts: Vec<RefGhost>,
    scores: [u32; 2],
}

impl MatchEngine {
    pub fn new(config: SimConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let busters = world_setup::spawn_busters(&config);
        let ghosts = world_setup::spawn_ghosts(&config, &mut rng);
        Self {
            config,
            turn: 0,
            busters,
            ghosts,
            scores: [0, 0],
        }
    }

    /// Hand-built world for focused scenarios.
    #[cfg(test)]
    pub(crate) fn with_state(
        config: SimConfig,
        busters: Vec<RefBuster>,
        ghosts: Vec<RefGhost>,
    ) -> Self {
        Self {
            config,
            turn: 0,
            busters,
            ghosts,
            scores: [0, 0],
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn rules(&self) -> &GameConfig {
        &self.config.rules
    }

    pub fn busters(&self) -> &[RefBuster] {
        &self.busters
    }

    /// Ghosts still on the board (not scored, not carried).
    pub fn ghosts_loose(&self) -> usize {
        self.ghosts
            .iter()
            .filter(|g| !g.captured && g.carried_by.is_none())
            .count()
    }

    /// What one team can see this turn. Enemy stun cooldowns are withheld
    /// (reported as zero), matching the live protocol.
    pub fn observation_for(&self, team: u32) -> TurnObservation {
        let mine: Vec<&RefBuster> = self.busters.iter().filter(|b| b.team == team).collect();
        let fog = self.config.rules.fog_range as f64;

        let allies = mine.iter().map(|b| to_entity(b, self.turn, true)).collect();
        let enemies = self
            .busters
            .iter()
            .filter(|b| b.team != team)
            .filter(|b| mine.iter().any(|m| m.pos.dist(b.pos) <= fog))
            .map(|b| to_entity(b, self.turn, false))
            .collect();
        let ghosts = self
            .ghosts
            .iter()
            .filter(|g| !g.captured && g.carried_by.is_none())
            .filter(|g| mine.iter().any(|m| m.pos.dist(g.pos) <= fog))
            .map(|g| Ghost {
                id: g.id,
                pos: g.pos,
                stamina: g.stamina,
                bust_cnt: g.bust_cnt,
            })
            .collect();

        TurnObservation {
            turn: self.turn,
            allies,
            enemies,
            ghosts,
        }
    }

    /// Resolve one turn from both teams' finalized actions.
    pub fn step(&mut self, team0: &[(BusterId, Action)], team1: &[(BusterId, Action)]) {
        let actions: Vec<(BusterId, Action)> =
            team0.iter().chain(team1).copied().collect();
        let rules = self.config.rules.clone();

        // 1. Stuns land against pre-move positions, in action order.
        let mut freshly_stunned: HashSet<BusterId> = HashSet::new();
        for (actor_id, action) in &actions {
            let Action::Stun { enemy } = action else {
                continue;
            };
            let Some(actor) = self.buster(*actor_id) else {
                continue;
            };
            let Some(target) = self.buster(*enemy) else {
                continue;
            };
            if actor.stun_duration > 0 || actor.stun_cooldown > 0 {
                continue;
            }
            if actor.pos.dist(target.pos) > rules.stun_range as f64 {
                continue;
            }
            let target_pos = target.pos;
            let carried = target.carrying;
            self.buster_mut(*enemy).stun_duration = rules.stun_duration;
            self.buster_mut(*enemy).carrying = None;
            self.buster_mut(*actor_id).stun_cooldown = rules.stun_cooldown;
            freshly_stunned.insert(*enemy);
            if let Some(ghost_id) = carried {
                let ghost = self.ghost_mut(ghost_id);
                ghost.carried_by = None;
                ghost.pos = target_pos;
            }
        }

        // 2. Releases.
        for (actor_id, action) in &actions {
            if !matches!(action, Action::Release) {
                continue;
            }
            let Some(actor) = self.buster(*actor_id) else {
                continue;
            };
            if actor.stun_duration > 0 {
                continue;
            }
            let Some(ghost_id) = actor.carrying else {
                continue;
            };
            let team = actor.team;
            let base = rules.base_for_team(team);
            let at_base = actor.pos.dist(base) <= rules.release_range as f64;
            let pos = actor.pos;
            self.buster_mut(*actor_id).carrying = None;
            if at_base {
                self.ghost_mut(ghost_id).carried_by = None;
                self.ghost_mut(ghost_id).captured = true;
                self.scores[team as usize] += 1;
            } else {
                let ghost = self.ghost_mut(ghost_id);
                ghost.carried_by = None;
                ghost.pos = pos;
            }
        }

        // 3. Moves.
        for (actor_id, action) in &actions {
            let Action::Move { to } = action else {
                continue;
            };
            let Some(actor) = self.buster(*actor_id) else {
                continue;
            };
            if actor.stun_duration > 0 {
                continue;
            }
            let next = spectre_core::geometry::step_toward(actor.pos, *to, rules.move_range, &rules);
            self.buster_mut(*actor_id).pos = next;
        }

        // 4. Busts.
        for ghost_idx in 0..self.ghosts.len() {
            let ghost = self.ghosts[ghost_idx];
            if ghost.captured || ghost.carried_by.is_some() {
                continue;
            }
            let mut workers: Vec<BusterId> = Vec::new();
            for (actor_id, action) in &actions {
                let Action::Bust { ghost: target } = action else {
                    continue;
                };
                if *target != ghost.id {
                    continue;
                }
                let Some(actor) = self.buster(*actor_id) else {
                    continue;
                };
                if actor.stun_duration > 0 || actor.carrying.is_some() {
                    continue;
                }
                if rules.in_bust_band(actor.pos.dist(ghost.pos)) {
                    workers.push(*actor_id);
                }
            }
            self.ghosts[ghost_idx].bust_cnt = workers.len() as u32;
            if workers.is_empty() {
                continue;
            }
            let drained = ghost.stamina.saturating_sub(workers.len() as u32);
            self.ghosts[ghost_idx].stamina = drained;
            if drained == 0 {
                let winner = workers
                    .iter()
                    .copied()
                    .min_by(|a, b| {
                        let da = self.buster(*a).unwrap().pos.dist(ghost.pos);
                        let db = self.buster(*b).unwrap().pos.dist(ghost.pos);
                        da.total_cmp(&db).then(a.cmp(b))
                    })
                    .unwrap();
                self.ghosts[ghost_idx].carried_by = Some(winner);
                self.ghosts[ghost_idx].bust_cnt = 0;
                self.buster_mut(winner).carrying = Some(ghost.id);
            }
        }

        // 5. Uncontested ghosts flee; same response rule the bot predicts.
        let all_units: Vec<Buster> = self
            .busters
            .iter()
            .map(|b| to_entity(b, self.turn, true))
            .collect();
        let no_locks = HashSet::new();
        for ghost in &mut self.ghosts {
            if ghost.captured || ghost.carried_by.is_some() {
                continue;
            }
            let entity = Ghost {
                id: ghost.id,
                pos: ghost.pos,
                stamina: ghost.stamina,
                bust_cnt: ghost.bust_cnt,
            };
            ghost.pos = simulator::step_ghost(&entity, None, &all_units, &no_locks, &rules).pos;
        }

        // 6. Carried ghosts ride along.
        for ghost in &mut self.ghosts {
            if let Some(carrier) = ghost.carried_by {
                let pos = self
                    .busters
                    .iter()
                    .find(|b| b.id == carrier)
                    .expect("carrier exists")
                    .pos;
                ghost.pos = pos;
            }
        }

        // 7. Timers. Fresh stuns keep their full duration for one turn so
        // the victim is first observed at the full value.
        for buster in &mut self.busters {
            if buster.stun_duration > 0 && !freshly_stunned.contains(&buster.id) {
                buster.stun_duration -= 1;
            }
            buster.stun_cooldown = buster.stun_cooldown.saturating_sub(1);
        }

        self.turn += 1;
    }

    fn buster(&self, id: BusterId) -> Option<&RefBuster> {
        self.busters.iter().find(|b| b.id == id)
    }

    fn buster_mut(&mut self, id: BusterId) -> &mut RefBuster {
        self.busters
            .iter_mut()
            .find(|b| b.id == id)
            .expect("buster id is valid")
    }

    fn ghost_mut(&mut self, id: spectre_core::entities::GhostId) -> &mut RefGhost {
        self.ghosts
            .iter_mut()
            .find(|g| g.id == id)
            .expect("ghost id is valid")
    }
}

fn to_entity(b: &RefBuster, turn: u32, own_side: bool) -> Buster {
    Buster {
        id: b.id,
        pos: b.pos,
        carrying: b.carrying,
        stun_duration: b.stun_duration,
        stun_cooldown: if own_side { b.stun_cooldown } else { 0 },
        last_seen: turn,
    }
}
