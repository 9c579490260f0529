//! The per-turn decision loop.
//!
//! Refreshes the belief state once, then decides busters in id order,
//! threading the already-stunned / already-busted accumulators between
//! decisions (never mutating them while one buster's candidates are being
//! scored).

use std::collections::HashSet;

use tracing::debug;

use spectre_core::action::Action;
use spectre_core::config::GameConfig;
use spectre_core::entities::{Buster, BusterId, Ghost, GhostId, TurnObservation};
use spectre_core::geometry::Point;

use crate::belief::BeliefTracker;
use crate::candidates::{self, DecisionContext};
use crate::evaluator::{self, EvalState};
use crate::simulator;

pub struct Planner {
    cfg: GameConfig,
    my_base: Point,
    enemy_base: Point,
    belief: BeliefTracker,
}

impl Planner {
    pub fn new(cfg: GameConfig, my_team_id: u32, ghost_count: u32) -> Self {
        let my_base = cfg.base_for_team(my_team_id);
        let enemy_base = cfg.base_for_team(1 - my_team_id);
        let belief = BeliefTracker::new(cfg.clone(), enemy_base, ghost_count);
        Self {
            cfg,
            my_base,
            enemy_base,
            belief,
        }
    }

    pub fn belief(&self) -> &BeliefTracker {
        &self.belief
    }

    #[cfg(test)]
    pub(crate) fn belief_mut(&mut self) -> &mut BeliefTracker {
        &mut self.belief
    }

    /// Decide one action per controlled buster for this turn.
    pub fn decide(&mut self, obs: &TurnObservation) -> Vec<(BusterId, Action)> {
        self.belief.refresh(obs);

        let mut allies = obs.allies.clone();
        allies.sort_by_key(|b| b.id);

        let enemies = self.belief.enemy_units();
        let mut ghosts = self.belief.ghost_units();
        if !candidates::explored_near_half(&self.belief.checkpoints, self.my_base, self.enemy_base)
        {
            ghosts.retain(|g| g.stamina < self.cfg.fat_ghost_stamina);
        }
        let forbidden = candidates::forbidden_ghosts(&ghosts, &allies, &enemies, &self.cfg);
        let carrier_paths: Vec<Vec<Point>> = enemies
            .iter()
            .filter(|e| e.is_carrying())
            .map(|e| simulator::carrier_path(e, self.enemy_base, &self.cfg))
            .collect();
        let anyone_can_intercept = allies.iter().any(|a| {
            evaluator::intercept_turns(a.pos, a.stun_cooldown, &carrier_paths, &self.cfg).is_some()
        });

        let mut already_stunned: HashSet<BusterId> = HashSet::new();
        let mut already_busted: HashSet<GhostId> = HashSet::new();
        let mut decisions = Vec::with_capacity(allies.len());

        for buster in &allies {
            let action = self.decide_one(
                buster,
                &allies,
                &enemies,
                &ghosts,
                &forbidden,
                &carrier_paths,
                anyone_can_intercept,
                &already_stunned,
                &already_busted,
            );
            // Accumulators move strictly between decisions, in id order.
            match action {
                Action::Stun { enemy } => {
                    already_stunned.insert(enemy);
                }
                Action::Bust { ghost } => {
                    already_busted.insert(ghost);
                }
                _ => {}
            }
            decisions.push((buster.id, action));
        }

        self.belief.apply_own_stuns(&decisions, &allies);
        decisions
    }

    #[allow(clippy::too_many_arguments)]
    fn decide_one(
        &self,
        buster: &Buster,
        allies: &[Buster],
        enemies: &[Buster],
        ghosts: &[Ghost],
        forbidden: &HashSet<GhostId>,
        carrier_paths: &[Vec<Point>],
        anyone_can_intercept: bool,
        already_stunned: &HashSet<BusterId>,
        already_busted: &HashSet<GhostId>,
    ) -> Action {
        if buster.is_stunned() {
            // Disabled: forfeit the turn.
            return Action::Release;
        }
        if buster.is_carrying()
            && buster.pos.dist(self.my_base) <= self.cfg.release_range as f64
        {
            return Action::Release;
        }
        if let Some(enemy) = self.stun_target(buster, enemies, already_stunned) {
            return Action::Stun { enemy };
        }

        let escortees: Vec<Buster> = allies
            .iter()
            .filter(|a| {
                a.is_carrying()
                    && candidates::needs_escort(a, buster, allies, enemies, self.my_base, &self.cfg)
            })
            .copied()
            .collect();
        let checkpoint = candidates::priority_checkpoint(buster, &self.belief.checkpoints)
            .unwrap_or(self.my_base);

        let ctx = DecisionContext {
            cfg: &self.cfg,
            my_base: self.my_base,
            enemy_base: self.enemy_base,
            allies,
            enemies,
            ghosts,
            checkpoints: &self.belief.checkpoints,
            checkpoint,
            forbidden,
            locked: already_busted,
            carrier_paths,
            escortees: &escortees,
            anyone_can_intercept,
        };

        let mut best: Option<(Action, EvalState)> = None;
        for action in candidates::generate(buster, &ctx) {
            let new_pos = evaluator::position_after(buster, &action, &self.cfg);
            let state = evaluator::evaluate(buster, new_pos, &action, &ctx);
            if state.better_than(best.as_ref().map(|(_, s)| s)) {
                best = Some((action, state));
            }
        }
        let (action, _) = best.expect("the hold candidate is always generated");
        debug!(buster = buster.id, ?action, "decided");
        action
    }

    /// Greedy stun: first enemy in id order that is in range, about to
    /// recover (or active), and not already claimed this turn.
    fn stun_target(
        &self,
        buster: &Buster,
        enemies: &[Buster],
        already_stunned: &HashSet<BusterId>,
    ) -> Option<BusterId> {
        if !buster.stun_ready() {
            return None;
        }
        enemies
            .iter()
            .filter(|e| e.stun_duration <= 1)
            .filter(|e| !already_stunned.contains(&e.id))
            .find(|e| buster.pos.dist(e.pos) <= self.cfg.stun_range as f64)
            .map(|e| e.id)
    }
}
