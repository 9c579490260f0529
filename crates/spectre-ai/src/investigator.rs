//! Retroactive stun attribution.
//!
//! An ally that shows up stunned for the full duration was stunned last
//! turn by somebody. Working out who burned their stun tightens the belief
//! about enemy cooldowns.

use std::collections::BTreeSet;

use spectre_core::config::GameConfig;
use spectre_core::entities::{Buster, BusterId};

/// Enemies that must have used their stun last turn, judged from the
/// allies that are newly stunned this turn.
///
/// Candidate enemies are scanned in ascending id order and the first
/// plausible attacker is credited. With two simultaneous stuns and
/// overlapping candidates this greedy pass can credit the wrong pairing;
/// downstream cooldown tracking depends on that bias, so it stays.
pub fn who_stunned_last_turn(
    allies: &[Buster],
    prev_allies: &[Buster],
    enemies: &[Buster],
    prev_enemies: &[Buster],
    cfg: &GameConfig,
) -> BTreeSet<BusterId> {
    let mut prev_enemies = prev_enemies.to_vec();
    prev_enemies.sort_by_key(|e| e.id);

    let mut credited = BTreeSet::new();
    for ally in allies {
        if ally.stun_duration != cfg.stun_duration {
            continue;
        }
        let Some(prev_ally) = prev_allies.iter().find(|a| a.id == ally.id) else {
            continue;
        };
        let stunner = prev_enemies.iter().find(|prev_enemy| {
            let enemy_now = enemies.iter().find(|e| e.id == prev_enemy.id);
            could_stun(prev_ally, enemy_now, prev_enemy, allies, &credited, cfg)
        });
        if let Some(enemy) = stunner {
            credited.insert(enemy.id);
        }
    }
    credited
}

fn could_stun(
    prev_ally: &Buster,
    enemy_now: Option<&Buster>,
    prev_enemy: &Buster,
    allies_now: &[Buster],
    credited: &BTreeSet<BusterId>,
    cfg: &GameConfig,
) -> bool {
    if credited.contains(&prev_enemy.id) {
        return false;
    }
    if prev_ally.pos.dist(prev_enemy.pos) > cfg.stun_range as f64 {
        return false;
    }
    if let Some(enemy) = enemy_now {
        // A carrier cannot stun, and stunning roots the attacker in place.
        if enemy.is_carrying() {
            return false;
        }
        if enemy.pos != prev_enemy.pos {
            return false;
        }
    }
    if prev_enemy.stun_cooldown > 0 || prev_enemy.stun_duration > 0 {
        return false;
    }
    // An unobserved attacker standing somewhere we have vision over is a
    // contradiction: we would see it.
    if enemy_now.is_none()
        && allies_now
            .iter()
            .any(|a| a.pos.dist(prev_enemy.pos) <= cfg.fog_range as f64)
    {
        return false;
    }
    true
}
