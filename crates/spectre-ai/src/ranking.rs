//! The total preorder over evaluation states.
//!
//! A strict, hand-ordered lexicographic comparator: earlier rules
//! dominate, ties fall through to the next rule. Each rule is a plain
//! function in an ordered table so it can be exercised on its own.
//! `Ordering::Greater` always means "the first state is better".

use std::cmp::Ordering;

use crate::evaluator::{CaptureCost, EvalState};

pub struct Rule {
    pub name: &'static str,
    pub cmp: fn(&EvalState, &EvalState) -> Ordering,
}

/// The comparator, in precedence order.
pub const RULES: &[Rule] = &[
    Rule { name: "prefer-carrying", cmp: prefer_carrying },
    Rule { name: "carrier-avoids-stun", cmp: carrier_avoids_stun },
    Rule { name: "carrier-reaches-release", cmp: carrier_reaches_release },
    Rule { name: "carrier-closes-on-base", cmp: carrier_closes_on_base },
    Rule { name: "intercept-sooner", cmp: intercept_sooner },
    Rule { name: "escort-closer", cmp: escort_closer },
    Rule { name: "capture-cheaper", cmp: capture_cheaper },
    Rule { name: "base-closer-while-hunting", cmp: base_closer_while_hunting },
    Rule { name: "checkpoint-closer", cmp: checkpoint_closer },
];

/// Compare two evaluation states from the same decision.
///
/// Stun readiness and intercept feasibility cannot differ between two
/// candidates of one buster's turn; a mismatch means the generator and
/// evaluator fell out of sync, which must fail loudly rather than rank.
pub fn compare(a: &EvalState, b: &EvalState) -> Ordering {
    assert_eq!(
        a.have_stun, b.have_stun,
        "stun readiness diverged between candidates of one decision"
    );
    assert_eq!(
        a.anyone_can_intercept, b.anyone_can_intercept,
        "intercept feasibility diverged between candidates of one decision"
    );
    for rule in RULES {
        match (rule.cmp)(a, b) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }
    Ordering::Equal
}

impl EvalState {
    /// Whether this state strictly beats the incumbent best (if any).
    /// Strictness keeps the earliest generated candidate on full ties.
    pub fn better_than(&self, best: Option<&EvalState>) -> bool {
        match best {
            None => true,
            Some(b) => compare(self, b) == Ordering::Greater,
        }
    }
}

fn prefer_carrying(a: &EvalState, b: &EvalState) -> Ordering {
    a.carrying_after.cmp(&b.carrying_after)
}

fn carrier_avoids_stun(a: &EvalState, b: &EvalState) -> Ordering {
    if a.carrying_after && b.carrying_after {
        b.can_be_stunned.cmp(&a.can_be_stunned)
    } else {
        Ordering::Equal
    }
}

fn carrier_reaches_release(a: &EvalState, b: &EvalState) -> Ordering {
    if a.carrying_after && b.carrying_after {
        a.in_release_range.cmp(&b.in_release_range)
    } else {
        Ordering::Equal
    }
}

fn carrier_closes_on_base(a: &EvalState, b: &EvalState) -> Ordering {
    if a.carrying_after && b.carrying_after {
        b.dist_to_base.total_cmp(&a.dist_to_base)
    } else {
        Ordering::Equal
    }
}

fn intercept_sooner(a: &EvalState, b: &EvalState) -> Ordering {
    if !a.anyone_can_intercept {
        // Interception is hopeless (or nobody carries): positioning for it
        // must not be rewarded or punished.
        return Ordering::Equal;
    }
    smaller_is_better(&a.turns_to_intercept, &b.turns_to_intercept, u32::cmp)
}

fn escort_closer(a: &EvalState, b: &EvalState) -> Ordering {
    smaller_is_better(&a.dist_to_escortee, &b.dist_to_escortee, f64::total_cmp)
}

fn capture_cheaper(a: &EvalState, b: &EvalState) -> Ordering {
    smaller_is_better(&a.capture_cost, &b.capture_cost, CaptureCost::cmp)
}

fn base_closer_while_hunting(a: &EvalState, b: &EvalState) -> Ordering {
    if a.ghosts_visible && b.ghosts_visible {
        b.dist_to_base.total_cmp(&a.dist_to_base)
    } else {
        Ordering::Equal
    }
}

fn checkpoint_closer(a: &EvalState, b: &EvalState) -> Ordering {
    b.dist_to_checkpoint.total_cmp(&a.dist_to_checkpoint)
}

/// Smaller present value beats larger; any present value beats `None`.
fn smaller_is_better<T>(
    a: &Option<T>,
    b: &Option<T>,
    cmp: fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(x), Some(y)) => cmp(y, x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> EvalState {
        EvalState {
            have_stun: true,
            anyone_can_intercept: false,
            can_be_stunned: false,
            carrying_after: false,
            in_release_range: false,
            dist_to_base: 100.0,
            dist_to_checkpoint: 100.0,
            capture_cost: None,
            turns_to_intercept: None,
            dist_to_escortee: None,
            ghosts_visible: false,
        }
    }

    #[test]
    fn test_carrying_dominates_everything_below() {
        let carrier = EvalState {
            carrying_after: true,
            can_be_stunned: true,
            dist_to_base: 9999.0,
            ..state()
        };
        let idle = EvalState {
            dist_to_base: 1.0,
            dist_to_checkpoint: 0.0,
            ..state()
        };
        assert_eq!(compare(&carrier, &idle), Ordering::Greater);
        assert_eq!(compare(&idle, &carrier), Ordering::Less);
    }

    #[test]
    fn test_carrier_safety_before_progress() {
        let safe = EvalState {
            carrying_after: true,
            dist_to_base: 50.0,
            ..state()
        };
        let exposed = EvalState {
            carrying_after: true,
            can_be_stunned: true,
            dist_to_base: 5.0,
            ..state()
        };
        assert_eq!(compare(&safe, &exposed), Ordering::Greater);
    }

    #[test]
    fn test_carrier_rules_ignored_when_not_carrying() {
        let a = EvalState {
            can_be_stunned: true,
            ..state()
        };
        let b = state();
        assert_eq!(carrier_avoids_stun(&a, &b), Ordering::Equal);
        assert_eq!(carrier_closes_on_base(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_release_range_beats_base_distance() {
        let inside = EvalState {
            carrying_after: true,
            in_release_range: true,
            dist_to_base: 40.0,
            ..state()
        };
        let outside = EvalState {
            carrying_after: true,
            dist_to_base: 41.0,
            ..state()
        };
        assert_eq!(compare(&inside, &outside), Ordering::Greater);
    }

    #[test]
    fn test_intercept_rule_gated_by_feasibility() {
        let a = EvalState {
            turns_to_intercept: Some(1),
            ..state()
        };
        let b = EvalState {
            turns_to_intercept: Some(5),
            ..state()
        };
        // Hopeless: the rule must not decide.
        assert_eq!(intercept_sooner(&a, &b), Ordering::Equal);

        let a = EvalState {
            anyone_can_intercept: true,
            ..a
        };
        let b = EvalState {
            anyone_can_intercept: true,
            ..b
        };
        assert_eq!(intercept_sooner(&a, &b), Ordering::Greater);
        // Reaching the path at all beats never reaching it.
        let never = EvalState {
            turns_to_intercept: None,
            ..b.clone()
        };
        assert_eq!(intercept_sooner(&b, &never), Ordering::Greater);
    }

    #[test]
    fn test_capture_cost_lexicographic() {
        let fast_far = EvalState {
            capture_cost: Some(CaptureCost { turns: 2, dist: 50.0 }),
            ..state()
        };
        let slow_near = EvalState {
            capture_cost: Some(CaptureCost { turns: 3, dist: 1.0 }),
            ..state()
        };
        assert_eq!(capture_cheaper(&fast_far, &slow_near), Ordering::Greater);

        let tied_near = EvalState {
            capture_cost: Some(CaptureCost { turns: 2, dist: 10.0 }),
            ..state()
        };
        assert_eq!(capture_cheaper(&tied_near, &fast_far), Ordering::Greater);
    }

    #[test]
    fn test_base_distance_only_counts_while_hunting() {
        let near = EvalState {
            dist_to_base: 10.0,
            ..state()
        };
        let far = EvalState {
            dist_to_base: 90.0,
            ..state()
        };
        assert_eq!(base_closer_while_hunting(&near, &far), Ordering::Equal);

        let near = EvalState {
            ghosts_visible: true,
            ..near
        };
        let far = EvalState {
            ghosts_visible: true,
            ..far
        };
        assert_eq!(base_closer_while_hunting(&near, &far), Ordering::Greater);
    }

    #[test]
    fn test_full_tie_is_equal() {
        assert_eq!(compare(&state(), &state()), Ordering::Equal);
        assert!(!state().better_than(Some(&state())));
        assert!(state().better_than(None));
    }

    #[test]
    #[should_panic(expected = "stun readiness diverged")]
    fn test_stun_readiness_mismatch_panics() {
        let a = state();
        let b = EvalState {
            have_stun: false,
            ..state()
        };
        compare(&a, &b);
    }

    #[test]
    #[should_panic(expected = "intercept feasibility diverged")]
    fn test_intercept_flag_mismatch_panics() {
        let a = state();
        let b = EvalState {
            anyone_can_intercept: true,
            ..state()
        };
        compare(&a, &b);
    }

    #[test]
    fn test_winner_is_order_independent() {
        // A spread of states differing across several criteria.
        let states = vec![
            EvalState { dist_to_checkpoint: 5.0, ..state() },
            EvalState { carrying_after: true, dist_to_base: 30.0, ..state() },
            EvalState { carrying_after: true, dist_to_base: 20.0, ..state() },
            EvalState { dist_to_escortee: Some(4.0), ..state() },
            EvalState { capture_cost: Some(CaptureCost { turns: 1, dist: 3.0 }), ghosts_visible: true, ..state() },
        ];
        let winner_of = |order: &[usize]| {
            let mut best: Option<&EvalState> = None;
            for &i in order {
                if states[i].better_than(best) {
                    best = Some(&states[i]);
                }
            }
            best.cloned().unwrap()
        };
        let baseline = winner_of(&[0, 1, 2, 3, 4]);
        for rotation in [
            [4, 3, 2, 1, 0],
            [2, 0, 4, 1, 3],
            [1, 2, 3, 4, 0],
            [3, 4, 0, 2, 1],
        ] {
            assert_eq!(winner_of(&rotation), baseline);
        }
    }
}
