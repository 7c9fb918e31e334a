//! Move / attack / wait resolution.
//!
//! None of these advance the turn; callers follow up with
//! [`advance_turn`](crate::turn_queue::advance_turn) so the same primitives
//! serve both player-driven and AI-driven turns.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combatant::{Combatant, GridPosition};
use crate::constants::{
    CRITICAL_MULTIPLIER, HIT_THRESHOLD_BASE, NATURAL_HIT, NATURAL_MISS, ROLL_SIDES,
    STRONG_ROLL_MIN, STRONG_ROLL_MULTIPLIER,
};
use crate::numbers::{round_f64_to_i32, unit_to_die};
use crate::rng::unit;
use crate::targeting::{get_valid_attack_targets, get_valid_move_targets};
use crate::turn_queue::{TurnQueue, get_current_actor};

/// Outcome of a single to-hit and damage roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    pub roll: u8,
    pub hit: bool,
    pub critical: bool,
    pub damage: i32,
    pub target_hp: i32,
    pub target_defeated: bool,
}

/// What happened on a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionResult {
    Move {
        actor_id: String,
        target_position: GridPosition,
    },
    Attack {
        actor_id: String,
        target_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        combat_result: Option<CombatResult>,
    },
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor_id: Option<String>,
    },
}

impl ActionResult {
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        match self {
            Self::Move { actor_id, .. } | Self::Attack { actor_id, .. } => Some(actor_id),
            Self::Wait { actor_id } => actor_id.as_deref(),
        }
    }

    #[must_use]
    pub const fn combat_result(&self) -> Option<&CombatResult> {
        match self {
            Self::Attack { combat_result, .. } => combat_result.as_ref(),
            Self::Move { .. } | Self::Wait { .. } => None,
        }
    }
}

/// New queue plus a description of the action that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub queue: TurnQueue,
    pub result: ActionResult,
}

/// Resolve a d20 roll of `attacker` against `defender`.
///
/// A natural 1 always misses and a natural 20 always hits for double damage.
/// Otherwise the attack lands when `roll + attack >= 10 + defense`; rolls of
/// 15 or more add a quarter to the base damage.
#[must_use]
pub fn resolve_attack_roll(attacker: &Combatant, defender: &Combatant, roll: u8) -> CombatResult {
    let hit = match roll {
        NATURAL_MISS => false,
        NATURAL_HIT => true,
        _ => i32::from(roll) + attacker.attack >= HIT_THRESHOLD_BASE + defender.defense,
    };
    let critical = roll == NATURAL_HIT;
    let damage = if hit {
        let base = (attacker.attack - defender.defense).max(1);
        let scale = if critical {
            CRITICAL_MULTIPLIER
        } else if roll >= STRONG_ROLL_MIN {
            STRONG_ROLL_MULTIPLIER
        } else {
            1.0
        };
        round_f64_to_i32(f64::from(base) * scale).max(1)
    } else {
        0
    };
    let target_hp = (defender.hp - damage).max(0);
    CombatResult {
        roll,
        hit,
        critical,
        damage,
        target_hp,
        target_defeated: target_hp == 0,
    }
}

#[must_use]
pub fn execute_move(queue: &TurnQueue, actor_id: &str, target: GridPosition) -> ActionOutcome {
    ActionOutcome {
        queue: queue.map_combatant(actor_id, |actor| actor.with_position(target)),
        result: ActionResult::Move {
            actor_id: actor_id.to_string(),
            target_position: target,
        },
    }
}

/// Roll an attack and apply its damage inside a new queue.
///
/// Unknown attacker or target ids leave the queue untouched and the
/// `combat_result` empty; no roll is drawn in that case.
pub fn execute_attack(
    queue: &TurnQueue,
    attacker_id: &str,
    target_id: &str,
    rng: &mut impl Rng,
) -> ActionOutcome {
    let unresolved = || ActionOutcome {
        queue: queue.clone(),
        result: ActionResult::Attack {
            actor_id: attacker_id.to_string(),
            target_id: target_id.to_string(),
            combat_result: None,
        },
    };
    let (Some(attacker), Some(defender)) = (queue.find(attacker_id), queue.find(target_id)) else {
        return unresolved();
    };

    let roll = unit_to_die(unit(rng), ROLL_SIDES);
    let combat = resolve_attack_roll(attacker, defender, roll);
    log::trace!(
        "attack: {attacker_id} -> {target_id} roll {roll} hit {} dmg {}",
        combat.hit,
        combat.damage
    );
    ActionOutcome {
        queue: queue.map_combatant(target_id, |target| target.with_hp(combat.target_hp)),
        result: ActionResult::Attack {
            actor_id: attacker_id.to_string(),
            target_id: target_id.to_string(),
            combat_result: Some(combat),
        },
    }
}

#[must_use]
pub fn execute_wait(actor_id: &str) -> ActionResult {
    ActionResult::Wait {
        actor_id: Some(actor_id.to_string()),
    }
}

/// Player-issued command for the combatant whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerAction {
    Move { target: GridPosition },
    Attack { target_id: String },
    Wait,
}

/// Reasons a player command is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("no combatant is waiting to act")]
    NoCurrentActor,
    #[error("it is {current}'s turn, not {requested}'s")]
    NotYourTurn { requested: String, current: String },
    #[error("cell ({x}, {y}) is not a legal move for {actor_id}")]
    InvalidMoveTarget { actor_id: String, x: i32, y: i32 },
    #[error("{target_id} cannot be attacked by {actor_id}")]
    InvalidAttackTarget { actor_id: String, target_id: String },
}

/// Validate and execute a player command for the current actor.
///
/// # Errors
///
/// Returns an [`ActionError`] when `actor_id` is not the current actor or
/// the chosen move cell / attack target is not legal.
pub fn execute_player_action(
    queue: &TurnQueue,
    actor_id: &str,
    action: &PlayerAction,
    rng: &mut impl Rng,
) -> Result<ActionOutcome, ActionError> {
    let actor = get_current_actor(queue).ok_or(ActionError::NoCurrentActor)?;
    if actor.id != actor_id {
        return Err(ActionError::NotYourTurn {
            requested: actor_id.to_string(),
            current: actor.id.clone(),
        });
    }

    match action {
        PlayerAction::Wait => Ok(ActionOutcome {
            queue: queue.clone(),
            result: execute_wait(actor_id),
        }),
        PlayerAction::Move { target } => {
            if !get_valid_move_targets(actor, &queue.combatants).contains(target) {
                return Err(ActionError::InvalidMoveTarget {
                    actor_id: actor_id.to_string(),
                    x: target.x,
                    y: target.y,
                });
            }
            Ok(execute_move(queue, actor_id, *target))
        }
        PlayerAction::Attack { target_id } => {
            let legal = get_valid_attack_targets(actor, &queue.combatants)
                .iter()
                .any(|candidate| candidate.id == *target_id);
            if !legal {
                return Err(ActionError::InvalidAttackTarget {
                    actor_id: actor_id.to_string(),
                    target_id: target_id.clone(),
                });
            }
            Ok(execute_attack(queue, actor_id, target_id, rng))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatStats, Side, create_combatant};
    use crate::rng::FixedRoll;
    use crate::turn_queue::{advance_turn, build_turn_queue, is_round_complete};

    fn fighter(id: &str, side: Side, speed: i32, x: i32, y: i32) -> Combatant {
        create_combatant(
            id,
            side,
            id,
            CombatStats {
                hp: 20,
                max_hp: 20,
                attack: 6,
                defense: 2,
                speed,
            },
            Some(GridPosition::new(x, y)),
        )
    }

    fn duel() -> TurnQueue {
        build_turn_queue(&[
            fighter("imp", Side::Invader, 5, 0, 1),
            fighter("golem", Side::Defender, 7, 0, 0),
        ])
    }

    #[test]
    fn natural_one_always_misses() {
        let queue = duel();
        let outcome = execute_attack(&queue, "golem", "imp", &mut FixedRoll(0.0));
        let combat = outcome.result.combat_result().copied().unwrap();
        assert_eq!(combat.roll, 1);
        assert!(!combat.hit);
        assert_eq!(combat.damage, 0);
        assert_eq!(outcome.queue.find("imp").unwrap().hp, 20);
    }

    #[test]
    fn natural_twenty_always_hits() {
        let mut attacker = fighter("weak", Side::Defender, 1, 0, 0);
        attacker.attack = 0;
        let mut target = fighter("wall", Side::Invader, 1, 0, 1);
        target.defense = 50;
        let queue = build_turn_queue(&[attacker, target]);
        let outcome = execute_attack(&queue, "weak", "wall", &mut FixedRoll(0.95));
        let combat = outcome.result.combat_result().copied().unwrap();
        assert_eq!(combat.roll, 20);
        assert!(combat.hit);
        assert!(combat.damage >= 1);
        assert_eq!(outcome.queue.find("wall").unwrap().hp, 20 - combat.damage);
    }

    #[test]
    fn duel_scenario_round_closure() {
        let queue = duel();
        let outcome = execute_attack(&queue, "golem", "imp", &mut FixedRoll(0.95));
        let combat = outcome.result.combat_result().copied().unwrap();
        assert_eq!(combat.damage, 8);
        assert_eq!(outcome.queue.find("imp").unwrap().hp, 20 - combat.damage);
        assert_eq!(queue.find("imp").unwrap().hp, 20);

        let after_golem = advance_turn(&outcome.queue);
        assert!(!is_round_complete(&after_golem));
        let after_imp = advance_turn(&after_golem);
        assert!(is_round_complete(&after_imp));
    }

    #[test]
    fn mid_rolls_compare_attack_and_defense() {
        let attacker = fighter("a", Side::Defender, 1, 0, 0);
        let defender = fighter("b", Side::Invader, 1, 0, 1);
        // 6 + 6 >= 10 + 2
        assert!(resolve_attack_roll(&attacker, &defender, 6).hit);
        assert!(!resolve_attack_roll(&attacker, &defender, 5).hit);
        assert_eq!(resolve_attack_roll(&attacker, &defender, 10).damage, 4);
        assert_eq!(resolve_attack_roll(&attacker, &defender, 15).damage, 5);
    }

    #[test]
    fn damage_never_drops_below_one_on_hit() {
        let mut attacker = fighter("a", Side::Defender, 1, 0, 0);
        attacker.attack = 1;
        let mut defender = fighter("b", Side::Invader, 1, 0, 1);
        defender.defense = 9;
        let combat = resolve_attack_roll(&attacker, &defender, 19);
        assert!(combat.hit);
        assert_eq!(combat.damage, 1);
    }

    #[test]
    fn unknown_attacker_is_a_no_op() {
        let queue = duel();
        let mut rng = crate::rng::ScriptedRolls::new(vec![0.5]);
        let outcome = execute_attack(&queue, "ghost", "imp", &mut rng);
        assert!(outcome.result.combat_result().is_none());
        assert_eq!(outcome.queue, queue);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn move_and_wait_do_not_advance() {
        let queue = duel();
        let moved = execute_move(&queue, "golem", GridPosition::new(1, 0));
        assert_eq!(
            moved.queue.find("golem").unwrap().position,
            Some(GridPosition::new(1, 0))
        );
        assert_eq!(moved.queue.current_index, queue.current_index);
        assert_eq!(
            execute_wait("golem"),
            ActionResult::Wait {
                actor_id: Some("golem".to_string())
            }
        );
    }

    #[test]
    fn player_actions_are_validated() {
        let queue = duel();
        let mut rng = FixedRoll(0.5);
        let err = execute_player_action(&queue, "imp", &PlayerAction::Wait, &mut rng).unwrap_err();
        assert!(matches!(err, ActionError::NotYourTurn { .. }));

        let err = execute_player_action(
            &queue,
            "golem",
            &PlayerAction::Move {
                target: GridPosition::new(0, 1),
            },
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, ActionError::InvalidMoveTarget { .. }));

        let ok = execute_player_action(
            &queue,
            "golem",
            &PlayerAction::Attack {
                target_id: "imp".to_string(),
            },
            &mut rng,
        )
        .unwrap();
        assert!(ok.result.combat_result().is_some());
    }

    #[test]
    fn attack_result_serializes_with_action_tag() {
        let result = execute_wait("golem");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["action"], "wait");
        assert_eq!(json["actor_id"], "golem");
    }
}
