//! Decision policy for computer-controlled combatants.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::{ActionOutcome, ActionResult, execute_attack, execute_move, execute_wait};
use crate::combatant::{Combatant, GridPosition};
use crate::targeting::{get_valid_attack_targets, get_valid_move_targets};
use crate::turn_queue::{TurnQueue, get_current_actor};

/// What the policy wants the actor to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AiDecision {
    Wait,
    Move { target: GridPosition },
    Attack { target_id: String },
}

fn nearest_enemy<'a>(
    actor: &Combatant,
    origin: GridPosition,
    all: &'a [Combatant],
) -> Option<(&'a Combatant, GridPosition)> {
    all.iter()
        .filter(|other| other.is_alive() && actor.is_enemy_of(other))
        .filter_map(|other| other.position.map(|cell| (other, cell)))
        .min_by_key(|(_, cell)| origin.manhattan_distance(*cell))
}

/// Step one cell toward `goal`, preferring the axis with the larger gap.
///
/// Ties go to the y axis. When the preferred cell is blocked the other axis
/// is tried if it also closes distance.
fn step_toward(
    origin: GridPosition,
    goal: GridPosition,
    open: &[GridPosition],
) -> Option<GridPosition> {
    let dx = goal.x - origin.x;
    let dy = goal.y - origin.y;
    let along_x = origin.offset(dx.signum(), 0);
    let along_y = origin.offset(0, dy.signum());
    let (preferred, fallback) = if dx.abs() > dy.abs() {
        (along_x, (dy != 0).then_some(along_y))
    } else {
        (along_y, (dx != 0).then_some(along_x))
    };
    if open.contains(&preferred) {
        return Some(preferred);
    }
    fallback.filter(|cell| open.contains(cell))
}

/// Attack the weakest adjacent enemy, else close on the nearest one, else wait.
///
/// Movement only ever lands on an open cell. If the step along the larger gap
/// is occupied, the actor steps along the other axis when that also closes
/// distance; otherwise it waits rather than sharing a cell.
#[must_use]
pub fn resolve_ai_action(actor: &Combatant, all: &[Combatant]) -> AiDecision {
    let Some(origin) = actor.position else {
        return AiDecision::Wait;
    };

    let adjacent = get_valid_attack_targets(actor, all);
    if let Some(weakest) = adjacent.iter().min_by_key(|target| target.hp) {
        return AiDecision::Attack {
            target_id: weakest.id.clone(),
        };
    }

    let Some((_, goal)) = nearest_enemy(actor, origin, all) else {
        return AiDecision::Wait;
    };
    let open = get_valid_move_targets(actor, all);
    step_toward(origin, goal, &open)
        .map_or(AiDecision::Wait, |target| AiDecision::Move { target })
}

/// Run the policy for the current actor and apply the chosen action.
///
/// An empty or exhausted queue yields a `wait` with no actor.
pub fn execute_ai_turn(queue: &TurnQueue, rng: &mut impl Rng) -> ActionOutcome {
    let Some(actor) = get_current_actor(queue) else {
        return ActionOutcome {
            queue: queue.clone(),
            result: ActionResult::Wait { actor_id: None },
        };
    };

    match resolve_ai_action(actor, &queue.combatants) {
        AiDecision::Attack { target_id } => execute_attack(queue, &actor.id, &target_id, rng),
        AiDecision::Move { target } => execute_move(queue, &actor.id, target),
        AiDecision::Wait => ActionOutcome {
            queue: queue.clone(),
            result: execute_wait(&actor.id),
        },
    }
}
