//! Grid adjacency and target enumeration.
//!
//! The grid is implicit: positions are integer cells and adjacency is
//! 4-directional. Cells with negative coordinates are off the grid.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::combatant::{Combatant, GridPosition};

/// Kinds of action a combatant may take on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Wait,
    Move,
    Attack,
}

/// Inline set of available actions; at most three kinds exist.
pub type ActionSet = SmallVec<[ActionKind; 3]>;

#[must_use]
pub const fn are_positions_adjacent(a: GridPosition, b: GridPosition) -> bool {
    a.manhattan_distance(b) == 1
}

/// The four orthogonal neighbours: north, south, west, east.
#[must_use]
pub const fn get_adjacent_positions(position: GridPosition) -> [GridPosition; 4] {
    [
        position.offset(0, -1),
        position.offset(0, 1),
        position.offset(-1, 0),
        position.offset(1, 0),
    ]
}

fn is_occupied(cell: GridPosition, all: &[Combatant]) -> bool {
    all.iter()
        .any(|combatant| combatant.is_alive() && combatant.position == Some(cell))
}

/// Adjacent on-grid cells not held by a living combatant.
#[must_use]
pub fn get_valid_move_targets(actor: &Combatant, all: &[Combatant]) -> Vec<GridPosition> {
    let Some(origin) = actor.position else {
        return Vec::new();
    };
    get_adjacent_positions(origin)
        .into_iter()
        .filter(|cell| cell.is_on_grid() && !is_occupied(*cell, all))
        .collect()
}

/// Living opponents standing on a cell adjacent to the actor.
#[must_use]
pub fn get_valid_attack_targets<'a>(actor: &Combatant, all: &'a [Combatant]) -> Vec<&'a Combatant> {
    let Some(origin) = actor.position else {
        return Vec::new();
    };
    all.iter()
        .filter(|other| other.is_alive() && actor.is_enemy_of(other))
        .filter(|other| {
            other
                .position
                .is_some_and(|cell| are_positions_adjacent(origin, cell))
        })
        .collect()
}

/// `Wait` is always available; `Move` and `Attack` need at least one target.
#[must_use]
pub fn get_available_actions(actor: &Combatant, all: &[Combatant]) -> ActionSet {
    let mut actions = ActionSet::new();
    actions.push(ActionKind::Wait);
    if !get_valid_move_targets(actor, all).is_empty() {
        actions.push(ActionKind::Move);
    }
    if !get_valid_attack_targets(actor, all).is_empty() {
        actions.push(ActionKind::Attack);
    }
    actions
}
