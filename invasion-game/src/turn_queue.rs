//! Speed-ordered initiative scheduling.
//!
//! A [`TurnQueue`] holds every combatant of an encounter sorted by speed
//! (descending) with defenders ahead of invaders at equal speed. Each round
//! every living combatant acts once; [`start_new_round`] drops the dead and
//! re-sorts by current speed.
use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnQueue {
    pub combatants: Vec<Combatant>,
    pub current_index: usize,
    pub round: u32,
}

impl TurnQueue {
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Combatant> {
        self.combatants.iter().find(|combatant| combatant.id == id)
    }

    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.combatants
            .iter()
            .position(|combatant| combatant.id == id)
    }

    /// Copy of the queue with one combatant replaced by `update(combatant)`.
    #[must_use]
    pub fn map_combatant(&self, id: &str, update: impl FnOnce(&Combatant) -> Combatant) -> Self {
        let mut combatants = self.combatants.clone();
        if let Some(slot) = combatants.iter_mut().find(|combatant| combatant.id == id) {
            *slot = update(slot);
        }
        Self {
            combatants,
            ..self.clone()
        }
    }
}

fn sort_by_initiative(combatants: &mut [Combatant]) {
    combatants.sort_by(|a, b| {
        b.speed
            .cmp(&a.speed)
            .then_with(|| a.side.initiative_rank().cmp(&b.side.initiative_rank()))
    });
}

fn next_eligible_from(combatants: &[Combatant], start: usize) -> usize {
    combatants
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, combatant)| combatant.is_eligible())
        .map_or(combatants.len(), |(idx, _)| idx)
}

/// Sort combatants into initiative order for round one.
#[must_use]
pub fn build_turn_queue(combatants: &[Combatant]) -> TurnQueue {
    let mut ordered = combatants.to_vec();
    sort_by_initiative(&mut ordered);
    TurnQueue {
        combatants: ordered,
        current_index: 0,
        round: 1,
    }
}

/// First living combatant at or after the cursor that has not acted.
#[must_use]
pub fn get_current_actor(queue: &TurnQueue) -> Option<&Combatant> {
    queue
        .combatants
        .get(next_eligible_from(&queue.combatants, queue.current_index))
}

/// Mark the current actor as done and move the cursor to the next eligible slot.
#[must_use]
pub fn advance_turn(queue: &TurnQueue) -> TurnQueue {
    let actor_idx = next_eligible_from(&queue.combatants, queue.current_index);
    if actor_idx >= queue.combatants.len() {
        return queue.clone();
    }
    let mut combatants = queue.combatants.clone();
    combatants[actor_idx] = combatants[actor_idx].with_acted(true);
    let current_index = next_eligible_from(&combatants, actor_idx + 1);
    TurnQueue {
        combatants,
        current_index,
        round: queue.round,
    }
}

#[must_use]
pub fn is_round_complete(queue: &TurnQueue) -> bool {
    queue
        .combatants
        .iter()
        .filter(|combatant| combatant.is_alive())
        .all(|combatant| combatant.has_acted)
}

/// Drop the dead, reset `has_acted`, and re-sort by current speed.
#[must_use]
pub fn start_new_round(queue: &TurnQueue) -> TurnQueue {
    let mut survivors: Vec<Combatant> = queue
        .combatants
        .iter()
        .filter(|combatant| combatant.is_alive())
        .map(|combatant| combatant.with_acted(false))
        .collect();
    sort_by_initiative(&mut survivors);
    log::trace!(
        "initiative: round {} begins with {} combatants",
        queue.round.saturating_add(1),
        survivors.len()
    );
    TurnQueue {
        combatants: survivors,
        current_index: 0,
        round: queue.round.saturating_add(1),
    }
}

#[must_use]
pub fn get_alive_combatants(queue: &TurnQueue) -> Vec<&Combatant> {
    queue
        .combatants
        .iter()
        .filter(|combatant| combatant.is_alive())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatStats, Side, create_combatant};

    fn unit(id: &str, side: Side, speed: i32, hp: i32) -> Combatant {
        create_combatant(
            id,
            side,
            id,
            CombatStats {
                hp,
                max_hp: 20,
                attack: 5,
                defense: 1,
                speed,
            },
            None,
        )
    }

    fn ids(queue: &TurnQueue) -> Vec<&str> {
        queue.combatants.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn build_sorts_by_speed_then_defender_first() {
        let queue = build_turn_queue(&[
            unit("slow", Side::Defender, 2, 10),
            unit("inv-fast", Side::Invader, 6, 10),
            unit("def-fast", Side::Defender, 6, 10),
            unit("mid", Side::Invader, 4, 10),
        ]);
        assert_eq!(ids(&queue), vec!["def-fast", "inv-fast", "mid", "slow"]);
        assert_eq!(queue.round, 1);
        assert_eq!(queue.current_index, 0);
    }

    #[test]
    fn current_actor_skips_dead() {
        let queue = build_turn_queue(&[
            unit("dead", Side::Defender, 9, 0),
            unit("alive", Side::Invader, 3, 5),
        ]);
        assert_eq!(get_current_actor(&queue).map(|c| c.id.as_str()), Some("alive"));
    }

    #[test]
    fn empty_or_all_dead_has_no_actor() {
        assert!(get_current_actor(&build_turn_queue(&[])).is_none());
        let queue = build_turn_queue(&[unit("a", Side::Defender, 1, 0)]);
        assert!(get_current_actor(&queue).is_none());
        assert!(is_round_complete(&queue));
    }

    #[test]
    fn advance_marks_actor_and_leaves_original() {
        let queue = build_turn_queue(&[
            unit("a", Side::Defender, 5, 10),
            unit("b", Side::Invader, 4, 0),
            unit("c", Side::Invader, 3, 10),
        ]);
        let next = advance_turn(&queue);
        assert!(next.combatants[0].has_acted);
        assert!(!queue.combatants[0].has_acted);
        assert_eq!(next.current_index, 2);
        assert_eq!(get_current_actor(&next).map(|c| c.id.as_str()), Some("c"));

        let done = advance_turn(&next);
        assert_eq!(done.current_index, 3);
        assert!(get_current_actor(&done).is_none());
        assert!(is_round_complete(&done));
        assert_eq!(advance_turn(&done), done);
    }

    #[test]
    fn new_round_drops_dead_and_resorts() {
        let queue = build_turn_queue(&[
            unit("a", Side::Defender, 5, 10),
            unit("b", Side::Invader, 4, 10),
        ]);
        let mut queue = advance_turn(&advance_turn(&queue));
        assert!(is_round_complete(&queue));
        queue = queue.map_combatant("a", |c| c.with_hp(0));
        queue = queue.map_combatant("b", |c| c.with_speed(8));
        let next = start_new_round(&queue);
        assert_eq!(next.round, 2);
        assert_eq!(ids(&next), vec!["b"]);
        assert!(next.combatants.iter().all(|c| !c.has_acted));
        assert_eq!(get_alive_combatants(&next).len(), 1);
    }
}
