//! Invasion state machine: altar, turn counter, end arbitration, and results.
//!
//! An [`InvasionState`] is created once per encounter and threaded through the
//! transition functions below. Each transition returns a new state; callers
//! keep the latest value and run [`check_invasion_end`] after every step.
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::combatant::{CombatStats, Combatant, GridPosition, Side, create_combatant};
use crate::config::InvasionConfig;
use crate::content::{InvaderClass, InvaderDefinition};
use crate::numbers::percent_u8;
use crate::objectives::{
    InvasionObjective, InvasionOutcome, ObjectiveType, resolve_outcome, secondary_counts,
    update_progress,
};

/// One invader taking part in an invasion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvaderInstance {
    pub id: String,
    pub definition_id: String,
    pub name: String,
    pub class: InvaderClass,
    pub current_hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

impl InvaderInstance {
    #[must_use]
    pub fn from_definition(id: impl Into<String>, definition: &InvaderDefinition) -> Self {
        Self {
            id: id.into(),
            definition_id: definition.id.clone(),
            name: definition.name.clone(),
            class: definition.class,
            current_hp: definition.stats.hp,
            max_hp: definition.stats.hp,
            attack: definition.stats.attack,
            defense: definition.stats.defense,
            speed: definition.stats.speed,
        }
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    #[must_use]
    pub fn to_combatant(&self, position: Option<GridPosition>) -> Combatant {
        create_combatant(
            self.id.clone(),
            Side::Invader,
            self.name.clone(),
            CombatStats {
                hp: self.current_hp,
                max_hp: self.max_hp,
                attack: self.attack,
                defense: self.defense,
                speed: self.speed,
            },
            position,
        )
    }
}

/// Why an invasion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvasionEndReason {
    AltarDestroyed,
    ObjectivesCompleted,
    AllInvadersEliminated,
    TurnLimitReached,
}

impl InvasionEndReason {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AltarDestroyed => "altar_destroyed",
            Self::ObjectivesCompleted => "objectives_completed",
            Self::AllInvadersEliminated => "all_invaders_eliminated",
            Self::TurnLimitReached => "turn_limit_reached",
        }
    }
}

impl std::fmt::Display for InvasionEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionState {
    pub invasion_id: String,
    pub current_turn: u32,
    pub max_turns: u32,
    pub altar_hp: i32,
    pub altar_max_hp: i32,
    pub invaders: Vec<InvaderInstance>,
    pub objectives: Vec<InvasionObjective>,
    pub defender_count: u32,
    pub defenders_lost: u32,
    pub invaders_killed: u32,
    pub secondaries_for_victory: usize,
    pub is_active: bool,
}

impl InvasionState {
    #[must_use]
    pub fn invader(&self, id: &str) -> Option<&InvaderInstance> {
        self.invaders.iter().find(|invader| invader.id == id)
    }

    #[must_use]
    pub fn alive_invaders(&self) -> usize {
        self.invaders.iter().filter(|invader| invader.is_alive()).count()
    }

    #[must_use]
    pub fn objective(&self, objective_type: ObjectiveType) -> Option<&InvasionObjective> {
        self.objectives
            .iter()
            .find(|objective| objective.objective_type == objective_type)
    }
}

fn derive_invasion_id(invaders: &[InvaderInstance], objectives: &[InvasionObjective]) -> String {
    let mut hasher = XxHash64::with_seed(0);
    for invader in invaders {
        hasher.write(invader.id.as_bytes());
        hasher.write(invader.definition_id.as_bytes());
    }
    for objective in objectives {
        hasher.write(objective.id.as_bytes());
        if let Some(target) = &objective.target_id {
            hasher.write(target.as_bytes());
        }
    }
    format!("invasion-{:016x}", hasher.finish())
}

/// New active invasion using the default rules.
#[must_use]
pub fn create_invasion_state(
    invaders: Vec<InvaderInstance>,
    objectives: Vec<InvasionObjective>,
    defender_count: u32,
) -> InvasionState {
    create_invasion_state_with(&InvasionConfig::default(), invaders, objectives, defender_count)
}

#[must_use]
pub fn create_invasion_state_with(
    config: &InvasionConfig,
    invaders: Vec<InvaderInstance>,
    objectives: Vec<InvasionObjective>,
    defender_count: u32,
) -> InvasionState {
    InvasionState {
        invasion_id: derive_invasion_id(&invaders, &objectives),
        current_turn: 0,
        max_turns: config.max_turns,
        altar_hp: config.altar_max_hp,
        altar_max_hp: config.altar_max_hp,
        invaders,
        objectives,
        defender_count,
        defenders_lost: 0,
        invaders_killed: 0,
        secondaries_for_victory: config.secondaries_for_victory,
        is_active: true,
    }
}

/// First applicable end condition, in priority order.
///
/// Returns `None` while the invasion should continue or once it has ended.
#[must_use]
pub fn check_invasion_end(state: &InvasionState) -> Option<InvasionEndReason> {
    if !state.is_active {
        return None;
    }
    let reason = if state.altar_hp <= 0 {
        Some(InvasionEndReason::AltarDestroyed)
    } else if secondary_counts(&state.objectives).1 >= state.secondaries_for_victory {
        Some(InvasionEndReason::ObjectivesCompleted)
    } else if state.invaders.iter().all(|invader| !invader.is_alive()) {
        Some(InvasionEndReason::AllInvadersEliminated)
    } else if state.current_turn >= state.max_turns {
        Some(InvasionEndReason::TurnLimitReached)
    } else {
        None
    };
    if let Some(reason) = reason {
        log::debug!(
            "invasion {}: ends on turn {} ({reason})",
            state.invasion_id,
            state.current_turn
        );
    }
    reason
}

/// Copy of `state` with the objective of `objective_type` set to `value`.
#[must_use]
pub fn set_objective_progress(
    state: &InvasionState,
    objective_type: ObjectiveType,
    value: i32,
) -> InvasionState {
    let objectives = state
        .objectives
        .iter()
        .map(|objective| {
            if objective.objective_type == objective_type {
                update_progress(objective, value)
            } else {
                objective.clone()
            }
        })
        .collect();
    InvasionState {
        objectives,
        ..state.clone()
    }
}

/// Reduce altar HP (floored at zero) and track it on the primary objective.
#[must_use]
pub fn damage_altar(state: &InvasionState, damage: i32) -> InvasionState {
    let altar_hp = (state.altar_hp - damage.max(0)).max(0);
    let progress = if altar_hp == 0 {
        100
    } else {
        let dealt = f64::from(state.altar_max_hp - altar_hp);
        percent_u8(dealt, f64::from(state.altar_max_hp)).min(99)
    };
    let damaged = InvasionState {
        altar_hp,
        ..state.clone()
    };
    set_objective_progress(&damaged, ObjectiveType::DestroyAltar, i32::from(progress))
}

#[must_use]
pub fn advance_invasion_turn(state: &InvasionState) -> InvasionState {
    InvasionState {
        current_turn: state.current_turn.saturating_add(1),
        ..state.clone()
    }
}

/// Copy of `state` with an invader's HP replaced, clamped to `[0, max_hp]`.
///
/// Does not count kills; use [`mark_invader_killed`] for that.
#[must_use]
pub fn sync_invader_hp(state: &InvasionState, invader_id: &str, hp: i32) -> InvasionState {
    let invaders = state
        .invaders
        .iter()
        .map(|invader| {
            if invader.id == invader_id {
                InvaderInstance {
                    current_hp: hp.clamp(0, invader.max_hp),
                    ..invader.clone()
                }
            } else {
                invader.clone()
            }
        })
        .collect();
    InvasionState {
        invaders,
        ..state.clone()
    }
}

/// Zero an invader's HP and count the kill once.
///
/// Unknown ids and invaders that were already counted leave the state as is.
#[must_use]
pub fn mark_invader_killed(state: &InvasionState, invader_id: &str) -> InvasionState {
    let Some(invader) = state.invader(invader_id) else {
        return state.clone();
    };
    if !invader.is_alive() {
        return state.clone();
    }
    let killed = sync_invader_hp(state, invader_id, 0);
    InvasionState {
        invaders_killed: state.invaders_killed.saturating_add(1),
        ..killed
    }
}

#[must_use]
pub fn record_defender_loss(state: &InvasionState) -> InvasionState {
    InvasionState {
        defenders_lost: state.defenders_lost.saturating_add(1),
        ..state.clone()
    }
}

#[must_use]
pub fn end_invasion(state: &InvasionState) -> InvasionState {
    InvasionState {
        is_active: false,
        ..state.clone()
    }
}

/// Terminal summary of an invasion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedInvasionResult {
    pub invasion_id: String,
    pub day: u32,
    pub outcome: InvasionOutcome,
    pub end_reason: InvasionEndReason,
    pub turns_taken: u32,
    pub invader_count: u32,
    pub invaders_killed: u32,
    pub defender_count: u32,
    pub defenders_lost: u32,
    pub objectives_completed: u32,
    pub objectives_total: u32,
    pub reward_multiplier: f64,
}

impl DetailedInvasionResult {
    #[must_use]
    pub fn is_victory(&self) -> bool {
        self.outcome == InvasionOutcome::Victory
    }
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Project a finished state into its result record.
///
/// Outcome and multiplier come straight from [`resolve_outcome`]; objective
/// counts cover secondary objectives only.
#[must_use]
pub fn resolve_detailed_result(
    state: &InvasionState,
    day: u32,
    end_reason: InvasionEndReason,
) -> DetailedInvasionResult {
    let resolved = resolve_outcome(&state.objectives);
    let (total, completed) = secondary_counts(&state.objectives);
    DetailedInvasionResult {
        invasion_id: state.invasion_id.clone(),
        day,
        outcome: resolved.outcome,
        end_reason,
        turns_taken: state.current_turn,
        invader_count: count_u32(state.invaders.len()),
        invaders_killed: state.invaders_killed,
        defender_count: state.defender_count,
        defenders_lost: state.defenders_lost,
        objectives_completed: count_u32(completed),
        objectives_total: count_u32(total),
        reward_multiplier: resolved.reward_multiplier,
    }
}

/// How an invasion was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvasionKind {
    Scheduled,
}

/// Persisted log record for one invasion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionHistoryEntry {
    pub day: u32,
    #[serde(rename = "type")]
    pub kind: InvasionKind,
    pub outcome: InvasionOutcome,
    pub end_reason: InvasionEndReason,
    pub invader_count: u32,
    pub invaders_killed: u32,
    pub defender_count: u32,
    pub defenders_lost: u32,
    pub turns_taken: u32,
}

#[must_use]
pub fn create_history_entry(result: &DetailedInvasionResult) -> InvasionHistoryEntry {
    InvasionHistoryEntry {
        day: result.day,
        kind: InvasionKind::Scheduled,
        outcome: result.outcome,
        end_reason: result.end_reason,
        invader_count: result.invader_count,
        invaders_killed: result.invaders_killed,
        defender_count: result.defender_count,
        defenders_lost: result.defenders_lost,
        turns_taken: result.turns_taken,
    }
}
