//! Invasion Combat Core
//!
//! Platform-agnostic resolution of dungeon invasions: initiative, grid
//! targeting, attack rolls, AI turns, objectives, the invasion state machine,
//! and the reward economy that follows. Every transition is a pure function
//! over plain values; randomness is always passed in explicitly.

pub mod actions;
pub mod ai;
pub mod combatant;
pub mod config;
pub mod constants;
pub mod content;
pub mod dungeon;
pub mod encounter;
pub mod engine;
pub mod history;
pub mod invasion;
pub mod numbers;
pub mod objectives;
pub mod prisoners;
pub mod rewards;
pub mod rng;
pub mod schedule;
pub mod targeting;
pub mod turn_queue;

// Re-export commonly used types
pub use actions::{
    ActionError, ActionOutcome, ActionResult, CombatResult, PlayerAction, execute_attack,
    execute_move, execute_player_action, execute_wait, resolve_attack_roll,
};
pub use ai::{AiDecision, execute_ai_turn, resolve_ai_action};
pub use combatant::{CombatStats, Combatant, GridPosition, Side, create_combatant};
pub use config::{InvasionConfig, InvasionConfigError, ObjectivePacing};
pub use content::{ContentLookup, InvaderCatalog, InvaderClass, InvaderDefinition, InvaderStats};
pub use dungeon::{DungeonSnapshot, DungeonView, Inhabitant, PlacedRoom, RoomRole};
pub use encounter::{Encounter, EncounterEvent, begin_encounter, run_encounter, step_encounter};
pub use engine::{InvasionAftermath, InvasionEngine, Settlement, muster_defenders};
pub use history::{DefenseRecord, InvasionHistory};
pub use invasion::{
    DetailedInvasionResult, InvaderInstance, InvasionEndReason, InvasionHistoryEntry,
    InvasionKind, InvasionState, advance_invasion_turn, check_invasion_end, create_history_entry,
    create_invasion_state, create_invasion_state_with, damage_altar, end_invasion,
    mark_invader_killed, record_defender_loss, resolve_detailed_result,
};
pub use objectives::{
    InvasionObjective, InvasionOutcome, ObjectiveAssigner, ObjectiveOutcome, ObjectiveType,
    assign_objectives, resolve_outcome, seal_portal_progress, slay_monster_progress,
    steal_treasure_progress, update_progress,
};
pub use prisoners::{
    CapturedPrisoner, PrisonerAction, PrisonerOutcome, handle_prisoner, roll_prisoner_captures,
};
pub use rewards::{
    DefensePenalties, DefenseRewards, ResourceKind, ResourceLedger, calculate_defense_penalties,
    calculate_defense_rewards, get_altar_rebuild_cost,
};
pub use rng::{CountingRng, FixedRoll, InvasionRng, ScriptedRolls};
pub use schedule::{compose_invasion_party, schedule_next_invasion};
pub use targeting::{
    ActionKind, are_positions_adjacent, get_adjacent_positions, get_available_actions,
    get_valid_attack_targets, get_valid_move_targets,
};
pub use turn_queue::{
    TurnQueue, advance_turn, build_turn_queue, get_alive_combatants, get_current_actor,
    is_round_complete, start_new_round,
};
