//! High-level facade tying content, objectives, encounters and the economy
//! together for one dungeon.
use serde::{Deserialize, Serialize};

use crate::combatant::{CombatStats, Combatant, GridPosition, Side, create_combatant};
use crate::config::{InvasionConfig, InvasionConfigError};
use crate::constants::{
    DEFENDER_ATTACK_PER_TIER, DEFENDER_BASE_ATTACK, DEFENDER_BASE_DEFENSE, DEFENDER_BASE_HP,
    DEFENDER_BASE_SPEED, DEFENDER_DEFENSE_PER_TIER, DEFENDER_GUARD_ROW, DEFENDER_HP_PER_TIER,
};
use crate::content::{ContentLookup, InvaderClass};
use crate::dungeon::{DungeonView, Inhabitant};
use crate::encounter::{Encounter, EncounterEvent, begin_encounter};
use crate::invasion::{
    DetailedInvasionResult, InvaderInstance, InvasionEndReason, InvasionHistoryEntry,
    create_history_entry, create_invasion_state_with, resolve_detailed_result,
};
use crate::objectives::{InvasionOutcome, ObjectiveAssigner};
use crate::prisoners::roll_prisoner_captures;
use crate::rewards::{
    DefensePenalties, DefenseRewards, ResourceLedger, calculate_defense_penalties,
    calculate_defense_rewards, get_altar_rebuild_cost,
};
use crate::rng::InvasionRng;
use crate::schedule::{compose_invasion_party, schedule_next_invasion};

/// Combat stat block for an inhabitant of the given tier.
#[must_use]
pub fn inhabitant_stats(tier: u8) -> CombatStats {
    let tier = i32::from(tier);
    let hp = DEFENDER_BASE_HP + DEFENDER_HP_PER_TIER * tier;
    CombatStats {
        hp,
        max_hp: hp,
        attack: DEFENDER_BASE_ATTACK + DEFENDER_ATTACK_PER_TIER * tier,
        defense: DEFENDER_BASE_DEFENSE + DEFENDER_DEFENSE_PER_TIER * tier,
        speed: DEFENDER_BASE_SPEED + tier,
    }
}

/// Line up every inhabitant on the guard row, one column per inhabitant.
#[must_use]
pub fn muster_defenders(inhabitants: &[Inhabitant]) -> Vec<Combatant> {
    inhabitants
        .iter()
        .enumerate()
        .map(|(slot, inhabitant)| {
            let column = i32::try_from(slot).unwrap_or(i32::MAX);
            create_combatant(
                inhabitant.id.clone(),
                Side::Defender,
                inhabitant.name.clone(),
                inhabitant_stats(inhabitant.tier),
                Some(GridPosition::new(column, DEFENDER_GUARD_ROW)),
            )
        })
        .collect()
}

/// Economy deltas owed once an invasion is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    Rewards(DefenseRewards),
    Penalties(DefensePenalties),
}

/// Everything the wider game applies after an invasion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvasionAftermath {
    pub result: DetailedInvasionResult,
    pub history_entry: InvasionHistoryEntry,
    pub settlement: Settlement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altar_rebuild_cost: Option<ResourceLedger>,
}

/// Invasion lifecycle for one dungeon backed by a content source.
pub struct InvasionEngine<C>
where
    C: ContentLookup,
{
    content: C,
    config: InvasionConfig,
    assigner: ObjectiveAssigner,
    planned_day: Option<u32>,
}

impl<C> InvasionEngine<C>
where
    C: ContentLookup,
{
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(content: C, config: InvasionConfig) -> Result<Self, InvasionConfigError> {
        config.validate()?;
        Ok(Self {
            content,
            config,
            assigner: ObjectiveAssigner::new(),
            planned_day: None,
        })
    }

    pub fn with_defaults(content: C) -> Self {
        Self {
            content,
            config: InvasionConfig::default(),
            assigner: ObjectiveAssigner::new(),
            planned_day: None,
        }
    }

    pub const fn content(&self) -> &C {
        &self.content
    }

    pub const fn config(&self) -> &InvasionConfig {
        &self.config
    }

    pub fn reset_objective_cache(&mut self) {
        self.assigner.reset_cache();
    }

    #[must_use]
    pub fn cached_objective_sets(&self) -> usize {
        self.assigner.cached_entries()
    }

    pub fn next_invasion_day(&self, current_day: u32, rngs: &InvasionRng) -> u32 {
        schedule_next_invasion(current_day, &mut *rngs.schedule())
    }

    /// Assign objectives, draw a party, and seat both sides for `day`.
    ///
    /// Cached objective sets only live for the day being planned.
    pub fn plan_invasion(
        &mut self,
        day: u32,
        dungeon: &impl DungeonView,
        rngs: &InvasionRng,
    ) -> Encounter {
        if self.planned_day != Some(day) {
            self.assigner.reset_cache();
            self.planned_day = Some(day);
        }
        let objectives = self
            .assigner
            .assign(dungeon, &format!("{}:day-{day}", rngs.seed()));
        let party = compose_invasion_party(day, &self.content, &mut *rngs.schedule());
        let defenders = muster_defenders(dungeon.inhabitants());
        let defender_count = u32::try_from(defenders.len()).unwrap_or(u32::MAX);
        let state = create_invasion_state_with(&self.config, party, objectives, defender_count);
        log::debug!(
            "engine: planned {} for day {day} with {} invaders against {defender_count} defenders",
            state.invasion_id,
            state.invaders.len()
        );
        begin_encounter(state, &defenders, self.config.pacing)
    }

    /// Settle a finished encounter.
    ///
    /// Victories earn rewards plus a capture roll for every fallen invader;
    /// defeats cost gold and list the inhabitants that fell. Invaders that
    /// complete their secondary objectives escape with a win, so that ending
    /// is settled as a defeat even though the altar stands. An encounter that
    /// never reached an end condition is settled as having run out of turns.
    pub fn conclude_invasion(
        &self,
        encounter: &Encounter,
        day: u32,
        current_gold: i32,
        rngs: &InvasionRng,
    ) -> InvasionAftermath {
        let end_reason = encounter
            .end_reason
            .unwrap_or(InvasionEndReason::TurnLimitReached);
        let mut result = resolve_detailed_result(&encounter.state, day, end_reason);
        if end_reason == InvasionEndReason::ObjectivesCompleted {
            result.outcome = InvasionOutcome::Defeat;
        }
        let history_entry = create_history_entry(&result);

        let settlement = if result.is_victory() {
            let classes: Vec<InvaderClass> = encounter
                .state
                .invaders
                .iter()
                .map(|invader| invader.class)
                .collect();
            let mut rewards = calculate_defense_rewards(&result, &classes, &mut *rngs.loot());
            let fallen: Vec<InvaderInstance> = encounter
                .state
                .invaders
                .iter()
                .filter(|invader| !invader.is_alive())
                .cloned()
                .collect();
            rewards.captured_prisoners = roll_prisoner_captures(
                &fallen,
                &self.content,
                day,
                &mut *rngs.capture(),
            );
            Settlement::Rewards(rewards)
        } else {
            let mut penalties = calculate_defense_penalties(&result, current_gold);
            penalties.killed_inhabitant_ids = encounter
                .log
                .iter()
                .filter_map(|event| match event {
                    EncounterEvent::DefenderFell { defender_id, .. } => Some(defender_id.clone()),
                    _ => None,
                })
                .collect();
            Settlement::Penalties(penalties)
        };

        let altar_rebuild_cost = (result.end_reason == InvasionEndReason::AltarDestroyed)
            .then(get_altar_rebuild_cost);
        InvasionAftermath {
            result,
            history_entry,
            settlement,
            altar_rebuild_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InvaderCatalog;
    use crate::dungeon::{DungeonSnapshot, RoomRole};
    use crate::encounter::run_encounter;
    use crate::objectives::{ObjectiveType, resolve_outcome, update_progress};

    fn dungeon() -> DungeonSnapshot {
        DungeonSnapshot::default()
            .with_room("altar-room", RoomRole::Altar)
            .with_room("vault-room", RoomRole::Vault)
            .with_inhabitant("goblin", "Goblin", 1)
            .with_inhabitant("ogre", "Ogre", 3)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = InvasionConfig {
            max_turns: 0,
            ..InvasionConfig::default()
        };
        assert!(InvasionEngine::new(InvaderCatalog::load_from_static(), config).is_err());
    }

    #[test]
    fn muster_scales_with_tier() {
        let defenders = muster_defenders(dungeon().inhabitants());
        assert_eq!(defenders.len(), 2);
        assert_eq!(defenders[0].hp, 20);
        assert_eq!(defenders[1].hp, 36);
        assert_eq!(defenders[1].attack, 10);
        assert_eq!(defenders[1].position, Some(GridPosition::new(1, DEFENDER_GUARD_ROW)));
        assert!(defenders.iter().all(|d| d.side == Side::Defender));
    }

    #[test]
    fn plan_is_reproducible() {
        let mut engine = InvasionEngine::with_defaults(InvaderCatalog::load_from_static());
        let first = engine.plan_invasion(24, &dungeon(), &InvasionRng::from_user_seed(5));
        engine.reset_objective_cache();
        let second = engine.plan_invasion(24, &dungeon(), &InvasionRng::from_user_seed(5));
        assert_eq!(first, second);
        assert_eq!(first.state.invaders.len(), 4);
        assert_eq!(first.state.defender_count, 2);
        assert_eq!(
            first.state.objectives[0].objective_type,
            ObjectiveType::DestroyAltar
        );
        assert_eq!(
            first.state.objectives[0].target_id.as_deref(),
            Some("altar-room")
        );
    }

    #[test]
    fn undefended_dungeon_pays_penalties() {
        let mut engine = InvasionEngine::with_defaults(InvaderCatalog::load_from_static());
        let bare = DungeonSnapshot::default().with_room("altar-room", RoomRole::Altar);
        let rngs = InvasionRng::from_user_seed(9);
        let planned = engine.plan_invasion(12, &bare, &rngs);
        let finished = run_encounter(&planned, &mut *rngs.combat());
        let aftermath = engine.conclude_invasion(&finished, 12, 200, &rngs);
        assert_eq!(aftermath.result.end_reason, InvasionEndReason::AltarDestroyed);
        assert!(!aftermath.result.is_victory());
        let Settlement::Penalties(penalties) = &aftermath.settlement else {
            panic!("expected penalties");
        };
        assert_eq!(penalties.gold_lost, 40);
        assert!(penalties.killed_inhabitant_ids.is_empty());
        assert!(aftermath.altar_rebuild_cost.is_some());
        assert_eq!(aftermath.history_entry.day, 12);
    }

    #[test]
    fn victory_pays_rewards() {
        let mut engine = InvasionEngine::with_defaults(InvaderCatalog::load_from_static());
        let rngs = InvasionRng::from_user_seed(1);
        let mut planned = engine.plan_invasion(12, &dungeon(), &rngs);
        for invader in &mut planned.state.invaders {
            invader.current_hp = 0;
        }
        planned.state.invaders_killed = 3;
        let aftermath = engine.conclude_invasion(&planned, 12, 500, &rngs);
        assert_eq!(
            aftermath.result.end_reason,
            InvasionEndReason::TurnLimitReached
        );
        assert!(aftermath.result.is_victory());
        let Settlement::Rewards(rewards) = &aftermath.settlement else {
            panic!("expected rewards");
        };
        assert_eq!(rewards.reputation_gain, 5 + 3 + 3);
        assert!(rewards.gold_gain > 0);
        assert!(aftermath.altar_rebuild_cost.is_none());
    }

    #[test]
    fn survivors_are_never_captured() {
        let mut engine = InvasionEngine::with_defaults(InvaderCatalog::load_from_static());
        for seed in 0..20 {
            let rngs = InvasionRng::from_user_seed(seed);
            let planned = engine.plan_invasion(12, &dungeon(), &rngs);
            let aftermath = engine.conclude_invasion(&planned, 12, 100, &rngs);
            assert!(aftermath.result.is_victory());
            let Settlement::Rewards(rewards) = &aftermath.settlement else {
                panic!("expected rewards");
            };
            assert!(rewards.captured_prisoners.is_empty());
        }
    }

    #[test]
    fn completed_objectives_settle_as_a_loss() {
        let mut engine = InvasionEngine::with_defaults(InvaderCatalog::load_from_static());
        let rngs = InvasionRng::from_user_seed(4);
        let mut planned = engine.plan_invasion(16, &dungeon(), &rngs);
        for objective in &mut planned.state.objectives {
            if !objective.is_primary {
                *objective = update_progress(objective, 100);
            }
        }
        planned.end_reason = Some(InvasionEndReason::ObjectivesCompleted);
        let resolved = resolve_outcome(&planned.state.objectives);
        assert_eq!(resolved.outcome, InvasionOutcome::Victory);

        let aftermath = engine.conclude_invasion(&planned, 16, 100, &rngs);
        assert_eq!(aftermath.result.outcome, InvasionOutcome::Defeat);
        assert_eq!(aftermath.history_entry.outcome, InvasionOutcome::Defeat);
        assert!(
            (aftermath.result.reward_multiplier - resolved.reward_multiplier).abs()
                < crate::constants::FLOAT_EPSILON
        );
        let Settlement::Penalties(penalties) = &aftermath.settlement else {
            panic!("expected penalties");
        };
        assert_eq!(penalties.gold_lost, 20);
        assert!(!penalties.resource_losses.is_empty());
        assert!(aftermath.altar_rebuild_cost.is_none());
    }

    #[test]
    fn objective_cache_holds_one_day() {
        let mut engine = InvasionEngine::with_defaults(InvaderCatalog::load_from_static());
        let rngs = InvasionRng::from_user_seed(8);
        for day in [12, 19, 27, 33] {
            let _ = engine.plan_invasion(day, &dungeon(), &rngs);
            assert_eq!(engine.cached_objective_sets(), 1);
        }
        let first = engine.plan_invasion(33, &dungeon(), &rngs);
        assert_eq!(engine.cached_objective_sets(), 1);
        assert_eq!(
            first.state.objectives,
            engine.plan_invasion(33, &dungeon(), &rngs).state.objectives
        );
    }
}
