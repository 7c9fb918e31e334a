//! Invader objectives: seeded assignment, progress formulas, and outcome.
//!
//! Every invasion carries exactly one primary objective (destroy the altar)
//! plus up to two secondaries of distinct types drawn from what the dungeon
//! currently offers. Assignment is a pure function of the dungeon and a seed
//! string; [`ObjectiveAssigner`] memoizes it behind an explicit cache.
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::constants::{
    MAX_SECONDARY_OBJECTIVES, REWARD_MULTIPLIER_BASE, REWARD_MULTIPLIER_STEP,
    SLAY_MONSTER_MIN_TIER,
};
use crate::dungeon::{DungeonView, RoomRole};
use crate::numbers::{percent_u8, usize_to_f64};
use crate::rng::seeded_from_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveType {
    DestroyAltar,
    StealTreasure,
    DefileLibrary,
    SealPortal,
    SlayMonster,
    ScoutDungeon,
}

impl ObjectiveType {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::DestroyAltar => "destroy_altar",
            Self::StealTreasure => "steal_treasure",
            Self::DefileLibrary => "defile_library",
            Self::SealPortal => "seal_portal",
            Self::SlayMonster => "slay_monster",
            Self::ScoutDungeon => "scout_dungeon",
        }
    }

    /// Room role whose presence makes this objective eligible.
    #[must_use]
    pub const fn backing_room(self) -> Option<RoomRole> {
        match self {
            Self::DestroyAltar => Some(RoomRole::Altar),
            Self::StealTreasure => Some(RoomRole::Vault),
            Self::DefileLibrary => Some(RoomRole::Library),
            Self::SealPortal => Some(RoomRole::LeyLine),
            Self::SlayMonster | Self::ScoutDungeon => None,
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::DestroyAltar => "Destroy the Altar",
            Self::StealTreasure => "Raid the Vault",
            Self::DefileLibrary => "Burn the Library",
            Self::SealPortal => "Seal the Ley Line",
            Self::SlayMonster => "Slay the Champion",
            Self::ScoutDungeon => "Map the Depths",
        }
    }

    const fn blurb(self) -> &'static str {
        match self {
            Self::DestroyAltar => "Shatter the altar that binds the dungeon together.",
            Self::StealTreasure => "Carry off as much of the hoard as they can hold.",
            Self::DefileLibrary => "Put the forbidden texts to the torch.",
            Self::SealPortal => "Close the ley line feeding the dungeon's magic.",
            Self::SlayMonster => "Hunt down the dungeon's mightiest inhabitant.",
            Self::ScoutDungeon => "Survey the halls for the next expedition.",
        }
    }
}

impl std::fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionObjective {
    pub id: String,
    #[serde(rename = "type")]
    pub objective_type: ObjectiveType,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub is_primary: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub progress: u8,
}

impl InvasionObjective {
    #[must_use]
    pub fn new(objective_type: ObjectiveType, target_id: Option<String>, is_primary: bool) -> Self {
        Self {
            id: format!("objective-{}", objective_type.key()),
            objective_type,
            name: objective_type.title().to_string(),
            description: objective_type.blurb().to_string(),
            target_id,
            is_primary,
            is_completed: false,
            progress: 0,
        }
    }
}

/// Copy of `objective` with progress clamped to `[0, 100]`.
#[must_use]
pub fn update_progress(objective: &InvasionObjective, value: i32) -> InvasionObjective {
    let progress = u8::try_from(value.clamp(0, 100)).unwrap_or(0);
    InvasionObjective {
        progress,
        is_completed: progress >= 100,
        ..objective.clone()
    }
}

#[must_use]
pub fn slay_monster_progress(hp: i32, max_hp: i32) -> u8 {
    if max_hp <= 0 {
        return 0;
    }
    let missing = f64::from(max_hp - hp.clamp(0, max_hp));
    percent_u8(missing, f64::from(max_hp))
}

#[must_use]
pub fn steal_treasure_progress(looted: u32, target: u32) -> u8 {
    percent_u8(f64::from(looted), f64::from(target))
}

#[must_use]
pub fn seal_portal_progress(turns_spent: u32, turns_needed: u32) -> u8 {
    percent_u8(f64::from(turns_spent), f64::from(turns_needed))
}

fn secondary_pool(dungeon: &impl DungeonView) -> Vec<InvasionObjective> {
    let mut pool = Vec::new();
    for objective_type in [
        ObjectiveType::StealTreasure,
        ObjectiveType::DefileLibrary,
        ObjectiveType::SealPortal,
    ] {
        if let Some(role) = objective_type.backing_room()
            && let Some(room) = dungeon.placed_room(role)
        {
            pool.push(InvasionObjective::new(
                objective_type,
                Some(room.id.clone()),
                false,
            ));
        }
    }
    if let Some(champion) = dungeon.strongest_inhabitant(SLAY_MONSTER_MIN_TIER) {
        pool.push(InvasionObjective::new(
            ObjectiveType::SlayMonster,
            Some(champion.id.clone()),
            false,
        ));
    }
    pool.push(InvasionObjective::new(
        ObjectiveType::ScoutDungeon,
        None,
        false,
    ));
    pool
}

/// Pick the primary objective plus up to two distinct secondaries.
///
/// Identical dungeon state and seed always yield the same ordered list.
#[must_use]
pub fn assign_objectives(dungeon: &impl DungeonView, seed: &str) -> Vec<InvasionObjective> {
    let altar = dungeon
        .placed_room(RoomRole::Altar)
        .map(|room| room.id.clone());
    let mut objectives = vec![InvasionObjective::new(
        ObjectiveType::DestroyAltar,
        altar,
        true,
    )];

    let mut pool = secondary_pool(dungeon);
    let mut rng = seeded_from_label(seed);
    pool.shuffle(&mut rng);
    pool.truncate(MAX_SECONDARY_OBJECTIVES);
    log::debug!(
        "objectives: seed {seed} -> {:?}",
        pool.iter().map(|o| o.objective_type).collect::<Vec<_>>()
    );
    objectives.extend(pool);
    objectives
}

fn dungeon_fingerprint(dungeon: &impl DungeonView, seed: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(seed.as_bytes());
    hasher.write_u8(0xFF);
    for role in [
        RoomRole::Altar,
        RoomRole::Vault,
        RoomRole::Library,
        RoomRole::LeyLine,
    ] {
        if let Some(room) = dungeon.placed_room(role) {
            hasher.write(room.id.as_bytes());
        }
        hasher.write_u8(0xFE);
    }
    for inhabitant in dungeon.inhabitants() {
        hasher.write(inhabitant.id.as_bytes());
        hasher.write_u8(inhabitant.tier);
    }
    hasher.finish()
}

/// Memoizing front for [`assign_objectives`].
///
/// Entries are keyed by seed and a fingerprint of the dungeon queries the
/// assignment depends on; call [`ObjectiveAssigner::reset_cache`] to drop them.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveAssigner {
    cache: HashMap<u64, Vec<InvasionObjective>>,
}

impl ObjectiveAssigner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, dungeon: &impl DungeonView, seed: &str) -> Vec<InvasionObjective> {
        let key = dungeon_fingerprint(dungeon, seed);
        if let Some(hit) = self.cache.get(&key) {
            log::trace!("objectives: cache hit for seed {seed}");
            return hit.clone();
        }
        let assigned = assign_objectives(dungeon, seed);
        self.cache.insert(key, assigned.clone());
        assigned
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn reset_cache(&mut self) {
        self.cache.clear();
    }
}

/// Final result of an invasion from the defenders' point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvasionOutcome {
    Victory,
    Defeat,
}

impl std::fmt::Display for InvasionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Victory => f.write_str("victory"),
            Self::Defeat => f.write_str("defeat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveOutcome {
    pub outcome: InvasionOutcome,
    pub altar_destroyed: bool,
    pub reward_multiplier: f64,
}

/// `(total, completed)` counts over secondary objectives.
#[must_use]
pub fn secondary_counts(objectives: &[InvasionObjective]) -> (usize, usize) {
    objectives
        .iter()
        .filter(|objective| !objective.is_primary)
        .fold((0, 0), |(total, completed), objective| {
            (total + 1, completed + usize::from(objective.is_completed))
        })
}

/// Defeat with a zero multiplier if the altar fell; otherwise a victory whose
/// multiplier rises for every secondary prevented and falls for every one lost.
#[must_use]
pub fn resolve_outcome(objectives: &[InvasionObjective]) -> ObjectiveOutcome {
    let primary_completed = objectives
        .iter()
        .any(|objective| objective.is_primary && objective.is_completed);
    if primary_completed {
        return ObjectiveOutcome {
            outcome: InvasionOutcome::Defeat,
            altar_destroyed: true,
            reward_multiplier: 0.0,
        };
    }

    let (total, completed) = secondary_counts(objectives);
    let prevented = usize_to_f64(total - completed);
    let completed = usize_to_f64(completed);
    let reward_multiplier = (REWARD_MULTIPLIER_BASE + prevented * REWARD_MULTIPLIER_STEP
        - completed * REWARD_MULTIPLIER_STEP)
        .max(0.0);
    ObjectiveOutcome {
        outcome: InvasionOutcome::Victory,
        altar_destroyed: false,
        reward_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;
    use crate::dungeon::DungeonSnapshot;

    fn full_dungeon() -> DungeonSnapshot {
        DungeonSnapshot::default()
            .with_room("altar-1", RoomRole::Altar)
            .with_room("vault-1", RoomRole::Vault)
            .with_room("library-1", RoomRole::Library)
            .with_room("ley-1", RoomRole::LeyLine)
            .with_inhabitant("imp", "Imp", 1)
            .with_inhabitant("wyrm", "Wyrm", 3)
    }

    fn types(objectives: &[InvasionObjective]) -> Vec<ObjectiveType> {
        objectives.iter().map(|o| o.objective_type).collect()
    }

    #[test]
    fn primary_targets_altar() {
        let objectives = assign_objectives(&full_dungeon(), "day-3");
        let primary = &objectives[0];
        assert!(primary.is_primary);
        assert_eq!(primary.objective_type, ObjectiveType::DestroyAltar);
        assert_eq!(primary.target_id.as_deref(), Some("altar-1"));
        assert_eq!(objectives.iter().filter(|o| o.is_primary).count(), 1);
    }

    #[test]
    fn secondaries_are_distinct_and_capped() {
        for seed in ["a", "b", "c", "d", "e", "f"] {
            let objectives = assign_objectives(&full_dungeon(), seed);
            let secondaries: Vec<_> = objectives.iter().filter(|o| !o.is_primary).collect();
            assert_eq!(secondaries.len(), 2);
            assert_ne!(secondaries[0].objective_type, secondaries[1].objective_type);
        }
    }

    #[test]
    fn same_seed_same_objectives() {
        let dungeon = full_dungeon();
        let first = assign_objectives(&dungeon, "invasion-42");
        let second = assign_objectives(&dungeon, "invasion-42");
        assert_eq!(types(&first), types(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn sparse_dungeon_falls_back_to_scouting() {
        let dungeon = DungeonSnapshot::default().with_room("altar-1", RoomRole::Altar);
        let objectives = assign_objectives(&dungeon, "any");
        assert_eq!(
            types(&objectives),
            vec![ObjectiveType::DestroyAltar, ObjectiveType::ScoutDungeon]
        );
    }

    #[test]
    fn slay_monster_needs_tier_two() {
        let weak = DungeonSnapshot::default().with_inhabitant("imp", "Imp", 1);
        for seed in ["x", "y", "z"] {
            let objectives = assign_objectives(&weak, seed);
            assert!(
                objectives
                    .iter()
                    .all(|o| o.objective_type != ObjectiveType::SlayMonster)
            );
        }
        let strong = DungeonSnapshot::default().with_inhabitant("wyrm", "Wyrm", 3);
        let objectives = assign_objectives(&strong, "x");
        let slay = objectives
            .iter()
            .find(|o| o.objective_type == ObjectiveType::SlayMonster)
            .expect("two eligible secondaries are both taken");
        assert_eq!(slay.target_id.as_deref(), Some("wyrm"));
    }

    #[test]
    fn assigner_caches_until_reset() {
        let dungeon = full_dungeon();
        let mut assigner = ObjectiveAssigner::new();
        let first = assigner.assign(&dungeon, "seed");
        let second = assigner.assign(&dungeon, "seed");
        assert_eq!(first, second);
        assert_eq!(assigner.cached_entries(), 1);
        let changed = dungeon.clone().with_inhabitant("lich", "Lich", 4);
        let _ = assigner.assign(&changed, "seed");
        assert_eq!(assigner.cached_entries(), 2);
        assigner.reset_cache();
        assert_eq!(assigner.cached_entries(), 0);
        assert_eq!(assigner.assign(&dungeon, "seed"), first);
    }

    #[test]
    fn update_progress_clamps_without_mutating() {
        let objective = InvasionObjective::new(ObjectiveType::ScoutDungeon, None, false);
        let done = update_progress(&objective, 140);
        assert_eq!(done.progress, 100);
        assert!(done.is_completed);
        assert_eq!(objective.progress, 0);
        let negative = update_progress(&objective, -5);
        assert_eq!(negative.progress, 0);
        assert!(!negative.is_completed);
    }

    #[test]
    fn progress_formulas() {
        assert_eq!(slay_monster_progress(25, 100), 75);
        assert_eq!(slay_monster_progress(0, 40), 100);
        assert_eq!(slay_monster_progress(5, 0), 0);
        assert_eq!(steal_treasure_progress(30, 60), 50);
        assert_eq!(steal_treasure_progress(90, 60), 100);
        assert_eq!(seal_portal_progress(1, 3), 33);
        assert_eq!(seal_portal_progress(4, 3), 100);
    }

    fn secondary(completed: bool) -> InvasionObjective {
        InvasionObjective {
            is_completed: completed,
            ..InvasionObjective::new(ObjectiveType::ScoutDungeon, None, false)
        }
    }

    #[test]
    fn completed_primary_is_defeat() {
        let mut primary = InvasionObjective::new(ObjectiveType::DestroyAltar, None, true);
        primary = update_progress(&primary, 100);
        let outcome = resolve_outcome(&[primary, secondary(false)]);
        assert_eq!(outcome.outcome, InvasionOutcome::Defeat);
        assert!(outcome.altar_destroyed);
        assert!(outcome.reward_multiplier.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn multiplier_drops_with_each_completed_secondary() {
        let primary = InvasionObjective::new(ObjectiveType::DestroyAltar, None, true);
        let mut previous = f64::INFINITY;
        for completed in 0..=4 {
            let mut objectives = vec![primary.clone()];
            for idx in 0..4 {
                objectives.push(secondary(idx < completed));
            }
            let outcome = resolve_outcome(&objectives);
            assert_eq!(outcome.outcome, InvasionOutcome::Victory);
            assert!(outcome.reward_multiplier >= 0.0);
            if previous > 0.0 {
                assert!(outcome.reward_multiplier < previous);
            }
            previous = outcome.reward_multiplier;
        }
        let none = resolve_outcome(&[primary, secondary(false), secondary(false)]);
        assert!((none.reward_multiplier - 1.5).abs() < FLOAT_EPSILON);
    }
}
