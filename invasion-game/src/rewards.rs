//! Post-invasion economy: defense rewards, defeat penalties, altar rebuild cost.
//!
//! Everything here computes deltas only; applying them to the persistent
//! resource ledger is the caller's job.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    ALTAR_REBUILD_CRYSTALS, ALTAR_REBUILD_FLUX, ALTAR_REBUILD_GOLD, CRYSTALS_LOST_PER_OBJECTIVE,
    DEFEAT_GOLD_LOSS_FRACTION, DEFEAT_REPUTATION_LOSS, ESSENCE_LOST_PER_OBJECTIVE,
    EXPERIENCE_PER_INVADER, REPUTATION_BASE_GAIN, REPUTATION_FLAWLESS_BONUS, REPUTATION_PER_KILL,
};
use crate::content::InvaderClass;
use crate::invasion::DetailedInvasionResult;
use crate::numbers::round_f64_to_i32;
use crate::prisoners::CapturedPrisoner;
use crate::rng::lerp_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Gold,
    Food,
    Crystals,
    Essence,
    Flux,
    Research,
}

impl ResourceKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Food => "food",
            Self::Crystals => "crystals",
            Self::Essence => "essence",
            Self::Flux => "flux",
            Self::Research => "research",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Resource amounts keyed by kind, iterated in a stable order.
pub type ResourceLedger = BTreeMap<ResourceKind, i32>;

/// Per-class loot ranges; both ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootTable {
    pub gold_min: i32,
    pub gold_max: i32,
    pub bonus_min: i32,
    pub bonus_max: i32,
    pub bonus_resource: ResourceKind,
}

#[must_use]
pub const fn loot_table(class: InvaderClass) -> LootTable {
    let (gold_min, gold_max, bonus_min, bonus_max, bonus_resource) = match class {
        InvaderClass::Warrior => (15, 30, 5, 10, ResourceKind::Crystals),
        InvaderClass::Rogue => (25, 45, 2, 6, ResourceKind::Essence),
        InvaderClass::Mage => (10, 20, 4, 8, ResourceKind::Flux),
        InvaderClass::Cleric => (10, 25, 3, 7, ResourceKind::Essence),
        InvaderClass::Paladin => (20, 35, 6, 12, ResourceKind::Crystals),
        InvaderClass::Ranger => (10, 20, 8, 15, ResourceKind::Food),
    };
    LootTable {
        gold_min,
        gold_max,
        bonus_min,
        bonus_max,
        bonus_resource,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefenseRewards {
    pub gold_gain: i32,
    pub experience_gain: i32,
    pub resource_gains: ResourceLedger,
    pub reputation_gain: i32,
    pub captured_prisoners: Vec<CapturedPrisoner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefensePenalties {
    pub gold_lost: i32,
    pub reputation_loss: i32,
    pub resource_losses: ResourceLedger,
    pub killed_inhabitant_ids: Vec<String>,
}

fn scale(amount: i32, multiplier: f64) -> i32 {
    round_f64_to_i32(f64::from(amount) * multiplier.max(0.0))
}

/// Reputation, experience and class loot earned by repelling an invasion.
///
/// Each class draws gold then its bonus resource; totals are scaled by the
/// result's reward multiplier. Prisoners are rolled separately.
pub fn calculate_defense_rewards(
    result: &DetailedInvasionResult,
    invader_classes: &[InvaderClass],
    rng: &mut impl Rng,
) -> DefenseRewards {
    let flawless = result.objectives_total > 0 && result.objectives_completed == 0;
    let kills = i32::try_from(result.invaders_killed).unwrap_or(i32::MAX);
    let reputation_gain = REPUTATION_BASE_GAIN
        .saturating_add(kills.saturating_mul(REPUTATION_PER_KILL))
        .saturating_add(if flawless { REPUTATION_FLAWLESS_BONUS } else { 0 });
    let experience_gain = round_f64_to_i32(
        f64::from(result.invader_count) * EXPERIENCE_PER_INVADER * result.reward_multiplier,
    );

    let mut raw_gold = 0_i32;
    let mut raw_bonus = ResourceLedger::new();
    for class in invader_classes {
        let table = loot_table(*class);
        raw_gold = raw_gold.saturating_add(lerp_range(rng, table.gold_min, table.gold_max));
        let bonus = lerp_range(rng, table.bonus_min, table.bonus_max);
        *raw_bonus.entry(table.bonus_resource).or_insert(0) += bonus;
    }

    let resource_gains = raw_bonus
        .into_iter()
        .map(|(kind, amount)| (kind, scale(amount, result.reward_multiplier)))
        .filter(|(_, amount)| *amount > 0)
        .collect();

    DefenseRewards {
        gold_gain: scale(raw_gold, result.reward_multiplier),
        experience_gain: experience_gain.max(0),
        resource_gains,
        reputation_gain,
        captured_prisoners: Vec::new(),
    }
}

/// Losses suffered when the defense fails.
#[must_use]
pub fn calculate_defense_penalties(
    result: &DetailedInvasionResult,
    current_gold: i32,
) -> DefensePenalties {
    let completed = i32::try_from(result.objectives_completed).unwrap_or(i32::MAX);
    let mut resource_losses = ResourceLedger::new();
    if completed > 0 {
        resource_losses.insert(
            ResourceKind::Crystals,
            CRYSTALS_LOST_PER_OBJECTIVE.saturating_mul(completed),
        );
        resource_losses.insert(
            ResourceKind::Essence,
            ESSENCE_LOST_PER_OBJECTIVE.saturating_mul(completed),
        );
    }
    DefensePenalties {
        gold_lost: round_f64_to_i32(f64::from(current_gold.max(0)) * DEFEAT_GOLD_LOSS_FRACTION),
        reputation_loss: DEFEAT_REPUTATION_LOSS,
        resource_losses,
        killed_inhabitant_ids: Vec::new(),
    }
}

/// Cost to rebuild a destroyed altar; a new ledger on every call.
#[must_use]
pub fn get_altar_rebuild_cost() -> ResourceLedger {
    ResourceLedger::from([
        (ResourceKind::Crystals, ALTAR_REBUILD_CRYSTALS),
        (ResourceKind::Gold, ALTAR_REBUILD_GOLD),
        (ResourceKind::Flux, ALTAR_REBUILD_FLUX),
    ])
}
