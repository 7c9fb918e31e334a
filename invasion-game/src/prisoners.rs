//! Prisoner capture and disposition.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONVERT_CORRUPTION_CHANGE, EXECUTE_FEAR_CHANGE, EXECUTE_REPUTATION_CHANGE,
    EXPERIMENT_CORRUPTION_CHANGE, PRISONER_CAPTURE_CHANCE, SACRIFICE_BOON_MAX, SACRIFICE_BOON_MIN,
    SACRIFICE_CORRUPTION_CHANGE, SACRIFICE_REPUTATION_CHANGE,
};
use crate::content::{ContentLookup, InvaderClass, InvaderStats};
use crate::invasion::InvaderInstance;
use crate::numbers::round_f64_to_i32;
use crate::rewards::{ResourceKind, ResourceLedger};
use crate::rng::{lerp_range, unit};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPrisoner {
    pub id: String,
    pub invader_class: InvaderClass,
    pub name: String,
    pub stats: InvaderStats,
    pub capture_day: u32,
}

/// Roll a capture for every invader whose definition resolves.
///
/// Unresolvable definitions are skipped without consuming a draw.
pub fn roll_prisoner_captures(
    invaders: &[InvaderInstance],
    content: &impl ContentLookup,
    day: u32,
    rng: &mut impl Rng,
) -> Vec<CapturedPrisoner> {
    let mut captured = Vec::new();
    for invader in invaders {
        let Some(definition) = content.invader(&invader.definition_id) else {
            log::debug!(
                "prisoners: no definition {} for {}",
                invader.definition_id,
                invader.id
            );
            continue;
        };
        if unit(rng) < PRISONER_CAPTURE_CHANCE {
            captured.push(CapturedPrisoner {
                id: format!("prisoner-{day}-{}", invader.id),
                invader_class: definition.class,
                name: invader.name.clone(),
                stats: definition.stats,
                capture_day: day,
            });
        }
    }
    log::debug!(
        "prisoners: captured {} of {} on day {day}",
        captured.len(),
        invaders.len()
    );
    captured
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrisonerAction {
    Execute,
    Ransom,
    Convert,
    Sacrifice,
    Experiment,
}

/// Deltas produced by disposing of a prisoner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrisonerOutcome {
    pub success: bool,
    pub gold_gain: i32,
    pub fear_change: i32,
    pub reputation_change: i32,
    pub corruption_change: i32,
    pub resource_gains: ResourceLedger,
}

#[must_use]
pub const fn ransom_value(class: InvaderClass) -> i32 {
    match class {
        InvaderClass::Paladin => 50,
        InvaderClass::Cleric => 40,
        InvaderClass::Warrior => 35,
        InvaderClass::Mage => 30,
        InvaderClass::Rogue => 25,
        InvaderClass::Ranger => 20,
    }
}

/// Chance that a prisoner of `class` turns to the dungeon's side.
#[must_use]
pub const fn conversion_rate(class: InvaderClass) -> f64 {
    match class {
        InvaderClass::Paladin => 0.05,
        InvaderClass::Cleric => 0.10,
        InvaderClass::Mage => 0.20,
        InvaderClass::Warrior => 0.30,
        InvaderClass::Ranger => 0.40,
        InvaderClass::Rogue => 0.50,
    }
}

const SACRIFICE_BOONS: [ResourceKind; 4] = [
    ResourceKind::Crystals,
    ResourceKind::Essence,
    ResourceKind::Flux,
    ResourceKind::Food,
];

fn sacrifice(rng: &mut impl Rng) -> PrisonerOutcome {
    let slot = (unit(rng) * 4.0).floor();
    let boon = SACRIFICE_BOONS
        .get(num_traits::cast::<f64, usize>(slot).unwrap_or(0))
        .copied()
        .unwrap_or(ResourceKind::Essence);
    let amount = lerp_range(rng, SACRIFICE_BOON_MIN, SACRIFICE_BOON_MAX);
    PrisonerOutcome {
        success: true,
        corruption_change: SACRIFICE_CORRUPTION_CHANGE,
        reputation_change: SACRIFICE_REPUTATION_CHANGE,
        resource_gains: ResourceLedger::from([(boon, amount)]),
        ..PrisonerOutcome::default()
    }
}

/// Resolve one disposition. Only convert and sacrifice draw from `rng`.
pub fn handle_prisoner(
    action: PrisonerAction,
    prisoner: &CapturedPrisoner,
    rng: &mut impl Rng,
) -> PrisonerOutcome {
    match action {
        PrisonerAction::Execute => PrisonerOutcome {
            success: true,
            fear_change: EXECUTE_FEAR_CHANGE,
            reputation_change: EXECUTE_REPUTATION_CHANGE,
            ..PrisonerOutcome::default()
        },
        PrisonerAction::Ransom => PrisonerOutcome {
            success: true,
            gold_gain: ransom_value(prisoner.invader_class),
            ..PrisonerOutcome::default()
        },
        PrisonerAction::Convert => {
            let success = unit(rng) < conversion_rate(prisoner.invader_class);
            PrisonerOutcome {
                success,
                corruption_change: if success { CONVERT_CORRUPTION_CHANGE } else { 0 },
                ..PrisonerOutcome::default()
            }
        }
        PrisonerAction::Sacrifice => sacrifice(rng),
        PrisonerAction::Experiment => PrisonerOutcome {
            success: true,
            corruption_change: EXPERIMENT_CORRUPTION_CHANGE,
            resource_gains: ResourceLedger::from([(
                ResourceKind::Research,
                round_f64_to_i32(prisoner.stats.average()),
            )]),
            ..PrisonerOutcome::default()
        },
    }
}
