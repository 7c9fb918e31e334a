//! When the next invasion arrives and who shows up.
use rand::Rng;

use crate::constants::{
    INVASION_BASE_INTERVAL_DAYS, INVASION_GRACE_DAYS, INVASION_INTERVAL_JITTER_DAYS,
    PARTY_BASE_SIZE, PARTY_GROWTH_DAYS, PARTY_MAX_SIZE,
};
use crate::content::ContentLookup;
use crate::invasion::InvaderInstance;
use crate::numbers::unit_to_index;
use crate::rng::{lerp_range, unit};

/// Day of the next invasion.
///
/// Nothing arrives before the grace period ends; after that invasions come
/// every base interval, jittered either way by up to the jitter window.
pub fn schedule_next_invasion(current_day: u32, rng: &mut impl Rng) -> u32 {
    let jitter = i32::try_from(INVASION_INTERVAL_JITTER_DAYS).unwrap_or(0);
    let offset = lerp_range(rng, -jitter, jitter);
    let interval = INVASION_BASE_INTERVAL_DAYS.saturating_add_signed(offset).max(1);
    current_day
        .saturating_add(interval)
        .max(INVASION_GRACE_DAYS)
}

/// Party size for an invasion on `day`; one extra invader per growth window.
#[must_use]
pub fn party_size(day: u32) -> usize {
    let growth = usize::try_from(day / PARTY_GROWTH_DAYS).unwrap_or(PARTY_MAX_SIZE);
    PARTY_BASE_SIZE.saturating_add(growth).min(PARTY_MAX_SIZE)
}

/// Draw a party from the catalog, one definition per slot.
///
/// Returns an empty party when the catalog has no definitions.
pub fn compose_invasion_party(
    day: u32,
    content: &impl ContentLookup,
    rng: &mut impl Rng,
) -> Vec<InvaderInstance> {
    let pool = content.invaders();
    if pool.is_empty() {
        return Vec::new();
    }
    (0..party_size(day))
        .filter_map(|slot| {
            let definition = unit_to_index(unit(rng), pool.len()).and_then(|idx| pool.get(idx))?;
            Some(InvaderInstance::from_definition(
                format!("invader-{day}-{slot}"),
                definition,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{InvaderCatalog, InvaderClass, InvaderDefinition, InvaderStats};
    use crate::rng::FixedRoll;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn grace_period_holds() {
        assert_eq!(schedule_next_invasion(0, &mut FixedRoll(0.0)), 10);
        assert_eq!(schedule_next_invasion(1, &mut FixedRoll(0.5)), 10);
    }

    #[test]
    fn interval_jitters_within_window() {
        assert_eq!(schedule_next_invasion(20, &mut FixedRoll(0.0)), 24);
        assert_eq!(schedule_next_invasion(20, &mut FixedRoll(0.5)), 27);
        assert_eq!(schedule_next_invasion(20, &mut FixedRoll(0.999_999)), 30);
        let mut rng = SmallRng::seed_from_u64(7);
        for day in 12..80 {
            let next = schedule_next_invasion(day, &mut rng);
            assert!((day + 4..=day + 10).contains(&next));
        }
    }

    #[test]
    fn party_grows_and_caps() {
        assert_eq!(party_size(0), 2);
        assert_eq!(party_size(9), 2);
        assert_eq!(party_size(10), 3);
        assert_eq!(party_size(35), 5);
        assert_eq!(party_size(400), 6);
    }

    #[test]
    fn party_draws_from_catalog() {
        let catalog = InvaderCatalog::load_from_static();
        let party = compose_invasion_party(21, &catalog, &mut FixedRoll(0.0));
        assert_eq!(party.len(), 4);
        assert!(party.iter().all(|inv| inv.definition_id == "sellsword"));
        assert_eq!(party[3].id, "invader-21-3");

        let last = compose_invasion_party(0, &catalog, &mut FixedRoll(0.999_999));
        assert!(last.iter().all(|inv| inv.definition_id == "trail-scout"));
    }

    #[test]
    fn large_catalog_still_fields_a_full_party() {
        let definitions: Vec<InvaderDefinition> = (0..300)
            .map(|idx| InvaderDefinition {
                id: format!("recruit-{idx}"),
                name: format!("Recruit {idx}"),
                class: InvaderClass::Warrior,
                stats: InvaderStats {
                    hp: 10,
                    attack: 3,
                    defense: 1,
                    speed: 2,
                },
            })
            .collect();
        let catalog = InvaderCatalog::from_definitions(definitions);
        let party = compose_invasion_party(21, &catalog, &mut FixedRoll(0.999_999));
        assert_eq!(party.len(), party_size(21));
        assert!(party.iter().all(|inv| inv.definition_id == "recruit-299"));

        let middle = compose_invasion_party(0, &catalog, &mut FixedRoll(0.5));
        assert!(middle.iter().all(|inv| inv.definition_id == "recruit-150"));
    }

    #[test]
    fn empty_catalog_sends_nobody() {
        let catalog = InvaderCatalog::empty();
        assert!(compose_invasion_party(50, &catalog, &mut FixedRoll(0.3)).is_empty());
    }
}
