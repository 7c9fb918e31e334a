//! Invader definitions and the lookup seam used by the core.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_INVADER_DATA: &str = include_str!("../data/invaders.json");

/// Adventurer archetype; drives loot, ransom and conversion tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvaderClass {
    Warrior,
    Rogue,
    Mage,
    Cleric,
    Paladin,
    Ranger,
}

impl InvaderClass {
    pub const ALL: [Self; 6] = [
        Self::Warrior,
        Self::Rogue,
        Self::Mage,
        Self::Cleric,
        Self::Paladin,
        Self::Ranger,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Rogue => "rogue",
            Self::Mage => "mage",
            Self::Cleric => "cleric",
            Self::Paladin => "paladin",
            Self::Ranger => "ranger",
        }
    }
}

impl std::fmt::Display for InvaderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Base stat block shared by definitions and captured prisoners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvaderStats {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

impl InvaderStats {
    /// Mean of the four stats, used to gauge prisoner strength.
    #[must_use]
    pub fn average(&self) -> f64 {
        f64::from(self.hp + self.attack + self.defense + self.speed) / 4.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvaderDefinition {
    pub id: String,
    pub name: String,
    pub class: InvaderClass,
    pub stats: InvaderStats,
}

/// Read-only content lookup; implementations never hand out mutable data.
pub trait ContentLookup {
    fn invader(&self, id: &str) -> Option<&InvaderDefinition>;

    /// All definitions in a stable order.
    fn invaders(&self) -> Vec<&InvaderDefinition>;
}

/// Container for invader definitions parsed from JSON.
///
/// Deserializing always rebuilds the id index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawCatalog")]
pub struct InvaderCatalog {
    pub invaders: Vec<InvaderDefinition>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct RawCatalog {
    invaders: Vec<InvaderDefinition>,
}

impl From<RawCatalog> for InvaderCatalog {
    fn from(raw: RawCatalog) -> Self {
        Self::from_definitions(raw.invaders)
    }
}

impl InvaderCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load definitions from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into invader definitions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_definitions(invaders: Vec<InvaderDefinition>) -> Self {
        let index = invaders
            .iter()
            .enumerate()
            .map(|(idx, def)| (def.id.clone(), idx))
            .collect();
        Self { invaders, index }
    }

    /// Built-in definitions shipped with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_INVADER_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.invaders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invaders.is_empty()
    }
}

impl ContentLookup for InvaderCatalog {
    fn invader(&self, id: &str) -> Option<&InvaderDefinition> {
        self.index.get(id).and_then(|idx| self.invaders.get(*idx))
    }

    fn invaders(&self) -> Vec<&InvaderDefinition> {
        self.invaders.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_catalog_covers_every_class() {
        let catalog = InvaderCatalog::load_from_static();
        assert!(!catalog.is_empty());
        for class in InvaderClass::ALL {
            assert!(
                catalog.invaders().iter().any(|def| def.class == class),
                "missing definition for {class}"
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        let json = r#"{
            "invaders": [
                {
                    "id": "test-knight",
                    "name": "Test Knight",
                    "class": "paladin",
                    "stats": { "hp": 30, "attack": 7, "defense": 5, "speed": 2 }
                }
            ]
        }"#;
        let catalog = InvaderCatalog::from_json(json).unwrap();
        let knight = catalog.invader("test-knight").unwrap();
        assert_eq!(knight.class, InvaderClass::Paladin);
        assert_eq!(knight.stats.hp, 30);
        assert!(catalog.invader("missing").is_none());
    }

    #[test]
    fn nested_catalog_keeps_lookups() {
        #[derive(Deserialize)]
        struct Save {
            catalog: InvaderCatalog,
        }
        let original = InvaderCatalog::load_from_static();
        let json = serde_json::json!({ "catalog": &original }).to_string();
        let save: Save = serde_json::from_str(&json).unwrap();
        assert_eq!(save.catalog, original);
        assert_eq!(
            save.catalog.invader("sellsword").map(|def| def.class),
            Some(InvaderClass::Warrior)
        );
    }

    #[test]
    fn average_stats() {
        let stats = InvaderStats {
            hp: 20,
            attack: 6,
            defense: 2,
            speed: 4,
        };
        assert!((stats.average() - 8.0).abs() < f64::EPSILON);
    }
}
