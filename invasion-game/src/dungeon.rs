//! Read-only view of the dungeon layout consumed by objective assignment.
use serde::{Deserialize, Serialize};

/// Functional role of a placed room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomRole {
    Altar,
    Vault,
    Library,
    LeyLine,
    Barracks,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedRoom {
    pub id: String,
    pub role: RoomRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inhabitant {
    pub id: String,
    pub name: String,
    pub tier: u8,
}

/// Placement and roster queries answered by the wider game.
pub trait DungeonView {
    /// First placed room with the given role.
    fn placed_room(&self, role: RoomRole) -> Option<&PlacedRoom>;

    fn inhabitants(&self) -> &[Inhabitant];

    fn has_room(&self, role: RoomRole) -> bool {
        self.placed_room(role).is_some()
    }

    /// Highest-tier inhabitant at or above `min_tier`; earlier entries win ties.
    fn strongest_inhabitant(&self, min_tier: u8) -> Option<&Inhabitant> {
        self.inhabitants()
            .iter()
            .filter(|inhabitant| inhabitant.tier >= min_tier)
            .fold(None, |best: Option<&Inhabitant>, candidate| match best {
                Some(current) if current.tier >= candidate.tier => Some(current),
                _ => Some(candidate),
            })
    }
}

/// Plain snapshot of rooms and inhabitants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DungeonSnapshot {
    #[serde(default)]
    pub rooms: Vec<PlacedRoom>,
    #[serde(default)]
    pub inhabitants: Vec<Inhabitant>,
}

impl DungeonSnapshot {
    #[must_use]
    pub fn with_room(mut self, id: impl Into<String>, role: RoomRole) -> Self {
        self.rooms.push(PlacedRoom {
            id: id.into(),
            role,
        });
        self
    }

    #[must_use]
    pub fn with_inhabitant(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        tier: u8,
    ) -> Self {
        self.inhabitants.push(Inhabitant {
            id: id.into(),
            name: name.into(),
            tier,
        });
        self
    }
}

impl DungeonView for DungeonSnapshot {
    fn placed_room(&self, role: RoomRole) -> Option<&PlacedRoom> {
        self.rooms.iter().find(|room| room.role == role)
    }

    fn inhabitants(&self) -> &[Inhabitant] {
        &self.inhabitants
    }
}
