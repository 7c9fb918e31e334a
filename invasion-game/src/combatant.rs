//! Combat participants and their grid positions.
use serde::{Deserialize, Serialize};

/// Which force a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Defender,
    Invader,
}

impl Side {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Defender => Self::Invader,
            Self::Invader => Self::Defender,
        }
    }

    /// Initiative tie-break rank; defenders act first at equal speed.
    #[must_use]
    pub const fn initiative_rank(self) -> u8 {
        match self {
            Self::Defender => 0,
            Self::Invader => 1,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Defender => "defender",
            Self::Invader => "invader",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Integer cell on the implicit combat grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    #[must_use]
    pub const fn is_on_grid(self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Stat block used to create a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

/// A single participant in the turn queue.
///
/// Updates go through the `with_*` constructors which return a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub side: Side,
    pub name: String,
    #[serde(default)]
    pub position: Option<GridPosition>,
    pub speed: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    #[serde(default)]
    pub has_acted: bool,
}

impl Combatant {
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Alive and still waiting for its turn this round.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.is_alive() && !self.has_acted
    }

    #[must_use]
    pub fn is_enemy_of(&self, other: &Self) -> bool {
        self.side != other.side
    }

    #[must_use]
    pub fn with_position(&self, position: GridPosition) -> Self {
        Self {
            position: Some(position),
            ..self.clone()
        }
    }

    /// Copy with `hp` clamped to `[0, max_hp]`.
    #[must_use]
    pub fn with_hp(&self, hp: i32) -> Self {
        Self {
            hp: hp.clamp(0, self.max_hp.max(0)),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_acted(&self, has_acted: bool) -> Self {
        Self {
            has_acted,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_speed(&self, speed: i32) -> Self {
        Self {
            speed,
            ..self.clone()
        }
    }
}

/// Build a combatant that has not yet acted this round.
#[must_use]
pub fn create_combatant(
    id: impl Into<String>,
    side: Side,
    name: impl Into<String>,
    stats: CombatStats,
    position: Option<GridPosition>,
) -> Combatant {
    Combatant {
        id: id.into(),
        side,
        name: name.into(),
        position,
        speed: stats.speed,
        hp: stats.hp.max(0),
        max_hp: stats.max_hp,
        attack: stats.attack,
        defense: stats.defense,
        has_acted: false,
    }
}
