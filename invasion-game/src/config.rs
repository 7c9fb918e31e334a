//! Tunable invasion rules with serde defaults and validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ALTAR_MAX_HP, DEFAULT_DEFILE_TURNS, DEFAULT_SCOUT_TURNS, DEFAULT_SEAL_TURNS,
    DEFAULT_TREASURE_TARGET, MAX_TURNS, SECONDARY_OBJECTIVES_FOR_VICTORY,
};

/// Errors raised when invasion configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvasionConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
}

/// How quickly secondary objectives fill while invaders remain standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectivePacing {
    #[serde(default = "ObjectivePacing::default_scout_turns")]
    pub scout_turns: u32,
    #[serde(default = "ObjectivePacing::default_defile_turns")]
    pub defile_turns: u32,
    #[serde(default = "ObjectivePacing::default_seal_turns")]
    pub seal_turns: u32,
    #[serde(default = "ObjectivePacing::default_treasure_target")]
    pub treasure_target: u32,
}

impl ObjectivePacing {
    const fn default_scout_turns() -> u32 {
        DEFAULT_SCOUT_TURNS
    }

    const fn default_defile_turns() -> u32 {
        DEFAULT_DEFILE_TURNS
    }

    const fn default_seal_turns() -> u32 {
        DEFAULT_SEAL_TURNS
    }

    const fn default_treasure_target() -> u32 {
        DEFAULT_TREASURE_TARGET
    }

    fn validate(&self) -> Result<(), InvasionConfigError> {
        for (field, value) in [
            ("pacing.scout_turns", self.scout_turns),
            ("pacing.defile_turns", self.defile_turns),
            ("pacing.seal_turns", self.seal_turns),
            ("pacing.treasure_target", self.treasure_target),
        ] {
            if value == 0 {
                return Err(InvasionConfigError::MinViolation {
                    field,
                    min: 1,
                    value: 0,
                });
            }
        }
        Ok(())
    }
}

impl Default for ObjectivePacing {
    fn default() -> Self {
        Self {
            scout_turns: Self::default_scout_turns(),
            defile_turns: Self::default_defile_turns(),
            seal_turns: Self::default_seal_turns(),
            treasure_target: Self::default_treasure_target(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionConfig {
    #[serde(default = "InvasionConfig::default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "InvasionConfig::default_altar_max_hp")]
    pub altar_max_hp: i32,
    #[serde(default = "InvasionConfig::default_secondaries_for_victory")]
    pub secondaries_for_victory: usize,
    #[serde(default)]
    pub pacing: ObjectivePacing,
}

impl InvasionConfig {
    const fn default_max_turns() -> u32 {
        MAX_TURNS
    }

    const fn default_altar_max_hp() -> i32 {
        ALTAR_MAX_HP
    }

    const fn default_secondaries_for_victory() -> usize {
        SECONDARY_OBJECTIVES_FOR_VICTORY
    }

    /// Parse a configuration, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), InvasionConfigError> {
        if self.max_turns == 0 {
            return Err(InvasionConfigError::MinViolation {
                field: "max_turns",
                min: 1,
                value: 0,
            });
        }
        if self.altar_max_hp <= 0 {
            return Err(InvasionConfigError::MinViolation {
                field: "altar_max_hp",
                min: 1,
                value: i64::from(self.altar_max_hp),
            });
        }
        if self.secondaries_for_victory == 0 {
            return Err(InvasionConfigError::MinViolation {
                field: "secondaries_for_victory",
                min: 1,
                value: 0,
            });
        }
        self.pacing.validate()
    }
}

impl Default for InvasionConfig {
    fn default() -> Self {
        Self {
            max_turns: Self::default_max_turns(),
            altar_max_hp: Self::default_altar_max_hp(),
            secondaries_for_victory: Self::default_secondaries_for_victory(),
            pacing: ObjectivePacing::default(),
        }
    }
}
