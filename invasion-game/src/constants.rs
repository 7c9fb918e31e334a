//! Centralized balance and tuning constants for invasion resolution.
//!
//! These values define the deterministic math for the combat core. Keeping
//! them together means balance can only shift through reviewed code changes
//! rather than through external JSON assets.

// Invasion state machine ---------------------------------------------------
pub const ALTAR_MAX_HP: i32 = 100;
pub const MAX_TURNS: u32 = 30;
pub const SECONDARY_OBJECTIVES_FOR_VICTORY: usize = 2;
pub const MAX_SECONDARY_OBJECTIVES: usize = 2;
pub const SLAY_MONSTER_MIN_TIER: u8 = 2;

// Attack rolls -------------------------------------------------------------
pub(crate) const ROLL_SIDES: u8 = 20;
pub(crate) const NATURAL_MISS: u8 = 1;
pub(crate) const NATURAL_HIT: u8 = 20;
pub(crate) const HIT_THRESHOLD_BASE: i32 = 10;
pub(crate) const STRONG_ROLL_MIN: u8 = 15;
pub(crate) const STRONG_ROLL_MULTIPLIER: f64 = 1.25;
pub(crate) const CRITICAL_MULTIPLIER: f64 = 2.0;

// Reward multiplier --------------------------------------------------------
pub(crate) const REWARD_MULTIPLIER_BASE: f64 = 1.0;
pub(crate) const REWARD_MULTIPLIER_STEP: f64 = 0.25;

// Defense rewards ----------------------------------------------------------
pub(crate) const REPUTATION_BASE_GAIN: i32 = 5;
pub(crate) const REPUTATION_PER_KILL: i32 = 1;
pub(crate) const REPUTATION_FLAWLESS_BONUS: i32 = 3;
pub(crate) const EXPERIENCE_PER_INVADER: f64 = 10.0;

// Defeat penalties ---------------------------------------------------------
pub(crate) const DEFEAT_GOLD_LOSS_FRACTION: f64 = 0.2;
pub(crate) const DEFEAT_REPUTATION_LOSS: i32 = 3;
pub(crate) const CRYSTALS_LOST_PER_OBJECTIVE: i32 = 10;
pub(crate) const ESSENCE_LOST_PER_OBJECTIVE: i32 = 5;

// Prisoners ----------------------------------------------------------------
pub(crate) const PRISONER_CAPTURE_CHANCE: f64 = 0.30;
pub(crate) const EXECUTE_FEAR_CHANGE: i32 = 2;
pub(crate) const EXECUTE_REPUTATION_CHANGE: i32 = 1;
pub(crate) const CONVERT_CORRUPTION_CHANGE: i32 = 5;
pub(crate) const SACRIFICE_CORRUPTION_CHANGE: i32 = 5;
pub(crate) const SACRIFICE_REPUTATION_CHANGE: i32 = 2;
pub(crate) const SACRIFICE_BOON_MIN: i32 = 10;
pub(crate) const SACRIFICE_BOON_MAX: i32 = 25;
pub(crate) const EXPERIMENT_CORRUPTION_CHANGE: i32 = 3;

// Altar rebuild ------------------------------------------------------------
pub(crate) const ALTAR_REBUILD_CRYSTALS: i32 = 100;
pub(crate) const ALTAR_REBUILD_GOLD: i32 = 50;
pub(crate) const ALTAR_REBUILD_FLUX: i32 = 20;

// Objective pacing defaults ------------------------------------------------
pub(crate) const DEFAULT_SCOUT_TURNS: u32 = 15;
pub(crate) const DEFAULT_DEFILE_TURNS: u32 = 20;
pub(crate) const DEFAULT_SEAL_TURNS: u32 = 24;
pub(crate) const DEFAULT_TREASURE_TARGET: u32 = 60;

// Scheduling ---------------------------------------------------------------
pub(crate) const INVASION_GRACE_DAYS: u32 = 10;
pub(crate) const INVASION_BASE_INTERVAL_DAYS: u32 = 7;
pub(crate) const INVASION_INTERVAL_JITTER_DAYS: u32 = 3;
pub(crate) const PARTY_BASE_SIZE: usize = 2;
pub(crate) const PARTY_GROWTH_DAYS: u32 = 10;
pub(crate) const PARTY_MAX_SIZE: usize = 6;

// Defender muster ----------------------------------------------------------
pub(crate) const DEFENDER_BASE_HP: i32 = 12;
pub(crate) const DEFENDER_HP_PER_TIER: i32 = 8;
pub(crate) const DEFENDER_BASE_ATTACK: i32 = 4;
pub(crate) const DEFENDER_ATTACK_PER_TIER: i32 = 2;
pub(crate) const DEFENDER_BASE_DEFENSE: i32 = 1;
pub(crate) const DEFENDER_DEFENSE_PER_TIER: i32 = 1;
pub(crate) const DEFENDER_BASE_SPEED: i32 = 3;
pub const DEFENDER_GUARD_ROW: i32 = 5;

// History ------------------------------------------------------------------
pub const HISTORY_CAPACITY: usize = 50;

// Float comparisons -------------------------------------------------------
pub const FLOAT_EPSILON: f64 = 1e-9;
