//! Deterministic randomness plumbing.
//!
//! Every stochastic operation in the crate takes `&mut impl Rng` and draws a
//! unit-interval float through [`unit`]. This module derives independent,
//! named streams from a single user seed and provides replay sources that
//! yield exact unit values.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Draw a float in `[0, 1)`.
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.r#gen::<f64>()
}

/// Linearly interpolate an inclusive integer range using one unit draw.
pub fn lerp_range<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    let span = f64::from(max - min);
    let offset = crate::numbers::round_f64_to_i32(unit(rng) * span);
    (min + offset).clamp(min, max)
}

/// Build a `ChaCha20Rng` from an arbitrary seed label.
#[must_use]
pub fn seeded_from_label(label: &str) -> ChaCha20Rng {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(label.as_bytes());
    ChaCha20Rng::seed_from_u64(hasher.finish())
}

/// Named RNG streams for one invasion, derived from a user-visible seed.
#[derive(Debug)]
pub struct InvasionRng {
    seed: u64,
    combat: RefCell<CountingRng<SmallRng>>,
    loot: RefCell<CountingRng<SmallRng>>,
    capture: RefCell<CountingRng<SmallRng>>,
    schedule: RefCell<CountingRng<SmallRng>>,
    prisoner: RefCell<CountingRng<SmallRng>>,
}

impl InvasionRng {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            combat: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"combat"))),
            loot: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"loot"))),
            capture: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"capture"))),
            schedule: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"schedule"))),
            prisoner: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"prisoner"))),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Attack rolls.
    #[must_use]
    pub fn combat(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.combat.borrow_mut()
    }

    /// Post-battle loot rolls.
    #[must_use]
    pub fn loot(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.loot.borrow_mut()
    }

    /// Prisoner capture rolls.
    #[must_use]
    pub fn capture(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.capture.borrow_mut()
    }

    /// Invasion timing and party composition.
    #[must_use]
    pub fn schedule(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.schedule.borrow_mut()
    }

    /// Prisoner disposition rolls.
    #[must_use]
    pub fn prisoner(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.prisoner.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Encode a unit value so that `gen::<f64>()` reproduces it.
///
/// `rand` maps the top 53 bits of `next_u64` onto `[0, 1)`.
fn encode_unit(value: f64) -> u64 {
    const SCALE: f64 = (1u64 << 53) as f64;
    let clamped = value.clamp(0.0, 1.0 - f64::EPSILON);
    let mantissa = num_traits::cast::<f64, u64>((clamped * SCALE).floor()).unwrap_or(0);
    mantissa << 11
}

/// RNG that yields the same unit value on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRoll(pub f64);

impl RngCore for FixedRoll {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        encode_unit(self.0)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand::rngs::mock::StepRng::new(self.next_u64(), 0).fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// RNG that replays a scripted list of unit values, cycling when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedRolls {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RngCore for ScriptedRolls {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.saturating_add(1);
        encode_unit(value)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let word = self.next_u64();
        rand::rngs::mock::StepRng::new(word, 0).fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
