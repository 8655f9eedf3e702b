//! No-repeat random selection for the wish wall and the art gallery.
//!
//! Every item in the pool is shown once, in random order, before any item comes
//! back. When a cycle is used up the full index set is refilled and shuffled
//! implicitly by the next draws. Nothing prevents the last item of one cycle from
//! also being the first of the next.

use crate::error::SamplerError;

// --- Random sources ---------------------------------------------------------

pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform index in `0..bound` (0 when `bound <= 1`). Rejection sampling keeps
    /// the choice unbiased for bounds that do not divide 2^64.
    fn below(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        let bound = bound as u64;
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let v = self.next_u64();
            if v < zone {
                return (v % bound) as usize;
            }
        }
    }
}

/// xorshift64* pseudo-random generator. Not crypto secure.
#[derive(Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn new(seed: u64) -> Self {
        // zero is a fixed point of xorshift
        let state = if seed == 0 { Self::DEFAULT_SEED } else { seed };
        Self { state }
    }
}

impl Default for XorShift64 {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl RandomSource for XorShift64 {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

/// OS / browser randomness (`getrandom`, feature `rng`) with a seeded
/// [`XorShift64`] used whenever that source is unavailable.
#[derive(Clone, Debug, Default)]
pub struct SystemRandom {
    fallback: XorShift64,
    warned: bool,
}

impl SystemRandom {
    /// Seed for the fallback generator, e.g. `performance.now()` bits.
    pub fn with_fallback_seed(seed: u64) -> Self {
        Self {
            fallback: XorShift64::new(seed),
            warned: false,
        }
    }

    #[cfg(feature = "rng")]
    fn secure_u64() -> Option<u64> {
        let mut buf = [0u8; 8];
        getrandom::getrandom(&mut buf).ok()?;
        Some(u64::from_le_bytes(buf))
    }

    #[cfg(not(feature = "rng"))]
    fn secure_u64() -> Option<u64> {
        None
    }
}

impl RandomSource for SystemRandom {
    fn next_u64(&mut self) -> u64 {
        if let Some(v) = Self::secure_u64() {
            return v;
        }
        if !self.warned {
            self.warned = true;
            log::warn!("sampler: secure random source unavailable, using xorshift fallback");
        }
        self.fallback.next_u64()
    }
}

// --- Sampler ----------------------------------------------------------------

pub struct NoRepeatSampler<T, R = SystemRandom> {
    pool: Vec<T>,
    /// Indices not yet drawn in the current cycle.
    remaining: Vec<usize>,
    rng: R,
}

impl<T> NoRepeatSampler<T, SystemRandom> {
    pub fn new(pool: Vec<T>) -> Self {
        Self::with_rng(pool, SystemRandom::default())
    }
}

impl<T, R: RandomSource> NoRepeatSampler<T, R> {
    /// An empty pool is accepted; drawing from it fails until items are pushed.
    pub fn with_rng(pool: Vec<T>, rng: R) -> Self {
        Self {
            pool,
            remaining: Vec::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn pool(&self) -> &[T] {
        &self.pool
    }

    /// Draws left before the next refill.
    pub fn remaining_in_cycle(&self) -> usize {
        self.remaining.len()
    }

    /// Append to the pool. The new item becomes eligible at the next refill.
    pub fn push(&mut self, item: T) {
        self.pool.push(item);
    }

    pub fn next(&mut self) -> Result<&T, SamplerError> {
        if self.pool.is_empty() {
            return Err(SamplerError::EmptyPool);
        }
        if self.remaining.is_empty() {
            self.remaining.extend(0..self.pool.len());
            log::debug!("sampler: new cycle over {} items", self.pool.len());
        }
        let pick = self.rng.below(self.remaining.len());
        let idx = self.remaining.swap_remove(pick);
        Ok(&self.pool[idx])
    }
}
