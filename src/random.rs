//! Seeded Random Streams
//!
//! Every draw in a simulation run comes from a [`RandomStream`], a 32-bit
//! linear congruential generator. A run holds three of them, one per
//! behavioral concern, so changing e.g. the sale probability never shifts
//! the arrival or purchase-size sequences.
//!
//! ## Recurrence
//! - `state = (a * state + c) mod m`
//! - `uniform = state / m`, in `[0, 1)`
//!
//! The stream implements [`RngCore`] and [`SeedableRng`], so it plugs into
//! `rand_distr` samplers. `next_u64` places the state in the upper 32 bits,
//! which makes `rng.gen::<f64>()` return exactly `state / m`.

use rand::{RngCore, SeedableRng};

pub const LCG_MULTIPLIER: u64 = 1_664_525;
pub const LCG_INCREMENT: u64 = 1_013_904_223;
pub const LCG_MODULUS: u64 = 1 << 32;

const STREAM_SPACING: u64 = 0x9e37_79b9_7f4a_7c15;

const ARRIVAL_STREAM: u64 = 0;
const PURCHASE_STREAM: u64 = 1;
const SALE_STREAM: u64 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomStream {
    state: u32,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed % LCG_MODULUS) as u32,
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    fn advance(&mut self) -> u32 {
        let next = (LCG_MULTIPLIER * self.state as u64 + LCG_INCREMENT) % LCG_MODULUS;
        self.state = next as u32;
        self.state
    }

    /// Next value in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.advance() as f64 / LCG_MODULUS as f64
    }

    /// Bernoulli trial: true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

impl RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        (self.advance() as u64) << 32
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for RandomStream {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// The three streams a simulation run draws from.
#[derive(Clone, Debug)]
pub struct RandomStreams {
    pub arrivals: RandomStream,  // Daily arrival counts
    pub purchases: RandomStream, // Purchase sizes
    pub sales: RandomStream,     // Sale decisions
}

impl RandomStreams {
    pub fn from_seed(base_seed: u64) -> Self {
        Self {
            arrivals: RandomStream::new(stream_seed(base_seed, ARRIVAL_STREAM)),
            purchases: RandomStream::new(stream_seed(base_seed, PURCHASE_STREAM)),
            sales: RandomStream::new(stream_seed(base_seed, SALE_STREAM)),
        }
    }
}

fn stream_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index.wrapping_mul(STREAM_SPACING))
}
