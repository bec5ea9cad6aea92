//! Derived Samplers
//!
//! Arrival counts, purchase sizes and the normal draws behind them. Each
//! sampler implements [`Distribution`] and consumes a fixed, documented number
//! of uniforms from whatever stream it is given, which keeps runs
//! reproducible draw-for-draw.
//!
//! ## Samplers
//! - [`Poisson`]: product-of-uniforms method. A rate above
//!   [`POISSON_CHUNK_LAMBDA`] is split into `ceil(lambda / 500)` equal parts,
//!   sampled one after the other and summed; each part draws until its
//!   product falls to `e^-part` (one or more draws per part)
//! - [`BoxMuller`]: standard normal, cosine branch (exactly two draws)
//! - [`LogNormal`]: `exp(sigma * N + mu)` (exactly two draws)

use rand::Rng;
use rand_distr::Distribution;
use std::f64::consts::PI;

use crate::error::{Result, SimulationError};

/// Largest rate sampled with a single product of uniforms. Past roughly 745,
/// `e^-lambda` underflows to zero and the product method stops counting.
pub const POISSON_CHUNK_LAMBDA: f64 = 500.0;

/// Largest accepted arrival rate.
pub const MAX_POISSON_LAMBDA: f64 = 1_000_000.0;

/// Largest accepted `ln` of a single log-normal sample. Keeps purchase sizes,
/// balances and the pool's `eth * token` product finite over a run.
pub const MAX_LOG_SAMPLE: f64 = 160.0;

pub(crate) fn check_poisson_rate(name: &'static str, lambda: f64) -> Result<()> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(SimulationError::invalid(
            name,
            format!("{lambda} must be a finite, non-negative rate"),
        ));
    }
    if lambda > MAX_POISSON_LAMBDA {
        return Err(SimulationError::invalid(
            name,
            format!("{lambda} exceeds the largest supported rate {MAX_POISSON_LAMBDA}"),
        ));
    }
    Ok(())
}

/// Largest `|z|` a [`BoxMuller`] draw can return: `u1` is clamped to
/// `f64::MIN_POSITIVE` and `|cos| <= 1`.
pub fn max_normal_magnitude() -> f64 {
    (-2.0 * f64::MIN_POSITIVE.ln()).sqrt()
}

pub(crate) fn check_log_normal(
    mu_name: &'static str,
    sigma_name: &'static str,
    mu: f64,
    sigma: f64,
) -> Result<()> {
    if !mu.is_finite() {
        return Err(SimulationError::invalid(mu_name, format!("{mu} is not finite")));
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(SimulationError::invalid(
            sigma_name,
            format!("{sigma} must be finite and non-negative"),
        ));
    }
    let largest = mu + sigma * max_normal_magnitude();
    if largest > MAX_LOG_SAMPLE {
        return Err(SimulationError::invalid(
            mu_name,
            format!(
                "samples reach e^{largest:.1} with {sigma_name} {sigma}; \
                 mu + {:.2} * sigma must stay at or below {MAX_LOG_SAMPLE}",
                max_normal_magnitude()
            ),
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Poisson {
    lambda: f64,
    parts: u64,
    limit: f64, // e^-(lambda / parts)
}

impl Poisson {
    pub fn new(lambda: f64) -> Result<Self> {
        check_poisson_rate("lambda", lambda)?;
        let parts = (lambda / POISSON_CHUNK_LAMBDA).ceil().max(1.0) as u64;
        Ok(Self {
            lambda,
            parts,
            limit: (-(lambda / parts as f64)).exp(),
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    fn sample_part<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let mut product = 1.0;
        let mut count = 0;
        loop {
            product *= rng.gen::<f64>();
            if product <= self.limit {
                return count;
            }
            count += 1;
        }
    }
}

impl Distribution<u64> for Poisson {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        (0..self.parts).map(|_| self.sample_part(rng)).sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxMuller;

impl Distribution<f64> for BoxMuller {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // ln(0) would send the sample to infinity
        let u1 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2 = rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogNormal {
    mu: f64,
    sigma: f64,
}

impl LogNormal {
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        check_log_normal("mu", "sigma", mu, sigma)?;
        Ok(Self { mu, sigma })
    }
}

impl Distribution<f64> for LogNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = BoxMuller.sample(rng);
        (self.sigma * z + self.mu).exp()
    }
}
