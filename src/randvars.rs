use rand::Rng;
use rand_seeder::{Seeder, SipRng};
use serde::Serialize;

use crate::types::Duration;

/// Seed used when the configuration doesn't name one
pub const DEFAULT_SEED: &str = "stripy zebra";

/// Anything that can hand out uniform(0, 1) draws
pub trait UniformSource {
    /// One draw in `[0, 1)`
    fn next_uniform(&mut self) -> f64;
}

impl<R: Rng> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen()
    }
}

/// Build a reproducible generator from a string seed
pub fn seeded_rng(seed: Option<&str>) -> SipRng {
    Seeder::from(seed.unwrap_or(DEFAULT_SEED)).make_rng()
}

/// One random variate together with the uniform draw it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Draw {
    pub rnd: f64,
    pub value: f64,
}

impl Draw {
    pub fn duration(&self) -> Duration {
        Duration(self.value)
    }
}

/// Inverse-transform sampling on top of a uniform source
#[derive(Debug)]
pub struct VariateGenerator<S> {
    source: S,
}

impl<S: UniformSource> VariateGenerator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Raw uniform(0, 1) draw
    pub fn uniform01(&mut self) -> f64 {
        self.source.next_uniform()
    }

    /// Exponential with the given mean: `-mean * ln(1 - u)`
    pub fn exponential(&mut self, mean: f64) -> Draw {
        assert!(mean > 0.0, "exponential mean must be positive, got {}", mean);
        let rnd = self.uniform01();
        Draw {
            rnd,
            value: -mean * (1.0 - rnd).ln(),
        }
    }

    /// Uniform over `[lo, hi]`: `lo + u * (hi - lo)`
    pub fn uniform(&mut self, lo: f64, hi: f64) -> Draw {
        assert!(hi >= lo, "uniform bounds inverted: [{}, {}]", lo, hi);
        let rnd = self.uniform01();
        Draw {
            rnd,
            value: lo + rnd * (hi - lo),
        }
    }
}

/// A uniform source replaying a fixed list of draws, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Scripted {
    draws: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl Scripted {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

#[cfg(test)]
impl UniformSource for Scripted {
    fn next_uniform(&mut self) -> f64 {
        self.draws
            .pop_front()
            .expect("scripted source ran out of draws")
    }
}
