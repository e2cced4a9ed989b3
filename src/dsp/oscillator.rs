//! Sine oscillator and the phase sources that seed it.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies start phases, in cycles, for oscillators.
///
/// Every call must return a value in `[0, 1)`.
pub trait PhaseSource {
    fn next_phase(&mut self) -> f64;
}

impl<P: PhaseSource + ?Sized> PhaseSource for &mut P {
    fn next_phase(&mut self) -> f64 {
        (**self).next_phase()
    }
}

/// Uniformly random phases drawn from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngPhase<R = StdRng> {
    rng: R,
}

impl RngPhase<StdRng> {
    /// Seeded from system entropy; phases differ on every run.
    pub fn from_entropy() -> Self {
        RngPhase {
            rng: StdRng::from_entropy(),
        }
    }

    /// A reproducible phase sequence.
    pub fn seeded(seed: u64) -> Self {
        RngPhase {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RngPhase<R> {
    pub fn new(rng: R) -> Self {
        RngPhase { rng }
    }
}

impl Default for RngPhase<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> PhaseSource for RngPhase<R> {
    fn next_phase(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Always the same phase. Makes synthesis bit-for-bit reproducible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPhase(pub f64);

impl PhaseSource for ConstantPhase {
    fn next_phase(&mut self) -> f64 {
        self.0.rem_euclid(1.0)
    }
}

/// A sine oscillator with a fixed start phase.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// `phase` is in cycles, `[0, 1)`.
    pub fn new(frequency: f64, phase: f64, sample_rate: f64) -> Self {
        Oscillator {
            frequency,
            phase: phase.rem_euclid(1.0),
            sample_rate,
        }
    }

    /// Phase increment per sample.
    fn phase_inc(&self) -> f64 {
        self.frequency / self.sample_rate
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let sample = (2.0 * PI * self.phase).sin();
        self.phase = (self.phase + self.phase_inc()).fract();
        sample
    }

    /// Add `gain * sine` into every slot of `out`.
    pub fn accumulate(&mut self, out: &mut [f64], gain: f64) {
        for s in out.iter_mut() {
            *s += gain * self.next_sample();
        }
    }
}
