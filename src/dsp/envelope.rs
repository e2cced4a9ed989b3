//! Amplitude envelopes.
//!
//! An envelope is a per-sample gain curve the same length as the buffer it
//! shapes. The attack curve is the percussive pluck used by synthesis.

use crate::error::{Result, invalid};

use super::buffer::SampleBuffer;

/// Gain of the attack curve `t` seconds after onset.
///
/// `2 * sqrt(0.01 / (t + 0.02))`: `sqrt(2)` at `t = 0`, 1.0 at 20 ms,
/// decaying as `1/sqrt(t)` afterwards. The onset gain is above unity, so
/// callers must keep the overall volume low enough to avoid clipping.
pub fn attack_gain(t: f64) -> f64 {
    2.0 * (0.01 / (t + 0.02)).sqrt()
}

/// The attack curve evaluated at each of `len` samples at `sample_rate`.
pub fn attack_curve(len: usize, sample_rate: u32) -> Vec<f64> {
    let rate = sample_rate as f64;
    (0..len).map(|i| attack_gain(i as f64 / rate)).collect()
}

impl SampleBuffer {
    /// A copy of this buffer multiplied sample-by-sample by `curve`.
    pub fn modulated(&self, curve: &[f64]) -> Result<SampleBuffer> {
        let mut out = self.clone();
        out.modulate_in_place(curve)?;
        Ok(out)
    }

    /// Multiply this buffer sample-by-sample by `curve`.
    pub fn modulate_in_place(&mut self, curve: &[f64]) -> Result<()> {
        if curve.len() != self.len() {
            return Err(invalid(format!(
                "envelope has {} points but buffer has {} samples",
                curve.len(),
                self.len()
            )));
        }
        for (s, g) in self.samples_mut().iter_mut().zip(curve) {
            *s *= g;
        }
        Ok(())
    }

    /// Shape this buffer with the attack curve.
    pub fn apply_attack(&mut self) {
        let curve = attack_curve(self.len(), self.sample_rate());
        for (s, g) in self.samples_mut().iter_mut().zip(&curve) {
            *s *= g;
        }
    }

    /// A copy of this buffer shaped with the attack curve.
    pub fn with_attack(&self) -> SampleBuffer {
        let mut out = self.clone();
        out.apply_attack();
        out
    }
}
