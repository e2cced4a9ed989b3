//! Butterworth low-pass filter built from cascaded biquads.
//!
//! An order-N Butterworth low-pass splits into N/2 second-order sections
//! with the same cutoff and per-section Q `1 / (2 sin((2k + 1) π / 2N))`,
//! plus one first-order section when N is odd. Each section is discretised
//! with the bilinear transform (Audio EQ Cookbook coefficients).

use std::f64::consts::PI;

use crate::error::{Result, invalid};

use super::buffer::SampleBuffer;

/// A single IIR section (first or second order).
///
/// Implements the Direct Form II Transposed structure.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    // State (Direct Form II Transposed)
    z1: f64,
    z2: f64,
}

impl BiquadFilter {
    /// Second-order low-pass section at `frequency` with quality `q`.
    pub fn lowpass(frequency: f64, q: f64, sample_rate: f64) -> Self {
        let w0 = 2.0 * PI * frequency / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let b1 = 1.0 - cos_w0;
        let b0 = b1 / 2.0;
        let b2 = b0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        Self::normalized(b0, b1, b2, a0, a1, a2)
    }

    /// First-order low-pass section at `frequency`.
    pub fn lowpass_first_order(frequency: f64, sample_rate: f64) -> Self {
        let k = (PI * frequency / sample_rate).tan();
        Self::normalized(k, k, 0.0, 1.0 + k, k - 1.0, 0.0)
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        BiquadFilter {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Process a single sample through the filter.
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// A Butterworth low-pass of arbitrary order.
#[derive(Debug, Clone)]
pub struct ButterworthLowpass {
    sections: Vec<BiquadFilter>,
}

impl ButterworthLowpass {
    /// Design a filter. `cutoff` must lie strictly between 0 and Nyquist and
    /// `order` must be at least 1.
    pub fn new(cutoff: f64, order: usize, sample_rate: u32) -> Result<Self> {
        let nyquist = sample_rate as f64 / 2.0;
        if !cutoff.is_finite() || cutoff <= 0.0 || cutoff >= nyquist {
            return Err(invalid(format!(
                "low-pass cutoff must be in (0, {nyquist}) Hz, got {cutoff}"
            )));
        }
        if order == 0 {
            return Err(invalid("filter order must be at least 1"));
        }

        let fs = sample_rate as f64;
        let n = order as f64;
        let mut sections: Vec<BiquadFilter> = (0..order / 2)
            .map(|k| {
                let q = 1.0 / (2.0 * ((2 * k + 1) as f64 * PI / (2.0 * n)).sin());
                BiquadFilter::lowpass(cutoff, q, fs)
            })
            .collect();
        if order % 2 == 1 {
            sections.push(BiquadFilter::lowpass_first_order(cutoff, fs));
        }

        Ok(ButterworthLowpass { sections })
    }

    pub fn process(&mut self, input: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(input, |x, section| section.process(x))
    }

    pub fn reset(&mut self) {
        self.sections.iter_mut().for_each(BiquadFilter::reset);
    }
}

impl SampleBuffer {
    /// A low-passed copy of this buffer.
    pub fn lowpassed(&self, cutoff: f64, order: usize) -> Result<SampleBuffer> {
        let mut out = self.clone();
        out.lowpass_in_place(cutoff, order)?;
        Ok(out)
    }

    /// Low-pass this buffer, replacing its contents.
    pub fn lowpass_in_place(&mut self, cutoff: f64, order: usize) -> Result<()> {
        let mut filter = ButterworthLowpass::new(cutoff, order, self.sample_rate())?;
        tracing::debug!(cutoff, order, samples = self.len(), "low-pass filtering");
        for s in self.samples_mut() {
            *s = filter.process(*s);
        }
        Ok(())
    }
}
