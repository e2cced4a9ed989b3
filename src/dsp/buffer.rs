//! SampleBuffer — a mono block of `f64` samples at a fixed sample rate.
//!
//! Operations that combine buffers always allocate a new one. The handful
//! of operations that rewrite a buffer's contents come in pairs: a pure
//! form returning a new buffer and an `_in_place` form taking `&mut self`.

use crate::error::{Result, invalid};

use super::resample::resample;

/// Default sample rate for synthesis and playback.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// A mono buffer of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap existing samples. Fails if `sample_rate` is zero.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        check_rate(sample_rate)?;
        Ok(SampleBuffer {
            samples,
            sample_rate,
        })
    }

    /// A buffer of `round(duration * sample_rate)` zero samples.
    pub fn silence(duration: f64, sample_rate: u32) -> Result<Self> {
        check_rate(sample_rate)?;
        let len = samples_for(duration, sample_rate)?;
        Ok(SampleBuffer {
            samples: vec![0.0; len],
            sample_rate,
        })
    }

    /// Create from f32 samples (the sink/codec interchange format).
    pub fn from_f32(samples: &[f32], sample_rate: u32) -> Result<Self> {
        Self::new(samples.iter().map(|&s| s as f64).collect(), sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds. Not necessarily a whole number of periods.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Timestamp in seconds of every sample.
    pub fn times(&self) -> Vec<f64> {
        let rate = self.sample_rate as f64;
        (0..self.samples.len()).map(|i| i as f64 / rate).collect()
    }

    /// Root-mean-square level. Zero for an empty buffer.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let energy: f64 = self.samples.iter().map(|s| s * s).sum();
        (energy / self.samples.len() as f64).sqrt()
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0_f64, |m, s| m.max(s.abs()))
    }

    /// Samples as f32 for handing to a sink.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|&s| s as f32).collect()
    }

    /// A copy of this buffer converted to `sample_rate`.
    pub fn resampled(&self, sample_rate: u32) -> Result<SampleBuffer> {
        check_rate(sample_rate)?;
        Ok(SampleBuffer {
            samples: resample(&self.samples, self.sample_rate, sample_rate),
            sample_rate,
        })
    }

    /// Convert this buffer to `sample_rate`, replacing its contents.
    pub fn resample_in_place(&mut self, sample_rate: u32) -> Result<()> {
        check_rate(sample_rate)?;
        self.samples = resample(&self.samples, self.sample_rate, sample_rate);
        self.sample_rate = sample_rate;
        Ok(())
    }

    /// Reinterpret the same samples at a different rate.
    ///
    /// Unlike [`resampled`](Self::resampled) this changes pitch and
    /// duration: relabelling at 80% of the rate plays 25% longer and lower.
    pub fn relabel_rate(&self, sample_rate: u32) -> Result<SampleBuffer> {
        Self::new(self.samples.clone(), sample_rate)
    }

    /// Samples at `sample_rate`, borrowing when no conversion is needed.
    pub(crate) fn samples_at(&self, sample_rate: u32) -> std::borrow::Cow<'_, [f64]> {
        if sample_rate == self.sample_rate {
            std::borrow::Cow::Borrowed(&self.samples)
        } else {
            std::borrow::Cow::Owned(resample(&self.samples, self.sample_rate, sample_rate))
        }
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }
}

/// Most samples a single buffer may hold (the allocator's limit for `f64`).
pub const MAX_SAMPLES: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Number of samples covering `duration` seconds at `sample_rate`.
pub(crate) fn samples_for(duration: f64, sample_rate: u32) -> Result<usize> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(invalid(format!(
            "duration must be a non-negative number of seconds, got {duration}"
        )));
    }
    let count = (duration * sample_rate as f64).round();
    if count > MAX_SAMPLES as f64 {
        return Err(invalid(format!(
            "{duration}s at {sample_rate} Hz needs more samples than a buffer can hold"
        )));
    }
    Ok(count as usize)
}

pub(crate) fn check_rate(sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(invalid("sample rate must be positive"));
    }
    Ok(())
}
