//! Tone synthesis: pure sines and additive "string" timbres.
//!
//! Every generated partial starts at a random phase drawn from the
//! synthesizer's [`PhaseSource`], so output is not reproducible across runs
//! unless a seeded or constant source is injected.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::{Result, invalid};

use super::buffer::{DEFAULT_SAMPLE_RATE, SampleBuffer, check_rate, samples_for};
use super::oscillator::{Oscillator, PhaseSource, RngPhase};

/// Number of partials in the default string timbre.
pub const DEFAULT_OVERTONE_COUNT: usize = 30;

/// Below this many samples per cycle a tone is flagged as aliasing-prone.
const MIN_SAMPLES_PER_CYCLE: f64 = 10.0;

/// Advisory raised when a tone is too close to the sample rate to be
/// rendered cleanly. Synthesis still succeeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasingWarning {
    pub frequency: f64,
    pub sample_rate: u32,
}

impl std::fmt::Display for AliasingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tone frequency {:.3e} Hz is not much lower than the sample rate {} Hz",
            self.frequency, self.sample_rate
        )
    }
}

/// Check a frequency against the sample rate, logging the advisory if it
/// fires.
pub fn aliasing_check(frequency: f64, sample_rate: u32) -> Option<AliasingWarning> {
    if (sample_rate as f64) < MIN_SAMPLES_PER_CYCLE * frequency {
        let warning = AliasingWarning {
            frequency,
            sample_rate,
        };
        tracing::warn!(frequency, sample_rate, "{warning}");
        Some(warning)
    } else {
        None
    }
}

/// A synthesized buffer tagged with the fundamental it was built from.
///
/// The frequency is informational; it is not re-derived from the samples
/// and stays the same after filtering or enveloping.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchedBuffer {
    buffer: SampleBuffer,
    frequency: f64,
    aliasing: Option<AliasingWarning>,
}

impl PitchedBuffer {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut SampleBuffer {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }

    /// The aliasing advisory, if it fired during synthesis.
    pub fn aliasing_warning(&self) -> Option<&AliasingWarning> {
        self.aliasing.as_ref()
    }
}

impl Deref for PitchedBuffer {
    type Target = SampleBuffer;

    fn deref(&self) -> &SampleBuffer {
        &self.buffer
    }
}

impl AsRef<SampleBuffer> for PitchedBuffer {
    fn as_ref(&self) -> &SampleBuffer {
        &self.buffer
    }
}

impl From<PitchedBuffer> for SampleBuffer {
    fn from(p: PitchedBuffer) -> Self {
        p.buffer
    }
}

/// Parameters of a plucked-string tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StringToneParams {
    /// Fundamental in Hz.
    pub frequency: f64,
    /// Length in seconds.
    pub duration: f64,
    pub volume: f64,
    /// Decay of the default overtone series: partial `n` has weight
    /// `2^(-n / overdrive)`. Larger is brighter.
    pub overdrive: f64,
    /// Explicit partial weights from the fundamental upward. Overrides
    /// `overdrive` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overtones: Option<Vec<f64>>,
    /// Shape with the attack curve.
    pub attacked: bool,
    pub sample_rate: u32,
}

impl Default for StringToneParams {
    fn default() -> Self {
        StringToneParams {
            frequency: 440.0,
            duration: 0.5,
            volume: 0.1,
            overdrive: 4.0,
            overtones: None,
            attacked: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl StringToneParams {
    pub fn new(frequency: f64) -> Self {
        StringToneParams {
            frequency,
            ..Default::default()
        }
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn overdrive(mut self, overdrive: f64) -> Self {
        self.overdrive = overdrive;
        self
    }

    pub fn overtones(mut self, weights: Vec<f64>) -> Self {
        self.overtones = Some(weights);
        self
    }

    pub fn attacked(mut self, attacked: bool) -> Self {
        self.attacked = attacked;
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// The default overtone series: `count` weights `2^(-n / overdrive)`.
pub fn overtone_weights(overdrive: f64, count: usize) -> Result<Vec<f64>> {
    if !overdrive.is_finite() || overdrive <= 0.0 {
        return Err(invalid(format!("overdrive must be positive, got {overdrive}")));
    }
    Ok((0..count)
        .map(|n| (2.0_f64).powf(-(n as f64) / overdrive))
        .collect())
}

/// Scale `weights` so their squares sum to one.
///
/// Weights must be finite, non-negative and not all zero.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(invalid(format!("overtone weights must be non-negative, got {w}")));
    }
    let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm == 0.0 {
        return Err(invalid("overtone weights must not all be zero"));
    }
    Ok(weights.iter().map(|w| w / norm).collect())
}

/// Generates pitched buffers.
#[derive(Debug, Clone)]
pub struct Synthesizer<P = RngPhase> {
    phases: P,
}

impl Synthesizer<RngPhase> {
    /// A synthesizer with entropy-seeded random phases.
    pub fn new() -> Self {
        Synthesizer {
            phases: RngPhase::from_entropy(),
        }
    }
}

impl Default for Synthesizer<RngPhase> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PhaseSource> Synthesizer<P> {
    pub fn with_phase_source(phases: P) -> Self {
        Synthesizer { phases }
    }

    pub fn phase_source_mut(&mut self) -> &mut P {
        &mut self.phases
    }

    /// A pure sine at `frequency` Hz.
    pub fn tone(
        &mut self,
        frequency: f64,
        duration: f64,
        volume: f64,
        sample_rate: u32,
    ) -> Result<PitchedBuffer> {
        let mut out = self.blank(frequency, duration, sample_rate)?;
        let phase = self.phases.next_phase();
        Oscillator::new(frequency, phase, sample_rate as f64)
            .accumulate(out.buffer.samples_mut(), volume);
        Ok(out)
    }

    /// An additive string tone: weighted partials at integer multiples of
    /// the fundamental, each with its own random phase.
    pub fn string_tone(&mut self, params: &StringToneParams) -> Result<PitchedBuffer> {
        let raw = match &params.overtones {
            Some(weights) => weights.clone(),
            None => overtone_weights(params.overdrive, DEFAULT_OVERTONE_COUNT)?,
        };
        let weights = normalize_weights(&raw)?;

        let mut out = self.blank(params.frequency, params.duration, params.sample_rate)?;
        let fs = params.sample_rate as f64;
        let samples = out.buffer.samples_mut();
        for (n, &w) in weights.iter().enumerate() {
            let phase = self.phases.next_phase();
            let partial = params.frequency * (n + 1) as f64;
            Oscillator::new(partial, phase, fs).accumulate(samples, w * params.volume);
        }

        if params.attacked {
            out.buffer.apply_attack();
        }

        tracing::debug!(
            frequency = params.frequency,
            partials = weights.len(),
            samples = out.len(),
            "synthesized string tone"
        );
        Ok(out)
    }

    /// Validate arguments and allocate a silent pitched buffer.
    fn blank(&self, frequency: f64, duration: f64, sample_rate: u32) -> Result<PitchedBuffer> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(invalid(format!("frequency must be positive, got {frequency}")));
        }
        check_rate(sample_rate)?;
        let len = samples_for(duration, sample_rate)?;
        let aliasing = aliasing_check(frequency, sample_rate);
        Ok(PitchedBuffer {
            buffer: SampleBuffer::new(vec![0.0; len], sample_rate)?,
            frequency,
            aliasing,
        })
    }
}
