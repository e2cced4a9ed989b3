//! Engine configuration.
//!
//! Stored as camelCase JSON, the same shape as the voice presets:
//!
//! ```json
//! { "sampleRate": 44100, "a4": 440.0, "timbre": "string", "playbackLowpass": 5000.0 }
//! ```
//!
//! Every field is optional and falls back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::buffer::DEFAULT_SAMPLE_RATE;
use crate::dsp::synth::{DEFAULT_OVERTONE_COUNT, StringToneParams};
use crate::error::{Result, invalid};
use crate::pitch::DEFAULT_A4;

/// Default playback low-pass cutoff in Hz.
pub const DEFAULT_PLAYBACK_LOWPASS: f64 = 5000.0;

/// Default playback low-pass order.
pub const DEFAULT_LOWPASS_ORDER: usize = 5;

/// Which synthesis model renders a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    /// A single sine shaped by the attack curve.
    #[default]
    Sine,
    /// The additive string model.
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub sample_rate: u32,
    /// Tuning reference: frequency of A4 in Hz.
    pub a4: f64,
    pub timbre: Timbre,
    pub volume: f64,
    /// Default note length in seconds.
    pub note_duration: f64,
    pub overdrive: f64,
    pub overtone_count: usize,
    pub attacked: bool,
    /// Low-pass cutoff applied before playback; `null` disables it.
    pub playback_lowpass: Option<f64>,
    pub lowpass_order: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            a4: DEFAULT_A4,
            timbre: Timbre::Sine,
            volume: 0.1,
            note_duration: 0.5,
            overdrive: 4.0,
            overtone_count: DEFAULT_OVERTONE_COUNT,
            attacked: true,
            playback_lowpass: Some(DEFAULT_PLAYBACK_LOWPASS),
            lowpass_order: DEFAULT_LOWPASS_ORDER,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading engine config");
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(invalid("config: sampleRate must be positive"));
        }
        if !(self.a4.is_finite() && self.a4 > 0.0) {
            return Err(invalid(format!("config: a4 must be positive, got {}", self.a4)));
        }
        if !(self.note_duration.is_finite() && self.note_duration >= 0.0) {
            return Err(invalid(format!(
                "config: noteDuration must be non-negative, got {}",
                self.note_duration
            )));
        }
        if !(self.overdrive.is_finite() && self.overdrive > 0.0) {
            return Err(invalid(format!(
                "config: overdrive must be positive, got {}",
                self.overdrive
            )));
        }
        if self.overtone_count == 0 {
            return Err(invalid("config: overtoneCount must be at least 1"));
        }
        if self.lowpass_order == 0 {
            return Err(invalid("config: lowpassOrder must be at least 1"));
        }
        if let Some(cutoff) = self.playback_lowpass {
            if !(cutoff.is_finite() && cutoff > 0.0) {
                return Err(invalid(format!(
                    "config: playbackLowpass must be positive, got {cutoff}"
                )));
            }
        }
        Ok(())
    }

    /// String-tone parameters for `frequency` using this configuration.
    ///
    /// The overtone series is expanded here so a non-default
    /// `overtone_count` takes effect.
    pub fn string_tone(&self, frequency: f64, duration: f64) -> Result<StringToneParams> {
        let weights =
            crate::dsp::synth::overtone_weights(self.overdrive, self.overtone_count)?;
        Ok(StringToneParams {
            frequency,
            duration,
            volume: self.volume,
            overdrive: self.overdrive,
            overtones: Some(weights),
            attacked: self.attacked,
            sample_rate: self.sample_rate,
        })
    }
}
