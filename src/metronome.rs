//! Metronome — click tracks built from a single click sample.
//!
//! A bar is laid out on a sixteenth-note grid. The first beat opens with the
//! accented click; the remaining beats open with a lower click (the same
//! sample played at 80% rate). The three sixteenths after each beat use an
//! even lower click (64% rate) at the eighth/sixteenth volumes, so with both
//! at zero only the beats sound.

use serde::{Deserialize, Serialize};

use crate::dsp::buffer::SampleBuffer;
use crate::dsp::envelope::attack_curve;
use crate::dsp::mixer::{overlay, repeat, scale, sequence, sequence_all};
use crate::dsp::oscillator::Oscillator;
use crate::error::{Result, invalid};

/// Rate factor between the accented click and each lower click.
const CLICK_DROP: f64 = 0.8;

/// Length of the synthetic click in seconds.
const CLICK_LENGTH: f64 = 0.015;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metronome {
    /// Beats per minute.
    pub bpm: f64,
    /// Beats per bar.
    pub signature: usize,
    /// Volume of the off-beat eighth. Defaults to the sixteenth volume.
    pub vol_8th: Option<f64>,
    /// Volume of the off-beat sixteenths. Defaults to silent.
    pub vol_16th: Option<f64>,
    /// Overall volume of the bar.
    pub volume: f64,
}

impl Default for Metronome {
    fn default() -> Self {
        Metronome {
            bpm: 120.0,
            signature: 4,
            vol_8th: None,
            vol_16th: None,
            volume: 1.0,
        }
    }
}

impl Metronome {
    pub fn new(bpm: f64, signature: usize) -> Self {
        Metronome {
            bpm,
            signature,
            ..Default::default()
        }
    }

    /// Seconds per sixteenth note.
    pub fn tick(&self) -> f64 {
        60.0 / (4.0 * self.bpm)
    }

    /// A short decaying 1.5 kHz blip usable as a click.
    pub fn default_click(sample_rate: u32) -> Result<SampleBuffer> {
        let mut click = SampleBuffer::silence(CLICK_LENGTH, sample_rate)?;
        let len = click.len();
        Oscillator::new(1500.0, 0.0, sample_rate as f64).accumulate(click.samples_mut(), 0.5);
        let fade: Vec<f64> = attack_curve(len, sample_rate)
            .into_iter()
            .enumerate()
            .map(|(i, g)| g * (1.0 - i as f64 / len.max(1) as f64))
            .collect();
        click.modulate_in_place(&fade)?;
        Ok(click)
    }

    /// One bar built from `click`.
    pub fn bar(&self, click: &SampleBuffer) -> Result<SampleBuffer> {
        let (vol_8th, vol_16th) = self.validate()?;
        let dt = self.tick();

        let rate = click.sample_rate();
        let clock = click.relabel_rate(lowered(rate, 1))?;
        let cluck = click.relabel_rate(lowered(rate, 2))?;
        // The lowest click is the longest.
        if dt < cluck.duration() {
            return Err(invalid(format!(
                "too many clicks per second: a sixteenth lasts {dt:.4}s but the click lasts {:.4}s",
                cluck.duration()
            )));
        }

        let slot = SampleBuffer::silence(dt, rate)?;
        let pad = |b: &SampleBuffer| overlay(b, &slot, 0.0);
        let click = pad(click)?;
        let clock = pad(&clock)?;
        let cluck = pad(&cluck)?;

        let beat_rest = sequence_all(&[
            scale(&cluck, vol_16th),
            scale(&cluck, vol_8th),
            scale(&cluck, vol_16th),
        ])?;
        let beat = sequence(&clock, &beat_rest)?;
        let first_beat = sequence(&click, &beat_rest)?;

        let bar = if self.signature > 1 {
            sequence(&first_beat, &repeat(&beat, self.signature - 1)?)?
        } else {
            first_beat
        };

        tracing::debug!(
            bpm = self.bpm,
            signature = self.signature,
            duration = bar.duration(),
            "built metronome bar"
        );
        Ok(scale(&bar, self.volume))
    }

    /// `count` bars back to back.
    pub fn bars(&self, click: &SampleBuffer, count: usize) -> Result<SampleBuffer> {
        repeat(&self.bar(click)?, count)
    }

    /// Returns the effective (eighth, sixteenth) volumes.
    fn validate(&self) -> Result<(f64, f64)> {
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            return Err(invalid(format!("bpm must be positive, got {}", self.bpm)));
        }
        if self.signature < 1 {
            return Err(invalid("signature must be at least one beat"));
        }
        let vol_16th = self.vol_16th.unwrap_or(0.0);
        let vol_8th = self.vol_8th.unwrap_or(vol_16th);
        for v in [vol_8th, vol_16th, self.volume] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(invalid(format!("volumes must be non-negative, got {v}")));
            }
        }
        Ok((vol_8th, vol_16th))
    }
}

/// `rate` dropped by [`CLICK_DROP`] `steps` times.
fn lowered(rate: u32, steps: i32) -> u32 {
    ((rate as f64 * CLICK_DROP.powi(steps)).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrettyError;

    const RATE: u32 = 8000;

    fn click() -> SampleBuffer {
        Metronome::default_click(RATE).unwrap()
    }

    fn energy(b: &SampleBuffer, from: f64, to: f64) -> f64 {
        let rate = b.sample_rate() as f64;
        let (i, j) = ((from * rate).round() as usize, (to * rate).round() as usize);
        b.samples()[i..j.min(b.len())].iter().map(|s| s * s).sum()
    }

    #[test]
    fn bar_length_matches_tempo() {
        let m = Metronome::new(120.0, 4);
        let bar = m.bar(&click()).unwrap();
        // 4 beats at 120 bpm = 2 seconds.
        assert!((bar.duration() - 2.0).abs() <= 4.0 / RATE as f64, "bar lasted {}", bar.duration());
    }

    #[test]
    fn silent_subdivisions_leave_gaps() {
        let m = Metronome::new(120.0, 2);
        let bar = m.bar(&click()).unwrap();
        let tick = m.tick();
        assert!(energy(&bar, 0.0, tick) > 0.0);
        assert_eq!(energy(&bar, tick, 4.0 * tick), 0.0);
        assert!(energy(&bar, 4.0 * tick, 5.0 * tick) > 0.0);
    }

    #[test]
    fn subdivisions_sound_when_enabled() {
        let m = Metronome {
            vol_16th: Some(0.3),
            ..Metronome::new(100.0, 1)
        };
        let bar = m.bar(&click()).unwrap();
        let tick = m.tick();
        for k in 1..4 {
            let e = energy(&bar, k as f64 * tick, (k + 1) as f64 * tick);
            assert!(e > 0.0, "sixteenth {k} should click");
        }
    }

    #[test]
    fn eighth_defaults_to_sixteenth_volume() {
        let m = Metronome {
            vol_16th: Some(0.5),
            ..Default::default()
        };
        assert_eq!(m.validate().unwrap(), (0.5, 0.5));
        let m = Metronome {
            vol_8th: Some(0.7),
            ..Default::default()
        };
        assert_eq!(m.validate().unwrap(), (0.7, 0.0));
    }

    #[test]
    fn volume_scales_bar() {
        let loud = Metronome::new(90.0, 3).bar(&click()).unwrap();
        let soft = Metronome {
            volume: 0.5,
            ..Metronome::new(90.0, 3)
        }
        .bar(&click())
        .unwrap();
        for (l, s) in loud.samples().iter().zip(soft.samples()) {
            assert_eq!(l * 0.5, *s);
        }
    }

    #[test]
    fn rejects_bad_settings() {
        let c = click();
        for m in [
            Metronome::new(0.0, 4),
            Metronome::new(120.0, 0),
            Metronome {
                vol_8th: Some(-1.0),
                ..Default::default()
            },
            Metronome {
                volume: -0.1,
                ..Default::default()
            },
            // A sixteenth at 2000 bpm is shorter than the click.
            Metronome::new(2000.0, 4),
            // A sixteenth this long cannot be allocated.
            Metronome::new(1e-300, 4),
        ] {
            assert!(
                matches!(m.bar(&c), Err(FrettyError::InvalidArgument(_))),
                "{m:?} should be rejected"
            );
        }
    }

    #[test]
    fn settings_round_trip_through_json() {
        let m = Metronome {
            vol_8th: Some(0.4),
            vol_16th: Some(0.2),
            ..Metronome::new(96.0, 3)
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"vol8th\":0.4"), "{json}");
        let back: Metronome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        let partial: Metronome = serde_json::from_str(r#"{"bpm": 60.0}"#).unwrap();
        assert_eq!(partial, Metronome::new(60.0, 4));
    }

    #[test]
    fn bars_repeat() {
        let m = Metronome::new(120.0, 4);
        let one = m.bar(&click()).unwrap();
        let three = m.bars(&click(), 3).unwrap();
        assert!((three.duration() - 3.0 * one.duration()).abs() <= 3.0 / RATE as f64);
    }
}
