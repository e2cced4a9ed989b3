//! Arranging notes into melodies and chords.

use crate::config::{EngineConfig, Timbre};
use crate::dsp::buffer::SampleBuffer;
use crate::dsp::mixer::{overlay_all, sequence_all};
use crate::dsp::oscillator::PhaseSource;
use crate::dsp::synth::{PitchedBuffer, Synthesizer};
use crate::error::{Result, invalid};
use crate::pitch::Note;

/// How much longer than the others the final note of a run is held.
const FINAL_NOTE_HOLD: f64 = 7.0;

/// Render a single note with the configured timbre.
pub fn render_note<P: PhaseSource>(
    synth: &mut Synthesizer<P>,
    note: Note,
    duration: f64,
    config: &EngineConfig,
) -> Result<PitchedBuffer> {
    let frequency = note.frequency(config.a4);
    match config.timbre {
        Timbre::Sine => {
            let mut tone = synth.tone(frequency, duration, config.volume, config.sample_rate)?;
            if config.attacked {
                tone.buffer_mut().apply_attack();
            }
            Ok(tone)
        }
        Timbre::String => synth.string_tone(&config.string_tone(frequency, duration)?),
    }
}

/// Play `notes` one after another, `note_duration` seconds each, holding
/// the last one seven times as long.
pub fn scale_run<P: PhaseSource>(
    synth: &mut Synthesizer<P>,
    notes: &[Note],
    note_duration: f64,
    config: &EngineConfig,
) -> Result<SampleBuffer> {
    let (last, rest) = notes
        .split_last()
        .ok_or_else(|| invalid("a run needs at least one note"))?;

    let mut parts = rest
        .iter()
        .map(|&n| render_note(synth, n, note_duration, config).map(SampleBuffer::from))
        .collect::<Result<Vec<_>>>()?;
    parts.push(render_note(synth, *last, FINAL_NOTE_HOLD * note_duration, config)?.into());

    sequence_all(&parts)
}

/// Sound every note at once for `duration` seconds.
pub fn chord<P: PhaseSource>(
    synth: &mut Synthesizer<P>,
    notes: &[Note],
    duration: f64,
    config: &EngineConfig,
) -> Result<SampleBuffer> {
    if notes.is_empty() {
        return Err(invalid("a chord needs at least one note"));
    }
    let voices = notes
        .iter()
        .map(|&n| render_note(synth, n, duration, config).map(SampleBuffer::from))
        .collect::<Result<Vec<_>>>()?;
    overlay_all(&voices)
}
