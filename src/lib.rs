pub mod arrange;
pub mod codec;
pub mod config;
pub mod dsp;
pub mod error;
pub mod metronome;
pub mod pitch;
pub mod playback;

pub use crate::config::{EngineConfig, Timbre};
pub use crate::dsp::buffer::{DEFAULT_SAMPLE_RATE, SampleBuffer};
pub use crate::dsp::mixer::{overlay, repeat, scale, sequence};
pub use crate::dsp::oscillator::{ConstantPhase, PhaseSource, RngPhase};
pub use crate::dsp::synth::{AliasingWarning, PitchedBuffer, StringToneParams, Synthesizer};
pub use crate::error::{FrettyError, Result};
pub use crate::pitch::Note;

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the fretty_audio version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Render a named note (e.g. `"E2"`) with the default string timbre.
pub fn render_note(note: &str, duration: f64, sample_rate: u32) -> Result<SampleBuffer> {
    let config = EngineConfig {
        sample_rate,
        timbre: Timbre::String,
        ..Default::default()
    };
    let note: Note = note.parse()?;
    let mut synth = Synthesizer::new();
    let tone = arrange::render_note(&mut synth, note, duration, &config)?;
    let softened = playback::softened(&tone, config.playback_lowpass, config.lowpass_order)?;
    Ok(softened.into_owned())
}

/// WASM-exposed: render a named note to mono f32 samples.
/// Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_note_samples(note: &str, duration: f64, sample_rate: u32) -> Result<Vec<f32>, JsValue> {
    let buffer =
        render_note(note, duration, sample_rate).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(buffer.to_f32())
}

/// WASM-exposed: render a named note to a WAV byte array.
#[wasm_bindgen]
pub fn render_note_wav(note: &str, duration: f64, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    render_note(note, duration, sample_rate)
        .and_then(|buffer| codec::encode_wav(&buffer))
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}
