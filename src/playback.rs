//! Playback sinks — where finished buffers go.
//!
//! A sink receives a complete buffer and converts it to 32-bit float PCM for
//! its output. [`play`] is the usual entry point: it tames harsh upper
//! harmonics with a low-pass before the hand-off.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::codec;
use crate::config::{DEFAULT_LOWPASS_ORDER, EngineConfig};
use crate::dsp::buffer::SampleBuffer;
use crate::error::Result;

/// Receives finished buffers.
pub trait PlaybackSink {
    fn play(&mut self, buffer: &SampleBuffer) -> Result<()>;
}

impl<S: PlaybackSink + ?Sized> PlaybackSink for &mut S {
    fn play(&mut self, buffer: &SampleBuffer) -> Result<()> {
        (**self).play(buffer)
    }
}

/// `buffer` low-passed at `cutoff` Hz for playback, borrowed unchanged
/// when there is no cutoff.
///
/// Cutoffs at or above the buffer's Nyquist frequency are skipped rather
/// than rejected, so low-rate buffers still play.
pub fn softened(
    buffer: &SampleBuffer,
    cutoff: Option<f64>,
    order: usize,
) -> Result<Cow<'_, SampleBuffer>> {
    let nyquist = buffer.sample_rate() as f64 / 2.0;
    match cutoff {
        Some(cutoff) if cutoff < nyquist => Ok(Cow::Owned(buffer.lowpassed(cutoff, order)?)),
        Some(cutoff) => {
            tracing::debug!(cutoff, nyquist, "playback low-pass above Nyquist, skipping");
            Ok(Cow::Borrowed(buffer))
        }
        None => Ok(Cow::Borrowed(buffer)),
    }
}

/// Low-pass `buffer` at `lowpass` Hz (if given) and hand it to `sink`.
///
/// See [`softened`] for how out-of-band cutoffs are treated.
pub fn play<S: PlaybackSink + ?Sized>(
    buffer: &SampleBuffer,
    sink: &mut S,
    lowpass: Option<f64>,
) -> Result<()> {
    let out = softened(buffer, lowpass, DEFAULT_LOWPASS_ORDER)?;
    hand_off(&out, sink)
}

/// [`play`] using the low-pass settings from `config`.
pub fn play_with_config<S: PlaybackSink + ?Sized>(
    buffer: &SampleBuffer,
    sink: &mut S,
    config: &EngineConfig,
) -> Result<()> {
    let out = softened(buffer, config.playback_lowpass, config.lowpass_order)?;
    hand_off(&out, sink)
}

fn hand_off<S: PlaybackSink + ?Sized>(out: &SampleBuffer, sink: &mut S) -> Result<()> {
    let peak = out.peak();
    if peak > 1.0 {
        tracing::warn!(peak, "buffer exceeds full scale and will clip at the sink");
    }
    tracing::info!(
        sample_rate = out.sample_rate(),
        duration = out.duration(),
        "handing buffer to sink"
    );
    sink.play(out)
}

/// One block received by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedBlock {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

/// Collects every block it is given.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Vec<PlayedBlock>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[PlayedBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<PlayedBlock> {
        self.blocks
    }
}

impl PlaybackSink for MemorySink {
    fn play(&mut self, buffer: &SampleBuffer) -> Result<()> {
        self.blocks.push(PlayedBlock {
            sample_rate: buffer.sample_rate(),
            samples: buffer.to_f32(),
        });
        Ok(())
    }
}

/// Writes each buffer it receives to a WAV file, overwriting the last.
#[derive(Debug, Clone)]
pub struct WavFileSink {
    path: PathBuf,
}

impl WavFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WavFileSink { path: path.into() }
    }
}

impl PlaybackSink for WavFileSink {
    fn play(&mut self, buffer: &SampleBuffer) -> Result<()> {
        codec::save(buffer, &self.path)
    }
}

#[cfg(feature = "playback")]
pub use device::DeviceSink;

#[cfg(feature = "playback")]
mod device {
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::PlaybackSink;
    use crate::dsp::buffer::SampleBuffer;
    use crate::error::{FrettyError, Result};

    /// Plays through the default output device and blocks until done.
    pub struct DeviceSink {
        // The stream must outlive the handle.
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl DeviceSink {
        pub fn open_default() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| FrettyError::Playback(format!("no output device: {e}")))?;
            Ok(DeviceSink {
                _stream: stream,
                handle,
            })
        }
    }

    impl PlaybackSink for DeviceSink {
        fn play(&mut self, buffer: &SampleBuffer) -> Result<()> {
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| FrettyError::Playback(format!("failed to open sink: {e}")))?;
            sink.append(SamplesBuffer::new(1, buffer.sample_rate(), buffer.to_f32()));
            sink.sleep_until_end();
            Ok(())
        }
    }
}
