//! WAV codec — loading and saving sample buffers.
//!
//! Loading always yields a mono buffer: channels are summed, integer PCM is
//! rescaled by its full-scale value into `[-1, 1]`. Saving writes mono
//! 32-bit float.

use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::dsp::buffer::SampleBuffer;
use crate::error::{FrettyError, Result};

/// Load a WAV file as a mono buffer.
pub fn load(path: impl AsRef<Path>) -> Result<SampleBuffer> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading waveform");
    let reader = WavReader::open(path).map_err(decode_error)?;
    read_mono(reader)
}

/// Decode WAV bytes from any reader.
pub fn decode<R: Read>(input: R) -> Result<SampleBuffer> {
    let reader = WavReader::new(input).map_err(decode_error)?;
    read_mono(reader)
}

/// Save a buffer as a mono 32-bit float WAV file.
pub fn save(buffer: &SampleBuffer, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = WavWriter::create(path.as_ref(), mono_spec(buffer.sample_rate()))?;
    for &s in buffer.samples() {
        writer.write_sample(s as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Encode a buffer as WAV bytes (mono 32-bit float).
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, mono_spec(buffer.sample_rate()))?;
        for &s in buffer.samples() {
            writer.write_sample(s as f32)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

fn read_mono<R: Read>(mut reader: WavReader<R>) -> Result<SampleBuffer> {
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, bits @ 1..=32) => {
            // hound hands back 8-bit unsigned PCM already shifted around zero.
            let full_scale = (1u64 << (bits - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
        (format, bits) => {
            return Err(FrettyError::UnsupportedFormat(format!(
                "{bits}-bit {format:?} samples"
            )));
        }
    };

    let mono: Vec<f64> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum())
        .collect();

    tracing::debug!(
        channels,
        sample_rate = spec.sample_rate,
        samples = mono.len(),
        "decoded waveform"
    );
    SampleBuffer::new(mono, spec.sample_rate)
}

/// Sort hound's header errors: encodings it cannot read versus files that
/// are broken.
fn decode_error(e: hound::Error) -> FrettyError {
    match e {
        hound::Error::Unsupported => {
            FrettyError::UnsupportedFormat("sample encoding not supported".to_string())
        }
        // hound rejects sample widths it has no reader for (64-bit float,
        // 12-bit packed PCM, ...) while parsing the fmt chunk.
        hound::Error::FormatError(msg) if msg.starts_with("bits per sample is not") => {
            FrettyError::UnsupportedFormat(msg.to_string())
        }
        other => FrettyError::Codec(other),
    }
}
