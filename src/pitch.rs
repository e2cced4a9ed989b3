//! Twelve-tone equal temperament pitch helpers.
//!
//! The audio engine only needs frequencies; this module turns note names
//! such as `"A4"`, `"F#3"` or `"Bbb2"` into them.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrettyError, Result, invalid};

/// Concert pitch: frequency of A4 in Hz.
pub const DEFAULT_A4: f64 = 440.0;

/// MIDI note number of A4.
const A4_MIDI: i32 = 69;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitch in twelve-tone equal temperament. Enharmonic spellings compare
/// equal: `C#4 == Db4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Note {
    /// MIDI numbering: C4 = 60, A4 = 69.
    midi: i32,
}

impl Note {
    pub fn from_midi(midi: i32) -> Self {
        Note { midi }
    }

    pub fn midi(&self) -> i32 {
        self.midi
    }

    /// Pitch class, 0 (C) to 11 (B).
    pub fn pitch_class(&self) -> usize {
        self.midi.rem_euclid(12) as usize
    }

    /// Scientific octave number: `D#4` -> 4.
    pub fn octave(&self) -> i32 {
        self.midi.div_euclid(12) - 1
    }

    /// Note name without octave, spelled with sharps.
    pub fn name(&self) -> &'static str {
        SHARP_NAMES[self.pitch_class()]
    }

    /// Frequency in Hz for the given A4 tuning.
    pub fn frequency(&self, a4: f64) -> f64 {
        midi_to_frequency(self.midi, a4)
    }

    /// Shift by `semitones` (negative goes down).
    pub fn transpose(&self, semitones: i32) -> Note {
        Note {
            midi: self.midi + semitones,
        }
    }

    /// Signed distance in semitones from `other` up to `self`.
    pub fn semitones_from(&self, other: Note) -> i32 {
        self.midi - other.midi
    }

    /// The equal-tempered note closest to `frequency`.
    pub fn closest_to(frequency: f64, a4: f64) -> Result<Note> {
        if !frequency.is_finite() || frequency <= 0.0 || !a4.is_finite() || a4 <= 0.0 {
            return Err(invalid(format!(
                "frequencies must be positive, got {frequency} Hz against A4 = {a4} Hz"
            )));
        }
        let semitones = 12.0 * (frequency / a4).log2();
        Ok(Note {
            midi: A4_MIDI + semitones.round() as i32,
        })
    }
}

impl FromStr for Note {
    type Err = FrettyError;

    /// Parse `<letter><accidentals><octave>`: a letter A-G, any run of `#`
    /// and `b`, then an octave number, which may be negative (`"C-1"` is
    /// MIDI 0, as [`Display`](fmt::Display) writes it).
    fn from_str(s: &str) -> Result<Self> {
        let bad = || invalid(format!("note name is not valid: '{s}'"));
        let out_of_range = || invalid(format!("note is out of range: '{s}'"));

        let mut chars = s.char_indices();
        let (_, letter) = chars.next().ok_or_else(bad)?;
        let mut semitone: i32 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(bad()),
        };

        let mut octave_start = s.len();
        for (idx, ch) in chars {
            let step = match ch {
                '#' => 1,
                'b' => -1,
                _ => {
                    octave_start = idx;
                    break;
                }
            };
            semitone = semitone.checked_add(step).ok_or_else(out_of_range)?;
        }

        let octave_str = &s[octave_start..];
        let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let octave: i32 = octave_str.parse().map_err(|_| out_of_range())?;

        let midi = octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(12))
            .and_then(|m| m.checked_add(semitone))
            .ok_or_else(out_of_range)?;
        Ok(Note { midi })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}

/// Convert a MIDI note number to frequency.
///
/// `a4` is the frequency of MIDI note 69. Formula: `a4 * 2^((midi - 69) / 12)`
pub fn midi_to_frequency(midi: i32, a4: f64) -> f64 {
    a4 * (2.0_f64).powf((midi - A4_MIDI) as f64 / 12.0)
}

/// Frequency of a named note (e.g. `"E2"`) for the given A4 tuning.
pub fn note_to_frequency(note: &str, a4: f64) -> Result<f64> {
    Ok(note.parse::<Note>()?.frequency(a4))
}
