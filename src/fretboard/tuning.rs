#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Equal Temperament
=================

Every fret on a guitar raises the pitch of its string by one semitone. In
12-tone equal temperament a semitone is the frequency ratio 2^(1/12), so
twelve frets make an octave (ratio 2).

We anchor everything on the lowest open string and describe the other
strings by how many semitones above it they are tuned:

    frequency = BASE_FREQ * 2^((semitone_offset + fret) / 12)

Standard tuning (low to high):

    string  name  offset  open pitch
    ------  ----  ------  ----------
      0      E      0      E2  82.41 Hz
      1      A      5      A2 110.00 Hz
      2      D     10      D3 146.83 Hz
      3      G     15      G3 196.00 Hz
      4      B     19      B3 246.94 Hz
      5      e     24      E4 329.63 Hz

Note the B string: it sits a major third (4 semitones) above G, every other
pair is a fourth (5 semitones).

There is no upper fret limit. Fret 25 on the high e string is ~1.4 kHz,
which is still a perfectly good frequency; the synthesizer is responsible
for whatever happens at absurd pitches, not the resolver.
*/

/// Frequency of the open low E string (E2) in Hz.
pub const BASE_FREQ: f64 = 82.41;

/// Number of strings on the instrument.
pub const STRING_COUNT: usize = 6;

/// Resolve a fretted note to its fundamental frequency in Hz.
///
/// Pure and deterministic: identical inputs give bit-identical output.
#[inline]
pub fn resolve_frequency(base_frequency: f64, semitone_offset: u32, fret: u32) -> f64 {
    let semitones = f64::from(semitone_offset) + f64::from(fret);
    base_frequency * 2.0_f64.powf(semitones / 12.0)
}

/// One string of a tuning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTuning {
    /// Display name ("E", "A", ... "e")
    pub name: String,
    /// Semitones above the open lowest string
    pub semitone_offset: u32,
}

impl StringTuning {
    pub fn new(name: impl Into<String>, semitone_offset: u32) -> Self {
        Self {
            name: name.into(),
            semitone_offset,
        }
    }
}

/// A validated six-string tuning, ordered low to high.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    strings: Vec<StringTuning>,
    base_frequency: f64,
}

impl Tuning {
    /// Build a tuning, checking that it has six strings, starts at offset 0,
    /// and that offsets strictly increase.
    pub fn new(strings: Vec<StringTuning>, base_frequency: f64) -> Result<Self, TuningError> {
        if strings.len() != STRING_COUNT {
            return Err(TuningError::WrongStringCount {
                expected: STRING_COUNT,
                actual: strings.len(),
            });
        }

        if !(base_frequency.is_finite() && base_frequency > 0.0) {
            return Err(TuningError::InvalidBaseFrequency(base_frequency));
        }

        if strings[0].semitone_offset != 0 {
            return Err(TuningError::LowestStringOffset(strings[0].semitone_offset));
        }

        for (index, pair) in strings.windows(2).enumerate() {
            if pair[1].semitone_offset <= pair[0].semitone_offset {
                return Err(TuningError::NotAscending {
                    string: index + 1,
                    previous: pair[0].semitone_offset,
                    offset: pair[1].semitone_offset,
                });
            }
        }

        Ok(Self {
            strings,
            base_frequency,
        })
    }

    /// Standard EADGBe tuning anchored on E2 = 82.41 Hz.
    pub fn standard() -> Self {
        Self {
            strings: vec![
                StringTuning::new("E", 0),
                StringTuning::new("A", 5),
                StringTuning::new("D", 10),
                StringTuning::new("G", 15),
                StringTuning::new("B", 19),
                StringTuning::new("e", 24),
            ],
            base_frequency: BASE_FREQ,
        }
    }

    /// Frequency of `string` held at `fret`, or `None` if the string index is
    /// out of range.
    pub fn frequency(&self, string: usize, fret: u32) -> Option<f64> {
        self.strings
            .get(string)
            .map(|s| resolve_frequency(self.base_frequency, s.semitone_offset, fret))
    }

    pub fn strings(&self) -> &[StringTuning] {
        &self.strings
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

/// Errors that can occur when building a custom tuning
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// Not exactly six strings
    WrongStringCount { expected: usize, actual: usize },
    /// The lowest string must be the anchor (offset 0)
    LowestStringOffset(u32),
    /// Offsets must strictly increase from low to high string
    NotAscending {
        string: usize,
        previous: u32,
        offset: u32,
    },
    /// Anchor frequency must be positive and finite
    InvalidBaseFrequency(f64),
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::WrongStringCount { expected, actual } => {
                write!(f, "Tuning needs {} strings, got {}", expected, actual)
            }
            TuningError::LowestStringOffset(offset) => {
                write!(
                    f,
                    "Lowest string must have semitone offset 0, got {}",
                    offset
                )
            }
            TuningError::NotAscending {
                string,
                previous,
                offset,
            } => {
                write!(
                    f,
                    "String {} offset {} is not above the previous string's offset {}",
                    string, offset, previous
                )
            }
            TuningError::InvalidBaseFrequency(freq) => {
                write!(f, "Base frequency must be a positive number of Hz, got {}", freq)
            }
        }
    }
}

impl std::error::Error for TuningError {}
